use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallsignError {
    #[error("callsign '{normalized}' has no run of three letters A-Z")]
    MissingLetterRun { normalized: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown section id '{0}'")]
pub struct UnknownSection(pub String);
