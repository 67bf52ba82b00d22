use std::{fmt, str::FromStr, sync::OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CallsignError, UnknownSection};

/// A normalized callsign has to contain this somewhere.
pub const CALLSIGN_PATTERN: &str = "[A-Z]{3}";

fn callsign_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(CALLSIGN_PATTERN).expect("callsign pattern compiles"))
}

/// A callsign in its normalized (upper-cased) form.
///
/// The only way to obtain one is [`Callsign::parse`], so holding a value
/// means the letter-run check already passed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Callsign(String);

impl Callsign {
    pub fn parse(raw: &str) -> Result<Self, CallsignError> {
        let normalized = raw.to_uppercase();
        if callsign_pattern().is_match(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(CallsignError::MissingLetterRun { normalized })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Callsign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Callsign {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Result of an availability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionOutcome {
    Ready,
    Taken,
    Error,
}

impl AdmissionOutcome {
    pub fn from_status(status: u16) -> Self {
        match status {
            200 => Self::Ready,
            403 => Self::Taken,
            _ => Self::Error,
        }
    }

    /// Whether the outcome lets the user go on to join.
    pub fn reveals_join(self) -> bool {
        matches!(self, Self::Ready | Self::Taken)
    }
}

impl fmt::Display for AdmissionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ready => "ready",
            Self::Taken => "taken",
            Self::Error => "error",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Ready,
    Taken,
    Join,
    Error,
}

impl Section {
    pub const ALL: [Section; 4] = [Self::Ready, Self::Taken, Self::Join, Self::Error];

    /// Element identifier of the section on the page.
    pub fn id(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Taken => "taken",
            Self::Join => "join",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Section {
    type Err = UnknownSection;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|section| section.id() == id)
            .ok_or_else(|| UnknownSection(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_uppercases_before_matching() {
        let callsign = Callsign::parse("abc123").expect("valid");
        assert_eq!(callsign.as_str(), "ABC123");
    }

    #[test]
    fn parse_requires_consecutive_letters() {
        assert!(Callsign::parse("a1b2c3").is_err());
        assert!(Callsign::parse("ab").is_err());
        assert!(Callsign::parse("").is_err());
        assert!(Callsign::parse("12-ab-cd").is_err());
        assert!(Callsign::parse("DL1ABC").is_ok());
        assert!(Callsign::parse("x zzz y").is_ok());
        assert!(Callsign::parse("ab cd ef").is_err());
        assert!(Callsign::parse("1ABCD").is_ok());
    }

    #[test]
    fn parse_rejects_non_latin_letters() {
        assert!(Callsign::parse("äöü").is_err());
        assert!(Callsign::parse("абв").is_err());
    }

    #[test]
    fn parse_uses_full_case_mapping() {
        // 'ß' upper-cases to "SS", completing a run with the following 'a'.
        let callsign = Callsign::parse("ßa").expect("valid after mapping");
        assert_eq!(callsign.as_str(), "SSA");
    }

    #[test]
    fn rejected_input_reports_normalized_value() {
        let err = Callsign::parse("ab-1").expect_err("invalid");
        assert_eq!(
            err,
            CallsignError::MissingLetterRun {
                normalized: "AB-1".into()
            }
        );
    }

    #[test]
    fn outcome_from_status_maps_known_codes() {
        assert_eq!(AdmissionOutcome::from_status(200), AdmissionOutcome::Ready);
        assert_eq!(AdmissionOutcome::from_status(403), AdmissionOutcome::Taken);
        assert_eq!(AdmissionOutcome::from_status(500), AdmissionOutcome::Error);
        assert_eq!(AdmissionOutcome::from_status(400), AdmissionOutcome::Error);
        assert_eq!(AdmissionOutcome::from_status(201), AdmissionOutcome::Error);
    }

    #[test]
    fn only_ready_and_taken_reveal_join() {
        assert!(AdmissionOutcome::Ready.reveals_join());
        assert!(AdmissionOutcome::Taken.reveals_join());
        assert!(!AdmissionOutcome::Error.reveals_join());
    }

    #[test]
    fn section_ids_round_trip_through_from_str() {
        for section in Section::ALL {
            assert_eq!(section.id().parse::<Section>(), Ok(section));
        }
        assert_eq!(
            "link".parse::<Section>(),
            Err(UnknownSection("link".into()))
        );
    }

    #[test]
    fn callsign_serializes_as_plain_string() {
        let callsign = Callsign::parse("dl1abc").expect("valid");
        assert_eq!(
            serde_json::to_string(&callsign).expect("json"),
            "\"DL1ABC\""
        );
    }
}
