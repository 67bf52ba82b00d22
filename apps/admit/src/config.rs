use std::{collections::HashMap, fs, path::Path};

use client_core::ConcurrencyMode;
use storage::DEFAULT_DATABASE_URL;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub database_url: String,
    pub concurrency: ConcurrencyMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:80".into(),
            database_url: DEFAULT_DATABASE_URL.into(),
            concurrency: ConcurrencyMode::Concurrent,
        }
    }
}

/// Defaults, then `config_path` if it exists, then the process environment.
pub fn load_settings(config_path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |name| std::env::var(name).ok());

    settings
}

pub fn apply_file(settings: &mut Settings, raw: &str) {
    let file_cfg = match toml::from_str::<HashMap<String, String>>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            warn!("config: ignoring unreadable settings file: {err}");
            return;
        }
    };

    if let Some(v) = file_cfg.get("server_url") {
        settings.server_url = v.clone();
    }
    if let Some(v) = file_cfg.get("database_url") {
        settings.database_url = v.clone();
    }
    if let Some(v) = file_cfg.get("concurrency") {
        set_concurrency(settings, v);
    }
}

pub fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("ADMIT_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = lookup("ADMIT_DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = lookup("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = lookup("APP__CONCURRENCY") {
        set_concurrency(settings, &v);
    }
}

fn set_concurrency(settings: &mut Settings, raw: &str) {
    match parse_concurrency(raw) {
        Some(mode) => settings.concurrency = mode,
        None => warn!("config: unknown concurrency mode '{raw}', keeping {:?}", settings.concurrency),
    }
}

pub fn parse_concurrency(raw: &str) -> Option<ConcurrencyMode> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "concurrent" => Some(ConcurrencyMode::Concurrent),
        "replace" | "replace_pending" | "replace-pending" => Some(ConcurrencyMode::ReplacePending),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
