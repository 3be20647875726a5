use std::fs;

use config as config_rs;
use serde::Deserialize;
use thiserror::Error;

use crate::obfuscator::ObfuscationOptions;

/// Recognized pipeline options. A missing `domain` (or an empty one) skips
/// the domain lock; the booleans gate the devtools guard and tamper seal.
/// Obfuscation options pass through to the engine untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloakConfig {
    pub domain: Option<String>,
    pub inject_runtime: bool,
    pub tamper_check: bool,
    pub obfuscation: ObfuscationOptions,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(#[from] config_rs::ConfigError),
}

/// Builds the effective configuration from an optional obfuscation-options
/// JSON file plus layered overrides: environment (`CLOAK_DOMAIN`,
/// `CLOAK_INJECT_RUNTIME`, `CLOAK_TAMPER_CHECK`) first, CLI flags on top.
pub fn load_config(
    options_path: Option<&str>,
    domain: &Option<String>,
    inject_runtime: bool,
    tamper_check: bool,
) -> Result<CloakConfig, ConfigError> {
    let obfuscation = match options_path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        }
        None => ObfuscationOptions::default(),
    };

    let mut builder = config_rs::Config::builder()
        .set_default("inject_runtime", false)?
        .set_default("tamper_check", false)?;

    if let Ok(d) = std::env::var("CLOAK_DOMAIN") {
        builder = builder.set_override("domain", d)?;
    }
    if let Ok(v) = std::env::var("CLOAK_INJECT_RUNTIME") {
        builder = builder.set_override("inject_runtime", env_flag(&v))?;
    }
    if let Ok(v) = std::env::var("CLOAK_TAMPER_CHECK") {
        builder = builder.set_override("tamper_check", env_flag(&v))?;
    }

    // CLI flags take precedence
    if let Some(d) = domain {
        builder = builder.set_override("domain", d.clone())?;
    }
    if inject_runtime {
        builder = builder.set_override("inject_runtime", true)?;
    }
    if tamper_check {
        builder = builder.set_override("tamper_check", true)?;
    }

    let cfg = builder.build()?;

    Ok(CloakConfig {
        domain: cfg.get::<String>("domain").ok(),
        inject_runtime: cfg.get::<bool>("inject_runtime")?,
        tamper_check: cfg.get::<bool>("tamper_check")?,
        obfuscation,
    })
}

fn env_flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
