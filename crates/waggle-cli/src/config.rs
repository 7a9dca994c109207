// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_VERSION: i64 = 1;
const APP_NAME: &str = "waggle";
const DEFAULT_TIMEOUT: &str = "10s";

pub const AUTH_TOKEN_ENV: &str = "BEEMINDER_AUTH_TOKEN";
pub const USERNAME_ENV: &str = "BEEMINDER_USERNAME";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub api: Api,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api: Api::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Api {
    pub base_url: Option<String>,
    pub timeout: Option<String>,
    pub auth_token: Option<String>,
    pub username: Option<String>,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: Some(waggle_api::DEFAULT_BASE_URL.to_owned()),
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
            auth_token: None,
            username: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub auth_token: String,
    pub username: String,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("WAGGLE_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set WAGGLE_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is missing `version = 1`; move settings under [api]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(timeout) = &self.api.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "api.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }
        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.api
            .base_url
            .as_deref()
            .unwrap_or(waggle_api::DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(self.api.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    /// Environment variables win over the config file. Both the token and the
    /// username are required before the interactive UI starts.
    pub fn credentials(&self) -> Result<Credentials> {
        let auth_token = env_value(AUTH_TOKEN_ENV)
            .or_else(|| non_empty(self.api.auth_token.clone()))
            .ok_or_else(|| {
                anyhow!(
                    "missing Beeminder auth token; set {AUTH_TOKEN_ENV} or [api].auth_token in the config file"
                )
            })?;
        let username = env_value(USERNAME_ENV)
            .or_else(|| non_empty(self.api.username.clone()))
            .ok_or_else(|| {
                anyhow!(
                    "missing Beeminder username; set {USERNAME_ENV} or [api].username in the config file"
                )
            })?;
        Ok(Credentials {
            auth_token,
            username,
        })
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# waggle config\n# Place this file at: {}\n\nversion = 1\n\n[api]\nbase_url = \"{}\"\ntimeout = \"{}\"\n# Credentials may live here instead of the {} / {} environment variables.\n# auth_token = \"...\"\n# username = \"...\"\n",
            path.display(),
            waggle_api::DEFAULT_BASE_URL,
            DEFAULT_TIMEOUT,
            AUTH_TOKEN_ENV,
            USERNAME_ENV,
        )
    }
}

fn env_value(name: &str) -> Option<String> {
    non_empty(env::var(name).ok())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 5s)")
}
