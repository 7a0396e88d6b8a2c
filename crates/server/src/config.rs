use std::{fs, str::FromStr};

use anyhow::{bail, Context};
use serde::Deserialize;

/// Where callback bodies run relative to the request task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerExecution {
    /// On the request task. A slow callback holds up that worker thread.
    Inline,
    /// On tokio's blocking pool, bounded by `max_concurrent_handlers`.
    #[serde(alias = "blocking-pool")]
    BlockingPool,
}

impl FromStr for HandlerExecution {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> anyhow::Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "inline" => Ok(Self::Inline),
            "blocking_pool" | "blocking-pool" => Ok(Self::BlockingPool),
            other => bail!("unknown handler execution mode '{other}'"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: String,
    pub routes_prefix: String,
    pub max_body_bytes: usize,
    pub compress: bool,
    pub handler_execution: HandlerExecution,
    pub max_concurrent_handlers: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8050".into(),
            routes_prefix: "/".into(),
            max_body_bytes: 1024 * 1024,
            compress: true,
            handler_execution: HandlerExecution::Inline,
            max_concurrent_handlers: 8,
        }
    }
}

impl Settings {
    pub fn update_component_route(&self) -> String {
        format!("{}_dash-update-component", self.routes_prefix)
    }

    pub fn dependencies_route(&self) -> String {
        format!("{}_dash-dependencies", self.routes_prefix)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    routes_prefix: Option<String>,
    max_body_bytes: Option<usize>,
    compress: Option<bool>,
    handler_execution: Option<HandlerExecution>,
    max_concurrent_handlers: Option<usize>,
}

/// Defaults, then `server.toml` if present, then `APP__*` environment variables.
pub fn load_settings() -> anyhow::Result<Settings> {
    let file = fs::read_to_string("server.toml").ok();
    settings_from_sources(file.as_deref(), |key| std::env::var(key).ok())
}

pub(crate) fn settings_from_sources(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        let file_cfg: FileSettings = toml::from_str(raw).context("failed to parse server.toml")?;
        if let Some(v) = file_cfg.bind_addr {
            settings.bind_addr = v;
        }
        if let Some(v) = file_cfg.routes_prefix {
            settings.routes_prefix = v;
        }
        if let Some(v) = file_cfg.max_body_bytes {
            settings.max_body_bytes = v;
        }
        if let Some(v) = file_cfg.compress {
            settings.compress = v;
        }
        if let Some(v) = file_cfg.handler_execution {
            settings.handler_execution = v;
        }
        if let Some(v) = file_cfg.max_concurrent_handlers {
            settings.max_concurrent_handlers = v;
        }
    }

    if let Some(v) = env("APP__BIND_ADDR") {
        settings.bind_addr = v;
    }
    if let Some(v) = env("APP__ROUTES_PREFIX") {
        settings.routes_prefix = v;
    }
    if let Some(v) = env("APP__MAX_BODY_BYTES") {
        settings.max_body_bytes = v
            .parse()
            .with_context(|| format!("APP__MAX_BODY_BYTES is not a byte count: '{v}'"))?;
    }
    if let Some(v) = env("APP__COMPRESS") {
        settings.compress = v
            .parse()
            .with_context(|| format!("APP__COMPRESS must be true or false, got '{v}'"))?;
    }
    if let Some(v) = env("APP__HANDLER_EXECUTION") {
        settings.handler_execution = v.parse()?;
    }
    if let Some(v) = env("APP__MAX_CONCURRENT_HANDLERS") {
        settings.max_concurrent_handlers = v
            .parse()
            .with_context(|| format!("APP__MAX_CONCURRENT_HANDLERS is not a count: '{v}'"))?;
    }

    settings.routes_prefix = normalize_routes_prefix(&settings.routes_prefix);
    if settings.max_concurrent_handlers == 0 {
        bail!("max_concurrent_handlers must be at least 1");
    }

    Ok(settings)
}

/// Prefixes always start and end with `/` so route names can be appended.
fn normalize_routes_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return "/".into();
    }
    format!("/{trimmed}/")
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
