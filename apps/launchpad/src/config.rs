use std::{fs, io, path::Path, time::Duration};

use anyhow::{bail, Context};
use launch_core::{PollerConfig, RuntimeConfig, SequenceTiming};
use serde::Deserialize;
use url::Url;

use crate::scene::stars::DEFAULT_STAR_COUNT;

const MAX_FRAME_RATE: u32 = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub status_url: String,
    pub stats_url: Option<String>,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
    pub firing_delay_ms: u64,
    pub liftoff_delay_ms: u64,
    pub frame_rate: u32,
    pub star_count: usize,
    pub star_seed: u64,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            status_url: "http://127.0.0.1:8787/launches".into(),
            stats_url: Some("http://127.0.0.1:8787/stats".into()),
            poll_interval_ms: 5000,
            request_timeout_ms: 4000,
            firing_delay_ms: 2000,
            liftoff_delay_ms: 2000,
            frame_rate: 60,
            star_count: DEFAULT_STAR_COUNT,
            star_seed: 0x5eed,
            log_filter: "info".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    status_url: Option<String>,
    stats_url: Option<String>,
    poll_interval_ms: Option<u64>,
    request_timeout_ms: Option<u64>,
    firing_delay_ms: Option<u64>,
    liftoff_delay_ms: Option<u64>,
    frame_rate: Option<u32>,
    star_count: Option<usize>,
    star_seed: Option<u64>,
    log_filter: Option<String>,
}

pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    load_settings_with(path, |key| std::env::var(key).ok())
}

/// Defaults, then the TOML file (if present), then environment variables.
pub fn load_settings_with(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => {
            let file_cfg: FileSettings = toml::from_str(&raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
            settings.apply_file(file_cfg);
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read '{}'", path.display()))
        }
    }

    if let Some(v) = env("STATUS_URL") {
        settings.status_url = v;
    }
    if let Some(v) = env("APP__STATUS_URL") {
        settings.status_url = v;
    }

    if let Some(v) = env("STATS_URL") {
        settings.stats_url = non_empty(v);
    }
    if let Some(v) = env("APP__STATS_URL") {
        settings.stats_url = non_empty(v);
    }

    if let Some(v) = env("APP__POLL_INTERVAL_MS") {
        settings.poll_interval_ms = parse_env("APP__POLL_INTERVAL_MS", &v)?;
    }
    if let Some(v) = env("APP__REQUEST_TIMEOUT_MS") {
        settings.request_timeout_ms = parse_env("APP__REQUEST_TIMEOUT_MS", &v)?;
    }
    if let Some(v) = env("APP__FIRING_DELAY_MS") {
        settings.firing_delay_ms = parse_env("APP__FIRING_DELAY_MS", &v)?;
    }
    if let Some(v) = env("APP__LIFTOFF_DELAY_MS") {
        settings.liftoff_delay_ms = parse_env("APP__LIFTOFF_DELAY_MS", &v)?;
    }
    if let Some(v) = env("APP__STAR_SEED") {
        settings.star_seed = parse_env("APP__STAR_SEED", &v)?;
    }
    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    Ok(settings)
}

impl Settings {
    /// Command-line flags win over every other layer. An empty stats URL
    /// turns stats polling off.
    pub fn apply_cli(
        &mut self,
        status_url: Option<String>,
        stats_url: Option<String>,
        log_filter: Option<String>,
    ) {
        if let Some(v) = status_url {
            self.status_url = v;
        }
        if let Some(v) = stats_url {
            self.stats_url = non_empty(v);
        }
        if let Some(v) = log_filter {
            self.log_filter = v;
        }
    }

    fn apply_file(&mut self, file_cfg: FileSettings) {
        if let Some(v) = file_cfg.status_url {
            self.status_url = v;
        }
        if let Some(v) = file_cfg.stats_url {
            self.stats_url = non_empty(v);
        }
        if let Some(v) = file_cfg.poll_interval_ms {
            self.poll_interval_ms = v;
        }
        if let Some(v) = file_cfg.request_timeout_ms {
            self.request_timeout_ms = v;
        }
        if let Some(v) = file_cfg.firing_delay_ms {
            self.firing_delay_ms = v;
        }
        if let Some(v) = file_cfg.liftoff_delay_ms {
            self.liftoff_delay_ms = v;
        }
        if let Some(v) = file_cfg.frame_rate {
            self.frame_rate = v;
        }
        if let Some(v) = file_cfg.star_count {
            self.star_count = v;
        }
        if let Some(v) = file_cfg.star_seed {
            self.star_seed = v;
        }
        if let Some(v) = file_cfg.log_filter {
            self.log_filter = v;
        }
    }

    pub fn poller_config(&self) -> anyhow::Result<PollerConfig> {
        if self.request_timeout_ms == 0 {
            bail!("request_timeout_ms must be greater than zero");
        }
        let status_url = parse_http_url(&self.status_url)?;
        let stats_url = self.stats_url.as_deref().map(parse_http_url).transpose()?;
        Ok(PollerConfig {
            status_url,
            stats_url,
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        })
    }

    pub fn runtime_config(&self) -> anyhow::Result<RuntimeConfig> {
        if self.poll_interval_ms == 0 {
            bail!("poll_interval_ms must be greater than zero");
        }
        if !(1..=MAX_FRAME_RATE).contains(&self.frame_rate) {
            bail!("frame_rate must be between 1 and {MAX_FRAME_RATE}");
        }
        Ok(RuntimeConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            frame_interval: Duration::from_secs(1) / self.frame_rate,
            timing: SequenceTiming {
                firing_delay: Duration::from_millis(self.firing_delay_ms),
                liftoff_delay: Duration::from_millis(self.liftoff_delay_ms),
            },
        })
    }
}

fn parse_http_url(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("invalid url '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("url '{raw}' must use http:// or https://");
    }
    Ok(url)
}

fn parse_env<T>(key: &str, raw: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("{key} has an invalid value '{raw}'"))
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
