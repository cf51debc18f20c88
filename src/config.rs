//! Config model and persistence helpers.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Placeholder returned by the simulated job API.
pub const PLACEHOLDER_VIDEO_URL: &str = "https://example.com/sample-video.mp4";

/// Top-level configuration stored in `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External job-submission API used by the worker.
    pub api: ApiCfg,
    /// Behaviour of the stand-in API when no endpoint is set.
    pub simulation: SimulationCfg,
    /// Which form sections start expanded.
    pub sections: SectionsCfg,
}

/// Job API connection settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiCfg {
    /// Full URL that accepts the job payload via POST. Empty means simulated.
    pub endpoint: String,
    /// Bearer token sent with each request, if set.
    pub api_key: String,
}

impl ApiCfg {
    /// Trimmed endpoint, or `None` when the simulated API should be used.
    pub fn endpoint(&self) -> Option<&str> {
        Some(self.endpoint.trim()).filter(|s| !s.is_empty())
    }

    pub fn api_key(&self) -> Option<&str> {
        Some(self.api_key.trim()).filter(|s| !s.is_empty())
    }
}

/// Simulated generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationCfg {
    /// Artificial latency before the result arrives.
    pub delay_ms: u64,
    /// URL handed back on success.
    pub video_url: String,
    /// Fail every request instead (exercises the error path).
    pub fail: bool,
}

impl Default for SimulationCfg {
    fn default() -> Self {
        Self {
            delay_ms: 2000,
            video_url: PLACEHOLDER_VIDEO_URL.into(),
            fail: false,
        }
    }
}

/// Initial open/closed state of each form section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionsCfg {
    pub voice: bool,
    pub tactics: bool,
    pub visual: bool,
    pub output: bool,
}

impl Default for SectionsCfg {
    fn default() -> Self {
        Self {
            voice: true,
            tactics: false,
            visual: false,
            output: false,
        }
    }
}

impl Config {
    /// Load from disk or create defaults when missing.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let s = fs::read_to_string(path)?;
            Ok(toml::from_str(&s)?)
        } else {
            let cfg = Self::default();
            cfg.save(path)?;
            Ok(cfg)
        }
    }

    /// Persist the config as pretty TOML.
    pub fn save(&self, path: &Path) -> Result<()> {
        let s = toml::to_string_pretty(self)?;
        fs::write(path, s)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_or_default(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
        assert_eq!(cfg.simulation.video_url, PLACEHOLDER_VIDEO_URL);
        assert!(cfg.sections.voice);
    }

    #[test]
    fn test_saved_settings_are_loaded_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.api.endpoint = "https://jobs.example.test/v1/videos".into();
        cfg.sections.output = true;
        cfg.save(&path).unwrap();

        let loaded = Config::load_or_default(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn test_partial_file_uses_defaults_for_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[simulation]\nfail = true\n").unwrap();

        let cfg = Config::load_or_default(&path).unwrap();
        assert!(cfg.simulation.fail);
        assert_eq!(cfg.simulation.delay_ms, 2000);
        assert_eq!(cfg.api.endpoint(), None);
        assert_eq!(cfg.sections, SectionsCfg::default());
    }

    #[test]
    fn test_blank_endpoint_and_key_are_none() {
        let api = ApiCfg {
            endpoint: "   ".into(),
            api_key: " secret ".into(),
        };
        assert_eq!(api.endpoint(), None);
        assert_eq!(api.api_key(), Some("secret"));
    }
}
