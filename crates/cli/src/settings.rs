//! Run settings that are not command-line flags
//!
//! - `GRAPH_ANALYZER_OUTPUT`: export path (default `graph_analysis.json`)
//! - `GRAPH_ANALYZER_TIMEOUT_SECS`: store fetch timeout (default 10)

use std::path::PathBuf;
use std::time::Duration;

use graph_analyzer_core::AnalysisConfig;
use tracing::warn;

pub const OUTPUT_VAR: &str = "GRAPH_ANALYZER_OUTPUT";
pub const TIMEOUT_VAR: &str = "GRAPH_ANALYZER_TIMEOUT_SECS";

const DEFAULT_OUTPUT: &str = "graph_analysis.json";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Settings {
    pub output: PathBuf,
    pub timeout: Duration,
    pub analysis: AnalysisConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Settings::default();

        if let Some(output) = lookup(OUTPUT_VAR).filter(|v| !v.trim().is_empty()) {
            settings.output = PathBuf::from(output);
        }

        if let Some(raw) = lookup(TIMEOUT_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => settings.timeout = Duration::from_secs(secs),
                _ => warn!(
                    value = %raw,
                    default = DEFAULT_TIMEOUT_SECS,
                    "ignoring invalid {TIMEOUT_VAR}"
                ),
            }
        }

        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_with(vars: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = settings_with(&[]);
        assert_eq!(settings.output, PathBuf::from("graph_analysis.json"));
        assert_eq!(settings.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_overrides() {
        let settings = settings_with(&[(OUTPUT_VAR, "/tmp/out.json"), (TIMEOUT_VAR, "3")]);
        assert_eq!(settings.output, PathBuf::from("/tmp/out.json"));
        assert_eq!(settings.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_timeout_falls_back() {
        assert_eq!(settings_with(&[(TIMEOUT_VAR, "soon")]).timeout, Duration::from_secs(10));
        assert_eq!(settings_with(&[(TIMEOUT_VAR, "0")]).timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_blank_output_is_ignored() {
        let settings = settings_with(&[(OUTPUT_VAR, "  ")]);
        assert_eq!(settings.output, PathBuf::from("graph_analysis.json"));
    }
}
