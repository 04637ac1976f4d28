//! Configuration loading from afternil.toml.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const CONFIG_FILE_NAME: &str = "afternil.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub afternil: AfternilConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AfternilConfig {
    pub format: OutputFormat,
    /// Source lines printed under each text finding, ending at the flagged line.
    pub context_lines: usize,
    /// Exit status when findings remain.
    pub exit_code: u8,
    /// Skip files carrying a `// Code generated ... DO NOT EDIT.` header.
    pub skip_generated: bool,
    /// Include `_test.go` files found in directories.
    pub include_tests: bool,
    /// Findings on a line with a `//` comment containing this marker are dropped.
    pub suppress_marker: String,
}

impl Default for AfternilConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            context_lines: 1,
            exit_code: 1,
            skip_generated: true,
            include_tests: true,
            suppress_marker: "afternil:ignore".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `Reference after nil check at FILE:LINE:COL` plus source context.
    #[default]
    Text,
    /// `FILE:LINE:COL` only.
    Machine,
    Json,
    /// ariadne reports.
    Pretty,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "machine" => Ok(Self::Machine),
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(format!(
                "unknown format `{other}` (expected text, machine, json or pretty)"
            )),
        }
    }
}

/// Find and load afternil.toml, walking up from `start_dir`.
/// Returns the default config if no file is found or it does not parse.
pub fn load_config(start_dir: &Path) -> Config {
    let Some(path) = find_config_file(start_dir) else {
        return Config::default();
    };
    let content = std::fs::read_to_string(&path).unwrap_or_default();
    match toml::from_str(&content) {
        Ok(config) => {
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config");
            Config::default()
        }
    }
}

/// Walk up directories looking for afternil.toml.
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// Default TOML content for `afternil init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"[afternil]
# text | machine | json | pretty
format = "text"
context_lines = 1
exit_code = 1
skip_generated = true
include_tests = true
suppress_marker = "afternil:ignore"
"#;
