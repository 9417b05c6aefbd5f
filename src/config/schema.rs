/// Configuration schema and defaults for vigia.
///
/// Three sections: `[api]` (where the monitoring API lives), `[refresh]`
/// (polling and retry cadence), and `[display]` (table rendering knobs).
/// Every field has a built-in default; users only set what they override.
use serde::{Deserialize, Serialize};

/// Top-level vigia configuration.
///
/// Maps directly to `~/.vigia/config.toml` and `.vigia.toml`. All sections
/// and fields are optional — missing values fall back to built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VigiaConfig {
    pub api: ApiConfig,
    pub refresh: RefreshConfig,
    pub display: DisplayConfig,
}

// ---------------------------------------------------------------------------
// [api]
// ---------------------------------------------------------------------------

/// Monitoring API endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the monitoring API, e.g. `https://monitor.example.com`.
    /// Empty means unconfigured — commands fail with a setup hint.
    pub base_url: String,
    /// Per-request timeout (milliseconds).
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_ms: 15_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [refresh]
// ---------------------------------------------------------------------------

/// Polling and retry cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Watch-mode poll interval (seconds).
    pub poll_interval_secs: u64,
    /// Delay before retrying a failed status fetch (seconds).
    pub retry_delay_secs: u64,
    /// Retry attempts per refresh before giving up and showing the error.
    pub retry_attempts: u32,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 30,
            retry_delay_secs: 10,
            retry_attempts: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// [display]
// ---------------------------------------------------------------------------

/// Table rendering knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Colorize output. `VIGIA_NO_COLOR=1` forces this off.
    pub color: bool,
    /// Maximum width of the flattened detail column in the table view.
    pub max_detail_width: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: true,
            max_detail_width: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl VigiaConfig {
    /// Annotated default config, written by `vigia config init`.
    pub fn default_toml() -> String {
        r#"# vigia configuration
#
# Precedence (highest wins):
#   1. Environment variables (VIGIA_*)
#   2. Project config (.vigia.toml in the current directory)
#   3. User global config (~/.vigia/config.toml)
#   4. Built-in defaults

[api]
base_url = ""          # e.g. "https://monitor.example.com"; required
timeout_ms = 15000

[refresh]
poll_interval_secs = 30
retry_delay_secs = 10  # delay before retrying a failed status fetch
retry_attempts = 1

[display]
color = true
max_detail_width = 60
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
