/// Configuration system for vigia.
///
/// Layered hierarchy:
///
/// 1. **Built-in defaults** — hardcoded in [`schema::VigiaConfig::default()`]
/// 2. **User global config** — `~/.vigia/config.toml`
/// 3. **Project local config** — `.vigia.toml` in the current working directory
/// 4. **Environment variables** — `VIGIA_*` overrides (highest precedence)
///
/// Later layers override earlier ones. Malformed TOML files are silently
/// ignored — a broken config must never keep the dashboard from rendering.
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::VigiaConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved vigia configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars. The primary entry point for everything that needs configuration.
pub fn load() -> VigiaConfig {
    let mut config = VigiaConfig::default();

    if let Some(global) = load_toml_file(global_config_path()) {
        config = global;
    }

    if let Some(project) = load_toml_file(project_config_path()) {
        config = project;
    }

    apply_env_overrides(&mut config);

    config
}

/// Load a TOML config file from the given path (if it exists).
///
/// Since every field has a serde default, a file that sets only `[api]`
/// still deserializes to a complete config, so the overlay can replace the
/// base wholesale.
fn load_toml_file(path: Option<PathBuf>) -> Option<VigiaConfig> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    toml::from_str(&content).ok()
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.vigia/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".vigia").join("config.toml"))
}

/// Path to the project local config: `.vigia.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".vigia.toml"))
}

/// Global config path for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Project config path for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `VIGIA_API_URL` — monitoring API base URL
/// - `VIGIA_TIMEOUT_MS` — per-request timeout
/// - `VIGIA_POLL_SECS` — watch-mode poll interval
/// - `VIGIA_RETRY_SECS` — retry delay after a failed fetch
/// - `VIGIA_NO_COLOR` — disable colored output (`1`/`true`/`yes`/`on`)
fn apply_env_overrides(config: &mut VigiaConfig) {
    if let Ok(val) = std::env::var("VIGIA_API_URL")
        && !val.is_empty()
    {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("VIGIA_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.api.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("VIGIA_POLL_SECS")
        && let Ok(secs) = val.parse::<u64>()
    {
        config.refresh.poll_interval_secs = secs;
    }
    if let Ok(val) = std::env::var("VIGIA_RETRY_SECS")
        && let Ok(secs) = val.parse::<u64>()
    {
        config.refresh.retry_delay_secs = secs;
    }
    if let Ok(val) = std::env::var("VIGIA_NO_COLOR")
        && is_truthy(&val)
    {
        config.display.color = false;
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.vigia/config.toml`.
///
/// Creates the `~/.vigia/` directory if needed. Errors if the file already
/// exists (use `force = true` to overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.vigia/ directory")?;
    }

    fs::write(&path, VigiaConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key in the global config file.
///
/// Supports dotted keys like `api.base_url` or `refresh.retry_delay_secs`.
/// Creates the file from defaults when it doesn't exist yet.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let content = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&VigiaConfig::default())
            .context("failed to serialize default config")?
    };

    let mut table: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML")?;
    set_toml_value(&mut table, key, value)?;

    // Reject keys the schema doesn't know about before persisting
    let updated = toml::to_string_pretty(&table).context("failed to serialize config")?;
    let _: VigiaConfig =
        toml::from_str(&updated).context("updated config no longer matches the schema")?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, updated).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path, preserving the
/// type of the existing value.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let (section, leaf) = key
        .split_once('.')
        .with_context(|| format!("expected a dotted key like 'api.base_url', got '{key}'"))?;

    let table = root
        .get_mut(section)
        .with_context(|| format!("unknown config section '{section}'"))?
        .as_table_mut()
        .with_context(|| format!("'{section}' is not a table"))?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::String(_)) | None => toml::Value::String(raw_value.to_string()),
        Some(other) => anyhow::bail!("cannot set '{key}' of type {}", other.type_str()),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config file to annotated defaults.
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Render the effective (merged) configuration as pretty TOML.
pub fn show_effective_config() -> Result<String> {
    toml::to_string_pretty(&load()).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
