//! Reads `~/.pactum/config.json` and layers environment overrides on top.
//!
//! Order: built-in defaults, then the JSON file, then `PACTUM_<SECTION>__<FIELD>`
//! variables. A missing or broken file is never fatal.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::schema::Config;

/// `~/.pactum/config.json`.
pub fn get_config_path() -> PathBuf {
    crate::utils::pactum_home().join("config.json")
}

/// Load `path` (or the default file) and apply env overrides.
pub fn load_config(path: Option<&Path>) -> Config {
    let path = path.map_or_else(get_config_path, Path::to_path_buf);
    let mut config = read_file(&path).unwrap_or_default();
    apply_env(&mut config, |key| std::env::var(key).ok());
    config
}

fn read_file(path: &Path) -> Option<Config> {
    if !path.exists() {
        info!(path = %path.display(), "no config file, using defaults");
        return None;
    }
    let text = std::fs::read_to_string(path)
        .map_err(|e| warn!(path = %path.display(), error = %e, "config file unreadable, using defaults"))
        .ok()?;
    let config = serde_json::from_str(&text)
        .map_err(|e| warn!(path = %path.display(), error = %e, "config file invalid, using defaults"))
        .ok()?;
    debug!(path = %path.display(), "config loaded");
    Some(config)
}

/// Write `config` as pretty camelCase JSON, creating parent directories.
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let path = path.map_or_else(get_config_path, Path::to_path_buf);
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let text = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;
    std::fs::write(&path, text)?;
    debug!(path = %path.display(), "config saved");
    Ok(())
}

type Setter = fn(&mut Config, &str) -> bool;

/// Env variable → setter. A setter returns `false` when the value does not parse.
const ENV_BINDINGS: &[(&str, Setter)] = &[
    ("PACTUM_AGENT__MODEL", |c, v| {
        c.agent.model = v.to_string();
        true
    }),
    ("PACTUM_AGENT__MAX_TOKENS", |c, v| set_parsed(&mut c.agent.max_tokens, v)),
    ("PACTUM_AGENT__TEMPERATURE", |c, v| set_parsed(&mut c.agent.temperature, v)),
    ("PACTUM_PROVIDER__API_KEY", |c, v| {
        c.provider.api_key = v.to_string();
        true
    }),
    ("PACTUM_PROVIDER__API_BASE", |c, v| {
        c.provider.api_base = Some(v.to_string());
        true
    }),
    ("PACTUM_ORCHESTRATION__MAX_CONTROLLER_ITERATIONS", |c, v| {
        set_parsed(&mut c.orchestration.max_controller_iterations, v)
    }),
    ("PACTUM_ORCHESTRATION__MAX_SPECIALIST_ITERATIONS", |c, v| {
        set_parsed(&mut c.orchestration.max_specialist_iterations, v)
    }),
    ("PACTUM_ORCHESTRATION__REQUEST_TIMEOUT_SECS", |c, v| {
        set_parsed(&mut c.orchestration.request_timeout_secs, v)
    }),
    ("PACTUM_ORCHESTRATION__MAX_ATTEMPTS", |c, v| {
        set_parsed(&mut c.orchestration.max_attempts, v)
    }),
];

fn set_parsed<T: std::str::FromStr>(slot: &mut T, value: &str) -> bool {
    match value.trim().parse() {
        Ok(parsed) => {
            *slot = parsed;
            true
        }
        Err(_) => false,
    }
}

/// Apply every bound variable `lookup` knows, then fall back to
/// `OPENAI_API_KEY` if no key is set yet.
fn apply_env(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    for (key, set) in ENV_BINDINGS {
        let Some(value) = lookup(key) else { continue };
        if set(config, &value) {
            debug!(key, "config overridden from environment");
        } else {
            warn!(key, value = %value, "ignoring unparseable environment override");
        }
    }
    if !config.provider.is_configured() {
        if let Some(key) = lookup("OPENAI_API_KEY") {
            debug!("using OPENAI_API_KEY");
            config.provider.api_key = key;
        }
    }
}
