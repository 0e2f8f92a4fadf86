use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::navigation::{HOME_ROUTE, LOGIN_ROUTE};

/// Seconds the session-replaced notice waits before redirecting.
pub const DEFAULT_REPLACED_COUNTDOWN_SECS: u64 = 5;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Idle-session guard: logs out after a period of inactivity
#[derive(Parser, Debug, Clone)]
#[command(
    name = "session-guard",
    about = "Idle-session guard: logs out after a period of inactivity",
    version
)]
pub struct Settings {
    /// Idle timeout in seconds before the session is logged out
    #[arg(long, default_value = "180", value_parser = clap::value_parser!(u64).range(1..=86_400))]
    pub idle_timeout_secs: u64,

    /// Route of the login view
    #[arg(long, default_value = LOGIN_ROUTE)]
    pub login_route: String,

    /// Route shown after signing in
    #[arg(long, default_value = HOME_ROUTE)]
    pub home_route: String,

    /// Seconds the session-replaced notice counts down before redirecting (1-60)
    #[arg(long, default_value_t = DEFAULT_REPLACED_COUNTDOWN_SECS, value_parser = clap::value_parser!(u64).range(1..=60))]
    pub replaced_countdown_secs: u64,

    /// Credential file path (defaults to ~/.session-guard/credential.json)
    #[arg(long, env = "SESSION_GUARD_CREDENTIAL_FILE")]
    pub credential_file: Option<PathBuf>,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "auto"])]
    pub theme: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

impl Settings {
    pub fn idle_duration(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.session-guard/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_route: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_route: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaced_countdown_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".session-guard").join("last_used.json")
    }

    /// Load persisted params from `path`.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings loading ───────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation – accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!(error = %e, "failed to clear saved configuration");
            }
            return Self::apply_debug(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins. Arg ids are the field names.
        if !is_arg_explicitly_set(&matches, "idle_timeout_secs") {
            if let Some(v) = last.idle_timeout_secs.filter(|v| (1..=86_400).contains(v)) {
                settings.idle_timeout_secs = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "login_route") {
            if let Some(v) = last.login_route.filter(|v| !v.is_empty()) {
                settings.login_route = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "home_route") {
            if let Some(v) = last.home_route.filter(|v| !v.is_empty()) {
                settings.home_route = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "replaced_countdown_secs") {
            if let Some(v) = last.replaced_countdown_secs.filter(|v| (1..=60).contains(v)) {
                settings.replaced_countdown_secs = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }

        settings = Self::apply_debug(settings);

        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            tracing::warn!(error = %e, "failed to persist last-used configuration");
        }

        settings
    }

    /// `--debug` overrides the log level.
    fn apply_debug(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            idle_timeout_secs: Some(s.idle_timeout_secs),
            login_route: Some(s.login_route.clone()),
            home_route: Some(s.home_route.clone()),
            replaced_countdown_secs: Some(s.replaced_countdown_secs),
            theme: Some(s.theme.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    fn load(args: &[&str], config_path: &std::path::Path) -> Settings {
        Settings::load_with_last_used_impl(args.iter().map(|a| (*a).into()).collect(), config_path)
    }

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["session-guard"]);

        assert_eq!(settings.idle_timeout_secs, 180);
        assert_eq!(settings.idle_duration(), Duration::from_secs(180));
        assert_eq!(settings.login_route, "/login");
        assert_eq!(settings.home_route, "/");
        assert_eq!(settings.replaced_countdown_secs, DEFAULT_REPLACED_COUNTDOWN_SECS);
        assert_eq!(settings.theme, "auto");
        assert_eq!(settings.log_level, "INFO");
        assert!(settings.log_file.is_none());
        assert!(!settings.debug);
        assert!(!settings.clear);
    }

    #[test]
    fn test_idle_timeout_range_enforced() {
        assert!(Settings::try_parse_from(["session-guard", "--idle-timeout-secs", "0"]).is_err());
        let ok = Settings::try_parse_from(["session-guard", "--idle-timeout-secs", "3"]).unwrap();
        assert_eq!(ok.idle_duration(), Duration::from_secs(3));
    }

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            idle_timeout_secs: Some(600),
            login_route: Some("/signin".to_string()),
            home_route: Some("/dashboard".to_string()),
            replaced_countdown_secs: Some(10),
            theme: Some("light".to_string()),
        };
        params.save_to(&path).expect("save");

        let loaded = LastUsedParams::load_from(&path);
        assert_eq!(loaded.idle_timeout_secs, Some(600));
        assert_eq!(loaded.login_route.as_deref(), Some("/signin"));
        assert_eq!(loaded.home_route.as_deref(), Some("/dashboard"));
        assert_eq!(loaded.replaced_countdown_secs, Some(10));
        assert_eq!(loaded.theme.as_deref(), Some("light"));
    }

    #[test]
    fn test_last_used_params_default_when_missing_or_corrupt() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        assert!(LastUsedParams::load_from(&path).idle_timeout_secs.is_none());

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();
        assert!(LastUsedParams::load_from(&path).theme.is_none());
    }

    #[test]
    fn test_load_with_last_used_merges_persisted_timeout() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            idle_timeout_secs: Some(300),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = load(&["session-guard"], &config_path);
        assert_eq!(settings.idle_timeout_secs, 300);
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            idle_timeout_secs: Some(300),
            theme: Some("dark".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = load(
            &["session-guard", "--idle-timeout-secs", "60", "--theme", "light"],
            &config_path,
        );
        assert_eq!(settings.idle_timeout_secs, 60);
        assert_eq!(settings.theme, "light");
    }

    #[test]
    fn test_load_with_last_used_ignores_out_of_range_persisted_values() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            idle_timeout_secs: Some(0),
            replaced_countdown_secs: Some(500),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = load(&["session-guard"], &config_path);
        assert_eq!(settings.idle_timeout_secs, 180);
        assert_eq!(settings.replaced_countdown_secs, 5);
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("dark".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = load(&["session-guard", "--clear"], &config_path);
        assert!(!config_path.exists(), "file must be gone after --clear");
        assert_eq!(settings.theme, "auto");
    }

    #[test]
    fn test_load_with_last_used_debug_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let settings = load(&["session-guard", "--debug"], &tmp_config_path(&tmp));
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_load_with_last_used_persists_after_run() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        load(&["session-guard", "--login-route", "/signin"], &config_path);

        assert!(config_path.exists());
        let loaded = LastUsedParams::load_from(&config_path);
        assert_eq!(loaded.login_route.as_deref(), Some("/signin"));
        assert_eq!(loaded.idle_timeout_secs, Some(180));
    }
}
