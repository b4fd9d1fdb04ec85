use std::path::PathBuf;
use std::time::Duration;

pub const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
pub const ENV_SUPABASE_KEY: &str = "SUPABASE_ANON_KEY";
pub const ENV_DATA_FILE: &str = "BATOO_DATA_FILE";
pub const ENV_HTTP_TIMEOUT: &str = "BATOO_HTTP_TIMEOUT_SECS";
pub const ENV_FILTER_DEBOUNCE: &str = "BATOO_FILTER_DEBOUNCE_MS";

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_FILTER_DEBOUNCE: Duration = Duration::from_millis(150);

/// Runtime configuration, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Backend project URL, e.g. `https://xyz.supabase.co`.
    pub supabase_url: Option<String>,
    /// Public (anon) API key for read-only access.
    pub supabase_key: Option<String>,
    /// Local snapshot used when the backend is not configured.
    pub data_file: Option<PathBuf>,
    pub http_timeout: Duration,
    /// Quiet period before a filter change is applied to the charts.
    pub filter_debounce: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: None,
            supabase_key: None,
            data_file: None,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            filter_debounce: DEFAULT_FILTER_DEBOUNCE,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset and
    /// unparseable numbers fall back to defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let http_timeout = get(ENV_HTTP_TIMEOUT)
            .and_then(|v| parse_or_warn(ENV_HTTP_TIMEOUT, &v))
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_HTTP_TIMEOUT);
        let filter_debounce = get(ENV_FILTER_DEBOUNCE)
            .and_then(|v| parse_or_warn(ENV_FILTER_DEBOUNCE, &v))
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_FILTER_DEBOUNCE);

        Self {
            supabase_url: get(ENV_SUPABASE_URL).map(|u| u.trim_end_matches('/').to_string()),
            supabase_key: get(ENV_SUPABASE_KEY),
            data_file: get(ENV_DATA_FILE).map(PathBuf::from),
            http_timeout,
            filter_debounce,
        }
    }

    /// Whether both backend settings are present.
    pub fn has_backend(&self) -> bool {
        self.supabase_url.is_some() && self.supabase_key.is_some()
    }
}

fn parse_or_warn(key: &str, value: &str) -> Option<u64> {
    match value.parse::<u64>() {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("Ignoring {key}={value:?}: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let cfg = config_from(&[]);
        assert!(!cfg.has_backend());
        assert!(cfg.data_file.is_none());
        assert_eq!(cfg.http_timeout, DEFAULT_HTTP_TIMEOUT);
        assert_eq!(cfg.filter_debounce, DEFAULT_FILTER_DEBOUNCE);
    }

    #[test]
    fn backend_needs_both_url_and_key() {
        let cfg = config_from(&[(ENV_SUPABASE_URL, "https://demo.supabase.co/")]);
        assert!(!cfg.has_backend());
        assert_eq!(cfg.supabase_url.as_deref(), Some("https://demo.supabase.co"));

        let cfg = config_from(&[
            (ENV_SUPABASE_URL, "https://demo.supabase.co"),
            (ENV_SUPABASE_KEY, "anon"),
        ]);
        assert!(cfg.has_backend());
    }

    #[test]
    fn numeric_settings_parse_or_fall_back() {
        let cfg = config_from(&[(ENV_HTTP_TIMEOUT, "5"), (ENV_FILTER_DEBOUNCE, "soon")]);
        assert_eq!(cfg.http_timeout, Duration::from_secs(5));
        assert_eq!(cfg.filter_debounce, DEFAULT_FILTER_DEBOUNCE);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let cfg = config_from(&[(ENV_SUPABASE_KEY, "   "), (ENV_DATA_FILE, "")]);
        assert!(cfg.supabase_key.is_none());
        assert!(cfg.data_file.is_none());
    }
}
