//! Configuration loading from disk and environment.
//!
//! Precedence: built-in defaults, then the optional TOML file, then
//! environment variables.

use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let config = read_file(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Defaults (or `path`), overlaid with the process environment, validated.
pub fn load(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_file(path)?,
        None => ProxyConfig::default(),
    };
    apply_env(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn read_file(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Overlay environment variables onto `config`.
///
/// Unset or empty variables leave the current value alone, as do durations
/// and numbers that fail to parse.
pub fn apply_env<F>(config: &mut ProxyConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(port) = var("PORT") {
        match port.parse() {
            Ok(port) => config.listener.port = port,
            Err(_) => tracing::warn!(value = %port, "Ignoring invalid PORT"),
        }
    }
    if let Some(domain) = var("BASE_DOMAIN") {
        config.routing.base_domain = domain;
    }
    if let Some(env) = var("DEFAULT_ENV") {
        config.routing.default_env = env;
    }
    if let Some(list) = var("ALLOWED_NAMESPACES") {
        config.routing.allowed_namespaces = parse_namespace_list(&list);
    }

    set_duration(&var, "READ_TIMEOUT", &mut config.timeouts.read);
    set_duration(&var, "WRITE_TIMEOUT", &mut config.timeouts.write);
    set_duration(&var, "IDLE_TIMEOUT", &mut config.timeouts.idle);
    set_duration(&var, "RESOLVE_TIMEOUT", &mut config.timeouts.resolve);
    set_duration(&var, "HEALTH_PROBE_INTERVAL", &mut config.health_check.interval);

    if let Some(flag) = var("DEV_MODE") {
        config.discovery.dev_mode = parse_flag(&flag);
    }
    if let Some(suffix) = var("CLUSTER_SUFFIX") {
        config.discovery.cluster_suffix = suffix;
    }
    if let Some(target) = var("DEV_TARGET") {
        config.discovery.dev_target = target;
    }
    if let Some(flag) = var("RESOLUTION_CACHE") {
        config.cache.enabled = parse_flag(&flag);
    }
    if let Some(flag) = var("HEALTH_PROBE") {
        config.health_check.enabled = parse_flag(&flag);
    }

    if let Some(addr) = var("METRICS_ADDRESS") {
        config.observability.metrics_address = Some(addr);
    }
}

fn set_duration<F>(var: &F, key: &str, slot: &mut Duration)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = var(key) {
        match humantime::parse_duration(raw.trim()) {
            Ok(value) => *slot = value,
            Err(e) => {
                tracing::warn!(key = %key, value = %raw, error = %e, "Ignoring invalid duration")
            }
        }
    }
}

/// Comma-separated namespaces, trimmed, empties dropped.
pub fn parse_namespace_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|ns| !ns.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_env_overlay() {
        let mut config = ProxyConfig::default();
        apply_env(
            &mut config,
            env(&[
                ("PORT", "9000"),
                ("BASE_DOMAIN", "apps.example.com"),
                ("DEFAULT_ENV", "staging"),
                ("ALLOWED_NAMESPACES", " orders, billing ,,"),
                ("READ_TIMEOUT", "1m30s"),
                ("WRITE_TIMEOUT", "500ms"),
                ("IDLE_TIMEOUT", "2m"),
                ("DEV_MODE", "true"),
                ("RESOLUTION_CACHE", "1"),
                ("METRICS_ADDRESS", "127.0.0.1:9090"),
            ]),
        );

        assert_eq!(config.listener.port, 9000);
        assert_eq!(config.routing.base_domain, "apps.example.com");
        assert_eq!(config.routing.default_env, "staging");
        assert_eq!(config.routing.allowed_namespaces, vec!["orders", "billing"]);
        assert_eq!(config.timeouts.read, Duration::from_secs(90));
        assert_eq!(config.timeouts.write, Duration::from_millis(500));
        assert_eq!(config.timeouts.idle, Duration::from_secs(120));
        assert!(config.discovery.dev_mode);
        assert!(config.cache.enabled);
        assert_eq!(
            config.observability.metrics_address.as_deref(),
            Some("127.0.0.1:9090")
        );
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let mut config = ProxyConfig::default();
        apply_env(
            &mut config,
            env(&[("PORT", "eighty"), ("READ_TIMEOUT", "soon"), ("DEV_MODE", "false")]),
        );

        assert_eq!(config.listener.port, 8080);
        assert_eq!(config.timeouts.read, Duration::from_secs(15));
        assert!(!config.discovery.dev_mode);
    }

    #[test]
    fn test_empty_variables_are_unset() {
        let mut config = ProxyConfig::default();
        apply_env(&mut config, env(&[("BASE_DOMAIN", ""), ("ALLOWED_NAMESPACES", "")]));
        assert_eq!(config.routing.base_domain, "localhost");
        assert!(config.routing.allowed_namespaces.is_empty());
    }

    #[test]
    fn test_toml_file() {
        let path = std::env::temp_dir().join("ingress_router_loader_test.toml");
        fs::write(
            &path,
            r#"
                [listener]
                port = 8181

                [routing]
                default_env = "prod"
                allowed_namespaces = ["orders"]

                [timeouts]
                resolve = "2s"

                [cache]
                enabled = true
            "#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.listener.port, 8181);
        assert_eq!(config.routing.default_env, "prod");
        assert_eq!(config.routing.allowed_namespaces, vec!["orders"]);
        assert_eq!(config.timeouts.resolve, Duration::from_secs(2));
        assert_eq!(config.timeouts.read, Duration::from_secs(15));
        assert!(config.cache.enabled);

        fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_invalid_file_fails_validation() {
        let path = std::env::temp_dir().join("ingress_router_loader_invalid.toml");
        fs::write(&path, "[routing]\ndefault_env = \"\"\n").unwrap();

        assert!(matches!(load_config(&path), Err(ConfigError::Validation(_))));

        fs::remove_file(&path).unwrap_or_default();
    }
}
