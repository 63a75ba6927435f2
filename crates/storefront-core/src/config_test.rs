use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("STOREFRONT_RECS_URL", "https://recs.example.com");
    m.insert("STOREFRONT_ACCOUNT_ID", "shopify-123");
    m
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "STOREFRONT_ENV"));
}

#[test]
fn build_app_config_fails_without_recs_url() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "STOREFRONT_RECS_URL"),
        "expected MissingEnvVar(STOREFRONT_RECS_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_treats_blank_account_id_as_missing() {
    let mut map = full_env();
    map.insert("STOREFRONT_ACCOUNT_ID", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "STOREFRONT_ACCOUNT_ID"),
        "expected MissingEnvVar(STOREFRONT_ACCOUNT_ID), got: {result:?}"
    );
}

#[test]
fn build_app_config_succeeds_with_defaults() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.recs_url, "https://recs.example.com");
    assert!(cfg.shop_url.is_none());
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.user_agent, "storefront-kit/0.1");
    assert_eq!(cfg.batch_delay_ms, 50);
    assert_eq!(cfg.batch_delay().as_millis(), 50);
}

#[test]
fn build_app_config_reads_overrides() {
    let mut map = full_env();
    map.insert("STOREFRONT_ENV", "production");
    map.insert("STOREFRONT_SHOP_URL", "https://shop.example.com");
    map.insert("STOREFRONT_BATCH_DELAY_MS", "120");
    map.insert("STOREFRONT_REQUEST_TIMEOUT_SECS", "5");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Production);
    assert_eq!(cfg.shop_url.as_deref(), Some("https://shop.example.com"));
    assert_eq!(cfg.batch_delay_ms, 120);
    assert_eq!(cfg.request_timeout_secs, 5);
}

#[test]
fn build_app_config_rejects_non_numeric_batch_delay() {
    let mut map = full_env();
    map.insert("STOREFRONT_BATCH_DELAY_MS", "soon");
    match build_app_config(lookup_from_map(&map)) {
        Err(ConfigError::InvalidEnvVar { var, .. }) => {
            assert_eq!(var, "STOREFRONT_BATCH_DELAY_MS");
        }
        other => panic!("expected InvalidEnvVar(STOREFRONT_BATCH_DELAY_MS), got: {other:?}"),
    }
}

#[test]
fn debug_output_redacts_account_id() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("shopify-123"), "leaked: {rendered}");
    assert!(rendered.contains("[redacted]"));
}
