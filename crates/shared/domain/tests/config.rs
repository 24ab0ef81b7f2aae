use sapp_domain::config::{AppConfig, DecrementPolicy, LoggingConfig, SessionConfig};
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let config = AppConfig::default();
    assert_eq!(config.cart.policy, DecrementPolicy::RemoveAtZero);
    assert!(config.catalog.seed.is_none());

    let sessions = SessionConfig::default();
    assert_eq!(sessions.capacity, 10_000);
    assert_eq!(sessions.idle_timeout_seconds, 1_800);

    let logging = LoggingConfig::default();
    assert_eq!(logging.level, "info");
    assert!(logging.console);
    assert_eq!(logging.max_files, 10);
}

#[test]
fn app_config_deserializes() {
    let raw = json!({
        "cart": { "policy": { "kind": "clamp", "floor": 2 } },
        "sessions": { "capacity": 16 },
        "catalog": { "seed": "/tmp/catalog.json" }
    });

    let cfg: AppConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.cart.policy, DecrementPolicy::Clamp { floor: 2 });
    assert_eq!(cfg.sessions.capacity, 16);
    assert_eq!(cfg.sessions.idle_timeout_seconds, 1_800);
    assert_eq!(cfg.catalog.seed, Some(std::path::PathBuf::from("/tmp/catalog.json")));
    assert_eq!(cfg.logging.level, "info");
}

#[test]
fn remove_at_zero_policy_deserializes_without_floor() {
    let policy: DecrementPolicy =
        serde_json::from_value(json!({ "kind": "remove_at_zero" })).expect("policy");
    assert_eq!(policy, DecrementPolicy::RemoveAtZero);
    assert_eq!(policy.floor(), 0);
}

#[test]
fn zero_clamp_floor_is_raised_to_one() {
    assert_eq!(DecrementPolicy::clamp(0), DecrementPolicy::Clamp { floor: 1 });
    assert_eq!(DecrementPolicy::Clamp { floor: 0 }.normalized(), DecrementPolicy::Clamp { floor: 1 });
    assert_eq!(DecrementPolicy::Clamp { floor: 0 }.floor(), 1);
}

#[test]
fn config_clone_is_copy_on_write() {
    let original = AppConfig::default();
    let mut changed = original.clone();
    changed.cart.policy = DecrementPolicy::clamp(1);

    assert_eq!(original.cart.policy, DecrementPolicy::RemoveAtZero);
    assert_eq!(changed.cart.policy, DecrementPolicy::Clamp { floor: 1 });
}
