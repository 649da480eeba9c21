//! End-to-end test: startup in opt-in, opt-out and restored sessions

use consent_engine::testing::RecordingHost;
use consent_engine::{ConsentChoice, ConsentManager};
use consent_tests::{external_script, inline_script, logging_hooks, manager, settle_all, site_config, HookLog};
use consent_types::{CategoryId, ConsentConfig, ConsentMode, ConsentSnapshot, ServiceId};
use std::collections::BTreeMap;

#[test]
fn opt_in_start_waits_for_a_decision() {
    let log = HookLog::default();
    let mut m = manager(ConsentMode::OptIn);
    m.register_hooks("analytics", "ga", logging_hooks(&log, "ga"))
        .unwrap();
    m.scan_scripts(vec![inline_script("ga-init", "analytics")])
        .unwrap();

    let report = m.start().unwrap();
    assert!(report.transitions.is_empty());
    assert!(report.activation.is_none());
    assert!(m.host().activations.is_empty());
    assert!(log.borrow().is_empty());
    assert!(!m.store().has_consent());
}

#[test]
fn opt_out_start_runs_default_enabled_categories() {
    let log = HookLog::default();
    let mut m = manager(ConsentMode::OptOut);
    m.register_hooks("analytics", "ga", logging_hooks(&log, "ga"))
        .unwrap();
    m.register_hooks("marketing", "ads-pixel", logging_hooks(&log, "ads-pixel"))
        .unwrap();
    m.scan_scripts(vec![
        external_script("gtag", "analytics"),
        inline_script("pixel", "marketing"),
        inline_script("consent-banner", "necessary"),
    ])
    .unwrap();

    let report = m.start().unwrap();
    assert!(report.activation.unwrap().is_suspended());
    assert_eq!(settle_all(&mut m), 1);

    assert_eq!(m.host().activated_placeholders(), vec!["gtag", "consent-banner"]);
    assert_eq!(*log.borrow(), vec!["accept:ga"]);
    assert_eq!(
        m.store().default_enabled_categories(),
        &[CategoryId::new("necessary"), CategoryId::new("analytics")]
    );
}

#[test]
fn rejecting_defaults_after_opt_out_start_is_a_withdrawal() {
    let log = HookLog::default();
    let mut m = manager(ConsentMode::OptOut);
    m.register_hooks("analytics", "ga", logging_hooks(&log, "ga"))
        .unwrap();
    m.scan_scripts(vec![
        inline_script("ga-init", "analytics"),
        inline_script("ga-off", "!analytics"),
    ])
    .unwrap();
    m.start().unwrap();

    let report = m.update_consent(&ConsentChoice::reject_all()).unwrap();
    assert_eq!(report.activation.unwrap().activated, vec![1]);
    assert_eq!(*log.borrow(), vec!["accept:ga", "reject:ga"]);
    assert!(m
        .snapshot()
        .category_changed(&CategoryId::new("analytics")));
}

#[test]
fn restored_consent_is_applied_without_seeding_defaults() {
    let log = HookLog::default();
    let mut m = manager(ConsentMode::OptOut);
    m.register_hooks("analytics", "ga", logging_hooks(&log, "ga"))
        .unwrap();
    m.register_hooks("marketing", "newsletter", logging_hooks(&log, "newsletter"))
        .unwrap();
    m.scan_scripts(vec![
        inline_script("ga-init", "analytics"),
        inline_script("newsletter", "marketing"),
    ])
    .unwrap();

    let mut enabled = BTreeMap::new();
    enabled.insert(
        CategoryId::new("marketing"),
        vec![ServiceId::new("newsletter")],
    );
    m.restore(ConsentSnapshot {
        accepted_categories: vec![CategoryId::new("necessary"), CategoryId::new("marketing")],
        enabled_services: enabled,
        ..ConsentSnapshot::default()
    })
    .unwrap();

    m.start().unwrap();
    assert_eq!(m.host().activated_placeholders(), vec!["newsletter"]);
    assert_eq!(*log.borrow(), vec!["accept:newsletter"]);
    assert!(m.store().default_enabled_categories().is_empty());
}

#[test]
fn restore_rejects_snapshots_from_another_catalog() {
    let mut m = manager(ConsentMode::OptIn);
    let err = m
        .restore(ConsentSnapshot {
            accepted_categories: vec![CategoryId::new("social")],
            ..ConsentSnapshot::default()
        })
        .unwrap_err();
    assert!(err.to_string().contains("social"));
    assert!(!m.store().has_consent());
}

#[test]
fn script_management_switched_off_only_notifies() {
    let log = HookLog::default();
    let mut config = site_config(ConsentMode::OptOut);
    config.manage_script_tags = false;
    let mut m = ConsentManager::new(config, RecordingHost::new()).unwrap();
    m.register_hooks("analytics", "ga", logging_hooks(&log, "ga"))
        .unwrap();
    m.scan_scripts(vec![inline_script("ga-init", "analytics")])
        .unwrap();

    let report = m.start().unwrap();
    assert!(report.activation.is_none());
    assert_eq!(report.transitions.len(), 1);
    assert!(m.host().activations.is_empty());
    assert_eq!(m.registry().executed_count(), 0);
}

#[test]
fn manager_builds_from_yaml_configuration() {
    let yaml = r#"
mode: opt_out
categories:
  - id: necessary
    read_only: true
  - id: analytics
    enabled: true
    services:
      - id: ga
        label: Google Analytics
"#;
    let config = ConsentConfig::from_yaml_str(yaml).unwrap();
    assert!(config.manage_script_tags);

    let mut m = ConsentManager::new(config, RecordingHost::new()).unwrap();
    m.scan_scripts(vec![inline_script("ga-init", "analytics")])
        .unwrap();
    m.start().unwrap();

    assert_eq!(m.host().activated_placeholders(), vec!["ga-init"]);
    assert_eq!(
        m.catalog()
            .service(&CategoryId::new("analytics"), &ServiceId::new("ga"))
            .unwrap()
            .label
            .as_deref(),
        Some("Google Analytics")
    );
}

#[test]
fn saved_snapshot_survives_a_json_round_trip_between_sessions() {
    let mut first = manager(ConsentMode::OptIn);
    first.start().unwrap();
    first
        .update_consent(&ConsentChoice::accept(["analytics"]).with_services("analytics", ["ga"]))
        .unwrap();
    let saved = serde_json::to_string(first.snapshot()).unwrap();

    let log = HookLog::default();
    let mut second = manager(ConsentMode::OptIn);
    second
        .register_hooks("analytics", "ga", logging_hooks(&log, "ga"))
        .unwrap();
    second
        .register_hooks("analytics", "hotjar", logging_hooks(&log, "hotjar"))
        .unwrap();
    second
        .scan_scripts(vec![external_script("gtag", "analytics")])
        .unwrap();
    second
        .restore(serde_json::from_str(&saved).unwrap())
        .unwrap();

    let report = second.start().unwrap();
    assert!(report.activation.unwrap().is_suspended());
    assert_eq!(*log.borrow(), vec!["accept:ga"]);
    assert_eq!(settle_all(&mut second), 1);
}

#[test]
fn restored_session_notifies_enabled_services_and_ignores_old_withdrawals() {
    let mut first = manager(ConsentMode::OptIn);
    first.start().unwrap();
    first
        .update_consent(&ConsentChoice::accept(["analytics", "marketing"]))
        .unwrap();
    first
        .update_consent(&ConsentChoice::accept(["analytics"]).with_services("analytics", ["ga"]))
        .unwrap();
    let saved = serde_json::to_string(first.snapshot()).unwrap();

    let log = HookLog::default();
    let mut second = manager(ConsentMode::OptIn);
    second
        .register_hooks("analytics", "ga", logging_hooks(&log, "ga"))
        .unwrap();
    second
        .scan_scripts(vec![
            inline_script("ga-init", "analytics"),
            inline_script("bye", "!marketing"),
        ])
        .unwrap();
    second
        .restore(serde_json::from_str(&saved).unwrap())
        .unwrap();

    second.start().unwrap();
    assert_eq!(*log.borrow(), vec!["accept:ga"]);
    assert!(second.is_service_enabled("analytics", "ga"));
    assert_eq!(second.host().activated_placeholders(), vec!["ga-init"]);
    assert!(!second.registry().get(1).unwrap().is_executed());
}
