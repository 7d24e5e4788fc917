#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use meterbind_bind::config;

#[test]
fn deny_unknown_fields() {
    let bad = r#"
enabled: true
extra_tagz: { region: "eu-1" } # typo should fail
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(err.to_string().contains("invalid yaml"));
}

#[test]
fn ok_minimal_defaults_off() {
    let cfg = config::load_from_str("{}").expect("must parse");
    assert!(!cfg.enabled);
    assert!(cfg.extra_tags.is_empty());
    assert!(!cfg.include_host_tag);
    assert!(cfg.request_tag_keys.is_empty());
    assert!(!cfg.include_internal);
}

#[test]
fn ok_full_config() {
    let ok = r#"
enabled: true
extra_tags:
  region: "eu-1"
  app.tier: "edge"
include_host_tag: true
request_tag_keys: ["method", "host"]
include_internal: true
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert!(cfg.enabled);
    assert_eq!(cfg.extra_tags.get("region").map(String::as_str), Some("eu-1"));
    assert_eq!(cfg.request_tag_keys, vec!["method", "host"]);
}

#[test]
fn duplicate_request_tag_keys_rejected() {
    let bad = r#"
request_tag_keys: ["method", "method"]
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(err.to_string().contains("duplicate"));
}

#[test]
fn uppercase_tag_key_rejected() {
    let bad = r#"
extra_tags: { Region: "eu-1" }
"#;
    config::load_from_str(bad).expect_err("must fail");
}
