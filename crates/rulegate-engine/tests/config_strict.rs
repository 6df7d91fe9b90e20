#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use rulegate_engine::config::{self, schema::EvaluationMode, schema::UnboundPolicy, RuleSpec};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
rules:
  - kind: user_allowlist
    name: is-member
    userz: [u1] # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn unknown_rule_kind_fails() {
    let bad = r#"
version: 1
rules:
  - kind: script
    name: anything
"#;
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.server.listen, "0.0.0.0:8080");
    assert_eq!(cfg.engine.evaluation, EvaluationMode::Sequential);
    assert_eq!(cfg.engine.unbound_operation, UnboundPolicy::Allow);
    assert!(cfg.rules.is_empty());
    assert!(cfg.bindings.is_empty());
}

#[test]
fn full_config_parses() {
    let ok = r#"
version: 1
server:
  listen: "127.0.0.1:9000"
engine:
  evaluation: concurrent
  unbound_operation: deny
rules:
  - kind: user_allowlist
    name: is-member
    users: [u1, u2]
  - kind: role
    name: is-admin
    any_of: [admin]
  - kind: tenant_match
    name: same-tenant
  - kind: field_match
    name: body-owner
    source: body
    field: ownerId
  - kind: resource_owner
    name: owns-channel
    owners:
      "channel/c1": u1
bindings:
  - operation: channel.update
    rules: [is-member, body-owner]
    action: update
  - operation: admin.purge
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.engine.evaluation, EvaluationMode::Concurrent);
    assert_eq!(cfg.engine.unbound_operation, UnboundPolicy::Deny);
    assert_eq!(cfg.rules.len(), 5);
    match &cfg.rules[2] {
        RuleSpec::TenantMatch(s) => assert_eq!(s.param, "tenantId"),
        other => panic!("unexpected rule spec: {other:?}"),
    }
    assert_eq!(cfg.bindings[0].action.as_deref(), Some("update"));
    assert!(cfg.bindings[1].rules.is_none());
    assert_eq!(cfg.server.listen_addr().unwrap().port(), 9000);
}

#[test]
fn rejects_bad_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn rejects_duplicate_rule_names() {
    let bad = r#"
version: 1
rules:
  - { kind: user_allowlist, name: dup, users: [u1] }
  - { kind: role, name: dup, any_of: [admin] }
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(err.to_string().contains("duplicate rule name: dup"));
}

#[test]
fn rejects_duplicate_bindings_and_empty_names() {
    let dup = r#"
version: 1
bindings:
  - { operation: channel.read }
  - { operation: channel.read, rules: [x] }
"#;
    assert!(config::load_from_str(dup).is_err());

    let empty = r#"
version: 1
bindings:
  - { operation: channel.read, rules: [""] }
"#;
    assert!(config::load_from_str(empty).is_err());
}

#[test]
fn rejects_empty_role_list_and_bad_listen() {
    let roles = r#"
version: 1
rules:
  - { kind: role, name: is-admin, any_of: [] }
"#;
    assert!(config::load_from_str(roles).is_err());

    let listen = r#"
version: 1
server: { listen: "not-an-addr" }
"#;
    assert!(config::load_from_str(listen).is_err());
}
