//! Enforcement point: bindings, identity gate, and first-failure reduction.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use serde_json::json;

use rulegate_core::{failure, success, RuleContext, RuleValidationResult, UserIdentity};
use rulegate_engine::config::schema::UnboundPolicy;
use rulegate_engine::enforce::{
    reduce_results, AccessDecision, AccessRequest, Binding, BindingTable, Enforcer,
};
use rulegate_engine::obs::{EngineMetrics, UNBOUND_OPERATION};
use rulegate_engine::registry::{FnRule, Rule, RuleEngine};
use rulegate_engine::rules::{FieldMatchRule, UserAllowlistRule};
use rulegate_engine::config::schema::FieldSource;

fn engine() -> Arc<RuleEngine> {
    let echo_action: Arc<dyn Rule> = Arc::new(FnRule::new("update-only", |ctx: &RuleContext| {
        if ctx.action == "update" {
            Ok(success())
        } else {
            Ok(failure(format!("action {} not permitted", ctx.action), Some("BAD_ACTION")))
        }
    }));
    Arc::new(
        RuleEngine::builder()
            .rule(Arc::new(UserAllowlistRule::new("is-member", ["u1", "u2"])))
            .rule(Arc::new(FieldMatchRule::new("body-owner", FieldSource::Body, "ownerId")))
            .rule(echo_action)
            .build(),
    )
}

fn bindings() -> BindingTable {
    let mut table = BindingTable::new();
    table.insert("channel.read", Binding::rules(["is-member"]));
    table.insert(
        "channel.update",
        Binding::rules(["is-member", "body-owner", "update-only"]).with_action("update"),
    );
    table.insert("channel.rename", Binding::rules(["is-member", "update-only"]));
    table.insert("channel.audit", Binding::rules(["is-member", "missing-rule"]));
    table.insert("channel.everything", Binding::all_rules().with_action("update"));
    table
}

fn req(user_id: &str) -> AccessRequest {
    AccessRequest::for_user(UserIdentity::new(user_id, "t1"))
}

#[test]
fn reduction_picks_first_failure() {
    let names = ["a", "b", "c"];
    let results: Vec<RuleValidationResult> = vec![
        success(),
        failure("first", Some("FIRST")),
        failure("second", Some("SECOND")),
    ];
    let reason = reduce_results(&names, &results).deny_reason().cloned().unwrap();
    assert_eq!(reason.code, "FIRST");
    assert_eq!(reason.message, "first");
    assert_eq!(reason.rule.as_deref(), Some("b"));

    assert!(reduce_results(&names, &[success(), success(), success()]).is_allowed());
    assert!(reduce_results::<&str>(&[], &[]).is_allowed());

    let untagged = reduce_results(&["x"], &[failure("nope", None)]);
    assert_eq!(untagged.deny_reason().unwrap().code, "ACCESS_DENIED");
}

#[tokio::test]
async fn allows_when_every_rule_passes() {
    let e = Enforcer::new(engine(), bindings());
    let mut r = req("u1");
    r.body = Some(json!({ "ownerId": "u1" }));

    assert_eq!(e.authorize("channel.update", r).await.unwrap(), AccessDecision::Allow);
}

#[tokio::test]
async fn denies_with_first_failing_rule() {
    let e = Enforcer::new(engine(), bindings());
    let mut r = req("u2");
    r.body = Some(json!({ "ownerId": "u1" }));

    let decision = e.authorize("channel.update", r).await.unwrap();
    let reason = decision.deny_reason().unwrap();
    assert_eq!(reason.code, "NOT_OWNER");
    assert_eq!(reason.rule.as_deref(), Some("body-owner"));
}

#[tokio::test]
async fn action_defaults_to_operation_name() {
    let e = Enforcer::new(engine(), bindings());
    let decision = e.authorize("channel.rename", req("u1")).await.unwrap();
    let reason = decision.deny_reason().unwrap();
    assert_eq!(reason.code, "BAD_ACTION");
    assert_eq!(reason.message, "action channel.rename not permitted");
}

#[tokio::test]
async fn missing_identity_is_rejected_before_rules() {
    let e = Enforcer::new(engine(), bindings());
    let decision = e
        .authorize("channel.read", AccessRequest::default())
        .await
        .unwrap();
    assert_eq!(decision, AccessDecision::Unauthenticated);

    let err = e
        .ensure_allowed("channel.read", AccessRequest::default())
        .await
        .expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "UNAUTHENTICATED");
}

#[tokio::test]
async fn unregistered_rule_denies() {
    let e = Enforcer::new(engine(), bindings());
    let decision = e.authorize("channel.audit", req("u1")).await.unwrap();
    let reason = decision.deny_reason().unwrap();
    assert_eq!(reason.code, "RULE_NOT_FOUND");
    assert_eq!(reason.rule.as_deref(), Some("missing-rule"));

    let err = e.ensure_allowed("channel.audit", req("u1")).await.expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "FORBIDDEN");
}

#[tokio::test]
async fn unfiltered_binding_attributes_rule_names() {
    let e = Enforcer::new(engine(), bindings());
    // no body: body-owner fails on a malformed context
    let decision = e.authorize("channel.everything", req("u1")).await.unwrap();
    let reason = decision.deny_reason().unwrap();
    assert_eq!(reason.code, "RULE_VALIDATION_ERROR");
    assert_eq!(reason.rule.as_deref(), Some("body-owner"));
}

#[tokio::test]
async fn unbound_operations_follow_policy() {
    let open = Enforcer::new(engine(), bindings());
    assert!(open
        .authorize("channel.unknown", AccessRequest::default())
        .await
        .unwrap()
        .is_allowed());

    let closed = Enforcer::new(engine(), bindings()).with_unbound_policy(UnboundPolicy::Deny);
    let decision = closed.authorize("channel.unknown", req("u1")).await.unwrap();
    assert_eq!(decision.deny_reason().unwrap().code, "NO_BINDING");
}

#[tokio::test]
async fn malformed_request_is_an_error() {
    let e = Enforcer::new(engine(), bindings());
    let err = e
        .authorize("channel.read", AccessRequest::for_user(UserIdentity::new(" ", "t1")))
        .await
        .expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "INVALID_CONTEXT");
}

#[tokio::test]
async fn decisions_are_counted() {
    let metrics = Arc::new(EngineMetrics::new());
    let e = Enforcer::new(engine(), bindings()).with_metrics(Arc::clone(&metrics));

    e.authorize("channel.read", req("u1")).await.unwrap();
    e.authorize("channel.read", req("u9")).await.unwrap();
    e.authorize("channel.read", AccessRequest::default()).await.unwrap();

    let d = &metrics.decisions;
    assert_eq!(d.get(&[("operation", "channel.read"), ("decision", "allow")]), 1);
    assert_eq!(d.get(&[("operation", "channel.read"), ("decision", "deny")]), 1);
    assert_eq!(d.get(&[("operation", "channel.read"), ("decision", "unauthenticated")]), 1);
}

#[tokio::test]
async fn unbound_operations_share_one_series() {
    let metrics = Arc::new(EngineMetrics::new());
    let e = Enforcer::new(engine(), bindings()).with_metrics(Arc::clone(&metrics));

    for i in 0..500 {
        let decision = e.authorize(&format!("junk-{i}"), req("u1")).await.unwrap();
        assert_eq!(decision, AccessDecision::Allow);
    }
    e.authorize("channel.read", req("u1")).await.unwrap();

    let d = &metrics.decisions;
    assert_eq!(d.series(), 2);
    assert_eq!(d.get(&[("operation", UNBOUND_OPERATION), ("decision", "allow")]), 500);
    assert_eq!(d.get(&[("operation", "channel.read"), ("decision", "allow")]), 1);
    assert!(!metrics.render(&[]).contains("junk-"));
}

#[test]
fn unresolved_bindings_are_reported() {
    let unresolved = bindings().unresolved(&engine());
    assert_eq!(
        unresolved,
        vec![("channel.audit".to_string(), "missing-rule".to_string())]
    );
}
