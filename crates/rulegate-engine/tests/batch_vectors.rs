//! Batch evaluation vectors, run under both evaluation modes.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use rulegate_engine::registry::{EvaluationMode, RuleEngine};
use rulegate_engine::rules::build_rules;

mod vector_loader;
use vector_loader::load;

const FILES: [&str; 7] = [
    "member_owner_missing.json",
    "duplicate_names.json",
    "malformed_context_isolated.json",
    "all_rules_in_registration_order.json",
    "anonymous_caller.json",
    "ownership.json",
    "empty_request.json",
];

#[tokio::test]
async fn batch_vectors() {
    for f in FILES {
        let v = load(f);

        for mode in [EvaluationMode::Sequential, EvaluationMode::Concurrent] {
            let engine = RuleEngine::builder()
                .mode(mode)
                .rules(build_rules(&v.rules))
                .build();

            let results = match &v.request {
                Some(names) => engine.validate_rules(&v.context, Some(names.as_slice())).await,
                None => engine.validate_all_rules(&v.context).await,
            }
            .expect("vector contexts are well formed");

            let tag = format!("vector={} mode={mode:?}", v.description);
            assert_eq!(results.len(), v.expect.len(), "{tag}");

            for (i, (got, ex)) in results.iter().zip(&v.expect).enumerate() {
                assert_eq!(got.is_valid, ex.is_valid, "{tag} index={i}");
                assert_eq!(got.error_code, ex.error_code, "{tag} index={i}");
                if let Some(msg) = &ex.error_message {
                    assert_eq!(got.error_message.as_ref(), Some(msg), "{tag} index={i}");
                }
            }
        }
    }
}
