//! Contract tests for the evaluator pipeline: cache behavior, quota and
//! budget gating, retry policy, and persistence rules.

use std::sync::Arc;
use std::time::Duration;

use proxyprobe_core::errors::EvalError;
use proxyprobe_core::evaluator::{EvalRequest, Evaluator, EvaluatorConfig};
use proxyprobe_core::guard::{RateBudgetGuard, DEFAULT_DAILY_BUDGET_CENTS};
use proxyprobe_core::model::{SubjectKind, Verdict};
use proxyprobe_core::providers::llm::{FakeClient, ProviderError};
use proxyprobe_core::storage::{CostLedger, Store};

fn fast_config() -> EvaluatorConfig {
    let mut config = EvaluatorConfig::new("claude-sonnet", "baseline");
    config.backoff_base = Duration::from_millis(1);
    config
}

fn harness(client: FakeClient, budget_cents: f64) -> (Evaluator, Arc<FakeClient>, Store) {
    let store = Store::memory().unwrap();
    store.init_schema().unwrap();
    let guard = Arc::new(RateBudgetGuard::new(CostLedger::new(&store), budget_cents));
    let client = Arc::new(client);
    let evaluator = Evaluator::new(
        fast_config(),
        store.clone(),
        guard,
        client.clone() as Arc<dyn proxyprobe_core::providers::llm::LlmClient>,
    );
    (evaluator, client, store)
}

fn against_response() -> String {
    "SUMMARY: Wage report request.\nRECOMMENDATION: AGAINST\nRATIONALE: Operational matter."
        .to_string()
}

#[tokio::test]
async fn contract_cache_determinism_second_call_makes_no_provider_call() {
    let (evaluator, client, _store) =
        harness(FakeClient::new("fake".into()).with_response(against_response()), 500.0);

    let req = EvalRequest::batch("p-1", SubjectKind::Original, "Resolved: publish wage data.");
    let first = evaluator.evaluate(req.clone()).await.unwrap();
    assert!(!first.cached);
    assert_eq!(client.calls(), 1);

    let second = evaluator.evaluate(req).await.unwrap();
    assert!(second.cached);
    assert_eq!(client.calls(), 1, "cache hit must not reach the provider");

    // Identical content modulo nothing: the cached record is returned as-is.
    assert_eq!(first.evaluation.id, second.evaluation.id);
    assert_eq!(first.evaluation.verdict, second.evaluation.verdict);
    assert_eq!(first.evaluation.raw_response, second.evaluation.raw_response);
}

#[tokio::test]
async fn contract_concurrent_same_fingerprint_makes_one_provider_call() {
    let delayed = FakeClient::new("fake".into())
        .with_response(against_response())
        .with_delay(Duration::from_millis(50));
    let (evaluator, client, _store) = harness(delayed, 500.0);

    let req = EvalRequest::batch("p-1", SubjectKind::Original, "identical text");
    let (a, b) = tokio::join!(evaluator.evaluate(req.clone()), evaluator.evaluate(req));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(
        client.calls(),
        1,
        "second caller must wait on the fingerprint lock, then hit the cache"
    );
    assert!(a.cached != b.cached, "exactly one outcome reached the provider");
    assert_eq!(a.evaluation.id, b.evaluation.id);
    assert_eq!(a.evaluation.verdict, Verdict::Against);
}

#[tokio::test]
async fn contract_caller_timeout_returns_early_uncharged() {
    let store = Store::memory().unwrap();
    store.init_schema().unwrap();
    let guard = Arc::new(RateBudgetGuard::new(CostLedger::new(&store), 500.0));
    let hanging = Arc::new(FakeClient::new("fake".into()).with_delay(Duration::from_secs(30)));
    let mut config = fast_config();
    config.call_timeout = Some(Duration::from_millis(20));
    let evaluator = Evaluator::new(
        config,
        store.clone(),
        guard.clone(),
        hanging.clone() as Arc<dyn proxyprobe_core::providers::llm::LlmClient>,
    );

    let err = evaluator
        .evaluate(EvalRequest {
            subject_id: "p-1",
            subject_kind: SubjectKind::Original,
            text: "text",
            use_cache: true,
            force: false,
            session_id: Some("s"),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EvalError::TimedOut(_)));
    assert_eq!(hanging.calls(), 1, "the provider call was started, then abandoned");

    assert!(store.all().unwrap().is_empty(), "nothing persisted for an abandoned call");
    assert_eq!(
        CostLedger::new(&store).spent_today().unwrap(),
        0.0,
        "a call that never completed is not charged"
    );
    assert_eq!(
        guard.session_remaining("s"),
        10,
        "an abandoned call does not consume session quota"
    );
}

#[tokio::test]
async fn contract_fingerprint_sensitivity_to_text() {
    let (evaluator, client, _store) = harness(FakeClient::new("fake".into()), 500.0);

    evaluator
        .evaluate(EvalRequest::batch("p-1", SubjectKind::Original, "text one"))
        .await
        .unwrap();
    evaluator
        .evaluate(EvalRequest::batch("p-1", SubjectKind::Original, "text two"))
        .await
        .unwrap();
    assert_eq!(client.calls(), 2, "different text must miss the cache");
}

#[tokio::test]
async fn contract_quota_cache_hits_consume_nothing() {
    let (evaluator, client, _store) =
        harness(FakeClient::new("fake".into()), DEFAULT_DAILY_BUDGET_CENTS);

    let req = EvalRequest {
        subject_id: "p-1",
        subject_kind: SubjectKind::Original,
        text: "same text every time",
        use_cache: true,
        force: false,
        session_id: Some("session-a"),
    };

    // 15 calls to one fingerprint: one provider call, zero quota pressure after.
    for _ in 0..15 {
        evaluator.evaluate(req.clone()).await.unwrap();
    }
    assert_eq!(client.calls(), 1);

    // Still 9 distinct-fingerprint calls available in the same session.
    let texts: Vec<String> = (0..9).map(|i| format!("distinct text {i}")).collect();
    for text in &texts {
        evaluator
            .evaluate(EvalRequest {
                subject_id: "p-x",
                subject_kind: SubjectKind::Original,
                text,
                use_cache: true,
                force: false,
                session_id: Some("session-a"),
            })
            .await
            .unwrap();
    }

    // The 11th distinct fingerprint is denied.
    let err = evaluator
        .evaluate(EvalRequest {
            subject_id: "p-x",
            subject_kind: SubjectKind::Original,
            text: "the eleventh distinct text",
            use_cache: true,
            force: false,
            session_id: Some("session-a"),
        })
        .await
        .unwrap_err();
    match err {
        EvalError::Denied { reason } => assert!(reason.contains("session limit")),
        other => panic!("expected session denial, got {other:?}"),
    }
}

#[tokio::test]
async fn contract_budget_gate_checks_before_the_call() {
    let (evaluator, _client, store) = harness(FakeClient::new("fake".into()), 500.0);
    let ledger = CostLedger::new(&store);
    ledger.add_cost(480.0).unwrap();

    // 480 < 500: allowed even though the call will push past the threshold.
    evaluator
        .evaluate(EvalRequest {
            subject_id: "p-1",
            subject_kind: SubjectKind::Original,
            text: "allowed call",
            use_cache: true,
            force: false,
            session_id: Some("s"),
        })
        .await
        .unwrap();
    ledger.add_cost(40.0).unwrap();

    let err = evaluator
        .evaluate(EvalRequest {
            subject_id: "p-2",
            subject_kind: SubjectKind::Original,
            text: "denied call",
            use_cache: true,
            force: false,
            session_id: Some("s"),
        })
        .await
        .unwrap_err();
    match err {
        EvalError::Denied { reason } => assert!(reason.contains("daily budget exceeded")),
        other => panic!("expected budget denial, got {other:?}"),
    }
}

#[tokio::test]
async fn contract_parse_failure_is_not_persisted_but_is_charged() {
    let (evaluator, _client, store) = harness(
        FakeClient::new("fake".into()).with_response("I decline to answer."),
        500.0,
    );
    let ledger = CostLedger::new(&store);

    let err = evaluator
        .evaluate(EvalRequest::batch("p-1", SubjectKind::Original, "some text"))
        .await
        .unwrap_err();
    match err {
        EvalError::Unparseable { raw_response, .. } => {
            assert!(raw_response.contains("decline"));
        }
        other => panic!("expected Unparseable, got {other:?}"),
    }

    assert!(store.all().unwrap().is_empty(), "no fabricated verdict stored");
    assert!(
        ledger.spent_today().unwrap() > 0.0,
        "cost was incurred even though the judgment was unparseable"
    );
}

#[tokio::test]
async fn contract_transient_failures_retry_then_surface_uncached() {
    let flaky = FakeClient::new("fake".into()).with_script(vec![
        Err(ProviderError::Server {
            status: 503,
            detail: "overloaded".into(),
        }),
        Err(ProviderError::RateLimited { status: 429 }),
        Err(ProviderError::Server {
            status: 500,
            detail: "still down".into(),
        }),
    ]);
    let (evaluator, client, store) = harness(flaky, 500.0);

    let err = evaluator
        .evaluate(EvalRequest::batch("p-1", SubjectKind::Original, "text"))
        .await
        .unwrap_err();
    match err {
        EvalError::ProviderUnavailable { attempts, .. } => assert_eq!(attempts, 3),
        other => panic!("expected ProviderUnavailable, got {other:?}"),
    }
    assert_eq!(client.calls(), 3);
    assert!(store.all().unwrap().is_empty(), "failures are never cached");

    // A later attempt is not blocked by a poisoned cache entry.
    let outcome = evaluator
        .evaluate(EvalRequest::batch("p-1", SubjectKind::Original, "text"))
        .await
        .unwrap();
    assert!(!outcome.cached);
}

#[tokio::test]
async fn contract_transient_failure_recovers_within_retry_budget() {
    let flaky = FakeClient::new("fake".into()).with_script(vec![
        Err(ProviderError::RateLimited { status: 429 }),
        Ok(against_response()),
    ]);
    let (evaluator, client, _store) = harness(flaky, 500.0);

    let outcome = evaluator
        .evaluate(EvalRequest::batch("p-1", SubjectKind::Original, "text"))
        .await
        .unwrap();
    assert_eq!(outcome.evaluation.verdict, Verdict::Against);
    assert_eq!(client.calls(), 2);
}

#[tokio::test]
async fn contract_fatal_provider_errors_are_not_retried() {
    let fatal = FakeClient::new("fake".into()).with_script(vec![Err(ProviderError::Rejected {
        status: 401,
        detail: "bad api key".into(),
    })]);
    let (evaluator, client, _store) = harness(fatal, 500.0);

    let err = evaluator
        .evaluate(EvalRequest::batch("p-1", SubjectKind::Original, "text"))
        .await
        .unwrap_err();
    assert!(matches!(err, EvalError::ProviderFatal(_)));
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn contract_force_writes_a_new_version_and_latest_wins() {
    let scripted = FakeClient::new("fake".into()).with_script(vec![
        Ok("RECOMMENDATION: FOR".to_string()),
        Ok("RECOMMENDATION: AGAINST".to_string()),
    ]);
    let (evaluator, _client, store) = harness(scripted, 500.0);

    let mut req = EvalRequest::batch("p-1", SubjectKind::Original, "text");
    let first = evaluator.evaluate(req.clone()).await.unwrap();
    assert_eq!(first.evaluation.verdict, Verdict::For);

    req.force = true;
    let second = evaluator.evaluate(req.clone()).await.unwrap();
    assert_eq!(second.evaluation.verdict, Verdict::Against);

    // Readers see the superseding record.
    req.force = false;
    let third = evaluator.evaluate(req).await.unwrap();
    assert!(third.cached);
    assert_eq!(third.evaluation.verdict, Verdict::Against);
    assert_eq!(store.all().unwrap().len(), 1);
}

#[tokio::test]
async fn contract_oversized_input_rejected_before_any_work() {
    let (evaluator, client, _store) = harness(FakeClient::new("fake".into()), 500.0);
    let oversized = "x".repeat(5_001);

    let err = evaluator
        .evaluate(EvalRequest::batch("p-1", SubjectKind::Original, &oversized))
        .await
        .unwrap_err();
    assert!(matches!(err, EvalError::InputTooLong { len: 5_001, .. }));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn contract_unknown_prompt_is_rejected_up_front() {
    let store = Store::memory().unwrap();
    store.init_schema().unwrap();
    let guard = Arc::new(RateBudgetGuard::new(CostLedger::new(&store), 500.0));
    let mut config = fast_config();
    config.prompt_version = "no_such_prompt".into();
    let evaluator = Evaluator::new(
        config,
        store,
        guard,
        Arc::new(FakeClient::new("fake".into())),
    );

    let err = evaluator
        .evaluate(EvalRequest::batch("p-1", SubjectKind::Original, "text"))
        .await
        .unwrap_err();
    assert!(matches!(err, EvalError::UnknownPrompt { .. }));
}

#[tokio::test]
async fn contract_custom_text_gets_a_stable_subject_id() {
    let (evaluator, client, _store) = harness(FakeClient::new("fake".into()), 500.0);

    let first = evaluator.evaluate_custom("ad-hoc text", None).await.unwrap();
    let second = evaluator.evaluate_custom("ad-hoc text", None).await.unwrap();
    assert!(first.evaluation.subject_id.starts_with("custom-"));
    assert_eq!(first.evaluation.subject_id, second.evaluation.subject_id);
    assert!(second.cached);
    assert_eq!(client.calls(), 1);
}
