use super::support::{atom, close, run, split, view_with};
use crate::{
    check_interrupt, emit_side_effects, environment, focus, give_up, record, Declaration, Engine,
    EngineLimits, Environment, NonLogical, ProofError, Status, Tactic, TacticError,
};
use std::sync::atomic::Ordering;
use std::thread::sleep;
use std::time::Duration;

#[test]
fn test_apply_returns_first_success() {
    let (view, _) = view_with(2);
    let tactic = close().then(Tactic::unit(1).or(|_| Tactic::unit(2)));
    let applied = run(&tactic, view);
    assert_eq!(applied.value, 1);
    assert!(applied.proofview.finished());
    assert_eq!(applied.status, Status::Safe);
    assert!(applied.trace.is_empty());
}

#[test]
fn test_apply_reports_failure() {
    let (view, _) = view_with(1);
    let engine = Engine::default();
    let err = engine
        .apply(&Tactic::<()>::zero(TacticError::failure("stuck")), view)
        .unwrap_err();
    assert_eq!(err, ProofError::Failed(TacticError::failure("stuck")));
    assert!(!err.is_asynchronous());
}

#[test]
fn test_interrupt_aborts_run() {
    let (view, _) = view_with(1);
    let engine = Engine::default();
    engine.interrupt_handle().store(true, Ordering::SeqCst);
    let tactic = check_interrupt().or(|_| Tactic::unit(()));
    let err = engine.apply(&tactic, view.clone()).unwrap_err();
    assert_eq!(err, ProofError::Interrupted);
    assert!(err.is_asynchronous());

    // the flag is consumed by the check that observed it
    assert!(engine.apply(&tactic, view).is_ok());
}

#[test]
fn test_global_time_limit() {
    let (view, _) = view_with(1);
    let limits = EngineLimits {
        max_tactic_time_ms: Some(5),
        ..EngineLimits::default()
    };
    let engine = Engine::with_limits(Environment::default(), limits);
    let slow = Tactic::lift(NonLogical::new(|_| {
        sleep(Duration::from_millis(30));
        Ok(())
    }))
    .then(close());
    // an inner handler cannot swallow the outer deadline
    let tactic = slow.or_else(|_| Tactic::unit(()));
    match engine.apply(&tactic, view) {
        Err(ProofError::Timeout { limit_ms, .. }) => assert_eq!(limit_ms, 5),
        other => panic!("unexpected outcome: {:?}", other.map(|a| a.value)),
    }
}

#[test]
fn test_step_limit() {
    let (view, _) = view_with(1);
    let limits = EngineLimits {
        max_steps: Some(3),
        ..EngineLimits::default()
    };
    let engine = Engine::with_limits(Environment::default(), limits);
    let tactic = (0..10).fold(Tactic::unit(()), |acc, _| acc.then(Tactic::unit(())));
    assert!(matches!(
        engine.apply(&tactic, view),
        Err(ProofError::ResourceLimitExceeded { .. })
    ));
}

#[test]
fn test_limits_from_json() {
    let limits = EngineLimits::from_json(r#"{"max_steps": 10, "unsafe_refine": true}"#).unwrap();
    assert_eq!(limits.max_steps, Some(10));
    assert!(limits.unsafe_refine);
    assert_eq!(limits.max_goals, EngineLimits::default().max_goals);
    assert_eq!(limits.max_tactic_time_ms, None);
}

#[test]
fn test_side_effects_emitted_only_on_request() {
    let (view, _) = view_with(1);
    let env = Environment::default();
    let lemma = Declaration::axiom("aux_lemma", atom("Prop"));
    let tactic = emit_side_effects(vec![lemma])
        .then(environment())
        .map(|env| env.contains("aux_lemma"));
    let engine = Engine::new(env.clone());
    let applied = engine.apply(&tactic, view).unwrap();
    assert!(applied.value);
    assert!(!engine.environment().contains("aux_lemma"));

    let sigma = applied.proofview.solution();
    assert_eq!(sigma.side_effects().len(), 1);
    assert!(env.emit_side_effects(sigma).contains("aux_lemma"));
}

#[test]
fn test_trace_nesting() {
    let (view, _) = view_with(2);
    let tactic = focus(1, 1, give_up())
        .tagged("outer")
        .then(split(1).tagged("split"));
    let applied = run(&tactic, view);
    assert_eq!(applied.trace.labels(), vec!["outer", "give_up", "split"]);
    assert_eq!(applied.trace.nodes().len(), 2);
    assert_eq!(applied.trace.nodes()[0].size(), 2);

    let json = applied.trace.to_json().unwrap();
    assert!(json.contains("\"outer\""));
    assert!(json.contains("\"give_up\""));
}

#[test]
fn test_trace_of_failed_branch_is_dropped() {
    let (view, _) = view_with(1);
    let tactic = record("first")
        .then(Tactic::<()>::zero(TacticError::failure("undo")))
        .or(|_| record("second"));
    assert_eq!(run(&tactic, view).trace.labels(), vec!["second"]);
}
