use super::support::{app, atom, close, run, run_err, view_with};
use crate::{
    cycle, focus, give_up, given_up, guard_no_unifiable, refine, reverse, shelve,
    shelve_unifiable, status, swap, unifiable_partition, unshelve, unshelve_all, with_shelf,
    GoalId, ProofError, Status, Tactic, TacticError, Term,
};

/// Refine each goal into a witness `w` and a proof whose statement
/// mentions `w`
fn intro_witness() -> Tactic<()> {
    refine(|goal, mut sigma| {
        let witness = sigma.new_goal(goal.context().clone(), atom("nat"), Some("w".to_string()));
        let proof = sigma.new_goal(
            goal.context().clone(),
            app("P", vec![Term::goal(witness)]),
            None,
        );
        let term = app("ex", vec![Term::goal(witness), Term::goal(proof)]);
        Ok((sigma, term))
    })
}

#[test]
fn test_shelve_then_unshelve() {
    let (view, goals) = view_with(2);
    let shelved = run(&shelve(), view);
    assert!(shelved.proofview.goals().is_empty());
    assert_eq!(shelved.proofview.shelf(), goals.as_slice());

    let restored = run(&unshelve(goals.clone()), shelved.proofview);
    assert_eq!(restored.proofview.goals(), goals.as_slice());
    assert!(restored.proofview.shelf().is_empty());
}

#[test]
fn test_unshelve_skips_solved_goals() {
    let (view, goals) = view_with(2);
    let tactic = shelve().then(unshelve(vec![goals[1]])).then(close());
    let applied = run(&tactic, view);
    assert_eq!(applied.proofview.shelf(), &[goals[0]]);
    assert!(applied.proofview.goals().is_empty());

    let again = run(&unshelve(goals.clone()), applied.proofview);
    assert_eq!(again.proofview.goals(), &[goals[0]]);
}

#[test]
fn test_unshelve_all_appends_after_focus() {
    let (view, goals) = view_with(3);
    let tactic = focus(1, 2, shelve()).then(unshelve_all());
    let applied = run(&tactic, view);
    assert_eq!(applied.proofview.goals(), &[goals[2], goals[0], goals[1]]);
}

#[test]
fn test_unifiable_partition() {
    let (view, _) = view_with(1);
    let applied = run(&intro_witness(), view);
    let comb = applied.proofview.goals().to_vec();
    let (unifiable, rest) = unifiable_partition(applied.proofview.solution(), &comb);
    assert_eq!(unifiable, vec![comb[0]]);
    assert_eq!(rest, vec![comb[1]]);
}

#[test]
fn test_shelve_unifiable() {
    let (view, _) = view_with(1);
    let applied = run(&intro_witness().then(shelve_unifiable()), view);
    let sigma = applied.proofview.solution();
    assert_eq!(applied.proofview.goals().len(), 1);
    assert_eq!(applied.proofview.shelf().len(), 1);
    assert_eq!(sigma.name(applied.proofview.shelf()[0]), Some("w"));
}

#[test]
fn test_guard_no_unifiable() {
    let (view, _) = view_with(1);
    assert_eq!(run(&guard_no_unifiable(), view.clone()).proofview.goals().len(), 1);
    assert_eq!(
        run_err(&intro_witness().then(guard_no_unifiable()), view),
        ProofError::Failed(TacticError::UnresolvedBindings(vec!["w".to_string()]))
    );
}

#[test]
fn test_give_up_marks_branch_unsafe() {
    let (view, goals) = view_with(2);
    let tactic = focus(1, 1, give_up()).then(close()).then(status());
    let applied = run(&tactic, view);
    assert_eq!(applied.value, Status::Unsafe);
    assert_eq!(applied.status, Status::Unsafe);
    assert!(applied.proofview.goals().is_empty());
    assert_eq!(applied.proofview.given_up(), &[goals[0]]);
    assert_eq!(applied.trace.labels(), vec!["give_up"]);
}

#[test]
fn test_give_up_undone_by_backtracking() {
    let (view, goals) = view_with(1);
    let tactic = give_up()
        .then(Tactic::<()>::zero(TacticError::failure("undo")))
        .or(|_| Tactic::unit(()))
        .then(given_up());
    let applied = run(&tactic, view);
    assert_eq!(applied.status, Status::Safe);
    assert!(applied.value.is_empty());
    assert_eq!(applied.proofview.goals(), goals.as_slice());
}

#[test]
fn test_with_shelf_reports_new_shelved_goals() {
    let (view, goals) = view_with(3);
    let tactic = focus(3, 3, shelve()).then(with_shelf(focus(1, 1, shelve())));
    let applied = run(&tactic, view);
    assert_eq!(applied.value.0, vec![goals[0]]);
    assert_eq!(applied.proofview.shelf(), &[goals[2]]);
    assert_eq!(applied.proofview.goals(), &[goals[1]]);
}

fn comb_after(tactic: Tactic<()>, n: usize) -> (Vec<GoalId>, Vec<GoalId>) {
    let (view, goals) = view_with(n);
    (run(&tactic, view).proofview.goals().to_vec(), goals)
}

#[test]
fn test_cycle() {
    let (comb, g) = comb_after(cycle(1), 3);
    assert_eq!(comb, vec![g[1], g[2], g[0]]);

    let (comb, g) = comb_after(cycle(-1), 3);
    assert_eq!(comb, vec![g[2], g[0], g[1]]);

    let (comb, g) = comb_after(cycle(0), 3);
    assert_eq!(comb, g);

    assert_eq!(comb_after(cycle(4), 3).0, comb_after(cycle(1), 3).0);
    assert!(comb_after(cycle(5), 0).0.is_empty());
}

#[test]
fn test_swap() {
    let (comb, g) = comb_after(swap(1, 3), 3);
    assert_eq!(comb, vec![g[2], g[1], g[0]]);

    let (comb, g) = comb_after(swap(-1, 1), 3);
    assert_eq!(comb, vec![g[2], g[1], g[0]]);

    let (comb, g) = comb_after(swap(2, 2), 3);
    assert_eq!(comb, g);
}

#[test]
fn test_reverse() {
    let (comb, g) = comb_after(reverse(), 3);
    assert_eq!(comb, vec![g[2], g[1], g[0]]);
}

#[test]
fn test_goal_order_primitives_are_traced() {
    let (view, _) = view_with(2);
    let tactic = cycle(1).then(swap(1, 2)).then(reverse());
    assert_eq!(
        run(&tactic, view).trace.labels(),
        vec!["cycle 1", "swap 1 2", "reverse"]
    );
}
