use super::support::{all_values, atom, choice, close, run, run_err, split, view_with};
use crate::monad::unchecked;
use crate::{
    dispatch, dispatch_with_results, enter_one, extend, focus, focus_by_id, focus_by_name,
    independent, num_goals, refine, shelve, try_focus, GoalId, ProofError, Tactic, TacticError,
};
use std::cell::Cell;
use std::rc::Rc;

fn own_id() -> Tactic<GoalId> {
    enter_one(|goal| Tactic::unit(goal.id()))
}

#[test]
fn test_focus_then_refine_keeps_surrounding_goals() {
    let (view, goals) = view_with(3);
    let applied = run(&focus(2, 2, split(2)), view);
    let comb = applied.proofview.goals();
    assert_eq!(comb.len(), 4);
    assert_eq!(comb[0], goals[0]);
    assert_eq!(comb[3], goals[2]);
    assert!(!applied.proofview.solution().is_open(goals[1]));
    let subgoals = applied
        .proofview
        .solution()
        .info(goals[1])
        .and_then(|info| info.solution())
        .map(|term| term.goals())
        .unwrap();
    assert_eq!(&comb[1..3], subgoals.as_slice());
}

#[test]
fn test_focus_out_of_range() {
    let (view, _) = view_with(2);
    assert_eq!(
        run_err(&focus(2, 3, close()), view),
        ProofError::Failed(TacticError::IndexOutOfRange {
            first: 2,
            last: 3,
            len: 2
        })
    );
}

#[test]
fn test_try_focus_clamps_and_skips() {
    let (view, goals) = view_with(3);
    let applied = run(&try_focus(2, 10, close()), view.clone());
    assert_eq!(applied.proofview.goals(), &[goals[0]]);

    let untouched = run(&try_focus(4, 5, close()), view);
    assert_eq!(untouched.proofview.goals(), goals.as_slice());
}

#[test]
fn test_dispatch_concatenates_in_goal_order() {
    let (view, goals) = view_with(3);
    let applied = run(&dispatch(vec![split(2), close(), split(1)]), view);
    let sigma = applied.proofview.solution();
    let subgoals_of = |goal: GoalId| sigma.info(goal).unwrap().solution().unwrap().goals();
    let mut expected = subgoals_of(goals[0]);
    expected.extend(subgoals_of(goals[2]));
    assert_eq!(applied.proofview.goals(), expected.as_slice());
    assert!(!sigma.is_open(goals[1]));
}

#[test]
fn test_dispatch_size_mismatch() {
    let (view, _) = view_with(3);
    assert_eq!(
        run_err(&dispatch(vec![close(), close()]), view),
        ProofError::Failed(TacticError::SizeMismatch {
            expected: 3,
            actual: 2
        })
    );
}

#[test]
fn test_dispatch_on_no_goals() {
    let (view, _) = view_with(0);
    assert!(run(&dispatch(Vec::new()), view.clone()).proofview.finished());
    assert_eq!(
        run_err(&dispatch(vec![close()]), view),
        ProofError::Failed(TacticError::SizeMismatch {
            expected: 0,
            actual: 1
        })
    );
}

#[test]
fn test_dispatch_with_results_in_goal_order() {
    let (view, goals) = view_with(3);
    let tactic = dispatch_with_results(vec![own_id(), own_id(), own_id()]);
    assert_eq!(run(&tactic, view).value, goals);
}

#[test]
fn test_dispatch_skips_goals_solved_by_earlier_tactics() {
    let (view, goals) = view_with(3);
    let second = goals[1];
    let solve_both = refine(move |_, mut sigma| {
        sigma.solve(second, atom("tt"))?;
        Ok((sigma, atom("tt")))
    });
    let runs = Rc::new(Cell::new(0));
    let counter = runs.clone();
    let counted = own_id().map(move |id| {
        counter.set(counter.get() + 1);
        id
    });
    let tactic = dispatch_with_results(vec![
        solve_both.then(Tactic::unit(goals[0])),
        counted,
        own_id(),
    ]);
    let applied = run(&tactic, view);
    assert_eq!(applied.value, vec![goals[0], goals[2]]);
    assert_eq!(runs.get(), 0);
    assert_eq!(applied.proofview.goals(), &[goals[2]]);
}

#[test]
fn test_extend_covers_middle_goals() {
    let (view, goals) = view_with(4);
    let applied = run(&extend(vec![close()], split(2), vec![shelve()]), view);
    assert_eq!(applied.proofview.goals().len(), 4);
    assert_eq!(applied.proofview.shelf(), &[goals[3]]);
    assert!(!applied.proofview.solution().is_open(goals[0]));
}

#[test]
fn test_extend_size_mismatch() {
    let (view, _) = view_with(1);
    assert_eq!(
        run_err(&extend(vec![close()], close(), vec![close()]), view),
        ProofError::Failed(TacticError::SizeMismatch {
            expected: 1,
            actual: 2
        })
    );
}

#[test]
fn test_independent_runs_on_every_goal() {
    let (view, _) = view_with(3);
    assert_eq!(run(&independent(split(2)), view).proofview.goals().len(), 6);

    let (empty, _) = view_with(0);
    assert!(run(&independent(split(2)), empty).proofview.finished());
}

#[test]
fn test_focus_by_id_on_focused_goal() {
    let (view, goals) = view_with(3);
    let applied = run(&focus_by_id(goals[2], close()), view);
    assert_eq!(applied.proofview.goals(), &goals[..2]);
}

#[test]
fn test_focus_by_id_on_shelved_goal_restores_focus() {
    let (view, goals) = view_with(2);
    let tactic = focus(1, 1, shelve())
        .then(focus_by_id(goals[0], split(2).then(num_goals())));
    let applied = run(&tactic, view);
    assert_eq!(applied.value, 2);
    assert_eq!(applied.proofview.goals(), &[goals[1]]);
    assert!(!applied.proofview.solution().is_open(goals[0]));
}

#[test]
fn test_focus_by_id_unknown_goal() {
    let (view, _) = view_with(1);
    assert_eq!(
        run_err(&focus_by_id(GoalId(42), close()), view),
        ProofError::Failed(TacticError::NoSuchGoal(GoalId(42)))
    );
}

#[test]
fn test_focus_by_name() {
    let (mut view, goals) = view_with(2);
    view.solution.rename(goals[1], "second").unwrap();
    let applied = run(&focus_by_name("second", close()), view.clone());
    assert_eq!(applied.proofview.goals(), &[goals[0]]);

    assert_eq!(
        run_err(&focus_by_name("third", close()), view),
        ProofError::Failed(TacticError::UnknownGoalName("third".to_string()))
    );
}

#[test]
fn test_num_goals_and_unchecked_access() {
    let (view, goals) = view_with(3);
    let tactic = unchecked::set_goals(vec![goals[2]])
        .then(unchecked::new_goals(vec![goals[0], goals[2]]))
        .then(num_goals());
    let applied = run(&tactic, view);
    assert_eq!(applied.value, 2);
    assert_eq!(applied.proofview.goals(), &[goals[2], goals[0]]);
}

#[test]
fn test_independent_over_many_goals() {
    let (view, _) = view_with(10_000);
    let applied = run(&independent(close()), view);
    assert!(applied.proofview.finished());
    assert_eq!(applied.proofview.solution().solved_count(), 10_000);
}

#[test]
fn test_dispatch_over_many_goals_keeps_order() {
    let (view, goals) = view_with(10_000);
    let tactics = (0..goals.len()).map(|_| own_id()).collect();
    let applied = run(&dispatch_with_results(tactics), view);
    assert_eq!(applied.value, goals);
    assert_eq!(applied.proofview.goals(), goals.as_slice());
}

#[test]
fn test_backtracking_through_many_goals() {
    let (view, goals) = view_with(10_000);
    let tactic = independent(close())
        .then(Tactic::<usize>::zero(TacticError::failure("undo")))
        .or(|_| num_goals());
    let applied = run(&tactic, view);
    assert_eq!(applied.value, 10_000);
    assert_eq!(applied.proofview.goals(), goals.as_slice());
}

#[test]
fn test_dispatch_backtracks_into_earlier_goals() {
    let (view, _) = view_with(3);
    let tactics = vec![choice(vec![1, 2]), choice(vec![1, 2]), Tactic::unit(5)];
    let tactic = dispatch_with_results(tactics).and_then(|values| {
        if values[0] == 2 {
            Tactic::unit(values)
        } else {
            Tactic::zero(TacticError::failure("first goal must pick 2"))
        }
    });
    assert_eq!(run(&tactic, view).value, vec![2, 1, 5]);
    assert_eq!(
        all_values(&tactic, view_with(3).0),
        vec![vec![2, 1, 5], vec![2, 2, 5]]
    );
}
