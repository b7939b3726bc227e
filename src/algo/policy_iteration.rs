use std::time::Instant;

use log::{trace, warn};

use crate::{
    env::{Action, Model, NUM_ACTIONS, NUM_STATES},
    error::Result,
};

use super::{
    action_values, active_states, backup, check_discount, greedy, max_change, Decision, Policy,
    QTable, Solution, SolverConfig, ValueTable,
};

/// Policy iteration
///
/// Starting from a policy that always moves right, alternates full policy
/// evaluation with greedy improvement until no state changes its action, or
/// until `config.max_policy_iterations` rounds have run. Improvement breaks ties
/// toward the earliest action in [`Action::VARIANTS`], as
/// [`value_iteration`](super::value_iteration) does.
pub fn policy_iteration<M: Model>(
    model: &M,
    gamma: f64,
    config: &SolverConfig,
) -> Result<Solution> {
    let start = Instant::now();
    let gamma = check_discount(gamma)?;

    let mut values: ValueTable = [0.0; NUM_STATES];
    let mut q_values: QTable = [[0.0; NUM_ACTIONS]; NUM_STATES];
    let mut policy = Policy::uniform(model, Action::Right);
    let mut rounds = 0;
    let mut converged = false;

    while rounds < config.max_policy_iterations {
        rounds += 1;

        let (evaluated, settled) = evaluate(model, &policy, values, gamma, config)?;
        values = evaluated;
        if !settled {
            warn!(
                "policy evaluation hit the {} sweep cap without converging (gamma = {gamma})",
                config.max_evaluation_sweeps
            );
        }

        let mut stable = true;
        for state in active_states(model) {
            let q = action_values(model, state, &values, gamma)?;
            let decision = Decision::Move(greedy(&q).0);
            q_values[state] = q;

            if policy.get(state)? != decision {
                stable = false;
                policy.set(state, decision);
            }
        }

        trace!("policy iteration round {rounds}: stable = {stable}");

        if stable {
            converged = settled;
            break;
        }
    }

    if !converged {
        warn!(
            "policy iteration stopped after {rounds} rounds without a converged policy (gamma = {gamma})"
        );
    }

    Ok(Solution {
        values,
        q_values,
        policy,
        iterations: rounds,
        converged,
        duration: start.elapsed(),
    })
}

/// Iterative policy evaluation with synchronous sweeps, warm-started from `values`
///
/// **Returns** the values and whether they settled below `config.theta`
fn evaluate<M: Model>(
    model: &M,
    policy: &Policy,
    mut values: ValueTable,
    gamma: f64,
    config: &SolverConfig,
) -> Result<(ValueTable, bool)> {
    for _ in 0..config.max_evaluation_sweeps {
        let mut next = values;
        for state in active_states(model) {
            next[state] = backup(model, state, policy.action(state)?, &values, gamma)?;
        }

        let delta = max_change(&values, &next);
        values = next;

        if delta < config.theta {
            return Ok((values, true));
        }
    }

    Ok((values, false))
}

#[cfg(test)]
mod tests {
    use crate::gym::{scenario, Hallway};

    use super::*;

    #[test]
    fn policy_iteration_goal_right() {
        let env = Hallway::new(scenario("goal-right").unwrap()).unwrap();
        let solution = policy_iteration(&env, 0.9, &SolverConfig::default()).unwrap();

        assert!(solution.converged);
        assert_eq!(solution.iterations, 1, "Initial policy is already optimal");
        assert_eq!(solution.policy, Policy::uniform(&env, Action::Right));
    }

    #[test]
    fn policy_iteration_goal_left() {
        let env = Hallway::new(scenario("goal-left").unwrap()).unwrap();
        let solution = policy_iteration(&env, 0.9, &SolverConfig::default()).unwrap();

        assert!(solution.converged);
        assert_eq!(solution.iterations, 2, "One improvement turns every state around");
        assert_eq!(solution.policy, Policy::uniform(&env, Action::Left));
        assert!(solution.values[1] > solution.values[2]);
        assert!(solution.values[2] > solution.values[3]);
    }

    #[test]
    fn evaluate_fixed_policy() {
        let env = Hallway::new(scenario("goal-right").unwrap()).unwrap();
        let policy = Policy::uniform(&env, Action::Left);
        let (values, settled) =
            evaluate(&env, &policy, [0.0; NUM_STATES], 0.5, &SolverConfig::default()).unwrap();

        // Walking left forever costs 1 per step: -1 / (1 - 0.5)
        assert!(settled);
        for v in &values[..3] {
            assert!((v + 2.0).abs() < 1e-3, "{values:?}");
        }
        assert_eq!(values[3], 0.0);
    }

    #[test]
    fn evaluation_cap_is_reported() {
        let env = Hallway::new(scenario("two-goals").unwrap()).unwrap();
        let config = SolverConfig {
            max_evaluation_sweeps: 50,
            ..Default::default()
        };
        let solution = policy_iteration(&env, 1.0, &config).unwrap();
        assert!(!solution.converged);
        assert!(solution.iterations <= config.max_policy_iterations);
    }
}
