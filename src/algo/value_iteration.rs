use std::time::Instant;

use log::warn;

use crate::{
    env::{Action, Model, NUM_ACTIONS, NUM_STATES},
    error::Result,
};

use super::{
    action_values, active_states, check_discount, greedy, max_change, Decision, Policy, QTable,
    Solution, SolverConfig, ValueTable,
};

/// Value iteration
///
/// Applies synchronous Bellman optimality backups, where every sweep reads only
/// the previous sweep's values, until the largest change in a sweep drops below
/// `config.theta` or `config.max_sweeps` is reached. For `gamma < 1` the backup
/// is a contraction and convergence is guaranteed.
///
/// The greedy policy is read from the Q-values of the final sweep, with ties
/// going to the earliest action in [`Action::VARIANTS`].
pub fn value_iteration<M: Model>(
    model: &M,
    gamma: f64,
    config: &SolverConfig,
) -> Result<Solution> {
    let start = Instant::now();
    let gamma = check_discount(gamma)?;

    let mut values: ValueTable = [0.0; NUM_STATES];
    let mut q_values: QTable = [[0.0; NUM_ACTIONS]; NUM_STATES];
    let mut sweeps = 0;
    let mut converged = false;

    while sweeps < config.max_sweeps {
        sweeps += 1;

        let mut next = values;
        for state in active_states(model) {
            let q = action_values(model, state, &values, gamma)?;
            next[state] = greedy(&q).1;
            q_values[state] = q;
        }

        let delta = max_change(&values, &next);
        values = next;

        if delta < config.theta {
            converged = true;
            break;
        }
    }

    if !converged {
        warn!(
            "value iteration hit the {} sweep cap without converging (gamma = {gamma})",
            config.max_sweeps
        );
    }

    let mut policy = Policy::uniform(model, Action::Right);
    for state in active_states(model) {
        policy.set(state, Decision::Move(greedy(&q_values[state]).0));
    }

    Ok(Solution {
        values,
        q_values,
        policy,
        iterations: sweeps,
        converged,
        duration: start.elapsed(),
    })
}
