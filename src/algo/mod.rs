use std::{fmt, time::Duration};

use log::debug;
use strum::{Display, EnumIter, EnumString, VariantArray};

use crate::{
    env::{check_state, states, Action, Model, State, NUM_ACTIONS, NUM_STATES},
    error::{Error, Result},
    gym::{Hallway, Scenario},
    util::first_argmax,
};

pub mod policy_iteration;
pub mod value_iteration;

pub use policy_iteration::policy_iteration;
pub use value_iteration::value_iteration;

/// State values, indexed by state
pub type ValueTable = [f64; NUM_STATES];

/// Action values, indexed by state then by [`Action::index`]
pub type QTable = [[f64; NUM_ACTIONS]; NUM_STATES];

/// Dynamic programming method used to solve a model
#[derive(EnumIter, EnumString, Display, Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Value,
    Policy,
}

/// Configuration for [`value_iteration`] and [`policy_iteration`]
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Sweeps stop once the largest value change falls below this threshold
    ///
    /// **Default**: `1e-4`
    pub theta: f64,
    /// Safety cap on value iteration sweeps
    ///
    /// **Default**: `1000`
    pub max_sweeps: u32,
    /// Safety cap on policy iteration's evaluate/improve rounds
    ///
    /// **Default**: `100`
    pub max_policy_iterations: u32,
    /// Safety cap on the sweeps of a single policy evaluation
    ///
    /// Only reachable when the discount factor is at least 1.
    ///
    /// **Default**: `100_000`
    pub max_evaluation_sweeps: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            theta: 1e-4,
            max_sweeps: 1000,
            max_policy_iterations: 100,
            max_evaluation_sweeps: 100_000,
        }
    }
}

/// What a policy prescribes in a state
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Decision {
    Move(Action),
    /// The state is the goal; there is nothing left to do
    Terminal,
}

impl Decision {
    pub fn action(self) -> Option<Action> {
        match self {
            Decision::Move(action) => Some(action),
            Decision::Terminal => None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Move(action) => write!(f, "{action}"),
            Decision::Terminal => f.write_str("TERMINAL"),
        }
    }
}

/// A deterministic policy: one [`Decision`] per state
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Policy([Decision; NUM_STATES]);

impl Policy {
    /// Every non-terminal state moves with `action`
    pub fn uniform(model: &impl Model, action: Action) -> Self {
        Self(std::array::from_fn(|state| {
            if model.is_terminal(state) {
                Decision::Terminal
            } else {
                Decision::Move(action)
            }
        }))
    }

    pub fn get(&self, state: State) -> Result<Decision> {
        Ok(self.0[check_state(state)?])
    }

    /// The action to take in a non-terminal state
    ///
    /// **Errors** if the policy marks `state` as terminal
    pub fn action(&self, state: State) -> Result<Action> {
        self.get(state)?
            .action()
            .ok_or(Error::PolicyMismatch(state))
    }

    pub fn iter(&self) -> impl Iterator<Item = (State, Decision)> + '_ {
        self.0.iter().copied().enumerate()
    }

    pub fn decisions(&self) -> &[Decision; NUM_STATES] {
        &self.0
    }

    pub(crate) fn set(&mut self, state: State, decision: Decision) {
        self.0[state] = decision;
    }
}

/// The result of solving a model
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    /// State values; the goal's value is always 0
    pub values: ValueTable,
    /// Action values; the goal's row is unused and left at 0
    pub q_values: QTable,
    pub policy: Policy,
    /// Value iteration sweeps, or policy iteration evaluate/improve rounds
    pub iterations: u32,
    /// `false` if a safety cap stopped the solver before it converged
    pub converged: bool,
    /// Wall-clock solve time, for diagnostics only
    pub duration: Duration,
}

impl Solution {
    /// Q-value of an action, or `None` for the goal state or an out-of-range state
    pub fn q_value(&self, state: State, action: Action) -> Option<f64> {
        match self.policy.get(state) {
            Ok(Decision::Move(_)) => Some(self.q_values[state][action.index()]),
            _ => None,
        }
    }

    pub fn solve_duration_ms(&self) -> f64 {
        self.duration.as_secs_f64() * 1000.0
    }
}

/// Solve a scenario with the default [`SolverConfig`]
pub fn solve(scenario: &Scenario, gamma: f64, algorithm: Algorithm) -> Result<Solution> {
    let env = Hallway::new(scenario)?;
    solve_with(&env, gamma, algorithm, &SolverConfig::default())
}

/// Solve a model with the chosen algorithm
///
/// Solving is a pure function of its inputs apart from the measured duration.
pub fn solve_with<M: Model>(
    model: &M,
    gamma: f64,
    algorithm: Algorithm,
    config: &SolverConfig,
) -> Result<Solution> {
    let solution = match algorithm {
        Algorithm::Value => value_iteration(model, gamma, config)?,
        Algorithm::Policy => policy_iteration(model, gamma, config)?,
    };

    debug!(
        "{algorithm} iteration finished after {} iterations in {:.3} ms (gamma = {gamma})",
        solution.iterations,
        solution.solve_duration_ms(),
    );

    Ok(solution)
}

fn check_discount(gamma: f64) -> Result<f64> {
    if gamma >= 0.0 {
        Ok(gamma)
    } else {
        Err(Error::InvalidDiscount(gamma))
    }
}

/// Expected return of taking `action` in `state` and then collecting `values`
fn backup<M: Model>(
    model: &M,
    state: State,
    action: Action,
    values: &ValueTable,
    gamma: f64,
) -> Result<f64> {
    model
        .transition(state, action)?
        .into_iter()
        .try_fold(0.0, |total, outcome| {
            check_state(outcome.next_state)?;
            let reward = model.reward(state, action, outcome.next_state)?;
            Ok(total + outcome.prob * (reward + gamma * values[outcome.next_state]))
        })
}

/// One-step lookahead for every action, in [`Action::VARIANTS`] order
fn action_values<M: Model>(
    model: &M,
    state: State,
    values: &ValueTable,
    gamma: f64,
) -> Result<[f64; NUM_ACTIONS]> {
    let mut q = [0.0; NUM_ACTIONS];
    for &action in Action::VARIANTS {
        q[action.index()] = backup(model, state, action, values, gamma)?;
    }
    Ok(q)
}

/// The best action for a row of Q-values; ties go to the earliest action
fn greedy(q: &[f64; NUM_ACTIONS]) -> (Action, f64) {
    first_argmax(q.iter().copied())
        .map(|(i, value)| (Action::VARIANTS[i], value))
        .unwrap_or((Action::VARIANTS[0], f64::NAN))
}

/// Largest absolute change between two value tables
///
/// NaN propagates so that a diverging solve never looks converged.
fn max_change(old: &ValueTable, new: &ValueTable) -> f64 {
    old.iter()
        .zip(new)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, |delta, change| {
            if change.is_nan() || delta.is_nan() {
                f64::NAN
            } else {
                delta.max(change)
            }
        })
}

/// States that take part in the Bellman backups
fn active_states<M: Model>(model: &M) -> impl Iterator<Item = State> + '_ {
    states().filter(|&s| !model.is_terminal(s))
}
