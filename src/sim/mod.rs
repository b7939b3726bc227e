use log::trace;
use rand::{thread_rng, Rng};

use crate::{
    algo::Policy,
    env::{check_state, Action, Model, Outcome, State},
    error::Result,
};

mod session;
mod trajectory;

pub use session::{Session, SessionConfig};
pub use trajectory::{StepRecord, Trajectory, TrajectoryStats};

/// The result of one simulated step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub next_state: State,
    pub action: Action,
    pub reward: f64,
    /// `false` if the robot slipped or walked into a wall
    pub moved: bool,
}

/// Pick an outcome by inverse-CDF sampling
///
/// Walks the outcomes in order and returns the first whose cumulative
/// probability reaches `draw`, a uniform value in `[0, 1)`. If rounding leaves
/// the cumulative mass short of `draw`, returns `None`.
pub fn sample(outcomes: &[Outcome], draw: f64) -> Option<State> {
    let mut cumulative = 0.0;
    outcomes
        .iter()
        .find(|o| {
            cumulative += o.prob;
            draw <= cumulative
        })
        .map(|o| o.next_state)
}

/// Advance the robot one step from `state` following `policy`
///
/// Draws a fresh uniform value from the thread-local generator for every call.
/// **Returns** `None` when `state` is the goal: the run is over and the
/// robot does not move.
pub fn step<M: Model>(model: &M, state: State, policy: &Policy) -> Result<Option<StepOutcome>> {
    step_with(model, state, policy, &mut thread_rng())
}

/// [`step`] with a caller-provided random number generator
pub fn step_with<M, R>(
    model: &M,
    state: State,
    policy: &Policy,
    rng: &mut R,
) -> Result<Option<StepOutcome>>
where
    M: Model,
    R: Rng,
{
    check_state(state)?;
    if model.is_terminal(state) {
        return Ok(None);
    }

    let action = policy.action(state)?;
    let outcomes = model.transition(state, action)?;
    let draw = rng.gen::<f64>();
    let next_state = check_state(sample(&outcomes, draw).unwrap_or(state))?;
    let reward = model.reward(state, action, next_state)?;

    trace!("{state} --{action}--> {next_state} (draw {draw:.3}, reward {reward})");

    Ok(Some(StepOutcome {
        next_state,
        action,
        reward,
        moved: next_state != state,
    }))
}
