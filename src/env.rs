use std::ops::Range;

use strum::{Display, EnumIter, EnumString, VariantArray};

use crate::error::{Error, Result};

/// Number of positions in the hallway
pub const NUM_STATES: usize = 4;

/// Number of actions available in every non-goal state
pub const NUM_ACTIONS: usize = 2;

/// A position in the hallway, in the interval `[0, NUM_STATES - 1]`
pub type State = usize;

/// Iterate over every state in ascending order
pub fn states() -> Range<State> {
    0..NUM_STATES
}

/// Check that `state` lies in the hallway
pub fn check_state(state: State) -> Result<State> {
    if state < NUM_STATES {
        Ok(state)
    } else {
        Err(Error::InvalidState {
            state,
            max: NUM_STATES - 1,
        })
    }
}

/// A move the robot can attempt
///
/// The declaration order is the enumeration order used when breaking ties
/// between equally valued actions: `Left` wins over `Right`.
#[derive(
    EnumIter, VariantArray, EnumString, Display, Clone, Copy, Debug, Hash, PartialEq, Eq,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Action {
    Left = 0,
    Right = 1,
}

impl Action {
    /// Parse an action name such as `"LEFT"` or `"RIGHT"`
    pub fn parse(name: &str) -> Result<Self> {
        name.parse()
            .map_err(|_| Error::InvalidAction(name.to_string()))
    }

    /// Position in [`Action::VARIANTS`], used to index Q-tables
    pub fn index(self) -> usize {
        self as usize
    }

    /// The state reached if the move succeeds, clamped to the hallway walls
    pub fn target(self, state: State) -> State {
        match self {
            Action::Left => state.saturating_sub(1),
            Action::Right => (state + 1).min(NUM_STATES - 1),
        }
    }
}

/// One possible result of taking an action in a state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome {
    pub next_state: State,
    pub prob: f64,
}

/// A fully known finite Markov decision process over the hallway states
///
/// Implementors describe the dynamics completely, which is what the dynamic
/// programming solvers in [`algo`](crate::algo) require.
pub trait Model {
    /// The absorbing state
    fn goal_state(&self) -> State;

    /// Distribution over next states for taking `action` in `state`
    ///
    /// The probabilities of the returned outcomes sum to 1.
    fn transition(&self, state: State, action: Action) -> Result<Vec<Outcome>>;

    /// Reward earned for the transition `state --action--> next_state`
    fn reward(&self, state: State, action: Action, next_state: State) -> Result<f64>;

    /// Determine if the state is terminal
    fn is_terminal(&self, state: State) -> bool {
        state == self.goal_state()
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn action_parse() {
        assert_eq!(Action::parse("LEFT"), Ok(Action::Left));
        assert_eq!(Action::parse("RIGHT"), Ok(Action::Right));
        assert_eq!(
            Action::parse("UP"),
            Err(Error::InvalidAction("UP".to_string()))
        );
        assert_eq!(Action::Right.to_string(), "RIGHT");
    }

    #[test]
    fn action_order() {
        let actions = Action::iter().collect::<Vec<_>>();
        assert_eq!(actions, Action::VARIANTS, "Enumeration order is stable");
        assert_eq!(actions, [Action::Left, Action::Right]);
        for (i, action) in actions.into_iter().enumerate() {
            assert_eq!(action.index(), i);
        }
    }

    #[test]
    fn action_target_clamps() {
        assert_eq!(Action::Left.target(0), 0, "Left wall");
        assert_eq!(Action::Right.target(NUM_STATES - 1), NUM_STATES - 1, "Right wall");
        assert_eq!(Action::Left.target(2), 1);
        assert_eq!(Action::Right.target(1), 2);
    }

    #[test]
    fn check_state_range() {
        assert_eq!(check_state(0), Ok(0));
        assert_eq!(check_state(NUM_STATES - 1), Ok(NUM_STATES - 1));
        assert_eq!(
            check_state(NUM_STATES),
            Err(Error::InvalidState {
                state: NUM_STATES,
                max: NUM_STATES - 1
            })
        );
    }
}
