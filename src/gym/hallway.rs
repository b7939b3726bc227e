use crate::{
    env::{check_state, Action, Model, Outcome, State, NUM_STATES},
    error::Result,
};

use super::Scenario;

/// Probability that an attempted move succeeds
pub const SUCCESS_PROB: f64 = 0.8;

/// Probability that the robot slips and stays where it is
pub const SLIP_PROB: f64 = 0.2;

/// A robot in a one-dimensional hallway of [`NUM_STATES`] positions
///
/// Moves succeed with probability [`SUCCESS_PROB`]; otherwise the robot stays put.
/// Moving into a wall also leaves the robot in place. The scenario's goal is
/// absorbing, and rewards depend only on the state the robot arrives at.
#[derive(Debug, Clone, PartialEq)]
pub struct Hallway {
    scenario: Scenario,
}

impl Hallway {
    /// Build the model for a scenario
    ///
    /// **Errors** if the scenario refers to a state outside the hallway
    pub fn new(scenario: &Scenario) -> Result<Self> {
        scenario.validate(NUM_STATES)?;
        Ok(Self {
            scenario: scenario.clone(),
        })
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }
}

impl Model for Hallway {
    fn goal_state(&self) -> State {
        self.scenario.goal_state
    }

    fn transition(&self, state: State, action: Action) -> Result<Vec<Outcome>> {
        check_state(state)?;

        if self.is_terminal(state) {
            return Ok(vec![Outcome {
                next_state: state,
                prob: 1.0,
            }]);
        }

        Ok(vec![
            Outcome {
                next_state: action.target(state),
                prob: SUCCESS_PROB,
            },
            Outcome {
                next_state: state,
                prob: SLIP_PROB,
            },
        ])
    }

    fn reward(&self, state: State, _action: Action, next_state: State) -> Result<f64> {
        check_state(state)?;
        check_state(next_state)?;
        Ok(self.scenario.arrival_reward(next_state))
    }
}

#[cfg(test)]
mod tests {
    use strum::VariantArray;

    use crate::{
        env::states,
        error::Error,
        gym::{list_scenarios, scenario},
    };

    use super::*;

    fn goal_right() -> Hallway {
        Hallway::new(scenario("goal-right").unwrap()).unwrap()
    }

    #[test]
    fn transition_slip_model() {
        let env = goal_right();
        let outcomes = env.transition(1, Action::Right).unwrap();
        assert_eq!(
            outcomes,
            [
                Outcome {
                    next_state: 2,
                    prob: 0.8
                },
                Outcome {
                    next_state: 1,
                    prob: SLIP_PROB
                }
            ]
        );
    }

    #[test]
    fn transition_boundary_clamping() {
        let env = goal_right();
        assert_eq!(env.transition(0, Action::Left).unwrap()[0].next_state, 0);

        let env = Hallway::new(scenario("goal-left").unwrap()).unwrap();
        assert_eq!(
            env.transition(NUM_STATES - 1, Action::Right).unwrap()[0].next_state,
            NUM_STATES - 1
        );
    }

    #[test]
    fn goal_is_absorbing() {
        for s in list_scenarios() {
            let env = Hallway::new(s).unwrap();
            for &action in Action::VARIANTS {
                assert_eq!(
                    env.transition(s.goal_state, action).unwrap(),
                    [Outcome {
                        next_state: s.goal_state,
                        prob: 1.0
                    }],
                    "{} goal absorbs {action}",
                    s.id
                );
            }
        }
    }

    #[test]
    fn probability_mass_sums_to_one() {
        for s in list_scenarios() {
            let env = Hallway::new(s).unwrap();
            for state in states() {
                for &action in Action::VARIANTS {
                    let outcomes = env.transition(state, action).unwrap();
                    let total = outcomes.iter().map(|o| o.prob).sum::<f64>();
                    assert!(
                        (total - 1.0).abs() < 1e-9,
                        "{}: mass of ({state}, {action}) is {total}",
                        s.id
                    );
                }
            }
        }
    }

    #[test]
    fn reward_ignores_action_and_origin() {
        let env = Hallway::new(scenario("expensive-path").unwrap()).unwrap();
        for origin in states() {
            for &action in Action::VARIANTS {
                assert_eq!(env.reward(origin, action, 3).unwrap(), 10.0);
                assert_eq!(env.reward(origin, action, 2).unwrap(), -5.0);
                assert_eq!(env.reward(origin, action, 1).unwrap(), -1.0);
            }
        }
    }

    #[test]
    fn out_of_range_state_is_rejected() {
        let env = goal_right();
        let err = Error::InvalidState {
            state: NUM_STATES,
            max: NUM_STATES - 1,
        };
        assert_eq!(env.transition(NUM_STATES, Action::Left), Err(err.clone()));
        assert_eq!(env.reward(0, Action::Left, NUM_STATES), Err(err.clone()));
        assert_eq!(env.reward(NUM_STATES, Action::Left, 0), Err(err));
    }

    #[test]
    fn invalid_scenario_is_rejected() {
        let s = Scenario::new("far", "Far", "Goal past the wall", 9);
        assert!(matches!(
            Hallway::new(&s),
            Err(Error::InvalidScenario { .. })
        ));
    }
}
