use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::{
    env::State,
    error::{Error, Result},
};

/// Reward for arriving at the goal when the scenario does not configure one
///
/// Kept for compatibility with the catalog's historical behavior. Nothing
/// derives this number, so configure the goal reward explicitly when it matters.
pub const DEFAULT_GOAL_REWARD: f64 = 10.0;

/// Reward for arriving at any state without a configured reward or hazard
pub const STEP_COST: f64 = -1.0;

/// An immutable world configuration: where the goal is, and what arriving at
/// each state is worth
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    pub description: String,
    pub goal_state: State,
    pub rewards: BTreeMap<State, f64>,
    pub hazards: BTreeMap<State, f64>,
    pub icon: String,
}

impl Scenario {
    /// Start building a scenario with no rewards or hazards
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        goal_state: State,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            goal_state,
            rewards: BTreeMap::new(),
            hazards: BTreeMap::new(),
            icon: String::new(),
        }
    }

    /// Reward earned on arrival at `state`
    pub fn with_reward(mut self, state: State, reward: f64) -> Self {
        self.rewards.insert(state, reward);
        self
    }

    /// Penalty earned on arrival at `state`, usually negative
    pub fn with_hazard(mut self, state: State, penalty: f64) -> Self {
        self.hazards.insert(state, penalty);
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    /// Reward for reaching the goal, falling back to [`DEFAULT_GOAL_REWARD`]
    pub fn goal_reward(&self) -> f64 {
        self.rewards
            .get(&self.goal_state)
            .copied()
            .unwrap_or(DEFAULT_GOAL_REWARD)
    }

    /// Reward for arriving at `next_state`
    ///
    /// Precedence: goal reward, bonus reward, hazard penalty, step cost.
    pub fn arrival_reward(&self, next_state: State) -> f64 {
        if next_state == self.goal_state {
            return self.goal_reward();
        }

        self.rewards
            .get(&next_state)
            .or_else(|| self.hazards.get(&next_state))
            .copied()
            .unwrap_or(STEP_COST)
    }

    /// Whether a non-goal state carries a bonus reward
    pub fn is_bonus(&self, state: State) -> bool {
        state != self.goal_state && self.rewards.contains_key(&state)
    }

    /// Whether arriving at `state` carries a penalty
    pub fn is_hazard(&self, state: State) -> bool {
        self.hazards.contains_key(&state)
    }

    /// Ensure every state the scenario mentions lies in `[0, num_states - 1]`
    pub(crate) fn validate(&self, num_states: usize) -> Result<()> {
        let invalid = |reason: String| Error::InvalidScenario {
            id: self.id.clone(),
            reason,
        };

        if self.goal_state >= num_states {
            return Err(invalid(format!("goal state {} is out of range", self.goal_state)));
        }

        let marked = self.rewards.iter().map(|e| ("reward", e));
        let marked = marked.chain(self.hazards.iter().map(|e| ("hazard", e)));
        for (kind, (&state, &value)) in marked {
            if state >= num_states {
                return Err(invalid(format!("{kind} at state {state} is out of range")));
            }
            if !value.is_finite() {
                return Err(invalid(format!("{kind} at state {state} is not finite")));
            }
        }

        Ok(())
    }
}

static CATALOG: Lazy<Vec<Scenario>> = Lazy::new(|| {
    vec![
        Scenario::new(
            "goal-right",
            "Goal on Right",
            "Charging station at position 3",
            3,
        )
        .with_reward(3, 10.0)
        .with_icon("⚡"),
        Scenario::new(
            "goal-left",
            "Goal on Left",
            "Charging station at position 0",
            0,
        )
        .with_reward(0, 10.0)
        .with_icon("⚡"),
        Scenario::new(
            "middle-treasure",
            "Middle Treasure",
            "Treasure at position 1, goal at position 3",
            3,
        )
        .with_reward(1, 5.0)
        .with_reward(3, 10.0)
        .with_icon("💎"),
        Scenario::new(
            "avoid-hazard",
            "Avoid Hazard",
            "Hazard at position 2, goal at position 3",
            3,
        )
        .with_reward(3, 10.0)
        .with_hazard(2, -8.0)
        .with_icon("☠️"),
        Scenario::new(
            "two-goals",
            "Two Goals",
            "Small reward at 0 (+3), big reward at 3 (+10)",
            3,
        )
        .with_reward(0, 3.0)
        .with_reward(3, 10.0)
        .with_icon("🎯"),
        Scenario::new(
            "expensive-path",
            "Expensive Path",
            "High cost through position 2 (-5)",
            3,
        )
        .with_reward(3, 10.0)
        .with_hazard(2, -5.0)
        .with_icon("💰"),
    ]
});

/// Every built-in scenario, in display order
pub fn list_scenarios() -> &'static [Scenario] {
    &CATALOG
}

/// Look up a built-in scenario by id
pub fn scenario(id: &str) -> Result<&'static Scenario> {
    CATALOG
        .iter()
        .find(|s| s.id == id)
        .ok_or_else(|| Error::UnknownScenario(id.to_string()))
}
