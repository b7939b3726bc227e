use crate::env::{Action, State};

use super::StepOutcome;

/// Represents a single simulated step of the robot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepRecord {
    /// Zero-based position of the step in its run
    pub step: usize,
    /// The state before taking the action
    pub from: State,
    /// The action taken in `from`
    pub action: Action,
    /// The state after the action
    pub to: State,
    /// The reward received on arrival at `to`
    pub reward: f64,
    /// `false` if the robot slipped or walked into a wall
    pub moved: bool,
}

/// Running totals of a run
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrajectoryStats {
    pub steps: usize,
    pub total_reward: f64,
    /// Steps on which the robot stayed where it was
    pub stuck_count: usize,
}

/// An append-only execution trace of one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    records: Vec<StepRecord>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the outcome of stepping from `from`, numbering it after the last record
    pub fn record(&mut self, from: State, outcome: &StepOutcome) -> StepRecord {
        let record = StepRecord {
            step: self.records.len(),
            from,
            action: outcome.action,
            to: outcome.next_state,
            reward: outcome.reward,
            moved: outcome.moved,
        };
        self.records.push(record);
        record
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&StepRecord> {
        self.records.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StepRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    /// Fold the records into running totals
    pub fn stats(&self) -> TrajectoryStats {
        self.records
            .iter()
            .fold(TrajectoryStats::default(), |mut stats, r| {
                stats.steps += 1;
                stats.total_reward += r.reward;
                if !r.moved {
                    stats.stuck_count += 1;
                }
                stats
            })
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a StepRecord;
    type IntoIter = std::slice::Iter<'a, StepRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
