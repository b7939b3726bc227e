use std::{
    sync::atomic::{AtomicBool, Ordering},
    thread,
    time::Duration,
};

use log::{debug, info};
use rand::{rngs::ThreadRng, thread_rng, Rng};

use crate::{
    algo::{solve_with, Algorithm, Solution, SolverConfig},
    env::{check_state, Model, State},
    error::Result,
    gym::{self, Hallway, Scenario},
};

use super::{step_with, StepRecord, Trajectory, TrajectoryStats};

/// Configuration for a [`Session`]
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Discount factor
    ///
    /// **Default**: `0.9`
    pub gamma: f64,
    /// **Default**: [`Algorithm::Value`]
    pub algorithm: Algorithm,
    /// Delay before each tick of [`Session::run`]
    ///
    /// **Default**: `800ms`
    pub tick_interval: Duration,
    pub solver: SolverConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            gamma: 0.9,
            algorithm: Algorithm::Value,
            tick_interval: Duration::from_millis(800),
            solver: SolverConfig::default(),
        }
    }
}

/// Owns one robot in one scenario: the solved policy, the robot's position and
/// the trajectory of the current run
///
/// Changing the scenario, discount factor or algorithm re-solves immediately, so
/// the policy is never stale when the next tick reads it. Changing the scenario
/// also sends the robot back to state 0 and clears the trajectory.
pub struct Session<R: Rng = ThreadRng> {
    env: Hallway,
    config: SessionConfig,
    solution: Solution,
    position: State,
    trajectory: Trajectory,
    running: bool,
    rng: R,
}

impl Session {
    /// Solve `scenario` and place the robot at state 0
    pub fn new(scenario: &Scenario, config: SessionConfig) -> Result<Self> {
        Self::with_rng(scenario, config, thread_rng())
    }
}

impl<R: Rng> Session<R> {
    /// [`Session::new`] drawing transitions from `rng`
    pub fn with_rng(scenario: &Scenario, config: SessionConfig, rng: R) -> Result<Self> {
        let env = Hallway::new(scenario)?;
        let solution = solve_with(&env, config.gamma, config.algorithm, &config.solver)?;

        Ok(Self {
            env,
            config,
            solution,
            position: 0,
            trajectory: Trajectory::new(),
            running: false,
            rng,
        })
    }

    pub fn scenario(&self) -> &Scenario {
        self.env.scenario()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    pub fn position(&self) -> State {
        self.position
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    pub fn stats(&self) -> TrajectoryStats {
        self.trajectory.stats()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_at_goal(&self) -> bool {
        self.env.is_terminal(self.position)
    }

    /// Switch to a built-in scenario by id
    pub fn select_scenario(&mut self, id: &str) -> Result<()> {
        self.set_scenario(gym::scenario(id)?)
    }

    /// Switch scenarios, re-solve, and restart from state 0
    ///
    /// On error the session is left unchanged.
    pub fn set_scenario(&mut self, scenario: &Scenario) -> Result<()> {
        let env = Hallway::new(scenario)?;
        let solution = solve_with(
            &env,
            self.config.gamma,
            self.config.algorithm,
            &self.config.solver,
        )?;

        info!("switched to scenario `{}`", scenario.id);
        self.env = env;
        self.solution = solution;
        self.reset(0)
    }

    /// Change the discount factor and re-solve; the current run continues
    pub fn set_gamma(&mut self, gamma: f64) -> Result<()> {
        self.solution = solve_with(&self.env, gamma, self.config.algorithm, &self.config.solver)?;
        self.config.gamma = gamma;
        Ok(())
    }

    /// Change the algorithm and re-solve; the current run continues
    pub fn set_algorithm(&mut self, algorithm: Algorithm) -> Result<()> {
        self.solution = solve_with(&self.env, self.config.gamma, algorithm, &self.config.solver)?;
        self.config.algorithm = algorithm;
        Ok(())
    }

    pub fn set_tick_interval(&mut self, interval: Duration) {
        self.config.tick_interval = interval;
    }

    /// Stop the run, clear the trajectory and place the robot at `start`
    pub fn reset(&mut self, start: State) -> Result<()> {
        self.position = check_state(start)?;
        self.running = false;
        self.trajectory.clear();
        Ok(())
    }

    /// Resume ticking; does nothing once the robot is at the goal
    pub fn start(&mut self) {
        if !self.is_at_goal() {
            self.running = true;
        }
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn toggle_running(&mut self) {
        if self.running {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Advance the robot by one step if the session is running
    ///
    /// Reaching the goal stops the session. **Returns** the new trajectory
    /// record, or `None` if nothing happened.
    pub fn tick(&mut self) -> Result<Option<StepRecord>> {
        if !self.running {
            return Ok(None);
        }

        let outcome = step_with(
            &self.env,
            self.position,
            &self.solution.policy,
            &mut self.rng,
        )?;

        let Some(outcome) = outcome else {
            self.running = false;
            return Ok(None);
        };

        let record = self.trajectory.record(self.position, &outcome);
        self.position = outcome.next_state;

        if self.is_at_goal() {
            let stats = self.stats();
            debug!(
                "reached the goal after {} steps with total reward {}",
                stats.steps, stats.total_reward
            );
            self.running = false;
        }

        Ok(Some(record))
    }

    /// Tick every [`SessionConfig::tick_interval`] until the goal is reached or
    /// `cancel` is set
    ///
    /// Cancellation is checked before each tick, so a step in progress is
    /// always completed. **Returns** the number of steps taken.
    pub fn run(&mut self, cancel: &AtomicBool) -> Result<usize> {
        self.run_ticks(usize::MAX, cancel)
    }

    /// [`Session::run`], stopping after at most `limit` steps
    pub fn run_ticks(&mut self, limit: usize, cancel: &AtomicBool) -> Result<usize> {
        self.start();

        let mut steps = 0;
        while self.running && steps < limit {
            thread::sleep(self.config.tick_interval);
            if cancel.load(Ordering::Acquire) {
                self.pause();
                break;
            }

            if self.tick()?.is_some() {
                steps += 1;
            }
        }

        Ok(steps)
    }
}
