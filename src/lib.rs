//! Dynamic programming for a robot in a stochastic hallway.
//!
//! A [`Scenario`](gym::Scenario) places a goal, bonuses and hazards along a
//! four-cell hallway. [`Hallway`](gym::Hallway) turns it into a fully known
//! Markov decision process, [`algo::solve`] computes state values, Q-values and
//! an optimal policy by value or policy iteration, and [`sim`] executes the
//! policy one stochastic step at a time.
//!
//! ```
//! use hallway::{algo::{solve, Algorithm}, gym::scenario};
//!
//! let solution = solve(scenario("goal-right")?, 0.9, Algorithm::Value)?;
//! assert!(solution.values[2] > solution.values[0]);
//! # Ok::<(), hallway::Error>(())
//! ```

/// Value iteration and policy iteration
pub mod algo;

/// Core MDP types and the model trait
pub mod env;

/// Error type
pub mod error;

/// The hallway model and scenario catalog
pub mod gym;

/// Policy execution
pub mod sim;

mod util;

pub use error::{Error, Result};
