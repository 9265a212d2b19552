//! The fulfilment agent: executor, goal checker and the agent loop.
//!
//! Each request runs a **Plan → Execute → Validate** cycle:
//!
//! 1. **Plan**: the planner turns the member's message into an [`Intent`]
//! 2. **Execute**: the [`Executor`] picks a strategy and runs its tool steps in order
//! 3. **Validate**: the [`GoalChecker`] scores the outcome against the category's goal
//! 4. **Retry** with a tagged message while the checker recommends it and
//!    the retry budget lasts, otherwise **respond**
//!
//! A panic anywhere inside a cycle is converted into an emergency hand-off
//! to the human concierge team.
//!
//! [`Intent`]: concierge_core::Intent

pub mod executor;
pub mod goal_checker;
pub mod loop_runner;
pub mod response;

#[cfg(test)]
mod test_helpers;

pub use executor::Executor;
pub use goal_checker::{GoalChecker, GoalDefinition};
pub use loop_runner::AgentLoop;
