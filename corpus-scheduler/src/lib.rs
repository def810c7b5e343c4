//! Corpus Scheduler - Quota-Weighted Axis Selection
//!
//! Draws one bucket per diversity axis per issued instruction, steering
//! the issued distribution toward configured target shares while
//! honoring inter-axis compatibility rules and avoiding near-repetition
//! of recently issued signatures. Holds no persistent state of its own;
//! counters are owned by the caller and passed in by reference.

mod error;
mod rules;
mod scheduler;

pub use error::SchedulerError;
pub use scheduler::Scheduler;
