//! Application layer - use cases that coordinate the domain services.
//!
//! The CLI layer in `commands` resolves configuration and hands the wired
//! services to the actions here.

mod check;

pub use check::{CheckAction, CheckOutcome, CheckSettings, Stage};
