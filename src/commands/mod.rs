//! CLI layer - resolves configuration and wires services for each subcommand.

mod check;
pub mod config;

pub use check::{check, run};
pub use config::{Config, Options};
pub use notify_test::notify_test;
