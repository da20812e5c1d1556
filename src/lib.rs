//! Project, contract and payment control for solar EPC contractors.
//!
//! The computational core lives in [`currency`] (USD to display currency)
//! and [`payments`] (milestone schedules and payment bookkeeping). The rest
//! is persistence ([`db`]) and the command-line surface ([`cli`]).

pub mod activity;
pub mod cli;
pub mod config;
pub mod currency;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod payments;
pub mod progress;
pub mod session;

pub use error::ValidationError;
