//! SQLite persistence for matches, predictions, scores, streaks and reminders.
//!
//! This module provides:
//! - Database initialization and schema setup
//! - SQLite pragma configuration
//! - The `Repository` with all keyed reads and writes

pub mod migrations;
pub mod repo;

pub use migrations::init_db;
pub use repo::{LeaderboardRow, Repository, ResultWriter, StreakCounter};
