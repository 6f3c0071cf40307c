//! `watermedic` - A hydration tracker
//!
//! This library computes a daily water target from body weight, activity and
//! weather, tracks intake against it, archives each finished day and builds
//! gap-filled trend series for charting. State is persisted to a local
//! `SQLite` database and reminders run on a Tokio timer.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
mod compat;
pub mod config;
pub mod error;
pub mod history;
pub mod ledger;
pub mod logging;
pub mod notice;
pub mod progress;
pub mod reminder;
pub mod rollover;
pub mod state;
pub mod storage;
pub mod target;
pub mod trend;
pub mod units;
pub mod watch;

pub use config::Config;
pub use error::{Error, Result};
pub use history::{History, HydrationRecord};
pub use logging::init_logging;
pub use notice::Notice;
pub use progress::Progress;
pub use state::{AppState, Tracker};
pub use storage::{StateGateway, Storage, StorageStats};
