#![forbid(unsafe_code)]

//! Console editor that drives a [`cmdstack::CommandStack`].
//!
//! Each input line becomes a command against an in-memory [`store::Store`];
//! `undo` and `redo` walk the recorded history.

pub mod cli;
pub mod config;
pub mod error;
pub mod session;
pub mod store;

pub use cli::{Cli, run, run_from_env};
pub use config::DemoConfig;
pub use error::{DemoError, Result};
pub use session::{Reply, Session};
pub use store::Store;
