//! qatrack-core library.
//!
//! Holds the in-memory mirror of the active QA session and keeps it
//! consistent with the remote collaborator through [`sync::Synchronizer`].
//!
//! # Conventions
//!
//! - **Errors**: session operations return [`error::SyncError`]; configuration
//!   helpers use `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod action;
pub mod api;
pub mod config;
pub mod error;
pub mod history;
pub mod memory;
pub mod modal;
pub mod model;
pub mod sync;
pub mod theme;
pub mod validate;
pub mod view;

pub use sync::{Confirm, Notice, NoticeLevel, Outcome, Pane, Surface, Synchronizer};
