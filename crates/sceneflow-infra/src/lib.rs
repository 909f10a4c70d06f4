//! Infrastructure layer for sceneflow.
//!
//! Contains implementations of the ports defined in `sceneflow-core`:
//! SQLite and in-memory document stores, plus configuration and data
//! directory resolution.

pub mod config;
pub mod filesystem;
pub mod memory;
pub mod sqlite;
