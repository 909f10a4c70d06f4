//! Shared domain types for sceneflow.
//!
//! This crate contains the types every layer of the conversation engine agrees
//! on: conversation identity, inbound events and payloads, keyboards, durable
//! documents, configuration, and the error enums.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod conversation;
pub mod document;
pub mod error;
pub mod event;
pub mod keyboard;
