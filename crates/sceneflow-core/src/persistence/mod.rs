//! Persistence port.
//!
//! Defines the schemaless collection store the engine persists conversation
//! state into, plus its type-erased wrapper. Implementations live in
//! sceneflow-infra.

pub mod box_store;
pub mod document_store;

pub use box_store::BoxDocumentStore;
pub use document_store::{DocumentStore, filter_by_field, merge_body};
