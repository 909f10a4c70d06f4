//! Named keyboards and their row-ordered rendering.

pub mod registry;

pub use registry::KeyboardRegistry;
