//! Scene state machine.
//!
//! - `behavior` -- `Scene` trait (enter/leave/handle) and its type-erased form
//! - `middleware` -- `Middleware` trait run before every scene-local `handle`
//! - `manager` -- `SceneManager`, the registry that drives transitions

pub mod behavior;
pub mod manager;
pub mod middleware;

pub use behavior::Scene;
pub use manager::SceneManager;
pub use middleware::Middleware;
