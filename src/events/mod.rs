//! Event and message types exchanged with the ECS world.
//!
//! Submodules:
//! - [`lifecycle`] – load/unload/reload notifications and the soft reload trigger
pub mod lifecycle;
