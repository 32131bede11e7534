//! ECS systems.
//!
//! - [`lifecycle`] – forward resource manager notifications into `Messages`

pub mod lifecycle;
