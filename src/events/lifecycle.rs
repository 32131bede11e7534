//! Resource lifecycle notifications and the soft reload trigger.
//!
//! [`ResourceLifecycle`] messages are broadcast by the
//! [`ResourceManager`](crate::resources::resourcemanager::ResourceManager) to
//! every subscriber after a load, unload or soft reload pass. Inside an ECS
//! world they are forwarded into `Messages<ResourceLifecycle>` by
//! [`crate::systems::lifecycle::poll_lifecycle_messages`].
//!
//! Emitting a [`SoftReloadRequested`] event makes [`soft_reload_observer`]
//! pick up pack changes without restarting the host.

use crate::resources::resourcemanager::ResourceManager;
use bevy_ecs::message::Message;
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::{error, info, warn};

/// Events sent *from* the resource manager.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub enum ResourceLifecycle {
    /// A full load pass succeeded.
    Loaded { resources: usize },
    /// A full load pass aborted; nothing is loaded.
    LoadFailed { reason: String },
    /// Every resource was unloaded.
    Unloaded,
    /// A soft reload reloaded these resources, in load order.
    Reloaded { ids: Vec<String> },
    /// A soft reload could not reload this resource.
    ReloadFailed { id: String, reason: String },
}

/// Event asking for a soft reload of the world's [`ResourceManager`].
#[derive(Event, Debug, Clone, Copy)]
pub struct SoftReloadRequested {}

/// Observer that runs [`ResourceManager::soft_reload`].
///
/// Failures are logged; the manager stays loaded either way.
pub fn soft_reload_observer(
    _trigger: On<SoftReloadRequested>,
    manager: Option<ResMut<ResourceManager>>,
) {
    let Some(mut manager) = manager else {
        warn!(target: "resources", "SoftReloadRequested without a ResourceManager in the world");
        return;
    };
    match manager.soft_reload() {
        Ok(report) if report.is_empty() => info!(target: "resources", "Soft reload: nothing changed"),
        Ok(report) => info!(
            target: "resources",
            "Soft reload: {} reloaded, {} failed",
            report.reloaded.len(),
            report.failed.len()
        ),
        Err(e) => error!(target: "resources", "Soft reload aborted: {}", e),
    }
}
