//! ECS resource that bridges the [`ResourceManager`] with `bevy_ecs` messages.
//!
//! Use [`setup_lifecycle_bridge`] once, after inserting the manager into the
//! world, to subscribe to its lifecycle channel and insert the
//! [`LifecycleBridge`] and `Messages<ResourceLifecycle>` resources.

use crate::events::lifecycle::ResourceLifecycle;
use crate::resources::resourcemanager::ResourceManager;
use bevy_ecs::prelude::*;
use crossbeam_channel::Receiver;
use log::warn;

/// Receiving end of the manager's lifecycle channel.
#[derive(Resource)]
pub struct LifecycleBridge {
    pub rx_msg: Receiver<ResourceLifecycle>,
}

/// Subscribe to the world's [`ResourceManager`] and register bridge resources.
///
/// Returns `false` and leaves the world untouched when no manager exists.
pub fn setup_lifecycle_bridge(world: &mut World) -> bool {
    let Some(rx_msg) = world
        .get_resource_mut::<ResourceManager>()
        .map(|mut manager| manager.subscribe())
    else {
        warn!(target: "resources", "No ResourceManager in the world, lifecycle bridge not installed");
        return false;
    };
    world.insert_resource(LifecycleBridge { rx_msg });
    world.insert_resource(Messages::<ResourceLifecycle>::default());
    true
}

/// Remove the bridge. The manager drops the sender on its next pass.
pub fn shutdown_lifecycle_bridge(world: &mut World) {
    world.remove_resource::<LifecycleBridge>();
}
