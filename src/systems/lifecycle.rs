//! Systems that move [`ResourceLifecycle`] messages into the ECS world.
//!
//! - [`poll_lifecycle_messages`] drains the manager's channel without blocking.
//! - [`update_lifecycle_messages`] advances the message queue so readers see
//!   what was written this frame.
//!
//! Both require [`crate::resources::lifecyclebridge::setup_lifecycle_bridge`]
//! to have run.

use crate::events::lifecycle::ResourceLifecycle;
use crate::resources::lifecyclebridge::LifecycleBridge;
use bevy_ecs::prelude::{MessageWriter, Messages, Res, ResMut};

pub fn poll_lifecycle_messages(
    bridge: Res<LifecycleBridge>,
    mut writer: MessageWriter<ResourceLifecycle>,
) {
    writer.write_batch(bridge.rx_msg.try_iter());
}

/// Run after [`poll_lifecycle_messages`].
pub fn update_lifecycle_messages(mut messages: ResMut<Messages<ResourceLifecycle>>) {
    messages.update();
}
