// File: streamwatch-common/src/models/mod.rs
pub mod notification;
pub mod stream;
pub mod subscription;

pub use notification::{EmbedField, NotificationBody, NotificationEmbed};
pub use stream::{
    BroadcasterId, LiveInfo, PresenceSnapshot, ResolvedProfile, StreamStatus, Transition,
};
pub use subscription::{DeliveryTarget, MessageHandle, Subscription};
