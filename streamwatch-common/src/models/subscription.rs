use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::stream::BroadcasterId;

/// Where notifications for a subscription get delivered: a channel inside a
/// guild, both kept as snowflake strings the way the rest of the codebase
/// passes Discord ids around.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeliveryTarget {
    pub guild_id: String,
    pub channel_id: String,
}

/// Reference to a previously sent notification message. Carries its own
/// channel id so edits and deletes do not depend on the subscription's
/// current target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHandle {
    pub channel_id: String,
    pub message_id: String,
}

/// Durable record: "notify `target` about `broadcaster_id`".
///
/// Created by the operator-facing command front-end, read every cycle by the
/// reconciliation engine, and mutated only in its `message_handle` field by
/// the notification synchronizer. At most one handle exists per subscription
/// at any time; the synchronizer never sends a second message without first
/// invalidating the old handle.
#[derive(Debug, Clone)]
pub struct Subscription {
    pub subscription_id: Uuid,
    pub broadcaster_id: BroadcasterId,
    pub target: DeliveryTarget,
    /// Role to ping on a transition to live, if configured. Never re-pinged
    /// on updates or offline edits.
    pub mention_target: Option<String>,
    pub message_handle: Option<MessageHandle>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
