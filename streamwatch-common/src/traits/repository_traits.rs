use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Error;
use crate::models::stream::BroadcasterId;
use crate::models::subscription::{DeliveryTarget, MessageHandle, Subscription};

/// CRUD boundary over persisted subscriptions. The reconciliation engine
/// reads every cycle and writes only message handles; `create_subscription`
/// exists for the operator-facing command front-end, and
/// `delete_subscription` doubles as the cleanup path when a broadcaster id
/// stops resolving.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Subscription>, Error>;

    async fn create_subscription(
        &self,
        broadcaster_id: &BroadcasterId,
        target: &DeliveryTarget,
        mention_target: Option<&str>,
    ) -> Result<Subscription, Error>;

    /// `handle = None` clears the stored handle (message deleted or given up).
    async fn update_message_handle(
        &self,
        subscription_id: Uuid,
        handle: Option<&MessageHandle>,
    ) -> Result<(), Error>;

    async fn delete_subscription(&self, subscription_id: Uuid) -> Result<(), Error>;
}
