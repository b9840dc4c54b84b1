use async_trait::async_trait;

use crate::error::Error;
use crate::models::notification::NotificationBody;
use crate::models::subscription::{DeliveryTarget, MessageHandle};

/// Delivery-side messaging boundary. Implementations must surface a missing
/// message as `Error::MessageNotFound` from `edit_message` and
/// `delete_message` so the synchronizer can distinguish "gone, re-send" from
/// transient delivery failures.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_message(
        &self,
        target: &DeliveryTarget,
        body: &NotificationBody,
        mention: Option<&str>,
    ) -> Result<MessageHandle, Error>;

    async fn edit_message(&self, handle: &MessageHandle, body: &NotificationBody)
        -> Result<(), Error>;

    async fn delete_message(&self, handle: &MessageHandle) -> Result<(), Error>;
}
