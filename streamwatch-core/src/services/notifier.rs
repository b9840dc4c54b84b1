// streamwatch-core/src/services/notifier.rs
//
// Keeps each subscription's one notification message in step with the
// broadcaster's transition for this cycle. Every subscription is handled in
// isolation: a failure is logged against that subscription and the rest of
// the batch proceeds.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use streamwatch_common::models::notification::NotificationBody;
use streamwatch_common::models::stream::{BroadcasterId, ResolvedProfile, Transition};
use streamwatch_common::models::subscription::Subscription;
use streamwatch_common::traits::messenger_traits::Messenger;
use streamwatch_common::traits::repository_traits::SubscriptionRepository;
use streamwatch_common::Error;

use super::render::NotificationRenderer;

pub struct NotificationSynchronizer {
    repo: Arc<dyn SubscriptionRepository>,
    messenger: Arc<dyn Messenger>,
    renderer: Arc<dyn NotificationRenderer>,
}

impl NotificationSynchronizer {
    pub fn new(
        repo: Arc<dyn SubscriptionRepository>,
        messenger: Arc<dyn Messenger>,
        renderer: Arc<dyn NotificationRenderer>,
    ) -> Self {
        Self {
            repo,
            messenger,
            renderer,
        }
    }

    /// Applies this cycle's transitions to every affected subscription.
    /// Returns how many subscriptions failed; failures are logged and never
    /// abort the batch, so they get retried next cycle (their message state
    /// was not advanced).
    pub async fn apply(
        &self,
        transitions: &[(BroadcasterId, Transition)],
        subs_by_broadcaster: &HashMap<BroadcasterId, Vec<Subscription>>,
        profiles: &HashMap<BroadcasterId, ResolvedProfile>,
    ) -> usize {
        let mut failed = 0;
        for (id, transition) in transitions {
            let Some(subs) = subs_by_broadcaster.get(id) else {
                continue;
            };
            let Some(profile) = profiles.get(id) else {
                warn!(
                    "No profile cached for broadcaster {id}; skipping {} subscription(s) this cycle",
                    subs.len()
                );
                failed += subs.len();
                continue;
            };

            for sub in subs {
                if let Err(e) = self.apply_one(sub, transition, profile).await {
                    error!(
                        "Failed to synchronize subscription {} (broadcaster {}): {e}",
                        sub.subscription_id, id
                    );
                    failed += 1;
                }
            }
        }
        failed
    }

    async fn apply_one(
        &self,
        sub: &Subscription,
        transition: &Transition,
        profile: &ResolvedProfile,
    ) -> Result<(), Error> {
        match transition {
            Transition::BecameLive(info) => {
                // A live transition should not find an existing handle, but a
                // crash between send and snapshot replace can leave one
                // behind. Invalidate it before sending so the subscription
                // never owns two messages.
                if let Some(handle) = &sub.message_handle {
                    match self.messenger.delete_message(handle).await {
                        Ok(()) | Err(Error::MessageNotFound) => {}
                        Err(e) => warn!(
                            "Could not delete stale message {} for subscription {}: {e}",
                            handle.message_id, sub.subscription_id
                        ),
                    }
                }
                let body = self.renderer.render_live(profile, info);
                self.send_and_persist(sub, &body, sub.mention_target.as_deref())
                    .await
            }
            Transition::Updated(info) => {
                let body = self.renderer.render_live(profile, info);
                match &sub.message_handle {
                    Some(handle) => match self.messenger.edit_message(handle, &body).await {
                        Ok(()) => Ok(()),
                        Err(Error::MessageNotFound) => {
                            info!(
                                "Message {} for subscription {} is gone; sending a replacement",
                                handle.message_id, sub.subscription_id
                            );
                            // Replacing a lost message is a repair, not a new
                            // live event, so it does not re-ping.
                            self.send_and_persist(sub, &body, None).await
                        }
                        Err(e) => Err(e),
                    },
                    // The live announcement never went out (the earlier send
                    // failed), so this is still the became-live path, mention
                    // included.
                    None => {
                        self.send_and_persist(sub, &body, sub.mention_target.as_deref())
                            .await
                    }
                }
            }
            Transition::BecameOffline => {
                let Some(handle) = &sub.message_handle else {
                    // No live message was ever sent, so there is nothing
                    // stale to correct.
                    debug!(
                        "Subscription {} went offline with no stored message; nothing to edit",
                        sub.subscription_id
                    );
                    return Ok(());
                };
                let body = self.renderer.render_offline(profile);
                match self.messenger.edit_message(handle, &body).await {
                    Ok(()) => Ok(()),
                    Err(Error::MessageNotFound) => {
                        // Keep a terminal offline record rather than leaving
                        // the channel with no trace of the stream ending.
                        info!(
                            "Offline edit found message {} gone for subscription {}; sending terminal offline message",
                            handle.message_id, sub.subscription_id
                        );
                        self.send_and_persist(sub, &body, None).await
                    }
                    Err(e) => Err(e),
                }
            }
            Transition::Unchanged => Ok(()),
        }
    }

    async fn send_and_persist(
        &self,
        sub: &Subscription,
        body: &NotificationBody,
        mention: Option<&str>,
    ) -> Result<(), Error> {
        let handle = self
            .messenger
            .send_message(&sub.target, body, mention)
            .await?;
        self.repo
            .update_message_handle(sub.subscription_id, Some(&handle))
            .await?;
        Ok(())
    }

    /// Cleanup path for broadcaster ids the platform no longer resolves:
    /// delete the notification message (best effort) and the subscription
    /// row, so dead links do not linger. Returns how many rows were removed.
    pub async fn remove_unresolved(
        &self,
        ids: &[BroadcasterId],
        subs_by_broadcaster: &HashMap<BroadcasterId, Vec<Subscription>>,
    ) -> usize {
        let mut removed = 0;
        for id in ids {
            let Some(subs) = subs_by_broadcaster.get(id) else {
                continue;
            };
            warn!(
                "Broadcaster {id} no longer resolves; removing {} subscription(s)",
                subs.len()
            );
            for sub in subs {
                if let Some(handle) = &sub.message_handle {
                    match self.messenger.delete_message(handle).await {
                        Ok(()) | Err(Error::MessageNotFound) => {}
                        Err(e) => warn!(
                            "Could not delete message {} for defunct subscription {}: {e}",
                            handle.message_id, sub.subscription_id
                        ),
                    }
                }
                match self.repo.delete_subscription(sub.subscription_id).await {
                    Ok(()) => removed += 1,
                    Err(e) => error!(
                        "Failed to delete subscription {}: {e}",
                        sub.subscription_id
                    ),
                }
            }
        }
        removed
    }
}
