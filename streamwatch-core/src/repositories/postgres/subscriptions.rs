// streamwatch-core/src/repositories/postgres/subscriptions.rs
//
// Postgres-backed SubscriptionRepository over the "stream_subscriptions"
// table. The engine only ever reads rows and writes message handles; row
// creation belongs to the operator command front-end and row deletion to the
// unresolved-broadcaster cleanup path.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use streamwatch_common::models::stream::BroadcasterId;
use streamwatch_common::models::subscription::{DeliveryTarget, MessageHandle, Subscription};
use streamwatch_common::traits::repository_traits::SubscriptionRepository;
use streamwatch_common::Error;

#[derive(Clone)]
pub struct PostgresSubscriptionRepository {
    pool: Pool<Postgres>,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_subscription(r: &PgRow) -> Result<Subscription, Error> {
    let message_channel_id: Option<String> = r.try_get("message_channel_id")?;
    let message_id: Option<String> = r.try_get("message_id")?;
    let message_handle = match (message_channel_id, message_id) {
        (Some(channel_id), Some(message_id)) => Some(MessageHandle {
            channel_id,
            message_id,
        }),
        _ => None,
    };

    Ok(Subscription {
        subscription_id: r.try_get("subscription_id")?,
        broadcaster_id: BroadcasterId::new(r.try_get::<String, _>("broadcaster_id")?),
        target: DeliveryTarget {
            guild_id: r.try_get("guild_id")?,
            channel_id: r.try_get("channel_id")?,
        },
        mention_target: r.try_get("mention_role_id")?,
        message_handle,
        created_at: r.try_get("created_at")?,
        updated_at: r.try_get("updated_at")?,
    })
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn list_all(&self) -> Result<Vec<Subscription>, Error> {
        let q = r#"
            SELECT subscription_id, broadcaster_id, guild_id, channel_id,
                   mention_role_id, message_channel_id, message_id,
                   created_at, updated_at
            FROM stream_subscriptions
            ORDER BY created_at
        "#;
        let rows = sqlx::query(q).fetch_all(&self.pool).await?;

        let mut out = Vec::new();
        for r in rows {
            out.push(row_to_subscription(&r)?);
        }
        Ok(out)
    }

    async fn create_subscription(
        &self,
        broadcaster_id: &BroadcasterId,
        target: &DeliveryTarget,
        mention_target: Option<&str>,
    ) -> Result<Subscription, Error> {
        let subscription_id = Uuid::new_v4();
        let now = Utc::now();

        let q = r#"
            INSERT INTO stream_subscriptions
                (subscription_id, broadcaster_id, guild_id, channel_id,
                 mention_role_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
        "#;
        sqlx::query(q)
            .bind(subscription_id)
            .bind(broadcaster_id.as_str())
            .bind(&target.guild_id)
            .bind(&target.channel_id)
            .bind(mention_target)
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(Subscription {
            subscription_id,
            broadcaster_id: broadcaster_id.clone(),
            target: target.clone(),
            mention_target: mention_target.map(|s| s.to_string()),
            message_handle: None,
            created_at: now,
            updated_at: now,
        })
    }

    async fn update_message_handle(
        &self,
        subscription_id: Uuid,
        handle: Option<&MessageHandle>,
    ) -> Result<(), Error> {
        let q = r#"
            UPDATE stream_subscriptions
            SET message_channel_id = $2,
                message_id = $3,
                updated_at = now()
            WHERE subscription_id = $1
        "#;
        sqlx::query(q)
            .bind(subscription_id)
            .bind(handle.map(|h| h.channel_id.as_str()))
            .bind(handle.map(|h| h.message_id.as_str()))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_subscription(&self, subscription_id: Uuid) -> Result<(), Error> {
        let q = r#"
            DELETE FROM stream_subscriptions
            WHERE subscription_id = $1
        "#;
        sqlx::query(q)
            .bind(subscription_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
