// streamwatch-core/src/repositories/mod.rs

pub mod postgres;

pub use postgres::subscriptions::PostgresSubscriptionRepository;
