// streamwatch-core/src/repositories/postgres/mod.rs

pub mod subscriptions;
