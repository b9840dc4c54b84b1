// streamwatch-core/src/services/mod.rs

pub mod diff;
pub mod engine;
pub mod notifier;
pub mod render;

pub use engine::{CycleReport, ReconciliationEngine};
pub use notifier::NotificationSynchronizer;
pub use render::{EmbedRenderer, NotificationRenderer};
