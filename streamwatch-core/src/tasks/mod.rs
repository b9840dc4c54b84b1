// streamwatch-core/src/tasks/mod.rs

pub mod presence_poll;
