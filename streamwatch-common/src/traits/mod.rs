// File: streamwatch-common/src/traits/mod.rs
pub mod messenger_traits;
pub mod repository_traits;
