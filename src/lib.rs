pub mod actors;
pub mod backend;
pub mod channel;
pub mod config;
pub mod patterns;
pub mod snapshot;
pub mod util;
pub mod views;
