// vim: tw=80

pub mod config;
pub mod engine;
pub mod job;
pub mod layout;
pub mod notification;
pub mod ops;
pub mod topology;
pub mod types;

pub use crate::types::*;
