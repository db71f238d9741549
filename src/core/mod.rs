//! Core types: tasks, payloads, actions and middlewares.

pub mod action;
pub mod payload;
pub mod task;
pub mod types;
