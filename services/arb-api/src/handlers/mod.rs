//! HTTP handlers, one module per route group

pub mod auth;
pub mod bot;
pub mod internal;
pub mod logs;
pub mod market;
pub mod notifications;
pub mod profile;
pub mod reports;
pub mod settings;
