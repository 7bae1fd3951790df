//! HTTP handlers
//!
//! Glob re-exports keep the `#[utoipa::path]` companions reachable from
//! `openapi.rs`.

pub mod account;
pub mod health;
pub mod transfer;

pub use account::*;
pub use health::*;
pub use transfer::*;
