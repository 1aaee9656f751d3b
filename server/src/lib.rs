//! Reinos Server
//!
//! Host-side layer for the community's moderation and admin handlers:
//! configuration, logging, the dual-record role store, and the moderation
//! service built on `reinos_roles`.

pub mod config;
pub mod moderation;
pub mod observability;
pub mod store;
