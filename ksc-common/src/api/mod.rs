//! Shared API types and authentication primitives

pub mod auth;
pub mod types;
