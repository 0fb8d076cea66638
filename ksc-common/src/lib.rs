//! # KSC Common Library
//!
//! Shared code for the Kappa Score Collector service including:
//! - Database schema, models and initialization
//! - Rating sheet data structure (item x criterion table)
//! - API request authentication primitives
//! - Configuration loading and root folder resolution

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod rating;

pub use db::models::ProjectKind;
pub use error::{Error, Result};
pub use rating::RatingSheet;
