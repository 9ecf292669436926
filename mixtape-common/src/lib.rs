//! # Mixtape Common Library
//!
//! Shared code for the mixtape services:
//! - Database pool initialization and schema creation
//! - API request/response model types
//! - Error types
//! - Configuration loading

pub mod config;
pub mod db;
pub mod error;
pub mod model;

pub use error::{Error, Result};
