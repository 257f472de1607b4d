//! Bootstrap module for initializing the Castgate server
//!
//! This module handles:
//! - Database pool creation and teardown
//! - Service construction and dependency injection

pub mod database;
pub mod services;

pub use database::{close_database, init_database};
pub use services::{init_services, Services};
