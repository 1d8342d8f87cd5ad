//! Database module providing organized access to all database operations
//!
//! This module is organized into several sub-modules:
//! - `connection`: Database connection management and pool configuration
//! - `communities`: Community, category and section operations
//! - `teams`: Team, namespace and user operations
//! - `packages`: Package and package version operations
//! - `listings`: Package listing operations
//! - `reports`: Package report operations
//! - `wikis`: Wiki and wiki page operations
//! - `service`: Main DatabaseService that provides a unified interface

pub mod communities;
pub mod connection;
pub mod listings;
pub mod packages;
pub mod reports;
pub mod service;
pub mod teams;
pub mod wikis;

// Re-export the main types and service for easy access
pub use connection::{DbConnection, DbPool, MIGRATIONS};
pub use service::DatabaseService;

// Re-export operation structs for advanced usage
pub use communities::CommunityOperations;
pub use listings::ListingOperations;
pub use packages::PackageOperations;
pub use reports::{ReportOperations, ReportSaveError};
pub use teams::TeamOperations;
pub use wikis::WikiOperations;
