pub mod aggregates;
pub mod auth;
pub mod listing_cache;

pub use crate::database::DatabaseService;
pub use auth::AuthService;
pub use listing_cache::{CachedListing, ListingCacheKey, ListingCacheService};
