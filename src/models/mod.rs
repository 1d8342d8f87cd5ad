// Re-export all models from their respective modules
pub mod auth;
pub mod community;
pub mod listing;
pub mod package;
pub mod report;
pub mod schema_import;
pub mod team;
pub mod wiki;

// Re-export commonly used models
pub use auth::*;
pub use community::*;
pub use listing::*;
pub use package::*;
pub use report::*;
pub use team::*;
pub use wiki::*;
