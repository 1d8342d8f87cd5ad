use crate::models::community::PackageCategoryResponse;
use crate::schema::{package_listing_categories, package_listings};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use rocket::serde::{Deserialize, Serialize};

pub const REVIEW_STATUS_UNREVIEWED: &str = "unreviewed";
pub const REVIEW_STATUS_APPROVED: &str = "approved";
pub const REVIEW_STATUS_REJECTED: &str = "rejected";

#[derive(Queryable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = package_listings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PackageListing {
    pub id: i32,
    pub package_id: i32,
    pub community_id: i32,
    pub review_status: String,
    pub has_nsfw_content: bool,
    pub is_active: bool,
    pub datetime_created: NaiveDateTime,
    pub datetime_updated: NaiveDateTime,
}

impl PackageListing {
    pub fn is_rejected(&self) -> bool {
        self.review_status == REVIEW_STATUS_REJECTED
    }

    /// A listing is visible when its community either does not require
    /// approval and the listing has not been rejected, or requires approval
    /// and the listing has been approved.
    pub fn is_visible(&self, require_approval: bool) -> bool {
        if require_approval {
            self.review_status == REVIEW_STATUS_APPROVED
        } else {
            !self.is_rejected()
        }
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = package_listings)]
pub struct NewPackageListing {
    pub package_id: i32,
    pub community_id: i32,
    pub review_status: String,
    pub has_nsfw_content: bool,
    pub is_active: bool,
    pub datetime_created: NaiveDateTime,
    pub datetime_updated: NaiveDateTime,
}

impl NewPackageListing {
    pub fn new(package_id: i32, community_id: i32) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            package_id,
            community_id,
            review_status: REVIEW_STATUS_UNREVIEWED.to_string(),
            has_nsfw_content: false,
            is_active: true,
            datetime_created: now,
            datetime_updated: now,
        }
    }
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = package_listing_categories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PackageListingCategory {
    pub id: i32,
    pub listing_id: i32,
    pub category_id: i32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = package_listing_categories)]
pub struct NewPackageListingCategory {
    pub listing_id: i32,
    pub category_id: i32,
}

// Request/Response models for the listing API

#[derive(Deserialize, Debug)]
pub struct PackageListingUpdateRequest {
    pub categories: Vec<String>,
}

#[derive(Serialize, Debug)]
pub struct PackageListingUpdateResponse {
    pub categories: Vec<PackageCategoryResponse>,
}

/// Denormalized listing detail, also the value stored in the listing cache.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PackageListingDetail {
    pub namespace: String,
    pub name: String,
    pub community: String,
    pub description: String,
    pub latest_version_number: Option<String>,
    pub download_count: i64,
    pub is_deprecated: bool,
    pub has_nsfw_content: bool,
    pub categories: Vec<PackageCategoryResponse>,
    pub datetime_updated: NaiveDateTime,
}

/// Compact listing representation for list endpoints.
#[derive(Serialize, Debug)]
pub struct PackageListingOverview {
    pub namespace: String,
    pub name: String,
    pub description: String,
    pub download_count: i64,
    pub is_deprecated: bool,
    pub has_nsfw_content: bool,
    pub datetime_updated: NaiveDateTime,
}

#[derive(Serialize, Debug)]
pub struct PackageListingListResponse {
    pub listings: Vec<PackageListingOverview>,
}
