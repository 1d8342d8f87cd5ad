use crate::schema::{
    communities, community_sites, package_categories, package_listing_sections,
};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use rocket::serde::{Deserialize, Serialize};

#[derive(Queryable, Selectable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = communities)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Community {
    pub id: i32,
    pub identifier: String,
    pub name: String,
    pub description: Option<String>,
    pub discord_url: Option<String>,
    pub background_image_url: Option<String>,
    pub require_package_listing_approval: bool,
    pub is_listed: bool,
    pub total_download_count: i64,
    pub total_package_count: i64,
    pub datetime_created: NaiveDateTime,
    pub datetime_updated: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = communities)]
pub struct NewCommunity {
    pub identifier: String,
    pub name: String,
    pub description: Option<String>,
    pub discord_url: Option<String>,
    pub background_image_url: Option<String>,
    pub require_package_listing_approval: bool,
    pub is_listed: bool,
    pub total_download_count: i64,
    pub total_package_count: i64,
    pub datetime_created: NaiveDateTime,
    pub datetime_updated: NaiveDateTime,
}

impl NewCommunity {
    pub fn new(identifier: String, name: String) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            identifier,
            name,
            description: None,
            discord_url: None,
            background_image_url: None,
            require_package_listing_approval: false,
            is_listed: true,
            total_download_count: 0,
            total_package_count: 0,
            datetime_created: now,
            datetime_updated: now,
        }
    }
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = community_sites)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CommunitySite {
    pub id: i32,
    pub community_id: i32,
    pub domain: String,
    pub datetime_created: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = community_sites)]
pub struct NewCommunitySite {
    pub community_id: i32,
    pub domain: String,
    pub datetime_created: NaiveDateTime,
}

impl NewCommunitySite {
    pub fn new(community_id: i32, domain: String) -> Self {
        Self {
            community_id,
            domain,
            datetime_created: chrono::Utc::now().naive_utc(),
        }
    }
}

#[derive(Queryable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = package_categories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PackageCategory {
    pub id: i32,
    pub community_id: i32,
    pub name: String,
    pub slug: String,
    pub datetime_created: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = package_categories)]
pub struct NewPackageCategory {
    pub community_id: i32,
    pub name: String,
    pub slug: String,
    pub datetime_created: NaiveDateTime,
}

impl NewPackageCategory {
    pub fn new(community_id: i32, name: String, slug: String) -> Self {
        Self {
            community_id,
            name,
            slug,
            datetime_created: chrono::Utc::now().naive_utc(),
        }
    }
}

#[derive(Queryable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = package_listing_sections)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PackageListingSection {
    pub id: i32,
    pub community_id: i32,
    pub name: String,
    pub slug: String,
    pub priority: i32,
    pub is_listed: bool,
    pub datetime_created: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = package_listing_sections)]
pub struct NewPackageListingSection {
    pub community_id: i32,
    pub name: String,
    pub slug: String,
    pub priority: i32,
    pub is_listed: bool,
    pub datetime_created: NaiveDateTime,
}

impl NewPackageListingSection {
    pub fn new(community_id: i32, name: String, slug: String, priority: i32) -> Self {
        Self {
            community_id,
            name,
            slug,
            priority,
            is_listed: true,
            datetime_created: chrono::Utc::now().naive_utc(),
        }
    }
}

// Response models for the community API

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CommunityResponse {
    pub name: String,
    pub identifier: String,
    pub total_download_count: i64,
    pub total_package_count: i64,
    pub background_image_url: Option<String>,
    pub description: Option<String>,
    pub discord_url: Option<String>,
}

impl From<&Community> for CommunityResponse {
    fn from(community: &Community) -> Self {
        Self {
            name: community.name.clone(),
            identifier: community.identifier.clone(),
            total_download_count: community.total_download_count,
            total_package_count: community.total_package_count,
            background_image_url: community.background_image_url.clone(),
            description: community.description.clone(),
            discord_url: community.discord_url.clone(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct CommunityListResponse {
    pub communities: Vec<CommunityResponse>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PackageCategoryResponse {
    pub name: String,
    pub slug: String,
}

impl From<&PackageCategory> for PackageCategoryResponse {
    fn from(category: &PackageCategory) -> Self {
        Self {
            name: category.name.clone(),
            slug: category.slug.clone(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct PackageListingSectionResponse {
    pub name: String,
    pub slug: String,
    pub priority: i32,
}

impl From<&PackageListingSection> for PackageListingSectionResponse {
    fn from(section: &PackageListingSection) -> Self {
        Self {
            name: section.name.clone(),
            slug: section.slug.clone(),
            priority: section.priority,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct CommunityFiltersResponse {
    pub package_categories: Vec<PackageCategoryResponse>,
    pub sections: Vec<PackageListingSectionResponse>,
}
