use crate::schema::{package_version_dependencies, package_versions, packages};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use rocket::serde::{Deserialize, Serialize};

#[derive(Queryable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = packages)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Package {
    pub id: i32,
    pub namespace_id: i32,
    pub name: String,
    pub is_active: bool,
    pub is_deprecated: bool,
    pub latest_version_id: Option<i32>,
    pub datetime_created: NaiveDateTime,
    pub date_updated: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = packages)]
pub struct NewPackage {
    pub namespace_id: i32,
    pub name: String,
    pub is_active: bool,
    pub is_deprecated: bool,
    pub latest_version_id: Option<i32>,
    pub datetime_created: NaiveDateTime,
    pub date_updated: NaiveDateTime,
}

impl NewPackage {
    pub fn new(namespace_id: i32, name: String) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            namespace_id,
            name,
            is_active: true,
            is_deprecated: false,
            latest_version_id: None,
            datetime_created: now,
            date_updated: now,
        }
    }
}

#[derive(Queryable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = package_versions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PackageVersion {
    pub id: i32,
    pub package_id: i32,
    pub version_number: String,
    pub full_version_name: String,
    pub description: String,
    pub readme: String,
    pub changelog: Option<String>,
    pub downloads: i64,
    pub file_size: i64,
    pub is_active: bool,
    pub datetime_created: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = package_versions)]
pub struct NewPackageVersion {
    pub package_id: i32,
    pub version_number: String,
    pub full_version_name: String,
    pub description: String,
    pub readme: String,
    pub changelog: Option<String>,
    pub downloads: i64,
    pub file_size: i64,
    pub is_active: bool,
    pub datetime_created: NaiveDateTime,
}

impl NewPackageVersion {
    pub fn new(
        package_id: i32,
        namespace: &str,
        package_name: &str,
        version_number: String,
    ) -> Self {
        let full_version_name = format!("{namespace}-{package_name}-{version_number}");
        Self {
            package_id,
            version_number,
            full_version_name,
            description: String::new(),
            readme: String::new(),
            changelog: None,
            downloads: 0,
            file_size: 0,
            is_active: true,
            datetime_created: chrono::Utc::now().naive_utc(),
        }
    }
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = package_version_dependencies)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PackageVersionDependency {
    pub id: i32,
    pub version_id: i32,
    pub dependency_version_id: i32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = package_version_dependencies)]
pub struct NewPackageVersionDependency {
    pub version_id: i32,
    pub dependency_version_id: i32,
}

// Response models for the package version API

#[derive(Serialize, Debug)]
pub struct PackageVersionResponse {
    pub version_number: String,
    pub full_version_name: String,
    pub downloads: i64,
    pub file_size: i64,
    pub datetime_created: NaiveDateTime,
}

impl From<&PackageVersion> for PackageVersionResponse {
    fn from(version: &PackageVersion) -> Self {
        Self {
            version_number: version.version_number.clone(),
            full_version_name: version.full_version_name.clone(),
            downloads: version.downloads,
            file_size: version.file_size,
            datetime_created: version.datetime_created,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct PackageVersionListResponse {
    pub versions: Vec<PackageVersionResponse>,
}

#[derive(Serialize, Debug)]
pub struct VersionMarkdownResponse {
    pub version_number: String,
    pub markdown: String,
}

#[derive(Deserialize, Debug)]
pub struct PackageListingReportRequest {
    pub package_version_id: i32,
    pub reason: String,
    pub description: Option<String>,
}
