use crate::schema::{package_report_reasons, package_reports};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use rocket::serde::Serialize;

#[derive(Queryable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = package_report_reasons)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PackageReportReason {
    pub id: i32,
    pub label: String,
    pub is_active: bool,
    pub datetime_created: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = package_report_reasons)]
pub struct NewPackageReportReason {
    pub label: String,
    pub is_active: bool,
    pub datetime_created: NaiveDateTime,
}

impl NewPackageReportReason {
    pub fn new(label: String) -> Self {
        Self {
            label,
            is_active: true,
            datetime_created: chrono::Utc::now().naive_utc(),
        }
    }
}

#[derive(Queryable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = package_reports)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PackageReport {
    pub id: i32,
    pub listing_id: Option<i32>,
    pub version_id: i32,
    pub reason_id: i32,
    pub description: Option<String>,
    pub created_by: i32,
    pub is_active: bool,
    pub datetime_created: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = package_reports)]
pub struct NewPackageReport {
    pub listing_id: Option<i32>,
    pub version_id: i32,
    pub reason_id: i32,
    pub description: Option<String>,
    pub created_by: i32,
    pub is_active: bool,
    pub datetime_created: NaiveDateTime,
}

impl NewPackageReport {
    pub fn new(
        listing_id: Option<i32>,
        version_id: i32,
        reason_id: i32,
        description: Option<String>,
        created_by: i32,
    ) -> Self {
        Self {
            listing_id,
            version_id,
            reason_id,
            description,
            created_by,
            is_active: true,
            datetime_created: chrono::Utc::now().naive_utc(),
        }
    }
}

/// A report may reference both a listing and a version; when it does, both
/// must point at the same package.
pub fn validate_report_consistency(
    listing_package_id: Option<i32>,
    version_package_id: i32,
) -> Result<(), String> {
    match listing_package_id {
        Some(package_id) if package_id != version_package_id => {
            Err("Package mismatch!".to_string())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_packages_pass_validation() {
        assert!(validate_report_consistency(Some(7), 7).is_ok());
        assert!(validate_report_consistency(None, 7).is_ok());
    }

    #[test]
    fn test_mismatched_packages_fail_validation() {
        let result = validate_report_consistency(Some(7), 8);
        assert_eq!(result, Err("Package mismatch!".to_string()));
    }
}
