use super::connection::{DbPool, get_connection_with_retry, pool_error};
use crate::models::listing::PackageListing;
use crate::models::package::PackageVersion;
use crate::models::report::*;
use crate::schema::{package_listings, package_report_reasons, package_reports, package_versions};
use diesel::prelude::*;

/// Saving a report can fail on the listing/version consistency rule before
/// any row is written, or on the database itself.
#[derive(Debug)]
pub enum ReportSaveError {
    Validation(String),
    Database(diesel::result::Error),
}

impl From<diesel::result::Error> for ReportSaveError {
    fn from(err: diesel::result::Error) -> Self {
        ReportSaveError::Database(err)
    }
}

/// Package report database operations
pub struct ReportOperations<'a> {
    pool: &'a DbPool,
}

impl<'a> ReportOperations<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    pub fn create_report_reason(
        &self,
        label: String,
    ) -> Result<PackageReportReason, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        diesel::insert_into(package_report_reasons::table)
            .values(&NewPackageReportReason::new(label))
            .get_result::<PackageReportReason>(&mut conn)
    }

    pub fn get_active_report_reasons(
        &self,
    ) -> Result<Vec<PackageReportReason>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        package_report_reasons::table
            .filter(package_report_reasons::is_active.eq(true))
            .order(package_report_reasons::label.asc())
            .load::<PackageReportReason>(&mut conn)
    }

    /// Persists a report after verifying that the referenced listing and
    /// version belong to the same package. A mismatch never reaches the
    /// database.
    pub fn create_report(&self, new_report: NewPackageReport) -> Result<PackageReport, ReportSaveError> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        conn.transaction::<PackageReport, ReportSaveError, _>(|conn| {
            let version = package_versions::table
                .find(new_report.version_id)
                .first::<PackageVersion>(conn)?;

            let listing_package_id = match new_report.listing_id {
                Some(listing_id) => {
                    let listing = package_listings::table
                        .find(listing_id)
                        .first::<PackageListing>(conn)?;
                    Some(listing.package_id)
                }
                None => None,
            };

            validate_report_consistency(listing_package_id, version.package_id)
                .map_err(ReportSaveError::Validation)?;

            let report = diesel::insert_into(package_reports::table)
                .values(&new_report)
                .get_result::<PackageReport>(conn)?;

            Ok(report)
        })
    }

    pub fn count_reports_for_version(
        &self,
        version_id: i32,
    ) -> Result<i64, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        package_reports::table
            .filter(package_reports::version_id.eq(version_id))
            .filter(package_reports::is_active.eq(true))
            .count()
            .get_result::<i64>(&mut conn)
    }

    pub fn deactivate_report(&self, report_id: i32) -> Result<(), diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        diesel::update(package_reports::table.find(report_id))
            .set(package_reports::is_active.eq(false))
            .execute(&mut conn)?;

        Ok(())
    }
}
