use super::connection::{DbPool, get_connection_with_retry, pool_error};
use crate::models::package::*;
use crate::schema::{package_version_dependencies, package_versions, packages};
use diesel::prelude::*;

/// Package and package version database operations
pub struct PackageOperations<'a> {
    pool: &'a DbPool,
}

impl<'a> PackageOperations<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    pub fn create_package(
        &self,
        namespace_id: i32,
        name: String,
    ) -> Result<Package, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        diesel::insert_into(packages::table)
            .values(&NewPackage::new(namespace_id, name))
            .get_result::<Package>(&mut conn)
    }

    /// Creates a version and promotes it to the package's latest. Versions
    /// are immutable once created; `date_updated` on the package mirrors the
    /// new version's creation time.
    pub fn create_version(
        &self,
        new_version: NewPackageVersion,
    ) -> Result<PackageVersion, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        conn.transaction::<PackageVersion, diesel::result::Error, _>(|conn| {
            let version = diesel::insert_into(package_versions::table)
                .values(&new_version)
                .get_result::<PackageVersion>(conn)?;

            diesel::update(packages::table.find(version.package_id))
                .set((
                    packages::latest_version_id.eq(version.id),
                    packages::date_updated.eq(version.datetime_created),
                ))
                .execute(conn)?;

            Ok(version)
        })
    }

    pub fn add_version_dependency(
        &self,
        version_id: i32,
        dependency_version_id: i32,
    ) -> Result<(), diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        diesel::insert_into(package_version_dependencies::table)
            .values(&NewPackageVersionDependency {
                version_id,
                dependency_version_id,
            })
            .execute(&mut conn)?;

        Ok(())
    }

    pub fn get_package(
        &self,
        namespace_id: i32,
        name: &str,
    ) -> Result<Option<Package>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        packages::table
            .filter(packages::namespace_id.eq(namespace_id))
            .filter(packages::name.eq(name))
            .filter(packages::is_active.eq(true))
            .first::<Package>(&mut conn)
            .optional()
    }

    pub fn get_package_by_id(
        &self,
        package_id: i32,
    ) -> Result<Option<Package>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        packages::table
            .find(package_id)
            .filter(packages::is_active.eq(true))
            .first::<Package>(&mut conn)
            .optional()
    }

    pub fn get_version_by_id(
        &self,
        version_id: i32,
    ) -> Result<Option<PackageVersion>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        package_versions::table
            .find(version_id)
            .filter(package_versions::is_active.eq(true))
            .first::<PackageVersion>(&mut conn)
            .optional()
    }

    pub fn get_version_by_number(
        &self,
        package_id: i32,
        version_number: &str,
    ) -> Result<Option<PackageVersion>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        package_versions::table
            .filter(package_versions::package_id.eq(package_id))
            .filter(package_versions::version_number.eq(version_number))
            .filter(package_versions::is_active.eq(true))
            .first::<PackageVersion>(&mut conn)
            .optional()
    }

    /// The package's latest version, preferring the denormalized reference
    /// and falling back to the newest active version.
    pub fn get_latest_version(
        &self,
        package: &Package,
    ) -> Result<Option<PackageVersion>, diesel::result::Error> {
        if let Some(latest_id) = package.latest_version_id {
            if let Some(version) = self.get_version_by_id(latest_id)? {
                return Ok(Some(version));
            }
        }

        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        package_versions::table
            .filter(package_versions::package_id.eq(package.id))
            .filter(package_versions::is_active.eq(true))
            .order(package_versions::datetime_created.desc())
            .first::<PackageVersion>(&mut conn)
            .optional()
    }

    pub fn get_versions(
        &self,
        package_id: i32,
    ) -> Result<Vec<PackageVersion>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        package_versions::table
            .filter(package_versions::package_id.eq(package_id))
            .filter(package_versions::is_active.eq(true))
            .order(package_versions::datetime_created.desc())
            .load::<PackageVersion>(&mut conn)
    }

    /// Ids of packages that have a version depending on any version of the
    /// given package.
    pub fn get_dependant_package_ids(
        &self,
        package_id: i32,
    ) -> Result<Vec<i32>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        let target_version_ids: Vec<i32> = package_versions::table
            .filter(package_versions::package_id.eq(package_id))
            .select(package_versions::id)
            .load::<i32>(&mut conn)?;

        if target_version_ids.is_empty() {
            return Ok(Vec::new());
        }

        let dependant_version_ids: Vec<i32> = package_version_dependencies::table
            .filter(package_version_dependencies::dependency_version_id.eq_any(&target_version_ids))
            .select(package_version_dependencies::version_id)
            .load::<i32>(&mut conn)?;

        if dependant_version_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut dependant_package_ids: Vec<i32> = package_versions::table
            .filter(package_versions::id.eq_any(&dependant_version_ids))
            .filter(package_versions::is_active.eq(true))
            .select(package_versions::package_id)
            .load::<i32>(&mut conn)?;

        dependant_package_ids.sort_unstable();
        dependant_package_ids.dedup();
        Ok(dependant_package_ids)
    }
}
