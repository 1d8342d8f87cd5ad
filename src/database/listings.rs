use super::connection::{DbPool, get_connection_with_retry, pool_error};
use crate::models::community::PackageCategory;
use crate::models::listing::*;
use crate::models::package::Package;
use crate::schema::{
    package_categories, package_listing_categories, package_listings, packages,
};
use diesel::prelude::*;

/// Package listing database operations
pub struct ListingOperations<'a> {
    pool: &'a DbPool,
}

impl<'a> ListingOperations<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    pub fn create_listing(
        &self,
        package_id: i32,
        community_id: i32,
    ) -> Result<PackageListing, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        diesel::insert_into(package_listings::table)
            .values(&NewPackageListing::new(package_id, community_id))
            .get_result::<PackageListing>(&mut conn)
    }

    pub fn get_listing_by_id(
        &self,
        listing_id: i32,
    ) -> Result<Option<PackageListing>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        package_listings::table
            .find(listing_id)
            .filter(package_listings::is_active.eq(true))
            .first::<PackageListing>(&mut conn)
            .optional()
    }

    pub fn get_listing(
        &self,
        package_id: i32,
        community_id: i32,
    ) -> Result<Option<PackageListing>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        package_listings::table
            .filter(package_listings::package_id.eq(package_id))
            .filter(package_listings::community_id.eq(community_id))
            .filter(package_listings::is_active.eq(true))
            .first::<PackageListing>(&mut conn)
            .optional()
    }

    pub fn get_listing_categories(
        &self,
        listing_id: i32,
    ) -> Result<Vec<PackageCategory>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        let category_ids: Vec<i32> = package_listing_categories::table
            .filter(package_listing_categories::listing_id.eq(listing_id))
            .select(package_listing_categories::category_id)
            .load::<i32>(&mut conn)?;

        package_categories::table
            .filter(package_categories::id.eq_any(&category_ids))
            .order(package_categories::slug.asc())
            .load::<PackageCategory>(&mut conn)
    }

    /// Replaces the listing's category set atomically.
    pub fn set_listing_categories(
        &self,
        listing_id: i32,
        category_ids: &[i32],
    ) -> Result<(), diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        conn.transaction::<(), diesel::result::Error, _>(|conn| {
            diesel::delete(
                package_listing_categories::table
                    .filter(package_listing_categories::listing_id.eq(listing_id)),
            )
            .execute(conn)?;

            for category_id in category_ids {
                diesel::insert_into(package_listing_categories::table)
                    .values(&NewPackageListingCategory {
                        listing_id,
                        category_id: *category_id,
                    })
                    .execute(conn)?;
            }

            diesel::update(package_listings::table.find(listing_id))
                .set(package_listings::datetime_updated.eq(chrono::Utc::now().naive_utc()))
                .execute(conn)?;

            Ok(())
        })
    }

    /// Active listings of a community joined with their active packages,
    /// newest update first.
    pub fn get_community_listings(
        &self,
        community_id: i32,
    ) -> Result<Vec<(PackageListing, Package)>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        package_listings::table
            .inner_join(packages::table)
            .filter(package_listings::community_id.eq(community_id))
            .filter(package_listings::is_active.eq(true))
            .filter(packages::is_active.eq(true))
            .order(package_listings::datetime_updated.desc())
            .load::<(PackageListing, Package)>(&mut conn)
    }

    pub fn get_community_listings_for_packages(
        &self,
        community_id: i32,
        package_ids: &[i32],
    ) -> Result<Vec<(PackageListing, Package)>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        package_listings::table
            .inner_join(packages::table)
            .filter(package_listings::community_id.eq(community_id))
            .filter(package_listings::package_id.eq_any(package_ids))
            .filter(package_listings::is_active.eq(true))
            .filter(packages::is_active.eq(true))
            .order(package_listings::datetime_updated.desc())
            .load::<(PackageListing, Package)>(&mut conn)
    }

    pub fn deactivate_listing(&self, listing_id: i32) -> Result<(), diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        diesel::update(package_listings::table.find(listing_id))
            .set((
                package_listings::is_active.eq(false),
                package_listings::datetime_updated.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }
}
