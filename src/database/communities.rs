use super::connection::{DbPool, get_connection_with_retry, pool_error};
use crate::models::community::*;
use crate::schema::{communities, community_sites, package_categories, package_listing_sections};
use chrono::NaiveDateTime;
use diesel::prelude::*;

/// Community-related database operations
pub struct CommunityOperations<'a> {
    pool: &'a DbPool,
}

impl<'a> CommunityOperations<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    pub fn create_community(
        &self,
        new_community: NewCommunity,
    ) -> Result<Community, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        diesel::insert_into(communities::table)
            .values(&new_community)
            .get_result::<Community>(&mut conn)
    }

    pub fn create_community_site(
        &self,
        community_id: i32,
        domain: String,
    ) -> Result<CommunitySite, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        diesel::insert_into(community_sites::table)
            .values(&NewCommunitySite::new(community_id, domain))
            .get_result::<CommunitySite>(&mut conn)
    }

    pub fn create_category(
        &self,
        community_id: i32,
        name: String,
        slug: String,
    ) -> Result<PackageCategory, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        diesel::insert_into(package_categories::table)
            .values(&NewPackageCategory::new(community_id, name, slug))
            .get_result::<PackageCategory>(&mut conn)
    }

    pub fn create_section(
        &self,
        community_id: i32,
        name: String,
        slug: String,
        priority: i32,
    ) -> Result<PackageListingSection, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        diesel::insert_into(package_listing_sections::table)
            .values(&NewPackageListingSection::new(
                community_id,
                name,
                slug,
                priority,
            ))
            .get_result::<PackageListingSection>(&mut conn)
    }

    /// Listed communities, ordered by identifier for stable output.
    pub fn get_listed_communities(&self) -> Result<Vec<Community>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        communities::table
            .filter(communities::is_listed.eq(true))
            .order(communities::identifier.asc())
            .load::<Community>(&mut conn)
    }

    pub fn get_community_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Community>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        communities::table
            .filter(communities::identifier.eq(identifier))
            .first::<Community>(&mut conn)
            .optional()
    }

    pub fn get_community_by_id(
        &self,
        community_id: i32,
    ) -> Result<Option<Community>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        communities::table
            .find(community_id)
            .first::<Community>(&mut conn)
            .optional()
    }

    /// Resolves the request host to a community via its registered sites.
    pub fn get_community_by_domain(
        &self,
        domain: &str,
    ) -> Result<Option<Community>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        let site = community_sites::table
            .filter(community_sites::domain.eq(domain))
            .first::<CommunitySite>(&mut conn)
            .optional()?;

        match site {
            Some(site) => communities::table
                .find(site.community_id)
                .first::<Community>(&mut conn)
                .optional(),
            None => Ok(None),
        }
    }

    pub fn get_categories(
        &self,
        community_id: i32,
    ) -> Result<Vec<PackageCategory>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        package_categories::table
            .filter(package_categories::community_id.eq(community_id))
            .order(package_categories::slug.asc())
            .load::<PackageCategory>(&mut conn)
    }

    pub fn get_categories_by_slugs(
        &self,
        community_id: i32,
        slugs: &[String],
    ) -> Result<Vec<PackageCategory>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        package_categories::table
            .filter(package_categories::community_id.eq(community_id))
            .filter(package_categories::slug.eq_any(slugs))
            .load::<PackageCategory>(&mut conn)
    }

    pub fn get_sections(
        &self,
        community_id: i32,
    ) -> Result<Vec<PackageListingSection>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        package_listing_sections::table
            .filter(package_listing_sections::community_id.eq(community_id))
            .filter(package_listing_sections::is_listed.eq(true))
            .order((
                package_listing_sections::priority.desc(),
                package_listing_sections::datetime_created.asc(),
            ))
            .load::<PackageListingSection>(&mut conn)
    }

    /// One page of listed communities in descending creation order. The
    /// cursor is the (datetime_created, id) pair of the last seen row.
    pub fn get_communities_page(
        &self,
        cursor: Option<(NaiveDateTime, i32)>,
        limit: i64,
    ) -> Result<Vec<Community>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        let mut query = communities::table
            .filter(communities::is_listed.eq(true))
            .into_boxed();

        if let Some((datetime, id)) = cursor {
            query = query.filter(
                communities::datetime_created.lt(datetime).or(
                    communities::datetime_created
                        .eq(datetime)
                        .and(communities::id.lt(id)),
                ),
            );
        }

        query
            .order((
                communities::datetime_created.desc(),
                communities::id.desc(),
            ))
            .limit(limit)
            .load::<Community>(&mut conn)
    }

    /// One page of a community's categories in descending creation order.
    pub fn get_categories_page(
        &self,
        community_id: i32,
        cursor: Option<(NaiveDateTime, i32)>,
        limit: i64,
    ) -> Result<Vec<PackageCategory>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        let mut query = package_categories::table
            .filter(package_categories::community_id.eq(community_id))
            .into_boxed();

        if let Some((datetime, id)) = cursor {
            query = query.filter(
                package_categories::datetime_created.lt(datetime).or(
                    package_categories::datetime_created
                        .eq(datetime)
                        .and(package_categories::id.lt(id)),
                ),
            );
        }

        query
            .order((
                package_categories::datetime_created.desc(),
                package_categories::id.desc(),
            ))
            .limit(limit)
            .load::<PackageCategory>(&mut conn)
    }

    pub fn set_community_aggregates(
        &self,
        community_id: i32,
        total_download_count: i64,
        total_package_count: i64,
    ) -> Result<(), diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        diesel::update(communities::table.find(community_id))
            .set((
                communities::total_download_count.eq(total_download_count),
                communities::total_package_count.eq(total_package_count),
                communities::datetime_updated.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    pub fn get_all_community_ids(&self) -> Result<Vec<i32>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        communities::table
            .select(communities::id)
            .load::<i32>(&mut conn)
    }
}
