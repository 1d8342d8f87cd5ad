use super::communities::CommunityOperations;
use super::connection::{DbConnection, DbPool, create_pool, get_connection_with_retry};
use super::listings::ListingOperations;
use super::packages::PackageOperations;
use super::reports::{ReportOperations, ReportSaveError};
use super::teams::TeamOperations;
use super::wikis::WikiOperations;
use crate::models::auth::{User, UserToken};
use crate::models::community::*;
use crate::models::listing::PackageListing;
use crate::models::package::{NewPackageVersion, Package, PackageVersion};
use crate::models::report::{NewPackageReport, PackageReport, PackageReportReason};
use crate::models::team::{Namespace, ServiceAccount, Team, TeamMember};
use crate::models::wiki::{Wiki, WikiPage};
use chrono::NaiveDateTime;

/// Main database service that provides a unified interface to all database
/// operations.
#[derive(Debug)]
pub struct DatabaseService {
    pub pool: DbPool,
}

impl DatabaseService {
    pub fn new(database_url: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let pool = create_pool(database_url)?;
        Ok(Self { pool })
    }

    pub fn get_connection(&self) -> Result<DbConnection, diesel::r2d2::Error> {
        get_connection_with_retry(&self.pool)
    }

    // Community operations

    pub fn create_community(
        &self,
        new_community: NewCommunity,
    ) -> Result<Community, diesel::result::Error> {
        CommunityOperations::new(&self.pool).create_community(new_community)
    }

    pub fn create_community_site(
        &self,
        community_id: i32,
        domain: String,
    ) -> Result<CommunitySite, diesel::result::Error> {
        CommunityOperations::new(&self.pool).create_community_site(community_id, domain)
    }

    pub fn create_category(
        &self,
        community_id: i32,
        name: String,
        slug: String,
    ) -> Result<PackageCategory, diesel::result::Error> {
        CommunityOperations::new(&self.pool).create_category(community_id, name, slug)
    }

    pub fn create_section(
        &self,
        community_id: i32,
        name: String,
        slug: String,
        priority: i32,
    ) -> Result<PackageListingSection, diesel::result::Error> {
        CommunityOperations::new(&self.pool).create_section(community_id, name, slug, priority)
    }

    pub fn get_listed_communities(&self) -> Result<Vec<Community>, diesel::result::Error> {
        CommunityOperations::new(&self.pool).get_listed_communities()
    }

    pub fn get_community_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Community>, diesel::result::Error> {
        CommunityOperations::new(&self.pool).get_community_by_identifier(identifier)
    }

    pub fn get_community_by_id(
        &self,
        community_id: i32,
    ) -> Result<Option<Community>, diesel::result::Error> {
        CommunityOperations::new(&self.pool).get_community_by_id(community_id)
    }

    pub fn get_community_by_domain(
        &self,
        domain: &str,
    ) -> Result<Option<Community>, diesel::result::Error> {
        CommunityOperations::new(&self.pool).get_community_by_domain(domain)
    }

    pub fn get_categories(
        &self,
        community_id: i32,
    ) -> Result<Vec<PackageCategory>, diesel::result::Error> {
        CommunityOperations::new(&self.pool).get_categories(community_id)
    }

    pub fn get_categories_by_slugs(
        &self,
        community_id: i32,
        slugs: &[String],
    ) -> Result<Vec<PackageCategory>, diesel::result::Error> {
        CommunityOperations::new(&self.pool).get_categories_by_slugs(community_id, slugs)
    }

    pub fn get_sections(
        &self,
        community_id: i32,
    ) -> Result<Vec<PackageListingSection>, diesel::result::Error> {
        CommunityOperations::new(&self.pool).get_sections(community_id)
    }

    pub fn get_communities_page(
        &self,
        cursor: Option<(NaiveDateTime, i32)>,
        limit: i64,
    ) -> Result<Vec<Community>, diesel::result::Error> {
        CommunityOperations::new(&self.pool).get_communities_page(cursor, limit)
    }

    pub fn get_categories_page(
        &self,
        community_id: i32,
        cursor: Option<(NaiveDateTime, i32)>,
        limit: i64,
    ) -> Result<Vec<PackageCategory>, diesel::result::Error> {
        CommunityOperations::new(&self.pool).get_categories_page(community_id, cursor, limit)
    }

    pub fn set_community_aggregates(
        &self,
        community_id: i32,
        total_download_count: i64,
        total_package_count: i64,
    ) -> Result<(), diesel::result::Error> {
        CommunityOperations::new(&self.pool).set_community_aggregates(
            community_id,
            total_download_count,
            total_package_count,
        )
    }

    pub fn get_all_community_ids(&self) -> Result<Vec<i32>, diesel::result::Error> {
        CommunityOperations::new(&self.pool).get_all_community_ids()
    }

    // Team, namespace and user operations

    pub fn create_team(&self, name: String) -> Result<Team, diesel::result::Error> {
        TeamOperations::new(&self.pool).create_team(name)
    }

    pub fn create_namespace(
        &self,
        team_id: i32,
        name: String,
    ) -> Result<Namespace, diesel::result::Error> {
        TeamOperations::new(&self.pool).create_namespace(team_id, name)
    }

    pub fn create_user(
        &self,
        username: String,
        is_superuser: bool,
    ) -> Result<User, diesel::result::Error> {
        TeamOperations::new(&self.pool).create_user(username, is_superuser)
    }

    pub fn create_user_token(&self, user_id: i32) -> Result<UserToken, diesel::result::Error> {
        TeamOperations::new(&self.pool).create_user_token(user_id)
    }

    pub fn add_team_member(
        &self,
        team_id: i32,
        user_id: i32,
        role: &str,
    ) -> Result<TeamMember, diesel::result::Error> {
        TeamOperations::new(&self.pool).add_team_member(team_id, user_id, role)
    }

    pub fn create_service_account(
        &self,
        team_id: i32,
        nickname: String,
    ) -> Result<ServiceAccount, diesel::result::Error> {
        TeamOperations::new(&self.pool).create_service_account(team_id, nickname)
    }

    pub fn get_team_by_name(&self, name: &str) -> Result<Option<Team>, diesel::result::Error> {
        TeamOperations::new(&self.pool).get_team_by_name(name)
    }

    pub fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, diesel::result::Error> {
        TeamOperations::new(&self.pool).get_user_by_username(username)
    }

    pub fn get_team_member(
        &self,
        team_id: i32,
        user_id: i32,
    ) -> Result<Option<TeamMember>, diesel::result::Error> {
        TeamOperations::new(&self.pool).get_team_member(team_id, user_id)
    }

    pub fn is_team_member(
        &self,
        team_id: i32,
        user_id: i32,
    ) -> Result<bool, diesel::result::Error> {
        TeamOperations::new(&self.pool).is_team_member(team_id, user_id)
    }

    pub fn get_team_members_with_users(
        &self,
        team_id: i32,
    ) -> Result<Vec<(TeamMember, User)>, diesel::result::Error> {
        TeamOperations::new(&self.pool).get_team_members_with_users(team_id)
    }

    pub fn get_service_accounts(
        &self,
        team_id: i32,
    ) -> Result<Vec<ServiceAccount>, diesel::result::Error> {
        TeamOperations::new(&self.pool).get_service_accounts(team_id)
    }

    pub fn get_namespace_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Namespace>, diesel::result::Error> {
        TeamOperations::new(&self.pool).get_namespace_by_name(name)
    }

    pub fn get_namespace_by_id(
        &self,
        namespace_id: i32,
    ) -> Result<Option<Namespace>, diesel::result::Error> {
        TeamOperations::new(&self.pool).get_namespace_by_id(namespace_id)
    }

    // Package operations

    pub fn create_package(
        &self,
        namespace_id: i32,
        name: String,
    ) -> Result<Package, diesel::result::Error> {
        PackageOperations::new(&self.pool).create_package(namespace_id, name)
    }

    pub fn create_version(
        &self,
        new_version: NewPackageVersion,
    ) -> Result<PackageVersion, diesel::result::Error> {
        PackageOperations::new(&self.pool).create_version(new_version)
    }

    pub fn add_version_dependency(
        &self,
        version_id: i32,
        dependency_version_id: i32,
    ) -> Result<(), diesel::result::Error> {
        PackageOperations::new(&self.pool).add_version_dependency(version_id, dependency_version_id)
    }

    pub fn get_package(
        &self,
        namespace_id: i32,
        name: &str,
    ) -> Result<Option<Package>, diesel::result::Error> {
        PackageOperations::new(&self.pool).get_package(namespace_id, name)
    }

    pub fn get_package_by_id(
        &self,
        package_id: i32,
    ) -> Result<Option<Package>, diesel::result::Error> {
        PackageOperations::new(&self.pool).get_package_by_id(package_id)
    }

    pub fn get_version_by_id(
        &self,
        version_id: i32,
    ) -> Result<Option<PackageVersion>, diesel::result::Error> {
        PackageOperations::new(&self.pool).get_version_by_id(version_id)
    }

    pub fn get_version_by_number(
        &self,
        package_id: i32,
        version_number: &str,
    ) -> Result<Option<PackageVersion>, diesel::result::Error> {
        PackageOperations::new(&self.pool).get_version_by_number(package_id, version_number)
    }

    pub fn get_latest_version(
        &self,
        package: &Package,
    ) -> Result<Option<PackageVersion>, diesel::result::Error> {
        PackageOperations::new(&self.pool).get_latest_version(package)
    }

    pub fn get_versions(
        &self,
        package_id: i32,
    ) -> Result<Vec<PackageVersion>, diesel::result::Error> {
        PackageOperations::new(&self.pool).get_versions(package_id)
    }

    pub fn get_dependant_package_ids(
        &self,
        package_id: i32,
    ) -> Result<Vec<i32>, diesel::result::Error> {
        PackageOperations::new(&self.pool).get_dependant_package_ids(package_id)
    }

    // Listing operations

    pub fn create_listing(
        &self,
        package_id: i32,
        community_id: i32,
    ) -> Result<PackageListing, diesel::result::Error> {
        ListingOperations::new(&self.pool).create_listing(package_id, community_id)
    }

    pub fn get_listing_by_id(
        &self,
        listing_id: i32,
    ) -> Result<Option<PackageListing>, diesel::result::Error> {
        ListingOperations::new(&self.pool).get_listing_by_id(listing_id)
    }

    pub fn get_listing(
        &self,
        package_id: i32,
        community_id: i32,
    ) -> Result<Option<PackageListing>, diesel::result::Error> {
        ListingOperations::new(&self.pool).get_listing(package_id, community_id)
    }

    pub fn get_listing_categories(
        &self,
        listing_id: i32,
    ) -> Result<Vec<PackageCategory>, diesel::result::Error> {
        ListingOperations::new(&self.pool).get_listing_categories(listing_id)
    }

    pub fn set_listing_categories(
        &self,
        listing_id: i32,
        category_ids: &[i32],
    ) -> Result<(), diesel::result::Error> {
        ListingOperations::new(&self.pool).set_listing_categories(listing_id, category_ids)
    }

    pub fn get_community_listings(
        &self,
        community_id: i32,
    ) -> Result<Vec<(PackageListing, Package)>, diesel::result::Error> {
        ListingOperations::new(&self.pool).get_community_listings(community_id)
    }

    pub fn get_community_listings_for_packages(
        &self,
        community_id: i32,
        package_ids: &[i32],
    ) -> Result<Vec<(PackageListing, Package)>, diesel::result::Error> {
        ListingOperations::new(&self.pool)
            .get_community_listings_for_packages(community_id, package_ids)
    }

    pub fn deactivate_listing(&self, listing_id: i32) -> Result<(), diesel::result::Error> {
        ListingOperations::new(&self.pool).deactivate_listing(listing_id)
    }

    // Report operations

    pub fn create_report_reason(
        &self,
        label: String,
    ) -> Result<PackageReportReason, diesel::result::Error> {
        ReportOperations::new(&self.pool).create_report_reason(label)
    }

    pub fn get_active_report_reasons(
        &self,
    ) -> Result<Vec<PackageReportReason>, diesel::result::Error> {
        ReportOperations::new(&self.pool).get_active_report_reasons()
    }

    pub fn create_report(
        &self,
        new_report: NewPackageReport,
    ) -> Result<PackageReport, ReportSaveError> {
        ReportOperations::new(&self.pool).create_report(new_report)
    }

    pub fn count_reports_for_version(
        &self,
        version_id: i32,
    ) -> Result<i64, diesel::result::Error> {
        ReportOperations::new(&self.pool).count_reports_for_version(version_id)
    }

    pub fn deactivate_report(&self, report_id: i32) -> Result<(), diesel::result::Error> {
        ReportOperations::new(&self.pool).deactivate_report(report_id)
    }

    // Wiki operations

    pub fn get_wiki_for_package(
        &self,
        package_id: i32,
    ) -> Result<Option<Wiki>, diesel::result::Error> {
        WikiOperations::new(&self.pool).get_wiki_for_package(package_id)
    }

    pub fn get_or_create_wiki_for_package(
        &self,
        package_id: i32,
    ) -> Result<Wiki, diesel::result::Error> {
        WikiOperations::new(&self.pool).get_or_create_wiki_for_package(package_id)
    }

    pub fn get_wiki_pages(&self, wiki_id: i32) -> Result<Vec<WikiPage>, diesel::result::Error> {
        WikiOperations::new(&self.pool).get_wiki_pages(wiki_id)
    }

    pub fn get_wiki_page(
        &self,
        wiki_id: i32,
        page_id: i32,
    ) -> Result<Option<WikiPage>, diesel::result::Error> {
        WikiOperations::new(&self.pool).get_wiki_page(wiki_id, page_id)
    }

    pub fn upsert_wiki_page(
        &self,
        wiki_id: i32,
        page_id: Option<i32>,
        title: String,
        markdown_content: String,
    ) -> Result<WikiPage, diesel::result::Error> {
        WikiOperations::new(&self.pool).upsert_wiki_page(wiki_id, page_id, title, markdown_content)
    }

    pub fn delete_wiki_page(
        &self,
        wiki_id: i32,
        page_id: i32,
    ) -> Result<(), diesel::result::Error> {
        WikiOperations::new(&self.pool).delete_wiki_page(wiki_id, page_id)
    }
}
