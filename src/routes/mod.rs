pub mod communities;
pub mod experimental;
pub mod health;
pub mod packages;
pub mod teams;
pub mod wiki;

use rocket::{Route, routes};

/// All routes served by the application.
pub fn get_routes() -> Vec<Route> {
    routes![
        health::health_check,
        communities::list_communities,
        communities::get_community,
        communities::get_community_filters,
        packages::list_community_packages,
        packages::list_namespace_packages,
        packages::get_package_detail,
        packages::list_package_dependants,
        packages::list_package_versions,
        packages::get_latest_changelog,
        packages::get_changelog,
        packages::get_latest_readme,
        packages::get_readme,
        teams::get_team_detail,
        teams::list_team_members,
        teams::list_service_accounts,
        teams::add_team_member,
        experimental::list_communities_paginated,
        experimental::list_community_categories_paginated,
        experimental::get_current_community,
        experimental::update_package_listing,
        experimental::report_package_listing,
        wiki::get_package_wiki,
        wiki::upsert_package_wiki_page,
        wiki::delete_package_wiki_page,
    ]
}
