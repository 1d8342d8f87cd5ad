use crate::error::ApiError;
use crate::models::community::{Community, PackageCategoryResponse};
use crate::models::listing::{
    PackageListing, PackageListingDetail, PackageListingListResponse, PackageListingOverview,
};
use crate::models::package::{
    Package, PackageVersion, PackageVersionListResponse, PackageVersionResponse,
    VersionMarkdownResponse,
};
use crate::services::{CachedListing, ListingCacheKey};
use crate::state::AppState;
use rocket::serde::json::Json;
use rocket::{State, get};

fn resolve_community(state: &AppState, identifier: &str) -> Result<Community, ApiError> {
    state
        .database
        .get_community_by_identifier(identifier)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?
        .ok_or_else(|| ApiError::NotFound(format!("Community '{identifier}' not found")))
}

fn resolve_package(state: &AppState, namespace: &str, name: &str) -> Result<Package, ApiError> {
    let namespace = state
        .database
        .get_namespace_by_name(namespace)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?
        .ok_or_else(|| ApiError::NotFound(format!("Namespace '{namespace}' not found")))?;

    state
        .database
        .get_package(namespace.id, name)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?
        .ok_or_else(|| ApiError::NotFound(format!("Package '{name}' not found")))
}

/// Resolves an explicit version number, or falls back to the package's
/// latest version.
fn resolve_version(
    state: &AppState,
    package: &Package,
    version_number: Option<&str>,
) -> Result<PackageVersion, ApiError> {
    let version = match version_number {
        Some(number) => state
            .database
            .get_version_by_number(package.id, number)
            .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?,
        None => state
            .database
            .get_latest_version(package)
            .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?,
    };

    version.ok_or_else(|| ApiError::NotFound(format!("No version found for '{}'", package.name)))
}

fn build_overview(
    state: &AppState,
    listing: &PackageListing,
    package: &Package,
) -> Result<PackageListingOverview, ApiError> {
    let namespace = state
        .database
        .get_namespace_by_id(package.namespace_id)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?
        .ok_or_else(|| ApiError::InternalServerError("Package namespace missing".to_string()))?;

    let versions = state
        .database
        .get_versions(package.id)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?;

    let download_count = versions.iter().map(|v| v.downloads).sum();
    let description = versions
        .first()
        .map(|v| v.description.clone())
        .unwrap_or_default();

    Ok(PackageListingOverview {
        namespace: namespace.name,
        name: package.name.clone(),
        description,
        download_count,
        is_deprecated: package.is_deprecated,
        has_nsfw_content: listing.has_nsfw_content,
        datetime_updated: listing.datetime_updated,
    })
}

fn build_listing_detail(
    state: &AppState,
    namespace_name: &str,
    community: &Community,
    listing: &PackageListing,
    package: &Package,
) -> Result<PackageListingDetail, ApiError> {
    let versions = state
        .database
        .get_versions(package.id)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?;

    let latest = state
        .database
        .get_latest_version(package)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?;

    let categories = state
        .database
        .get_listing_categories(listing.id)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?;

    Ok(PackageListingDetail {
        namespace: namespace_name.to_string(),
        name: package.name.clone(),
        community: community.identifier.clone(),
        description: latest
            .as_ref()
            .map(|v| v.description.clone())
            .unwrap_or_default(),
        latest_version_number: latest.map(|v| v.version_number),
        download_count: versions.iter().map(|v| v.downloads).sum(),
        is_deprecated: package.is_deprecated,
        has_nsfw_content: listing.has_nsfw_content,
        categories: categories.iter().map(PackageCategoryResponse::from).collect(),
        datetime_updated: listing.datetime_updated,
    })
}

/// Active, visible listings of a community
#[get("/api/cyberstorm/package/<community>")]
pub async fn list_community_packages(
    community: &str,
    state: &State<AppState>,
) -> Result<Json<PackageListingListResponse>, ApiError> {
    let community = resolve_community(state, community)?;

    let rows = state
        .database
        .get_community_listings(community.id)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?;

    let mut listings = Vec::new();
    for (listing, package) in &rows {
        if listing.is_visible(community.require_package_listing_approval) {
            listings.push(build_overview(state, listing, package)?);
        }
    }

    Ok(Json(PackageListingListResponse { listings }))
}

/// Community listings narrowed to a single namespace
#[get("/api/cyberstorm/package/<community>/<namespace>")]
pub async fn list_namespace_packages(
    community: &str,
    namespace: &str,
    state: &State<AppState>,
) -> Result<Json<PackageListingListResponse>, ApiError> {
    let community = resolve_community(state, community)?;

    let namespace = state
        .database
        .get_namespace_by_name(namespace)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?
        .ok_or_else(|| ApiError::NotFound(format!("Namespace '{namespace}' not found")))?;

    let rows = state
        .database
        .get_community_listings(community.id)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?;

    let mut listings = Vec::new();
    for (listing, package) in &rows {
        if package.namespace_id == namespace.id
            && listing.is_visible(community.require_package_listing_approval)
        {
            listings.push(build_overview(state, listing, package)?);
        }
    }

    Ok(Json(PackageListingListResponse { listings }))
}

/// Package detail within a community. Lookups go through the listing cache;
/// both hits and misses are cached until the listing is mutated.
#[get("/api/cyberstorm/package/<community>/<namespace>/<name>")]
pub async fn get_package_detail(
    community: &str,
    namespace: &str,
    name: &str,
    state: &State<AppState>,
) -> Result<Json<PackageListingDetail>, ApiError> {
    let key = ListingCacheKey::new(namespace, name, community);

    if let Some(cached) = state.listing_cache.get(&key) {
        return match cached {
            CachedListing::Found(detail) => Ok(Json(detail)),
            CachedListing::NotFound => {
                Err(ApiError::NotFound("No matching package found".to_string()))
            }
        };
    }

    let detail = lookup_listing_detail(state, community, namespace, name)?;

    match detail {
        Some(detail) => {
            state
                .listing_cache
                .insert(key, CachedListing::Found(detail.clone()));
            Ok(Json(detail))
        }
        None => {
            state.listing_cache.insert(key, CachedListing::NotFound);
            Err(ApiError::NotFound("No matching package found".to_string()))
        }
    }
}

fn lookup_listing_detail(
    state: &AppState,
    community: &str,
    namespace: &str,
    name: &str,
) -> Result<Option<PackageListingDetail>, ApiError> {
    let community = match state
        .database
        .get_community_by_identifier(community)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?
    {
        Some(community) => community,
        None => return Ok(None),
    };

    let namespace = match state
        .database
        .get_namespace_by_name(namespace)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?
    {
        Some(namespace) => namespace,
        None => return Ok(None),
    };

    let package = match state
        .database
        .get_package(namespace.id, name)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?
    {
        Some(package) => package,
        None => return Ok(None),
    };

    let listing = match state
        .database
        .get_listing(package.id, community.id)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?
    {
        Some(listing) => listing,
        None => return Ok(None),
    };

    if !listing.is_visible(community.require_package_listing_approval) {
        return Ok(None);
    }

    build_listing_detail(state, &namespace.name, &community, &listing, &package).map(Some)
}

/// Listings in the community whose package depends on the target package
#[get("/api/cyberstorm/package/<community>/<namespace>/<name>/dependants")]
pub async fn list_package_dependants(
    community: &str,
    namespace: &str,
    name: &str,
    state: &State<AppState>,
) -> Result<Json<PackageListingListResponse>, ApiError> {
    let community = resolve_community(state, community)?;
    let package = resolve_package(state, namespace, name)?;

    let dependant_ids = state
        .database
        .get_dependant_package_ids(package.id)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?;

    let rows = state
        .database
        .get_community_listings_for_packages(community.id, &dependant_ids)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?;

    let mut listings = Vec::new();
    for (listing, package) in &rows {
        if listing.is_visible(community.require_package_listing_approval) {
            listings.push(build_overview(state, listing, package)?);
        }
    }

    Ok(Json(PackageListingListResponse { listings }))
}

/// All active versions of a package, newest first
#[get("/api/cyberstorm/versions/<namespace>/<name>")]
pub async fn list_package_versions(
    namespace: &str,
    name: &str,
    state: &State<AppState>,
) -> Result<Json<PackageVersionListResponse>, ApiError> {
    let package = resolve_package(state, namespace, name)?;

    let versions = state
        .database
        .get_versions(package.id)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?;

    Ok(Json(PackageVersionListResponse {
        versions: versions.iter().map(PackageVersionResponse::from).collect(),
    }))
}

#[get("/api/cyberstorm/changelog/<namespace>/<name>")]
pub async fn get_latest_changelog(
    namespace: &str,
    name: &str,
    state: &State<AppState>,
) -> Result<Json<VersionMarkdownResponse>, ApiError> {
    changelog_response(state, namespace, name, None)
}

#[get("/api/cyberstorm/changelog/<namespace>/<name>/<version>")]
pub async fn get_changelog(
    namespace: &str,
    name: &str,
    version: &str,
    state: &State<AppState>,
) -> Result<Json<VersionMarkdownResponse>, ApiError> {
    changelog_response(state, namespace, name, Some(version))
}

fn changelog_response(
    state: &AppState,
    namespace: &str,
    name: &str,
    version_number: Option<&str>,
) -> Result<Json<VersionMarkdownResponse>, ApiError> {
    let package = resolve_package(state, namespace, name)?;
    let version = resolve_version(state, &package, version_number)?;

    let markdown = version
        .changelog
        .ok_or_else(|| ApiError::NotFound("Version has no changelog".to_string()))?;

    Ok(Json(VersionMarkdownResponse {
        version_number: version.version_number,
        markdown,
    }))
}

#[get("/api/cyberstorm/readme/<namespace>/<name>")]
pub async fn get_latest_readme(
    namespace: &str,
    name: &str,
    state: &State<AppState>,
) -> Result<Json<VersionMarkdownResponse>, ApiError> {
    readme_response(state, namespace, name, None)
}

#[get("/api/cyberstorm/readme/<namespace>/<name>/<version>")]
pub async fn get_readme(
    namespace: &str,
    name: &str,
    version: &str,
    state: &State<AppState>,
) -> Result<Json<VersionMarkdownResponse>, ApiError> {
    readme_response(state, namespace, name, Some(version))
}

fn readme_response(
    state: &AppState,
    namespace: &str,
    name: &str,
    version_number: Option<&str>,
) -> Result<Json<VersionMarkdownResponse>, ApiError> {
    let package = resolve_package(state, namespace, name)?;
    let version = resolve_version(state, &package, version_number)?;

    Ok(Json(VersionMarkdownResponse {
        version_number: version.version_number,
        markdown: version.readme,
    }))
}
