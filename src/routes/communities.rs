use crate::error::ApiError;
use crate::models::community::*;
use crate::state::AppState;
use rocket::serde::json::Json;
use rocket::{State, get};

/// List all listed communities
#[get("/api/cyberstorm/community")]
pub async fn list_communities(
    state: &State<AppState>,
) -> Result<Json<CommunityListResponse>, ApiError> {
    let communities = state
        .database
        .get_listed_communities()
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?;

    Ok(Json(CommunityListResponse {
        communities: communities.iter().map(CommunityResponse::from).collect(),
    }))
}

/// Community detail by identifier. Aggregate counts come straight off the
/// community row; they are recomputed by the periodic refresh task, never
/// on the fly.
#[get("/api/cyberstorm/community/<identifier>")]
pub async fn get_community(
    identifier: &str,
    state: &State<AppState>,
) -> Result<Json<CommunityResponse>, ApiError> {
    let community = state
        .database
        .get_community_by_identifier(identifier)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?
        .ok_or_else(|| ApiError::NotFound(format!("Community '{identifier}' not found")))?;

    Ok(Json(CommunityResponse::from(&community)))
}

/// Categories and sections available for filtering a community's listings
#[get("/api/cyberstorm/community/<identifier>/filters")]
pub async fn get_community_filters(
    identifier: &str,
    state: &State<AppState>,
) -> Result<Json<CommunityFiltersResponse>, ApiError> {
    let community = state
        .database
        .get_community_by_identifier(identifier)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?
        .ok_or_else(|| ApiError::NotFound(format!("Community '{identifier}' not found")))?;

    let categories = state
        .database
        .get_categories(community.id)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?;

    let sections = state
        .database
        .get_sections(community.id)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?;

    Ok(Json(CommunityFiltersResponse {
        package_categories: categories.iter().map(PackageCategoryResponse::from).collect(),
        sections: sections
            .iter()
            .map(PackageListingSectionResponse::from)
            .collect(),
    }))
}
