use crate::error::ApiError;
use crate::models::auth::AuthenticatedUser;
use crate::models::community::{CommunityResponse, PackageCategoryResponse};
use crate::models::listing::{PackageListingUpdateRequest, PackageListingUpdateResponse};
use crate::models::package::{Package, PackageListingReportRequest};
use crate::models::team::validate_role;
use crate::services::ListingCacheKey;
use crate::state::AppState;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, NaiveDateTime};
use rocket::request::{FromRequest, Outcome, Request};
use rocket::serde::json::Json;
use rocket::serde::Serialize;
use rocket::{State, get, post};

/// Page size of the cursor-paginated experimental listings.
pub const PAGE_SIZE: i64 = 100;

#[derive(Serialize, Debug, Default)]
pub struct PaginationLinks {
    pub next_link: Option<String>,
    pub previous_link: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct PaginatedResponse<T: Serialize> {
    pub pagination: PaginationLinks,
    pub results: Vec<T>,
}

/// Encodes a (creation time, id) position as an opaque cursor token.
fn encode_cursor(datetime: NaiveDateTime, id: i32) -> String {
    let raw = format!("{}:{id}", datetime.and_utc().timestamp_micros());
    URL_SAFE_NO_PAD.encode(raw.as_bytes())
}

fn decode_cursor(cursor: &str) -> Result<(NaiveDateTime, i32), ApiError> {
    let invalid = || ApiError::BadRequest("Invalid cursor".to_string());

    let raw = URL_SAFE_NO_PAD.decode(cursor).map_err(|_| invalid())?;
    let raw = String::from_utf8(raw).map_err(|_| invalid())?;

    let (micros, id) = raw.split_once(':').ok_or_else(invalid)?;
    let micros: i64 = micros.parse().map_err(|_| invalid())?;
    let id: i32 = id.parse().map_err(|_| invalid())?;

    let datetime = DateTime::from_timestamp_micros(micros)
        .ok_or_else(invalid)?
        .naive_utc();

    Ok((datetime, id))
}

/// Builds the pagination envelope for one fetched page. Rows must have been
/// loaded with a limit of PAGE_SIZE + 1 so the presence of a next page is
/// known without a count query.
fn paginate<T, R>(
    base_url: &str,
    had_cursor: bool,
    mut rows: Vec<R>,
    position: impl Fn(&R) -> (NaiveDateTime, i32),
    into_result: impl Fn(&R) -> T,
) -> PaginatedResponse<T>
where
    T: Serialize,
{
    let has_next = rows.len() as i64 > PAGE_SIZE;
    rows.truncate(PAGE_SIZE as usize);

    let next_link = if has_next {
        rows.last().map(|row| {
            let (datetime, id) = position(row);
            format!("{base_url}?cursor={}", encode_cursor(datetime, id))
        })
    } else {
        None
    };

    // The previous link always points at the first page; positional
    // back-tracking is not supported.
    let previous_link = had_cursor.then(|| base_url.to_string());

    PaginatedResponse {
        pagination: PaginationLinks {
            next_link,
            previous_link,
        },
        results: rows.iter().map(into_result).collect(),
    }
}

/// Host header of the incoming request, used to resolve the current
/// community from its registered site domains.
pub struct HostHeader(pub String);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for HostHeader {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match req.headers().get_one("Host") {
            Some(host) => {
                // Strip an explicit port before matching against site domains.
                let domain = host.split(':').next().unwrap_or(host);
                Outcome::Success(HostHeader(domain.to_string()))
            }
            None => Outcome::Forward(rocket::http::Status::BadRequest),
        }
    }
}

/// Listed communities, newest first, one cursor page at a time.
#[get("/api/experimental/community?<cursor>")]
pub async fn list_communities_paginated(
    cursor: Option<&str>,
    state: &State<AppState>,
) -> Result<Json<PaginatedResponse<CommunityResponse>>, ApiError> {
    let position = cursor.map(decode_cursor).transpose()?;

    let rows = state
        .database
        .get_communities_page(position, PAGE_SIZE + 1)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?;

    Ok(Json(paginate(
        "/api/experimental/community",
        cursor.is_some(),
        rows,
        |community| (community.datetime_created, community.id),
        |community| CommunityResponse::from(community),
    )))
}

/// Categories of a community, newest first, one cursor page at a time.
#[get("/api/experimental/community/<identifier>/category?<cursor>")]
pub async fn list_community_categories_paginated(
    identifier: &str,
    cursor: Option<&str>,
    state: &State<AppState>,
) -> Result<Json<PaginatedResponse<PackageCategoryResponse>>, ApiError> {
    let community = state
        .database
        .get_community_by_identifier(identifier)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?
        .ok_or_else(|| ApiError::NotFound(format!("Community '{identifier}' not found")))?;

    let position = cursor.map(decode_cursor).transpose()?;

    let rows = state
        .database
        .get_categories_page(community.id, position, PAGE_SIZE + 1)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?;

    let base_url = format!("/api/experimental/community/{identifier}/category");

    Ok(Json(paginate(
        &base_url,
        cursor.is_some(),
        rows,
        |category| (category.datetime_created, category.id),
        |category| PackageCategoryResponse::from(category),
    )))
}

/// Resolves the community serving the requested host name.
#[get("/api/experimental/current-community")]
pub async fn get_current_community(
    host: HostHeader,
    state: &State<AppState>,
) -> Result<Json<CommunityResponse>, ApiError> {
    let community = state
        .database
        .get_community_by_domain(&host.0)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?
        .ok_or_else(|| ApiError::NotFound(format!("No community configured for '{}'", host.0)))?;

    Ok(Json(CommunityResponse::from(&community)))
}

/// Superusers and members of the team owning the package's namespace may
/// edit its listings.
fn can_edit_listing(
    state: &AppState,
    user: &AuthenticatedUser,
    package: &Package,
) -> Result<bool, ApiError> {
    if user.is_superuser {
        return Ok(true);
    }

    let namespace = state
        .database
        .get_namespace_by_id(package.namespace_id)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?
        .ok_or_else(|| ApiError::InternalServerError("Package namespace missing".to_string()))?;

    let membership = state
        .database
        .get_team_member(namespace.team_id, user.user_id)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?;

    match membership {
        Some(member) => {
            let role = validate_role(&member.role)
                .map_err(|e| ApiError::InternalServerError(format!("Corrupt role value: {e}")))?;
            Ok(role.can_manage_packages())
        }
        None => Ok(false),
    }
}

/// Replaces the categories of a package listing. The listing's cache entry
/// is invalidated before the response is sent, so a follow-up read never
/// sees the stale category set.
#[post("/api/experimental/package-listing/<listing_id>/update", data = "<request>")]
pub async fn update_package_listing(
    listing_id: i32,
    request: Json<PackageListingUpdateRequest>,
    user: Option<AuthenticatedUser>,
    state: &State<AppState>,
) -> Result<Json<PackageListingUpdateResponse>, ApiError> {
    let listing = state
        .database
        .get_listing_by_id(listing_id)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?
        .ok_or_else(|| ApiError::NotFound(format!("Package listing {listing_id} not found")))?;

    let package = state
        .database
        .get_package_by_id(listing.package_id)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?
        .ok_or_else(|| ApiError::InternalServerError("Listing package missing".to_string()))?;

    let allowed = match &user {
        Some(user) => can_edit_listing(state, user, &package)?,
        None => false,
    };
    if !allowed {
        return Err(ApiError::Forbidden(
            "User is missing necessary permission".to_string(),
        ));
    }

    // Every requested slug must belong to the listing's own community.
    let categories = state
        .database
        .get_categories_by_slugs(listing.community_id, &request.categories)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?;

    let mut requested: Vec<&str> = request.categories.iter().map(String::as_str).collect();
    requested.sort_unstable();
    requested.dedup();
    if categories.len() != requested.len() {
        return Err(ApiError::BadRequest(
            "Community mismatch between package listing and category".to_string(),
        ));
    }

    let category_ids: Vec<i32> = categories.iter().map(|c| c.id).collect();
    state
        .database
        .set_listing_categories(listing.id, &category_ids)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?;

    let namespace = state
        .database
        .get_namespace_by_id(package.namespace_id)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?
        .ok_or_else(|| ApiError::InternalServerError("Package namespace missing".to_string()))?;

    let community = state
        .database
        .get_community_by_id(listing.community_id)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?
        .ok_or_else(|| ApiError::InternalServerError("Listing community missing".to_string()))?;

    state.listing_cache.invalidate(&ListingCacheKey::new(
        &namespace.name,
        &package.name,
        &community.identifier,
    ));

    Ok(Json(PackageListingUpdateResponse {
        categories: categories.iter().map(PackageCategoryResponse::from).collect(),
    }))
}

/// Report intake is disabled. The request is still authenticated and
/// validated so the endpoint's contract stays stable, but every attempt is
/// rejected before anything is persisted.
#[post("/api/experimental/package-listing/<listing_id>/report", data = "<request>")]
pub async fn report_package_listing(
    listing_id: i32,
    request: Json<PackageListingReportRequest>,
    _user: AuthenticatedUser,
    state: &State<AppState>,
) -> Result<(), ApiError> {
    let _listing = state
        .database
        .get_listing_by_id(listing_id)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?
        .ok_or_else(|| ApiError::NotFound(format!("Package listing {listing_id} not found")))?;

    let version = state
        .database
        .get_version_by_id(request.package_version_id)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "Package version {} not found",
                request.package_version_id
            ))
        })?;

    Err(ApiError::Forbidden(format!(
        "You tried to report {}",
        version.full_version_name
    )))
}
