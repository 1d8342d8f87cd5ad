use crate::error::ApiError;
use crate::models::auth::AuthenticatedUser;
use crate::models::package::Package;
use crate::models::team::validate_role;
use crate::models::wiki::{
    WikiPageDeleteRequest, WikiPageIndexResponse, WikiPageResponse, WikiPageUpsertRequest,
    WikiResponse, validate_wiki_page,
};
use crate::state::AppState;
use rocket::serde::json::Json;
use rocket::{State, delete, get, post};

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

/// Superusers and members of the owning team may edit the wiki.
fn ensure_can_edit_wiki(
    state: &AppState,
    user: &AuthenticatedUser,
    package: &Package,
) -> Result<(), ApiError> {
    if user.is_superuser {
        return Ok(());
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

    let allowed = match membership {
        Some(member) => validate_role(&member.role)
            .map_err(|e| ApiError::InternalServerError(format!("Corrupt role value: {e}")))?
            .can_manage_packages(),
        None => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "User is missing necessary permission".to_string(),
        ))
    }
}

/// Wiki index of a package. A package that has never had a wiki page
/// written responds 404; wikis come into existence on first write.
#[get("/api/experimental/package/<namespace>/<name>/wiki")]
pub async fn get_package_wiki(
    namespace: &str,
    name: &str,
    state: &State<AppState>,
) -> Result<Json<WikiResponse>, ApiError> {
    let package = resolve_package(state, namespace, name)?;

    let wiki = state
        .database
        .get_wiki_for_package(package.id)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?
        .ok_or_else(|| ApiError::NotFound(format!("Package '{name}' has no wiki")))?;

    let pages = state
        .database
        .get_wiki_pages(wiki.id)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?;

    Ok(Json(WikiResponse {
        id: wiki.id,
        datetime_created: wiki.datetime_created,
        datetime_updated: wiki.datetime_updated,
        pages: pages.iter().map(WikiPageIndexResponse::from).collect(),
    }))
}

/// Creates or updates a wiki page. A request without an id creates a new
/// page; with an id it updates that page in place. The package's wiki is
/// created lazily on the first write.
#[post("/api/experimental/package/<namespace>/<name>/wiki", data = "<request>")]
pub async fn upsert_package_wiki_page(
    namespace: &str,
    name: &str,
    request: Json<WikiPageUpsertRequest>,
    user: AuthenticatedUser,
    state: &State<AppState>,
) -> Result<Json<WikiPageResponse>, ApiError> {
    let package = resolve_package(state, namespace, name)?;
    ensure_can_edit_wiki(state, &user, &package)?;

    validate_wiki_page(&request.title, &request.markdown_content)
        .map_err(ApiError::ValidationError)?;

    let wiki = state
        .database
        .get_or_create_wiki_for_package(package.id)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?;

    // NotFound from the scoped update surfaces as a 404 via the diesel
    // error conversion.
    let page = state.database.upsert_wiki_page(
        wiki.id,
        request.id,
        request.title.clone(),
        request.markdown_content.clone(),
    )?;

    Ok(Json(WikiPageResponse::from(&page)))
}

/// Deletes a wiki page by id.
#[delete("/api/experimental/package/<namespace>/<name>/wiki", data = "<request>")]
pub async fn delete_package_wiki_page(
    namespace: &str,
    name: &str,
    request: Json<WikiPageDeleteRequest>,
    user: AuthenticatedUser,
    state: &State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let package = resolve_package(state, namespace, name)?;
    ensure_can_edit_wiki(state, &user, &package)?;

    let wiki = state
        .database
        .get_wiki_for_package(package.id)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?
        .ok_or_else(|| ApiError::NotFound(format!("Package '{name}' has no wiki")))?;

    state.database.delete_wiki_page(wiki.id, request.id)?;

    Ok(Json(serde_json::json!({ "success": true })))
}
