use diesel::prelude::*;
use modvault::database::ReportSaveError;
use modvault::models::auth::User;
use modvault::models::community::{Community, NewCommunity};
use modvault::models::listing::PackageListing;
use modvault::models::package::{NewPackageVersion, Package, PackageVersion};
use modvault::models::report::NewPackageReport;
use modvault::models::team::{Namespace, Team};
use modvault::{AppConfig, AppState, DatabaseService, ListingCacheService};
use rocket::Config;
use rocket::http::{ContentType, Header, Status};
use rocket::local::blocking::Client;
use rocket_cors::{AllowedOrigins, CorsOptions};
use serial_test::serial;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tempfile::TempDir;

static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

struct TestRocket {
    rocket: rocket::Rocket<rocket::Build>,
    database: Arc<DatabaseService>,
    cache: Arc<ListingCacheService>,
    _temp_dir: TempDir, // Keep alive for cleanup
}

fn create_test_rocket() -> TestRocket {
    // Create temporary directory for this test
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let data_dir = temp_dir.path().to_string_lossy().to_string();

    // Unique database file per test
    let test_id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let database_url = format!("{data_dir}/test_{test_id}.db");

    let config = AppConfig {
        port: 8000,
        host: "127.0.0.1".to_string(),
        database_url: database_url.clone(),
        data_dir,
        aggregate_refresh_enabled: false,
    };

    let cache = Arc::new(ListingCacheService::new());
    let database =
        Arc::new(DatabaseService::new(&database_url).expect("Failed to initialize database"));

    let state = AppState {
        config: config.clone(),
        listing_cache: cache.clone(),
        database: database.clone(),
    };

    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::all())
        .to_cors()
        .expect("Failed to create CORS configuration");

    let rocket_config = Config {
        port: config.port,
        address: config.host.parse().expect("Invalid host address"),
        ..Config::default()
    };

    let rocket = rocket::custom(&rocket_config)
        .manage(state)
        .attach(cors)
        .attach(modvault::RequestLogger)
        .mount("/", modvault::routes::get_routes());

    TestRocket {
        rocket,
        database,
        cache,
        _temp_dir: temp_dir,
    }
}

struct Fixture {
    community: Community,
    team: Team,
    namespace: Namespace,
    package: Package,
    version: PackageVersion,
    listing: PackageListing,
}

/// One community with a single listed package and version.
fn seed_listing(db: &DatabaseService) -> Fixture {
    let community = db
        .create_community(NewCommunity::new("test".to_string(), "Test".to_string()))
        .expect("community");
    let team = db.create_team("TestTeam".to_string()).expect("team");
    let namespace = db
        .create_namespace(team.id, "TestTeam".to_string())
        .expect("namespace");
    let package = db
        .create_package(namespace.id, "TestMod".to_string())
        .expect("package");
    let version = db
        .create_version(NewPackageVersion::new(
            package.id,
            &namespace.name,
            &package.name,
            "1.0.0".to_string(),
        ))
        .expect("version");
    let listing = db
        .create_listing(package.id, community.id)
        .expect("listing");

    Fixture {
        community,
        team,
        namespace,
        package,
        version,
        listing,
    }
}

/// Creates a user with an out-of-band provisioned bearer token.
fn seed_user(db: &DatabaseService, username: &str, is_superuser: bool) -> (User, String) {
    let user = db
        .create_user(username.to_string(), is_superuser)
        .expect("user");
    let token = db.create_user_token(user.id).expect("token");
    (user, token.token)
}

fn auth_header(token: &str) -> Header<'static> {
    Header::new("Authorization", format!("Bearer {token}"))
}

fn json_body(response: rocket::local::blocking::LocalResponse<'_>) -> serde_json::Value {
    let body = response.into_string().expect("response body");
    serde_json::from_str(&body).expect("valid JSON")
}

#[test]
#[serial]
fn test_health_check() {
    let test_rocket = create_test_rocket();
    let client = Client::tracked(test_rocket.rocket).expect("valid rocket instance");
    let response = client.get("/api/v1/health").dispatch();

    assert_eq!(response.status(), Status::Ok);
    let json = json_body(response);
    assert_eq!(json["status"], "ok");
}

#[test]
#[serial]
fn test_community_detail_returns_denormalized_aggregates() {
    let test_rocket = create_test_rocket();
    let db = test_rocket.database.clone();
    let client = Client::tracked(test_rocket.rocket).expect("valid rocket instance");

    let community = db
        .create_community(NewCommunity::new(
            "riskofrain2".to_string(),
            "Risk of Rain 2".to_string(),
        ))
        .expect("community");

    let response = client.get("/api/cyberstorm/community/riskofrain2").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let json = json_body(response);
    assert_eq!(json["total_download_count"], 0);
    assert_eq!(json["total_package_count"], 0);

    db.set_community_aggregates(community.id, 23, 42)
        .expect("aggregates");

    let response = client.get("/api/cyberstorm/community/riskofrain2").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let json = json_body(response);
    assert_eq!(json["name"], "Risk of Rain 2");
    assert_eq!(json["identifier"], "riskofrain2");
    assert_eq!(json["total_download_count"], 23);
    assert_eq!(json["total_package_count"], 42);
}

#[test]
#[serial]
fn test_unknown_community_returns_404() {
    let test_rocket = create_test_rocket();
    let client = Client::tracked(test_rocket.rocket).expect("valid rocket instance");

    let response = client.get("/api/cyberstorm/community/nope").dispatch();
    assert_eq!(response.status(), Status::NotFound);
}

#[test]
#[serial]
fn test_community_filters_lists_categories_and_sections() {
    let test_rocket = create_test_rocket();
    let db = test_rocket.database.clone();
    let client = Client::tracked(test_rocket.rocket).expect("valid rocket instance");

    let community = db
        .create_community(NewCommunity::new("test".to_string(), "Test".to_string()))
        .expect("community");
    db.create_category(community.id, "Mods".to_string(), "mods".to_string())
        .expect("category");
    db.create_section(community.id, "Mods".to_string(), "mods".to_string(), 10)
        .expect("section");

    let response = client.get("/api/cyberstorm/community/test/filters").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let json = json_body(response);
    assert_eq!(json["package_categories"][0]["slug"], "mods");
    assert_eq!(json["sections"][0]["priority"], 10);
}

#[test]
#[serial]
fn test_package_detail_is_served_through_cache() {
    let test_rocket = create_test_rocket();
    let db = test_rocket.database.clone();
    let cache = test_rocket.cache.clone();
    let client = Client::tracked(test_rocket.rocket).expect("valid rocket instance");

    seed_listing(&db);

    let response = client
        .get("/api/cyberstorm/package/test/TestTeam/TestMod")
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let json = json_body(response);
    assert_eq!(json["namespace"], "TestTeam");
    assert_eq!(json["name"], "TestMod");
    assert_eq!(json["community"], "test");
    assert_eq!(json["latest_version_number"], "1.0.0");

    let (hits, misses, _) = cache.stats();
    assert_eq!((hits, misses), (0, 1));

    let response = client
        .get("/api/cyberstorm/package/test/TestTeam/TestMod")
        .dispatch();
    assert_eq!(response.status(), Status::Ok);

    let (hits, misses, _) = cache.stats();
    assert_eq!((hits, misses), (1, 1));
}

#[test]
#[serial]
fn test_unknown_package_miss_is_cached() {
    let test_rocket = create_test_rocket();
    let db = test_rocket.database.clone();
    let cache = test_rocket.cache.clone();
    let client = Client::tracked(test_rocket.rocket).expect("valid rocket instance");

    seed_listing(&db);

    for _ in 0..2 {
        let response = client
            .get("/api/cyberstorm/package/test/TestTeam/Missing")
            .dispatch();
        assert_eq!(response.status(), Status::NotFound);
    }

    // Second lookup is answered from the negative cache entry.
    let (hits, misses, _) = cache.stats();
    assert_eq!((hits, misses), (1, 1));
}

#[test]
#[serial]
fn test_rejected_listing_is_not_visible() {
    let test_rocket = create_test_rocket();
    let db = test_rocket.database.clone();
    let client = Client::tracked(test_rocket.rocket).expect("valid rocket instance");

    let fixture = seed_listing(&db);

    {
        use modvault::schema::package_listings;
        let mut conn = db.get_connection().expect("connection");
        diesel::update(package_listings::table.find(fixture.listing.id))
            .set(package_listings::review_status.eq("rejected"))
            .execute(&mut conn)
            .expect("update review status");
    }

    let response = client
        .get("/api/cyberstorm/package/test/TestTeam/TestMod")
        .dispatch();
    assert_eq!(response.status(), Status::NotFound);

    let response = client.get("/api/cyberstorm/package/test").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let json = json_body(response);
    assert_eq!(json["listings"].as_array().map(Vec::len), Some(0));
}

#[test]
#[serial]
fn test_category_update_without_permission_changes_nothing() {
    let test_rocket = create_test_rocket();
    let db = test_rocket.database.clone();
    let client = Client::tracked(test_rocket.rocket).expect("valid rocket instance");

    let fixture = seed_listing(&db);
    db.create_category(fixture.community.id, "Mods".to_string(), "mods".to_string())
        .expect("category");

    // No credentials at all
    let response = client
        .post(format!(
            "/api/experimental/package-listing/{}/update",
            fixture.listing.id
        ))
        .header(ContentType::JSON)
        .body(r#"{"categories": ["mods"]}"#)
        .dispatch();
    assert_eq!(response.status(), Status::Forbidden);

    // Authenticated but not a member of the owner team
    let (_, token) = seed_user(&db, "stranger", false);
    let response = client
        .post(format!(
            "/api/experimental/package-listing/{}/update",
            fixture.listing.id
        ))
        .header(ContentType::JSON)
        .header(auth_header(&token))
        .body(r#"{"categories": ["mods"]}"#)
        .dispatch();
    assert_eq!(response.status(), Status::Forbidden);

    let categories = db
        .get_listing_categories(fixture.listing.id)
        .expect("categories");
    assert!(categories.is_empty());
}

#[test]
#[serial]
fn test_category_update_replaces_set_and_invalidates_cache() {
    let test_rocket = create_test_rocket();
    let db = test_rocket.database.clone();
    let cache = test_rocket.cache.clone();
    let client = Client::tracked(test_rocket.rocket).expect("valid rocket instance");

    let fixture = seed_listing(&db);
    db.create_category(fixture.community.id, "Mods".to_string(), "mods".to_string())
        .expect("category");
    db.create_category(
        fixture.community.id,
        "Maps".to_string(),
        "maps".to_string(),
    )
    .expect("category");

    let (user, token) = seed_user(&db, "owner", false);
    db.add_team_member(fixture.team.id, user.id, "owner")
        .expect("membership");

    // Warm the cache so the invalidation is observable.
    let response = client
        .get("/api/cyberstorm/package/test/TestTeam/TestMod")
        .dispatch();
    assert_eq!(response.status(), Status::Ok);

    let response = client
        .post(format!(
            "/api/experimental/package-listing/{}/update",
            fixture.listing.id
        ))
        .header(ContentType::JSON)
        .header(auth_header(&token))
        .body(r#"{"categories": ["mods", "maps"]}"#)
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let json = json_body(response);
    assert_eq!(json["categories"].as_array().map(Vec::len), Some(2));

    let categories = db
        .get_listing_categories(fixture.listing.id)
        .expect("categories");
    let slugs: Vec<&str> = categories.iter().map(|c| c.slug.as_str()).collect();
    assert_eq!(slugs, vec!["maps", "mods"]);

    // The cached detail was dropped; the next read recomputes and sees the
    // new category set.
    let (_, misses_before, _) = cache.stats();
    let response = client
        .get("/api/cyberstorm/package/test/TestTeam/TestMod")
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let json = json_body(response);
    assert_eq!(json["categories"].as_array().map(Vec::len), Some(2));
    let (_, misses_after, _) = cache.stats();
    assert_eq!(misses_after, misses_before + 1);
}

#[test]
#[serial]
fn test_category_update_rejects_foreign_community_category() {
    let test_rocket = create_test_rocket();
    let db = test_rocket.database.clone();
    let client = Client::tracked(test_rocket.rocket).expect("valid rocket instance");

    let fixture = seed_listing(&db);
    let other = db
        .create_community(NewCommunity::new("other".to_string(), "Other".to_string()))
        .expect("community");
    db.create_category(other.id, "Mods".to_string(), "mods".to_string())
        .expect("category");

    let (user, token) = seed_user(&db, "owner", false);
    db.add_team_member(fixture.team.id, user.id, "owner")
        .expect("membership");

    let response = client
        .post(format!(
            "/api/experimental/package-listing/{}/update",
            fixture.listing.id
        ))
        .header(ContentType::JSON)
        .header(auth_header(&token))
        .body(r#"{"categories": ["mods"]}"#)
        .dispatch();
    assert_eq!(response.status(), Status::BadRequest);
    let body = response.into_string().expect("body");
    assert!(body.contains("Community mismatch between package listing and category"));

    let categories = db
        .get_listing_categories(fixture.listing.id)
        .expect("categories");
    assert!(categories.is_empty());
}

#[test]
#[serial]
fn test_report_endpoint_always_rejects() {
    let test_rocket = create_test_rocket();
    let db = test_rocket.database.clone();
    let client = Client::tracked(test_rocket.rocket).expect("valid rocket instance");

    let fixture = seed_listing(&db);
    let (_, token) = seed_user(&db, "reporter", false);

    // Unauthenticated requests never reach the kill-switch.
    let response = client
        .post(format!(
            "/api/experimental/package-listing/{}/report",
            fixture.listing.id
        ))
        .header(ContentType::JSON)
        .body(format!(
            r#"{{"package_version_id": {}, "reason": "spam"}}"#,
            fixture.version.id
        ))
        .dispatch();
    assert_eq!(response.status(), Status::Unauthorized);

    // Unknown version is still a 404.
    let response = client
        .post(format!(
            "/api/experimental/package-listing/{}/report",
            fixture.listing.id
        ))
        .header(ContentType::JSON)
        .header(auth_header(&token))
        .body(r#"{"package_version_id": 999999, "reason": "spam"}"#)
        .dispatch();
    assert_eq!(response.status(), Status::NotFound);

    // A fully valid request is rejected with the version named.
    let response = client
        .post(format!(
            "/api/experimental/package-listing/{}/report",
            fixture.listing.id
        ))
        .header(ContentType::JSON)
        .header(auth_header(&token))
        .body(format!(
            r#"{{"package_version_id": {}, "reason": "spam"}}"#,
            fixture.version.id
        ))
        .dispatch();
    assert_eq!(response.status(), Status::Forbidden);
    let body = response.into_string().expect("body");
    assert!(body.contains("You tried to report TestTeam-TestMod-1.0.0"));

    let count = db
        .count_reports_for_version(fixture.version.id)
        .expect("count");
    assert_eq!(count, 0);
}

#[test]
#[serial]
fn test_report_package_mismatch_never_persists() {
    let test_rocket = create_test_rocket();
    let db = test_rocket.database.clone();
    let _client = Client::tracked(test_rocket.rocket).expect("valid rocket instance");

    let fixture = seed_listing(&db);

    // A version belonging to a different package than the listing's.
    let other_package = db
        .create_package(fixture.namespace.id, "OtherMod".to_string())
        .expect("package");
    let other_version = db
        .create_version(NewPackageVersion::new(
            other_package.id,
            &fixture.namespace.name,
            &other_package.name,
            "1.0.0".to_string(),
        ))
        .expect("version");

    let (user, _) = seed_user(&db, "reporter", false);
    let reason = db.create_report_reason("Spam".to_string()).expect("reason");

    let result = db.create_report(NewPackageReport::new(
        Some(fixture.listing.id),
        other_version.id,
        reason.id,
        None,
        user.id,
    ));

    match result {
        Err(ReportSaveError::Validation(message)) => {
            assert_eq!(message, "Package mismatch!");
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    let count = db
        .count_reports_for_version(other_version.id)
        .expect("count");
    assert_eq!(count, 0);
}

#[test]
#[serial]
fn test_wiki_page_lifecycle() {
    let test_rocket = create_test_rocket();
    let db = test_rocket.database.clone();
    let client = Client::tracked(test_rocket.rocket).expect("valid rocket instance");

    let fixture = seed_listing(&db);
    let (user, token) = seed_user(&db, "author", false);
    db.add_team_member(fixture.team.id, user.id, "member")
        .expect("membership");

    // No wiki exists until the first write.
    let response = client
        .get("/api/experimental/package/TestTeam/TestMod/wiki")
        .dispatch();
    assert_eq!(response.status(), Status::NotFound);

    // Upsert without an id creates a page.
    let response = client
        .post("/api/experimental/package/TestTeam/TestMod/wiki")
        .header(ContentType::JSON)
        .header(auth_header(&token))
        .body(r##"{"title": "Getting Started", "markdown_content": "# Hello"}"##)
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let json = json_body(response);
    let page_id = json["id"].as_i64().expect("page id");
    assert_eq!(json["slug"], "getting-started");

    let wiki = db
        .get_wiki_for_package(fixture.package.id)
        .expect("wiki lookup")
        .expect("wiki created lazily");
    let page = db
        .get_wiki_page(wiki.id, page_id as i32)
        .expect("page lookup")
        .expect("page exists");
    assert_eq!(page.title, "Getting Started");

    // Upsert with the id mutates the same page instead of creating another.
    let response = client
        .post("/api/experimental/package/TestTeam/TestMod/wiki")
        .header(ContentType::JSON)
        .header(auth_header(&token))
        .body(format!(
            r##"{{"id": {page_id}, "title": "Setup", "markdown_content": "# Updated"}}"##
        ))
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let json = json_body(response);
    assert_eq!(json["id"].as_i64(), Some(page_id));
    assert_eq!(json["title"], "Setup");

    let response = client
        .get("/api/experimental/package/TestTeam/TestMod/wiki")
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let json = json_body(response);
    assert_eq!(json["pages"].as_array().map(Vec::len), Some(1));

    // Upserting with an id that does not exist in the wiki is a 404.
    let response = client
        .post("/api/experimental/package/TestTeam/TestMod/wiki")
        .header(ContentType::JSON)
        .header(auth_header(&token))
        .body(r#"{"id": 999999, "title": "Ghost", "markdown_content": "nope"}"#)
        .dispatch();
    assert_eq!(response.status(), Status::NotFound);

    // Deleting an unknown page is a 404, a known one succeeds.
    let response = client
        .delete("/api/experimental/package/TestTeam/TestMod/wiki")
        .header(ContentType::JSON)
        .header(auth_header(&token))
        .body(r#"{"id": 999999}"#)
        .dispatch();
    assert_eq!(response.status(), Status::NotFound);

    let response = client
        .delete("/api/experimental/package/TestTeam/TestMod/wiki")
        .header(ContentType::JSON)
        .header(auth_header(&token))
        .body(format!(r#"{{"id": {page_id}}}"#))
        .dispatch();
    assert_eq!(response.status(), Status::Ok);

    let wiki = db
        .get_wiki_for_package(fixture.package.id)
        .expect("wiki")
        .expect("wiki exists");
    assert!(db.get_wiki_pages(wiki.id).expect("pages").is_empty());
}

#[test]
#[serial]
fn test_wiki_write_requires_team_membership() {
    let test_rocket = create_test_rocket();
    let db = test_rocket.database.clone();
    let client = Client::tracked(test_rocket.rocket).expect("valid rocket instance");

    let fixture = seed_listing(&db);
    let (_, token) = seed_user(&db, "stranger", false);

    let response = client
        .post("/api/experimental/package/TestTeam/TestMod/wiki")
        .header(ContentType::JSON)
        .header(auth_header(&token))
        .body(r#"{"title": "Intrusion", "markdown_content": "nope"}"#)
        .dispatch();
    assert_eq!(response.status(), Status::Forbidden);

    assert!(
        db.get_wiki_for_package(fixture.package.id)
            .expect("wiki lookup")
            .is_none()
    );
}

#[test]
#[serial]
fn test_wiki_page_validation() {
    let test_rocket = create_test_rocket();
    let db = test_rocket.database.clone();
    let client = Client::tracked(test_rocket.rocket).expect("valid rocket instance");

    let fixture = seed_listing(&db);
    let (user, token) = seed_user(&db, "author", false);
    db.add_team_member(fixture.team.id, user.id, "member")
        .expect("membership");

    let response = client
        .post("/api/experimental/package/TestTeam/TestMod/wiki")
        .header(ContentType::JSON)
        .header(auth_header(&token))
        .body(r#"{"title": "   ", "markdown_content": "content"}"#)
        .dispatch();
    assert_eq!(response.status(), Status::BadRequest);
}

#[test]
#[serial]
fn test_team_endpoints_enforce_membership() {
    let test_rocket = create_test_rocket();
    let db = test_rocket.database.clone();
    let client = Client::tracked(test_rocket.rocket).expect("valid rocket instance");

    let fixture = seed_listing(&db);
    let (member, member_token) = seed_user(&db, "alice", false);
    db.add_team_member(fixture.team.id, member.id, "owner")
        .expect("membership");
    let (_, stranger_token) = seed_user(&db, "bob", false);

    let response = client.get("/api/cyberstorm/team/TestTeam").dispatch();
    assert_eq!(response.status(), Status::Unauthorized);

    let response = client
        .get("/api/cyberstorm/team/TestTeam")
        .header(auth_header(&stranger_token))
        .dispatch();
    assert_eq!(response.status(), Status::Forbidden);

    let response = client
        .get("/api/cyberstorm/team/TestTeam")
        .header(auth_header(&member_token))
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let json = json_body(response);
    assert_eq!(json["name"], "TestTeam");

    let response = client
        .get("/api/cyberstorm/team/TestTeam/members")
        .header(auth_header(&member_token))
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let json = json_body(response);
    assert_eq!(json["members"][0]["username"], "alice");
    assert_eq!(json["members"][0]["role"], "owner");

    db.create_service_account(fixture.team.id, "deploy-bot".to_string())
        .expect("service account");
    let response = client
        .get("/api/cyberstorm/team/TestTeam/service-accounts")
        .header(auth_header(&member_token))
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let json = json_body(response);
    assert_eq!(json["service_accounts"][0]["name"], "deploy-bot");
}

#[test]
#[serial]
fn test_add_team_member_requires_owner_role() {
    let test_rocket = create_test_rocket();
    let db = test_rocket.database.clone();
    let client = Client::tracked(test_rocket.rocket).expect("valid rocket instance");

    let fixture = seed_listing(&db);
    let (owner, owner_token) = seed_user(&db, "alice", false);
    db.add_team_member(fixture.team.id, owner.id, "owner")
        .expect("membership");
    let (plain, plain_token) = seed_user(&db, "bob", false);
    db.add_team_member(fixture.team.id, plain.id, "member")
        .expect("membership");
    seed_user(&db, "carol", false);

    // A plain member may not manage membership.
    let response = client
        .post("/api/cyberstorm/team/TestTeam/members/add")
        .header(ContentType::JSON)
        .header(auth_header(&plain_token))
        .body(r#"{"username": "carol", "role": "member"}"#)
        .dispatch();
    assert_eq!(response.status(), Status::Forbidden);

    // Invalid role values are rejected up front.
    let response = client
        .post("/api/cyberstorm/team/TestTeam/members/add")
        .header(ContentType::JSON)
        .header(auth_header(&owner_token))
        .body(r#"{"username": "carol", "role": "admin"}"#)
        .dispatch();
    assert_eq!(response.status(), Status::BadRequest);

    let response = client
        .post("/api/cyberstorm/team/TestTeam/members/add")
        .header(ContentType::JSON)
        .header(auth_header(&owner_token))
        .body(r#"{"username": "carol", "role": "member"}"#)
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let json = json_body(response);
    assert_eq!(json["username"], "carol");
    assert_eq!(json["role"], "member");

    // Adding the same user twice conflicts.
    let response = client
        .post("/api/cyberstorm/team/TestTeam/members/add")
        .header(ContentType::JSON)
        .header(auth_header(&owner_token))
        .body(r#"{"username": "carol", "role": "member"}"#)
        .dispatch();
    assert_eq!(response.status(), Status::Conflict);
}

#[test]
#[serial]
fn test_experimental_community_pagination_envelope() {
    let test_rocket = create_test_rocket();
    let db = test_rocket.database.clone();
    let client = Client::tracked(test_rocket.rocket).expect("valid rocket instance");

    for i in 0..3 {
        db.create_community(NewCommunity::new(format!("community-{i}"), format!("C{i}")))
            .expect("community");
    }

    let response = client.get("/api/experimental/community").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let json = json_body(response);
    assert_eq!(json["results"].as_array().map(Vec::len), Some(3));
    assert!(json["pagination"]["next_link"].is_null());
    assert!(json["pagination"]["previous_link"].is_null());
}

#[test]
#[serial]
fn test_experimental_category_pagination() {
    let test_rocket = create_test_rocket();
    let db = test_rocket.database.clone();
    let client = Client::tracked(test_rocket.rocket).expect("valid rocket instance");

    let community = db
        .create_community(NewCommunity::new("test".to_string(), "Test".to_string()))
        .expect("community");
    db.create_category(community.id, "Mods".to_string(), "mods".to_string())
        .expect("category");
    db.create_category(community.id, "Maps".to_string(), "maps".to_string())
        .expect("category");

    let response = client
        .get("/api/experimental/community/test/category")
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let json = json_body(response);
    assert_eq!(json["results"].as_array().map(Vec::len), Some(2));
    assert!(json["pagination"]["next_link"].is_null());

    let response = client
        .get("/api/experimental/community/nope/category")
        .dispatch();
    assert_eq!(response.status(), Status::NotFound);

    let response = client
        .get("/api/experimental/community/test/category?cursor=not-a-cursor")
        .dispatch();
    assert_eq!(response.status(), Status::BadRequest);
}

#[test]
#[serial]
fn test_current_community_resolves_host_header() {
    let test_rocket = create_test_rocket();
    let db = test_rocket.database.clone();
    let client = Client::tracked(test_rocket.rocket).expect("valid rocket instance");

    let community = db
        .create_community(NewCommunity::new("test".to_string(), "Test".to_string()))
        .expect("community");
    db.create_community_site(community.id, "mods.example.org".to_string())
        .expect("site");

    let response = client
        .get("/api/experimental/current-community")
        .header(Header::new("Host", "mods.example.org"))
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let json = json_body(response);
    assert_eq!(json["identifier"], "test");

    let response = client
        .get("/api/experimental/current-community")
        .header(Header::new("Host", "unknown.example.org"))
        .dispatch();
    assert_eq!(response.status(), Status::NotFound);
}

#[test]
#[serial]
fn test_readme_changelog_and_versions() {
    let test_rocket = create_test_rocket();
    let db = test_rocket.database.clone();
    let client = Client::tracked(test_rocket.rocket).expect("valid rocket instance");

    let fixture = seed_listing(&db);

    let mut new_version = NewPackageVersion::new(
        fixture.package.id,
        &fixture.namespace.name,
        &fixture.package.name,
        "1.1.0".to_string(),
    );
    new_version.readme = "# TestMod".to_string();
    new_version.changelog = Some("## 1.1.0".to_string());
    db.create_version(new_version).expect("version");

    // Latest version wins when no version number is given.
    let response = client
        .get("/api/cyberstorm/readme/TestTeam/TestMod")
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let json = json_body(response);
    assert_eq!(json["version_number"], "1.1.0");
    assert_eq!(json["markdown"], "# TestMod");

    let response = client
        .get("/api/cyberstorm/changelog/TestTeam/TestMod/1.1.0")
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let json = json_body(response);
    assert_eq!(json["markdown"], "## 1.1.0");

    // The first version has no changelog.
    let response = client
        .get("/api/cyberstorm/changelog/TestTeam/TestMod/1.0.0")
        .dispatch();
    assert_eq!(response.status(), Status::NotFound);

    let response = client
        .get("/api/cyberstorm/changelog/TestTeam/TestMod/9.9.9")
        .dispatch();
    assert_eq!(response.status(), Status::NotFound);

    let response = client
        .get("/api/cyberstorm/versions/TestTeam/TestMod")
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let json = json_body(response);
    assert_eq!(json["versions"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["versions"][0]["version_number"], "1.1.0");
}

#[test]
#[serial]
fn test_dependants_endpoint() {
    let test_rocket = create_test_rocket();
    let db = test_rocket.database.clone();
    let client = Client::tracked(test_rocket.rocket).expect("valid rocket instance");

    let fixture = seed_listing(&db);

    // A second package depending on the fixture package's version.
    let dependant = db
        .create_package(fixture.namespace.id, "AddOn".to_string())
        .expect("package");
    let dependant_version = db
        .create_version(NewPackageVersion::new(
            dependant.id,
            &fixture.namespace.name,
            "AddOn",
            "0.1.0".to_string(),
        ))
        .expect("version");
    db.add_version_dependency(dependant_version.id, fixture.version.id)
        .expect("dependency");
    db.create_listing(dependant.id, fixture.community.id)
        .expect("listing");

    let response = client
        .get("/api/cyberstorm/package/test/TestTeam/TestMod/dependants")
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let json = json_body(response);
    assert_eq!(json["listings"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["listings"][0]["name"], "AddOn");
}

#[test]
#[serial]
fn test_revoked_token_is_rejected() {
    let test_rocket = create_test_rocket();
    let db = test_rocket.database.clone();
    let client = Client::tracked(test_rocket.rocket).expect("valid rocket instance");

    seed_listing(&db);
    let (_, token) = seed_user(&db, "alice", true);

    let response = client
        .get("/api/cyberstorm/team/TestTeam")
        .header(auth_header(&token))
        .dispatch();
    assert_eq!(response.status(), Status::Ok);

    modvault::services::AuthService::revoke_token(&db, &token).expect("revoke");

    let response = client
        .get("/api/cyberstorm/team/TestTeam")
        .header(auth_header(&token))
        .dispatch();
    assert_eq!(response.status(), Status::Unauthorized);
}

#[test]
#[serial]
fn test_deactivated_listing_disappears_from_reads() {
    let test_rocket = create_test_rocket();
    let db = test_rocket.database.clone();
    let client = Client::tracked(test_rocket.rocket).expect("valid rocket instance");

    let fixture = seed_listing(&db);

    db.deactivate_listing(fixture.listing.id).expect("deactivate");

    let response = client
        .get("/api/cyberstorm/package/test/TestTeam/TestMod")
        .dispatch();
    assert_eq!(response.status(), Status::NotFound);

    let response = client.get("/api/cyberstorm/package/test").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let json = json_body(response);
    assert_eq!(json["listings"].as_array().map(Vec::len), Some(0));
}

#[test]
#[serial]
fn test_valid_report_persists_at_database_layer() {
    // Report intake is disabled at the HTTP layer, but the save path itself
    // accepts consistent reports.
    let test_rocket = create_test_rocket();
    let db = test_rocket.database.clone();
    let _client = Client::tracked(test_rocket.rocket).expect("valid rocket instance");

    let fixture = seed_listing(&db);
    let (user, _) = seed_user(&db, "reporter", false);
    let reason = db.create_report_reason("Spam".to_string()).expect("reason");

    let reasons = db.get_active_report_reasons().expect("reasons");
    assert_eq!(reasons.len(), 1);
    assert_eq!(reasons[0].label, "Spam");

    let report = db
        .create_report(NewPackageReport::new(
            Some(fixture.listing.id),
            fixture.version.id,
            reason.id,
            Some("Not a real mod".to_string()),
            user.id,
        ))
        .expect("report");

    assert_eq!(
        db.count_reports_for_version(fixture.version.id)
            .expect("count"),
        1
    );

    db.deactivate_report(report.id).expect("deactivate");
    assert_eq!(
        db.count_reports_for_version(fixture.version.id)
            .expect("count"),
        0
    );
}

#[test]
#[serial]
fn test_aggregate_refresh_recomputes_counts() {
    let test_rocket = create_test_rocket();
    let db = test_rocket.database.clone();
    let _client = Client::tracked(test_rocket.rocket).expect("valid rocket instance");

    let fixture = seed_listing(&db);

    {
        use modvault::schema::package_versions;
        let mut conn = db.get_connection().expect("connection");
        diesel::update(package_versions::table.find(fixture.version.id))
            .set(package_versions::downloads.eq(23_i64))
            .execute(&mut conn)
            .expect("set downloads");
    }

    modvault::services::aggregates::refresh_community_aggregates(&db).expect("refresh");

    let community = db
        .get_community_by_identifier("test")
        .expect("lookup")
        .expect("community");
    assert_eq!(community.total_download_count, 23);
    assert_eq!(community.total_package_count, 1);
}
