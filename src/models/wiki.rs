use crate::schema::{package_wikis, wiki_pages, wikis};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use rocket::serde::{Deserialize, Serialize};

pub const MAX_WIKI_TITLE_LENGTH: usize = 512;
pub const MAX_MARKDOWN_SIZE: usize = 100_000;

#[derive(Queryable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = wikis)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Wiki {
    pub id: i32,
    pub datetime_created: NaiveDateTime,
    pub datetime_updated: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = wikis)]
pub struct NewWiki {
    pub datetime_created: NaiveDateTime,
    pub datetime_updated: NaiveDateTime,
}

impl NewWiki {
    pub fn new() -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            datetime_created: now,
            datetime_updated: now,
        }
    }
}

impl Default for NewWiki {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Queryable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = wiki_pages)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WikiPage {
    pub id: i32,
    pub wiki_id: i32,
    pub title: String,
    pub markdown_content: String,
    pub datetime_created: NaiveDateTime,
    pub datetime_updated: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = wiki_pages)]
pub struct NewWikiPage {
    pub wiki_id: i32,
    pub title: String,
    pub markdown_content: String,
    pub datetime_created: NaiveDateTime,
    pub datetime_updated: NaiveDateTime,
}

impl NewWikiPage {
    pub fn new(wiki_id: i32, title: String, markdown_content: String) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            wiki_id,
            title,
            markdown_content,
            datetime_created: now,
            datetime_updated: now,
        }
    }
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = wiki_pages)]
pub struct UpdateWikiPage {
    pub title: String,
    pub markdown_content: String,
    pub datetime_updated: NaiveDateTime,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = package_wikis)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PackageWiki {
    pub id: i32,
    pub package_id: i32,
    pub wiki_id: i32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = package_wikis)]
pub struct NewPackageWiki {
    pub package_id: i32,
    pub wiki_id: i32,
}

// Request/Response models for the wiki API

#[derive(Deserialize, Debug)]
pub struct WikiPageUpsertRequest {
    pub id: Option<i32>,
    pub title: String,
    pub markdown_content: String,
}

#[derive(Deserialize, Debug)]
pub struct WikiPageDeleteRequest {
    pub id: i32,
}

#[derive(Serialize, Debug)]
pub struct WikiPageResponse {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub markdown_content: String,
    pub datetime_created: NaiveDateTime,
    pub datetime_updated: NaiveDateTime,
}

impl From<&WikiPage> for WikiPageResponse {
    fn from(page: &WikiPage) -> Self {
        Self {
            id: page.id,
            title: page.title.clone(),
            slug: slugify(&page.title),
            markdown_content: page.markdown_content.clone(),
            datetime_created: page.datetime_created,
            datetime_updated: page.datetime_updated,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct WikiPageIndexResponse {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub datetime_created: NaiveDateTime,
    pub datetime_updated: NaiveDateTime,
}

impl From<&WikiPage> for WikiPageIndexResponse {
    fn from(page: &WikiPage) -> Self {
        Self {
            id: page.id,
            title: page.title.clone(),
            slug: slugify(&page.title),
            datetime_created: page.datetime_created,
            datetime_updated: page.datetime_updated,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct WikiResponse {
    pub id: i32,
    pub datetime_created: NaiveDateTime,
    pub datetime_updated: NaiveDateTime,
    pub pages: Vec<WikiPageIndexResponse>,
}

pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut previous_dash = true;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            previous_dash = false;
        } else if !previous_dash {
            slug.push('-');
            previous_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

pub fn validate_wiki_page(title: &str, markdown_content: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Page title cannot be empty".to_string());
    }
    if title.len() > MAX_WIKI_TITLE_LENGTH {
        return Err(format!(
            "Page title cannot be longer than {MAX_WIKI_TITLE_LENGTH} characters"
        ));
    }
    if markdown_content.trim().is_empty() {
        return Err("Page content cannot be empty".to_string());
    }
    if markdown_content.len() > MAX_MARKDOWN_SIZE {
        return Err(format!(
            "Page content cannot be larger than {MAX_MARKDOWN_SIZE} bytes"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Getting Started"), "getting-started");
        assert_eq!(slugify("  FAQ & Tips!  "), "faq-tips");
        assert_eq!(slugify("already-slugged"), "already-slugged");
    }

    #[test]
    fn test_validate_wiki_page() {
        assert!(validate_wiki_page("Title", "content").is_ok());
        assert!(validate_wiki_page("", "content").is_err());
        assert!(validate_wiki_page("Title", "  ").is_err());
        assert!(validate_wiki_page(&"x".repeat(513), "content").is_err());
    }
}
