use super::connection::{DbPool, get_connection_with_retry, pool_error};
use crate::models::wiki::*;
use crate::schema::{package_wikis, wiki_pages, wikis};
use diesel::prelude::*;

/// Wiki and wiki page database operations
pub struct WikiOperations<'a> {
    pool: &'a DbPool,
}

impl<'a> WikiOperations<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    pub fn get_wiki_for_package(
        &self,
        package_id: i32,
    ) -> Result<Option<Wiki>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        let package_wiki = package_wikis::table
            .filter(package_wikis::package_id.eq(package_id))
            .first::<PackageWiki>(&mut conn)
            .optional()?;

        match package_wiki {
            Some(package_wiki) => wikis::table
                .find(package_wiki.wiki_id)
                .first::<Wiki>(&mut conn)
                .optional(),
            None => Ok(None),
        }
    }

    /// The wiki attached to the package, created lazily on first write.
    pub fn get_or_create_wiki_for_package(
        &self,
        package_id: i32,
    ) -> Result<Wiki, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        conn.transaction::<Wiki, diesel::result::Error, _>(|conn| {
            let existing = package_wikis::table
                .filter(package_wikis::package_id.eq(package_id))
                .first::<PackageWiki>(conn)
                .optional()?;

            if let Some(package_wiki) = existing {
                return wikis::table.find(package_wiki.wiki_id).first::<Wiki>(conn);
            }

            let wiki = diesel::insert_into(wikis::table)
                .values(&NewWiki::new())
                .get_result::<Wiki>(conn)?;

            diesel::insert_into(package_wikis::table)
                .values(&NewPackageWiki {
                    package_id,
                    wiki_id: wiki.id,
                })
                .execute(conn)?;

            Ok(wiki)
        })
    }

    pub fn get_wiki_pages(&self, wiki_id: i32) -> Result<Vec<WikiPage>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        wiki_pages::table
            .filter(wiki_pages::wiki_id.eq(wiki_id))
            .order(wiki_pages::title.asc())
            .load::<WikiPage>(&mut conn)
    }

    pub fn get_wiki_page(
        &self,
        wiki_id: i32,
        page_id: i32,
    ) -> Result<Option<WikiPage>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        wiki_pages::table
            .find(page_id)
            .filter(wiki_pages::wiki_id.eq(wiki_id))
            .first::<WikiPage>(&mut conn)
            .optional()
    }

    /// Creates a page, or overwrites title and content of an existing page
    /// when `page_id` is given. Returns `NotFound` when the page id does not
    /// exist within the wiki.
    pub fn upsert_wiki_page(
        &self,
        wiki_id: i32,
        page_id: Option<i32>,
        title: String,
        markdown_content: String,
    ) -> Result<WikiPage, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        conn.transaction::<WikiPage, diesel::result::Error, _>(|conn| {
            let now = chrono::Utc::now().naive_utc();

            let page = match page_id {
                Some(page_id) => {
                    // Scope the update to the wiki so a page id from another
                    // wiki cannot be touched.
                    let updated = diesel::update(
                        wiki_pages::table
                            .find(page_id)
                            .filter(wiki_pages::wiki_id.eq(wiki_id)),
                    )
                    .set(&UpdateWikiPage {
                        title,
                        markdown_content,
                        datetime_updated: now,
                    })
                    .execute(conn)?;

                    if updated == 0 {
                        return Err(diesel::result::Error::NotFound);
                    }

                    wiki_pages::table.find(page_id).first::<WikiPage>(conn)?
                }
                None => diesel::insert_into(wiki_pages::table)
                    .values(&NewWikiPage::new(wiki_id, title, markdown_content))
                    .get_result::<WikiPage>(conn)?,
            };

            diesel::update(wikis::table.find(wiki_id))
                .set(wikis::datetime_updated.eq(now))
                .execute(conn)?;

            Ok(page)
        })
    }

    /// Deletes a page by id within the wiki; `NotFound` when absent.
    pub fn delete_wiki_page(
        &self,
        wiki_id: i32,
        page_id: i32,
    ) -> Result<(), diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        let deleted = diesel::delete(
            wiki_pages::table
                .find(page_id)
                .filter(wiki_pages::wiki_id.eq(wiki_id)),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(diesel::result::Error::NotFound);
        }

        Ok(())
    }
}
