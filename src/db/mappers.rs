use super::entities::*;
use rusqlite::{Row, Error};

// Column order is the one from ARTICLE_FIELDS.
pub fn map_article(row: &Row) -> Result<Article, Error> {
  Ok(Article {
    id: row.get(0)?,
    title: row.get(1)?,
    slug: row.get(2)?,
    content_html: row.get(3)?,
    meta_description: row.get(4)?,
    keywords: row.get(5)?,
    featured_image: row.get(6)?,
    status: row.get(7)?,
    category: row.get(8)?,
    scheduled_at: row.get(9)?,
    created_at: row.get(10)?
  })
}
