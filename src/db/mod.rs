use rusqlite::{
  params,
  Connection,
  OptionalExtension,
  Row,
  Transaction,
  TransactionBehavior
};
use std::time::Duration;
pub mod entities;
mod helpers;
mod mappers;
use eyre::WrapErr;
use color_eyre::Result;
use derive_more::Display;
use lazy_static::lazy_static;
use entities::*;
use mappers::map_article;
use crate::config::SlugPolicy;

// Type alias to make function signatures much clearer:
pub type Pool = r2d2::Pool<r2d2_sqlite::SqliteConnectionManager>;

// How long a writer waits for another connection's write
// transaction before giving up with "database is locked".
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub enum Order {
  Asc,
  Desc
}

impl Order {
  fn as_sql(&self) -> &'static str {
    match self {
      Order::Asc => "ASC",
      Order::Desc => "DESC"
    }
  }
}

// Returned inside the eyre Report when the slug policy
// refuses a write. The HTTP layer downcasts it into a 409.
#[derive(Debug, Display)]
#[display(fmt = "Slug already exists: {}", _0)]
pub struct SlugConflict(pub String);

impl std::error::Error for SlugConflict {}

const ARTICLE_FIELDS: &str = "id, title, slug, content_html, \
  meta_description, keywords, featured_image, status, category, \
  scheduled_at, created_at";

// Fields written by inserts, in bind order.
const INSERT_FIELDS: [&str; 10] = [
  "title", "slug", "content_html", "meta_description", "keywords",
  "featured_image", "status", "category", "scheduled_at", "created_at"
];

// created_at is never touched by updates.
const UPDATE_FIELDS: [&str; 9] = [
  "title", "slug", "content_html", "meta_description", "keywords",
  "featured_image", "status", "category", "scheduled_at"
];

lazy_static! {
  static ref INSERT_QUERY: String = format!(
    "INSERT INTO articles ({}) VALUES ({})",
    INSERT_FIELDS.join(", "),
    helpers::generate_placeholders(INSERT_FIELDS.len())
  );
  static ref UPDATE_QUERY: String = format!(
    "UPDATE articles SET {} WHERE {}",
    helpers::generate_set_clause(&UPDATE_FIELDS),
    helpers::generate_field_equal_qmark("id")
  );
}

const SCHEMA: &str = "
  CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    slug TEXT NOT NULL,
    content_html TEXT,
    meta_description TEXT,
    keywords TEXT,
    featured_image TEXT,
    status TEXT NOT NULL DEFAULT 'Draft',
    category TEXT,
    scheduled_at TEXT,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
  );
  CREATE INDEX IF NOT EXISTS idx_articles_slug ON articles (slug);
  CREATE INDEX IF NOT EXISTS idx_articles_created_at ON articles (created_at);
";

/**
 * All DB access is synchronous, handlers call these
 * directly with the pool from the app state.
 */

pub fn init_schema(pool: &Pool) -> Result<()> {
  let conn = pool.get()?;
  conn.execute_batch(SCHEMA)
    .context("Creating articles schema")
}

// Writes read the table (slug checks) before writing to
// it. A deferred transaction would only take the write
// lock at the first write, and SQLite fails a reader that
// tries to upgrade while another connection writes. Taking
// the lock upfront makes competing writers queue on the
// busy timeout instead.
fn begin_write(conn: &mut Connection) -> Result<Transaction<'_>> {
  conn.transaction_with_behavior(TransactionBehavior::Immediate)
    .context("Starting write transaction")
}

fn select_many<T, P, F>(
  pool: &Pool,
  query: &str,
  params: P,
  mapper: F
) -> Result<Vec<T>>
  where
    P: rusqlite::Params,
    F: FnMut(&Row<'_>) -> Result<T, rusqlite::Error>,
{
  let conn = pool.get()?;
  let mut stmt = conn.prepare(query)?;
  let rows = stmt.query_map(params, mapper)
    .and_then(Iterator::collect)
    .context("Generic select_many query");
  rows
}

// Ties on created_at are common with imported data, the
// id keeps the order stable.
pub fn all_articles(
  pool: &Pool,
  order: Order
) -> Result<Vec<Article>> {
  select_many(
    pool,
    &format!(
      "SELECT {} FROM articles ORDER BY created_at {}, id {}",
      ARTICLE_FIELDS,
      order.as_sql(),
      order.as_sql()
    ),
    [],
    map_article
  )
}

// Slugs aren't necessarily unique (see SlugPolicy::Allow),
// the oldest row wins.
pub fn article_by_slug(
  pool: &Pool,
  slug: &str
) -> Result<Option<Article>> {
  let conn = pool.get()?;
  conn.query_row(
    &format!(
      "SELECT {} FROM articles WHERE slug = ? ORDER BY id ASC LIMIT 1",
      ARTICLE_FIELDS
    ),
    params![slug],
    map_article
  )
    .optional()
    .context("Fetching article by slug")
}

pub fn article_count(pool: &Pool) -> Result<i64> {
  let conn = pool.get()?;
  let count: i64 = conn.query_row(
    "SELECT count(*) FROM articles",
    [],
    |row| row.get(0)
  )?;
  Ok(count)
}

// Returns the slug the article was actually stored with.
pub fn insert_article(
  pool: &Pool,
  article: &ArticleInsert,
  policy: SlugPolicy
) -> Result<String> {
  let mut conn = pool.get()?;
  let tx = begin_write(&mut conn)?;
  let slug = insert_in_tx(&tx, article, policy)?;
  tx.commit().context("Committing article insert")?;
  Ok(slug)
}

/**
 * Inserts all of the articles or none of them. Dropping
 * the transaction without committing rolls it back, so
 * any error on the way leaves the table untouched.
 *
 * The returned slugs are the rows the batch left in the
 * table. With the overwrite policy a later element can
 * replace an earlier one from the same batch, that one
 * isn't counted anymore.
 */
pub fn insert_articles(
  pool: &Pool,
  articles: &[ArticleInsert],
  policy: SlugPolicy
) -> Result<Vec<String>> {
  let mut conn = pool.get()?;
  let tx = begin_write(&mut conn)?;
  let mut slugs: Vec<String> = Vec::with_capacity(articles.len());
  for article in articles {
    let slug = insert_in_tx(&tx, article, policy)?;
    if policy == SlugPolicy::Overwrite {
      slugs.retain(|s| s != &slug);
    }
    slugs.push(slug);
  }
  tx.commit().context("Committing article batch")?;
  Ok(slugs)
}

/**
 * Replaces the editable fields of the article currently
 * found under `slug`. Returns None when there's no such
 * article, the new slug otherwise.
 */
pub fn update_article(
  pool: &Pool,
  slug: &str,
  article: &ArticleInsert,
  policy: SlugPolicy
) -> Result<Option<String>> {
  let mut conn = pool.get()?;
  let tx = begin_write(&mut conn)?;
  let id = match article_id_by_slug(&tx, slug)? {
    Some(id) => id,
    None => return Ok(None)
  };
  let new_slug = claim_slug(&tx, &article.slug, policy, Some(id))?;
  tx.execute(
    UPDATE_QUERY.as_str(),
    params![
      article.title,
      new_slug,
      article.content_html,
      article.meta_description,
      article.keywords,
      article.featured_image,
      article.status,
      article.category,
      article.scheduled_at,
      id
    ]
  ).context("Updating article")?;
  tx.commit().context("Committing article update")?;
  Ok(Some(new_slug))
}

// Returns the amount of deleted rows.
pub fn delete_article(
  pool: &Pool,
  slug: &str
) -> Result<usize> {
  let conn = pool.get()?;
  conn.execute(
    "DELETE FROM articles WHERE slug = ?",
    params![slug]
  ).context("Deleting article")
}

fn insert_in_tx(
  tx: &Transaction,
  article: &ArticleInsert,
  policy: SlugPolicy
) -> Result<String> {
  let slug = claim_slug(tx, &article.slug, policy, None)?;
  tx.execute(
    INSERT_QUERY.as_str(),
    params![
      article.title,
      slug,
      article.content_html,
      article.meta_description,
      article.keywords,
      article.featured_image,
      article.status,
      article.category,
      article.scheduled_at,
      article.created_at
    ]
  ).context("Inserting article")?;
  Ok(slug)
}

fn article_id_by_slug(
  conn: &Connection,
  slug: &str
) -> Result<Option<i64>> {
  conn.query_row(
    "SELECT id FROM articles WHERE slug = ? ORDER BY id ASC LIMIT 1",
    params![slug],
    |row| row.get(0)
  )
    .optional()
    .context("Fetching article id by slug")
}

// `own_id` is the article being updated, it doesn't
// count as a holder of its own slug.
fn slug_taken(
  conn: &Connection,
  slug: &str,
  own_id: Option<i64>
) -> Result<bool> {
  let taken: bool = conn.query_row(
    "SELECT EXISTS(SELECT 1 FROM articles WHERE slug = ?1 AND id IS NOT ?2)",
    params![slug, own_id],
    |row| row.get(0)
  )?;
  Ok(taken)
}

/**
 * Applies the slug policy and returns the slug to write.
 * Has to run in the same transaction as the write that
 * follows it.
 */
fn claim_slug(
  tx: &Transaction,
  slug: &str,
  policy: SlugPolicy,
  own_id: Option<i64>
) -> Result<String> {
  match policy {
    SlugPolicy::Allow => Ok(slug.to_string()),
    SlugPolicy::Reject => {
      if slug_taken(tx, slug, own_id)? {
        Err(SlugConflict(slug.to_string()).into())
      } else {
        Ok(slug.to_string())
      }
    },
    SlugPolicy::Suffix => {
      let mut candidate = slug.to_string();
      let mut n: u32 = 2;
      while slug_taken(tx, &candidate, own_id)? {
        candidate = format!("{}-{}", slug, n);
        n += 1;
      }
      Ok(candidate)
    },
    SlugPolicy::Overwrite => {
      tx.execute(
        "DELETE FROM articles WHERE slug = ?1 AND id IS NOT ?2",
        params![slug, own_id]
      ).context("Overwriting articles holding the slug")?;
      Ok(slug.to_string())
    }
  }
}
