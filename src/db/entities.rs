use derive_more::Display;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use std::str::FromStr;

// Publication states the admin client knows about.
// Stored as their display name in the status column.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ArticleStatus {
  #[display(fmt = "Draft")]
  Draft,
  #[display(fmt = "Published")]
  Published,
  #[display(fmt = "Scheduled")]
  Scheduled
}

impl Default for ArticleStatus {
  fn default() -> Self {
    ArticleStatus::Draft
  }
}

impl ArticleStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      ArticleStatus::Draft => "Draft",
      ArticleStatus::Published => "Published",
      ArticleStatus::Scheduled => "Scheduled"
    }
  }
}

#[derive(Debug, Display, PartialEq)]
#[display(fmt = "Unknown article status: {}", _0)]
pub struct UnknownStatus(pub String);

impl std::error::Error for UnknownStatus {}

impl FromStr for ArticleStatus {
  type Err = UnknownStatus;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Draft" => Ok(ArticleStatus::Draft),
      "Published" => Ok(ArticleStatus::Published),
      "Scheduled" => Ok(ArticleStatus::Scheduled),
      other => Err(UnknownStatus(other.to_string()))
    }
  }
}

impl ToSql for ArticleStatus {
  fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
    Ok(ToSqlOutput::from(self.as_str()))
  }
}

// A row written by something else than this API could
// hold any string, which surfaces as a storage error.
impl FromSql for ArticleStatus {
  fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
    value.as_str()?
      .parse()
      .map_err(|e| FromSqlError::Other(Box::new(e)))
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Article {
  pub id: i64,
  pub title: String,
  pub slug: String,
  pub content_html: Option<String>,
  pub meta_description: Option<String>,
  pub keywords: Option<String>,
  pub featured_image: Option<String>,
  pub status: ArticleStatus,
  pub category: Option<String>,
  pub scheduled_at: Option<String>,
  pub created_at: String
}

// Everything needed to write a row. Used for inserts
// and for full updates, in which case created_at is
// ignored.
// The slug is the one computed from the title, the
// slug policy may still change it when writing.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleInsert {
  pub title: String,
  pub slug: String,
  pub content_html: Option<String>,
  pub meta_description: Option<String>,
  pub keywords: Option<String>,
  pub featured_image: Option<String>,
  pub status: ArticleStatus,
  pub category: Option<String>,
  pub scheduled_at: Option<String>,
  pub created_at: String
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_parses_its_own_display() {
    for status in [
      ArticleStatus::Draft,
      ArticleStatus::Published,
      ArticleStatus::Scheduled
    ].iter() {
      assert_eq!(Ok(*status), status.to_string().parse());
    }
  }

  #[test]
  fn status_parsing_is_case_sensitive() {
    assert_eq!(
      "draft".parse::<ArticleStatus>(),
      Err(UnknownStatus("draft".to_string()))
    );
  }
}
