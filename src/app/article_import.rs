use derive_more::Display;
use log::warn;
use serde_json::Value;
use crate::db::entities::ArticleInsert;
use super::dtos::{ImportedArticleDto, ValidationError};
use super::error::Error;

// Import bodies are either the admin's export file or
// something handmade. Either way the whole batch is
// refused as soon as one article is invalid, nothing
// gets written in that case.

#[derive(Debug, Display)]
pub enum ImportError {
  #[display(fmt = "Expected an array of articles")]
  NotAnArray,
  #[display(fmt = "Article at index {} could not be parsed: {}", _0, _1)]
  ParseError(usize, String),
  #[display(fmt = "Article at index {} is invalid: {}", _0, _1)]
  Invalid(usize, ValidationError)
}

impl std::error::Error for ImportError {}

impl From<ImportError> for Error {
  fn from(e: ImportError) -> Self {
    Error::BadRequest(e.to_string())
  }
}

/**
 * Validates a whole import payload and turns it into
 * rows ready to be inserted, in the original order.
 */
pub fn parse_articles(
  payload: Value
) -> Result<Vec<ArticleInsert>, ImportError> {
  let items = match payload {
    Value::Array(items) => items,
    _ => return Err(ImportError::NotAnArray)
  };
  let mut articles: Vec<ArticleInsert> = Vec::with_capacity(items.len());
  for (index, item) in items.into_iter().enumerate() {
    let dto: ImportedArticleDto = serde_json::from_value(item)
      .map_err(|e| {
        warn!("Import element {} is not an article - {}", index, e);
        ImportError::ParseError(index, e.to_string())
      })?;
    let article = dto.into_insert()
      .map_err(|e| ImportError::Invalid(index, e))?;
    articles.push(article);
  }
  Ok(articles)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn object_payload_is_refused() {
    let err = parse_articles(json!({"title": "Not a list"})).unwrap_err();
    assert_eq!("Expected an array of articles", err.to_string());
  }

  #[test]
  fn empty_array_is_fine() {
    assert!(parse_articles(json!([])).unwrap().is_empty());
  }

  #[test]
  fn articles_keep_their_order() {
    let articles = parse_articles(json!([
      {"title": "One"},
      {"title": "Two", "category": "News"},
      {"title": "Three", "status": "Published"}
    ])).unwrap();
    let slugs: Vec<&str> = articles.iter().map(|a| a.slug.as_str()).collect();
    assert_eq!(vec!["one", "two", "three"], slugs);
  }

  #[test]
  fn invalid_element_names_its_index() {
    let err = parse_articles(json!([
      {"title": "Fine"},
      {"content_html": "<p>No title</p>"}
    ])).unwrap_err();
    assert_eq!(
      "Article at index 1 is invalid: Title is required",
      err.to_string()
    );
  }

  #[test]
  fn non_object_element_is_a_parse_error() {
    let err = parse_articles(json!([{"title": "Fine"}, 42])).unwrap_err();
    match err {
      ImportError::ParseError(index, _) => assert_eq!(1, index),
      other => panic!("unexpected error: {}", other)
    }
  }
}
