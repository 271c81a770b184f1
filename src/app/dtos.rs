use serde::{Deserialize, Serialize};
use derive_more::Display;
use crate::db::entities::*;
use crate::utils::{
  self,
  time_utils,
  text_utils
};
use super::error::Error;

// Entities are converted to DTOs with From, request
// bodies go the other way through validation.

#[derive(Debug, Serialize, Deserialize)]
pub struct ArticleDto {
  pub id: i64,
  pub title: String,
  pub slug: String,
  pub content_html: Option<String>,
  pub meta_description: Option<String>,
  pub keywords: Option<String>,
  pub featured_image: Option<String>,
  pub status: String,
  pub category: Option<String>,
  pub scheduled_at: Option<String>,
  pub created_at: String
}

impl From<Article> for ArticleDto {
  fn from(article: Article) -> Self {
    Self {
      id: article.id,
      title: article.title,
      slug: article.slug,
      content_html: article.content_html,
      meta_description: article.meta_description,
      keywords: article.keywords,
      featured_image: article.featured_image,
      status: article.status.to_string(),
      category: article.category,
      scheduled_at: article.scheduled_at,
      created_at: article.created_at
    }
  }
}

#[derive(Debug, Display, PartialEq)]
pub enum ValidationError {
  #[display(fmt = "Title is required")]
  MissingTitle,
  #[display(fmt = "Title must contain at least one letter or digit")]
  EmptySlug,
  #[display(fmt = "{}", _0)]
  UnknownStatus(UnknownStatus),
  #[display(fmt = "scheduled_at is required when status is Scheduled")]
  MissingSchedule,
  #[display(fmt = "created_at is not a valid date: {}", _0)]
  InvalidCreatedAt(String)
}

impl std::error::Error for ValidationError {}

impl From<UnknownStatus> for ValidationError {
  fn from(e: UnknownStatus) -> Self {
    ValidationError::UnknownStatus(e)
  }
}

impl From<ValidationError> for Error {
  fn from(e: ValidationError) -> Self {
    Error::BadRequest(e.to_string())
  }
}

// Body of POST and PUT on /articles. Every field is
// optional at this point so that a missing title is a
// validation error and not a JSON parsing error.
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
pub struct ArticleForm {
  pub title: Option<String>,
  pub content_html: Option<String>,
  pub meta_description: Option<String>,
  pub keywords: Option<String>,
  pub featured_image: Option<String>,
  pub status: Option<String>,
  pub category: Option<String>,
  pub scheduled_at: Option<String>
}

impl ArticleForm {

  /**
   * Checks the form and computes the slug. The title and
   * the optional text fields are stored verbatim.
   * created_at is ignored by updates.
   */
  pub fn into_insert(
    self,
    created_at: String
  ) -> Result<ArticleInsert, ValidationError> {
    let title = match self.title {
      Some(t) if !t.trim().is_empty() => t,
      _ => return Err(ValidationError::MissingTitle)
    };
    let slug = text_utils::slugify(&title);
    if slug.is_empty() {
      return Err(ValidationError::EmptySlug);
    }
    // The client's status select never sends an empty
    // value but older imports might.
    let status: ArticleStatus = match utils::non_empty(self.status) {
      Some(s) => s.parse()?,
      None => ArticleStatus::default()
    };
    let scheduled_at = match status {
      ArticleStatus::Scheduled => Some(
        utils::non_empty(self.scheduled_at)
          .ok_or(ValidationError::MissingSchedule)?
      ),
      _ => None
    };
    Ok(ArticleInsert {
      title,
      slug,
      content_html: self.content_html,
      meta_description: self.meta_description,
      keywords: self.keywords,
      featured_image: self.featured_image,
      status,
      category: self.category,
      scheduled_at,
      created_at
    })
  }

  pub fn into_new_article(self) -> Result<ArticleInsert, ValidationError> {
    self.into_insert(time_utils::current_timestamp())
  }

}

// One element of an import array. Exports can be fed
// back as they are: id and slug are ignored (serde
// drops unknown fields), created_at is kept but brought
// to the sortable UTC format first.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ImportedArticleDto {
  #[serde(flatten)]
  pub form: ArticleForm,
  pub created_at: Option<String>
}

impl ImportedArticleDto {
  pub fn into_insert(self) -> Result<ArticleInsert, ValidationError> {
    let created_at = match utils::non_empty(self.created_at) {
      Some(value) => time_utils::normalize_timestamp(&value)
        .ok_or(ValidationError::InvalidCreatedAt(value))?,
      None => time_utils::current_timestamp()
    };
    self.form.into_insert(created_at)
  }
}

// Response body for successful writes.
#[derive(Debug, Deserialize, Serialize)]
pub struct JsonStatus {
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub slug: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub count: Option<usize>
}

impl JsonStatus {
  pub fn with_slug(message: &str, slug: String) -> Self {
    Self {
      message: String::from(message),
      slug: Some(slug),
      count: None
    }
  }

  pub fn with_count(message: &str, count: usize) -> Self {
    Self {
      message: String::from(message),
      slug: None,
      count: Some(count)
    }
  }
}
