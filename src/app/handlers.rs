use actix_web::{
  http::{header, Method},
  web,
  HttpRequest,
  HttpResponse,
  Result
};
use serde_json::Value;
use log::info;
use crate::db;
use super::article_import;
use super::dtos::*;
use super::error::{Error, map_db_error};
use super::AppState;

// Module with all the API handler functions. Every one
// of them returns our Error so responses look the same
// (see the "error" module). The admin token is checked
// before these run, see the "guards" module.

const EXPORT_DISPOSITION: &str = "attachment; filename=\"articles.json\"";

// Default response when no route matched the request.
// Browsers send preflight requests to any path, these
// get an empty response with the CORS headers added by
// the middleware.
pub async fn fallback(req: HttpRequest) -> Result<HttpResponse, Error> {
  if req.method() == Method::OPTIONS {
    Ok(HttpResponse::NoContent().finish())
  } else {
    Err(Error::NoRoute)
  }
}

pub async fn articles(
  app_state: web::Data<AppState>
) -> Result<HttpResponse, Error> {
  let articles: Vec<ArticleDto> = db::all_articles(&app_state.pool, db::Order::Desc)
    .map_err(map_db_error)?
    .into_iter()
    .map(ArticleDto::from)
    .collect();
  Ok(HttpResponse::Ok().json(articles))
}

// Path variables have to be in a tuple.
pub async fn article(
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>
) -> Result<HttpResponse, Error> {
  let slug = path.into_inner().0;
  match db::article_by_slug(&app_state.pool, &slug).map_err(map_db_error)? {
    Some(a) => Ok(HttpResponse::Ok().json(ArticleDto::from(a))),
    None => Err(Error::NotFound("Article not found".to_string()))
  }
}

pub async fn create_article(
  app_state: web::Data<AppState>,
  form: web::Json<ArticleForm>
) -> Result<HttpResponse, Error> {
  let article = form.into_inner().into_new_article()?;
  let slug = db::insert_article(&app_state.pool, &article, app_state.slug_policy)
    .map_err(map_db_error)?;
  info!("Article created with slug {}", slug);
  Ok(
    HttpResponse::Created()
      .json(JsonStatus::with_slug("Article added successfully", slug))
  )
}

// Replaces the whole article, fields missing from the
// body are cleared. The slug follows the new title.
pub async fn update_article(
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>,
  form: web::Json<ArticleForm>
) -> Result<HttpResponse, Error> {
  let current_slug = path.into_inner().0;
  let article = form.into_inner().into_new_article()?;
  let updated = db::update_article(
    &app_state.pool,
    &current_slug,
    &article,
    app_state.slug_policy
  ).map_err(map_db_error)?;
  match updated {
    Some(slug) => {
      info!("Article {} updated, slug is now {}", current_slug, slug);
      Ok(HttpResponse::Ok().json(JsonStatus::with_slug("Article updated successfully", slug)))
    },
    None => Err(Error::NotFound("Article not found".to_string()))
  }
}

pub async fn delete_article(
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>
) -> Result<HttpResponse, Error> {
  let slug = path.into_inner().0;
  let deleted = db::delete_article(&app_state.pool, &slug)
    .map_err(map_db_error)?;
  if deleted == 0 {
    return Err(Error::NotFound("Article not found".to_string()));
  }
  info!("Deleted {} article(s) with slug {}", deleted, slug);
  Ok(HttpResponse::Ok().json(JsonStatus::with_slug("Article deleted successfully", slug)))
}

// Oldest first, so feeding the file back to the import
// endpoint inserts rows in their original order.
pub async fn export_articles(
  app_state: web::Data<AppState>
) -> Result<HttpResponse, Error> {
  let articles: Vec<ArticleDto> = db::all_articles(&app_state.pool, db::Order::Asc)
    .map_err(map_db_error)?
    .into_iter()
    .map(ArticleDto::from)
    .collect();
  Ok(
    HttpResponse::Ok()
      .insert_header((header::CONTENT_DISPOSITION, EXPORT_DISPOSITION))
      .json(articles)
  )
}

// The body is taken as raw JSON so that a non-array
// gets its own error message.
pub async fn import_articles(
  app_state: web::Data<AppState>,
  payload: web::Json<Value>
) -> Result<HttpResponse, Error> {
  let articles = article_import::parse_articles(payload.into_inner())?;
  let slugs = db::insert_articles(&app_state.pool, &articles, app_state.slug_policy)
    .map_err(map_db_error)?;
  info!("Imported {} article(s)", slugs.len());
  Ok(
    HttpResponse::Created()
      .json(JsonStatus::with_count("Articles imported successfully", slugs.len()))
  )
}
