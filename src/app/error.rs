use actix_web::{
  error::ResponseError,
  http::StatusCode,
  HttpResponse
};
use derive_more::Display;
use eyre::Report;
use log::error;
use crate::db::SlugConflict;

// Validation messages are meant for the admin, they
// are shown as is. Database errors only say what kind
// of error it was, the full report goes to the logs.
#[derive(Debug, Display)]
pub enum Error {
  #[display(fmt = "Database Error")]
  DatabaseError(String),
  #[display(fmt = "Unauthorized")]
  Unauthorized,
  #[display(fmt = "Not Found: {}", _0)]
  NotFound(String),
  // No route matched, the body is just the status text.
  #[display(fmt = "Not Found")]
  NoRoute,
  #[display(fmt = "Conflict: {}", _0)]
  Conflict(String),
  #[display(fmt = "Bad Request: {}", _0)]
  BadRequest(String)
}

// Plain text for error responses, the admin client
// shows the response text in its notification.
impl ResponseError for Error {
  fn status_code(&self) -> StatusCode {
    match self {
      Error::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
      Error::Unauthorized => StatusCode::UNAUTHORIZED,
      Error::NotFound(_) | Error::NoRoute => StatusCode::NOT_FOUND,
      Error::Conflict(_) => StatusCode::CONFLICT,
      Error::BadRequest(_) => StatusCode::BAD_REQUEST
    }
  }

  fn error_response(&self) -> HttpResponse {
    HttpResponse::build(self.status_code())
      .content_type("text/plain; charset=utf-8")
      .body(self.to_string())
  }
}

// Data access functions return eyre reports. The only
// one that isn't a server error is the slug conflict.
pub fn map_db_error(report: Report) -> Error {
  if let Some(conflict) = report.downcast_ref::<SlugConflict>() {
    return Error::Conflict(conflict.to_string());
  }
  error!("Database error - {:?}", report);
  Error::DatabaseError(report.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn slug_conflict_maps_to_409() {
    let report: Report = SlugConflict("taken".to_string()).into();
    let err = map_db_error(report);
    assert_eq!(StatusCode::CONFLICT, err.status_code());
    assert_eq!("Conflict: Slug already exists: taken", err.to_string());
  }

  #[test]
  fn unmatched_route_is_bare_not_found() {
    assert_eq!(StatusCode::NOT_FOUND, Error::NoRoute.status_code());
    assert_eq!("Not Found", Error::NoRoute.to_string());
  }

  #[test]
  fn database_error_hides_details() {
    let err = map_db_error(eyre::eyre!("no such table: articles"));
    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, err.status_code());
    assert_eq!("Database Error", err.to_string());
  }
}
