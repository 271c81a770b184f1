use actix_web::{
  dev::{Service, ServiceRequest, ServiceResponse},
  http::Method,
  web
};
use futures::future::{ready, Either, Ready};
use super::{error::Error, AppState};

// A route guard would only make the router skip the
// route and answer 404, so the admin token check is a
// middleware wrapped around each resource. It runs
// before any extractor, a request without a valid token
// is refused before its body is read at all.
//
// The refusal is returned as a response and not as an
// error so that the app-wide CORS headers still apply.
pub fn admin_only<S>(
  req: ServiceRequest,
  srv: &S,
  protected: &[Method]
) -> Either<Ready<Result<ServiceResponse, actix_web::Error>>, S::Future>
where
  S: Service<ServiceRequest, Response = ServiceResponse, Error = actix_web::Error>
{
  if protected.contains(req.method()) {
    let authorized = match req.app_data::<web::Data<AppState>>() {
      Some(app_state) => app_state.authorize(req.request()).is_ok(),
      None => false
    };
    if !authorized {
      return Either::Left(ready(Ok(req.error_response(Error::Unauthorized))));
    }
  }
  Either::Right(srv.call(req))
}
