use actix_web::{
  body::MessageBody,
  dev::{ServiceFactory, ServiceRequest, ServiceResponse},
  http::Method,
  middleware,
  web,
  App,
  HttpRequest,
  HttpServer
};
use r2d2_sqlite::SqliteConnectionManager;
use color_eyre::Result;
use eyre::WrapErr;
use log::{debug, info, warn};
// The crate prefix is needed because of the
// dependency that's also named "config".
use crate::config::{Config, SlugPolicy};
use crate::db::{self, Pool};
use error::Error;
pub mod article_import;
pub mod dtos;
pub mod error;
mod guards;
mod handlers;
mod helpers;

pub const CORS_ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const CORS_ALLOWED_HEADERS: &str = "Content-Type, Authorization";

// Everything in here is read-only once the server
// started, requests share nothing else.
pub struct AppState {
  pub pool: Pool,
  pub slug_policy: SlugPolicy,
  pub admin_token: Option<String>,
  pub json_limit: usize
}

impl AppState {

  // Called by guards::admin_only for the write and export
  // routes. With no token configured every request goes
  // through.
  pub fn authorize(&self, req: &HttpRequest) -> Result<(), Error> {
    let expected = match &self.admin_token {
      Some(token) => token,
      None => return Ok(())
    };
    match helpers::bearer_token(req) {
      Some(given) if helpers::tokens_match(given, expected) => Ok(()),
      _ => {
        warn!("Refused {} {} - missing or invalid admin token",
          req.method(), req.path());
        Err(Error::Unauthorized)
      }
    }
  }

}

// Same App for the server and the tests.
pub fn build_app(
  app_state: web::Data<AppState>
) -> App<
  impl ServiceFactory<
    ServiceRequest,
    Config = (),
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
    InitError = ()
  >
> {
  let json_config = web::JsonConfig::default()
    .limit(app_state.json_limit)
    .error_handler(|err, _req| {
      Error::BadRequest(format!("Invalid JSON body - {}", err)).into()
    });

  App::new()
    .app_data(app_state)
    .app_data(json_config)
    .app_data(web::PathConfig::default().error_handler(|_, _| {
      Error::BadRequest(String::from("Invalid path arguments")).into()
    }))
    .wrap(cors_headers())
    .wrap(middleware::Logger::default())
    .configure(endpoints_config)
    .default_service(web::to(handlers::fallback))
}

// Added to every response, errors included. Preflight
// requests are answered by handlers::fallback.
fn cors_headers() -> middleware::DefaultHeaders {
  middleware::DefaultHeaders::new()
    .add(("Access-Control-Allow-Origin", "*"))
    .add(("Access-Control-Allow-Methods", CORS_ALLOWED_METHODS))
    .add(("Access-Control-Allow-Headers", CORS_ALLOWED_HEADERS))
}

// Route configuration. Each resource sends methods it
// doesn't know to the fallback so that OPTIONS works
// everywhere and other methods are a 404, not a 405.
// The admin guard goes last so it wraps the whole
// resource, fallback included.
fn endpoints_config(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::resource("/articles")
      .route(web::get().to(handlers::articles))
      .route(web::post().to(handlers::create_article))
      .default_service(web::to(handlers::fallback))
      .wrap_fn(|req, srv| guards::admin_only(req, srv, &[Method::POST]))
  )
  .service(
    web::resource("/articles/{slug}")
      .route(web::get().to(handlers::article))
      .route(web::put().to(handlers::update_article))
      .route(web::delete().to(handlers::delete_article))
      .default_service(web::to(handlers::fallback))
      .wrap_fn(|req, srv| {
        guards::admin_only(req, srv, &[Method::PUT, Method::DELETE])
      })
  )
  .service(
    web::resource("/export")
      .route(web::get().to(handlers::export_articles))
      .default_service(web::to(handlers::fallback))
      .wrap_fn(|req, srv| guards::admin_only(req, srv, &[Method::GET]))
  )
  .service(
    web::resource("/import")
      .route(web::post().to(handlers::import_articles))
      .default_service(web::to(handlers::fallback))
      .wrap_fn(|req, srv| guards::admin_only(req, srv, &[Method::POST]))
  );
}

pub fn open_pool(config: &Config) -> Result<Pool> {
  // Writers take the write lock when their transaction
  // starts, a second writer waits for it this long.
  let manager = SqliteConnectionManager::file(&config.db_path)
    .with_init(|conn| conn.busy_timeout(db::BUSY_TIMEOUT));
  let pool = r2d2::Pool::builder()
    .max_size(config.db_pool_size)
    .build(manager)
    .context("Opening database connection pool")?;
  db::init_schema(&pool)?;
  Ok(pool)
}

// Function to start the server, awaited by the
// #[actix_web::main] function in main.rs.
pub async fn run() -> Result<()> {
  let config = Config::from_env()?;
  // Not the whole config, it holds the admin token.
  debug!("Database: {} (pool size {}), JSON limit: {} bytes",
    config.db_path, config.db_pool_size, config.json_limit);
  let pool = open_pool(&config)?;

  if config.admin_token.is_none() {
    warn!("No ADMIN_TOKEN configured, write endpoints are open");
  }
  info!("Slug policy is {}", config.slug_policy);

  let bind_address = config.bind_address.clone();
  let app_state = web::Data::new(
    AppState {
      pool,
      slug_policy: config.slug_policy,
      admin_token: config.admin_token,
      json_limit: config.json_limit
    }
  );

  info!("Listening on {}", bind_address);
  HttpServer::new(move || build_app(app_state.clone()))
    .bind(bind_address)?
    .run()
    .await
    .context("Start Actix web server")
}
