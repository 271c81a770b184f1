// Adding the context method to errors:
use eyre::WrapErr;
use color_eyre::Result;
use derive_more::Display;
use serde::Deserialize;

// What to do when the slug computed from a title
// is already used by another article.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlugPolicy {
  // Refuse the write with a 409.
  #[display(fmt = "reject")]
  Reject,
  // Append -2, -3... until the slug is free.
  #[display(fmt = "suffix")]
  Suffix,
  // Delete whatever holds the slug and take it.
  #[display(fmt = "overwrite")]
  Overwrite,
  // Store duplicates, lookups return the oldest row.
  #[display(fmt = "allow")]
  Allow
}

#[derive(Debug, Deserialize)]
pub struct Config {
  pub db_path: String,
  pub db_pool_size: u32,
  pub bind_address: String,
  pub slug_policy: SlugPolicy,
  // Write endpoints require this as a bearer token
  // when it's set.
  pub admin_token: Option<String>,
  // Max size of JSON request bodies, in bytes.
  pub json_limit: usize
}

impl Config {

  pub fn from_env() -> Result<Config> {
    // RUST_LOG is handled by env_logger in main.rs.
    // Keys have to be lowercase when compared to
    // what's in the .env file.
    let c = config::Config::builder()
      .set_default("db_path", "./articles.db")?
      .set_default("db_pool_size", 8)?
      .set_default("bind_address", "127.0.0.1:8080")?
      .set_default("slug_policy", "reject")?
      // Import requests carry the whole table, 30 MB
      // should be plenty:
      .set_default("json_limit", 31457280)?
      .add_source(config::Environment::default())
      .build()
      .context("Reading configuration sources")?;
    let mut config: Config = c.try_deserialize()
      .context("Loading configuration from env")?;
    config.admin_token = clean_admin_token(config.admin_token);
    Ok(config)
  }

}

// ADMIN_TOKEN= in a .env file means no token. Stray
// whitespace around the value isn't part of the token,
// bearer_token() trims what clients send too.
fn clean_admin_token(token: Option<String>) -> Option<String> {
  crate::utils::non_empty(token.map(|t| t.trim().to_string()))
}
