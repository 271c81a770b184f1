#![allow(dead_code)]
mod app;
mod config;
mod db;
mod utils;

use std::env;
use std::fs;
use std::path::Path;
use color_eyre::Result;
use eyre::WrapErr;
use dotenv::dotenv;
use log::info;
use getopts::Options;
use crate::app::article_import;
use crate::app::dtos::ArticleDto;
use crate::config::{Config, SlugPolicy};
use crate::db::{Order, Pool};

// Copy pasted this from getopts doc.
fn print_usage(program: &str, opts: Options) {
  let brief = format!("Usage: {} [options]", program);
  print!("{}", opts.usage(&brief));
}

// Same file the /export endpoint sends.
fn export_to_file<P: AsRef<Path>>(pool: &Pool, path: P) -> Result<usize> {
  let articles: Vec<ArticleDto> = db::all_articles(pool, Order::Asc)?
    .into_iter()
    .map(ArticleDto::from)
    .collect();
  let json = serde_json::to_string_pretty(&articles)?;
  fs::write(path.as_ref(), json)
    .with_context(|| format!("Writing export to {:?}", path.as_ref()))?;
  Ok(articles.len())
}

// All or nothing, like the /import endpoint.
fn import_from_file<P: AsRef<Path>>(
  pool: &Pool,
  path: P,
  policy: SlugPolicy
) -> Result<usize> {
  let contents = fs::read_to_string(path.as_ref())
    .with_context(|| format!("Reading import file {:?}", path.as_ref()))?;
  let payload: serde_json::Value = serde_json::from_str(&contents)
    .context("Import file is not valid JSON")?;
  let articles = article_import::parse_articles(payload)?;
  let slugs = db::insert_articles(pool, &articles, policy)?;
  Ok(slugs.len())
}

/**
 * Operator tool working directly on the database file
 * the server uses.
 */
fn main() -> Result<()> {
  color_eyre::install()?;
  dotenv().ok();
  env_logger::Builder::from_env(
    env_logger::Env::default().default_filter_or("info")
  ).init();

  let args: Vec<String> = env::args().collect();
  let program = args[0].clone();
  let mut opts = Options::new();
  opts.optopt("e", "export", "Export all articles to a JSON file", "FILE");
  opts.optopt("i", "import", "Import articles from a JSON file", "FILE");
  opts.optflag("s", "init-schema", "Create the articles table and exit");
  opts.optflag("h", "help", "Program usage");
  let opt_matches = opts.parse(&args[1..])?;
  if opt_matches.opt_present("h") {
    print_usage(&program, opts);
    return Ok(());
  }

  let config = Config::from_env()?;
  // Opening the pool creates the schema.
  let pool = app::open_pool(&config)?;

  if opt_matches.opt_present("s") {
    info!("Schema ready in {}", config.db_path);
    return Ok(());
  }
  if let Some(file) = opt_matches.opt_str("i") {
    let count = import_from_file(&pool, &file, config.slug_policy)?;
    info!("Imported {} article(s) from {}, {} in total",
      count, file, db::article_count(&pool)?);
    return Ok(());
  }
  if let Some(file) = opt_matches.opt_str("e") {
    let count = export_to_file(&pool, &file)?;
    info!("Exported {} article(s) to {}", count, file);
    return Ok(());
  }

  print_usage(&program, opts);
  Ok(())
}
