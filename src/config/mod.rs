//! Configuration loading and validation
//!
//! Guidefeed is configured through a TOML file with four tables:
//! `[source]` (guide site endpoints), `[crawler]` (crawl horizon and
//! politeness), `[user-agent]` (crawler identification), and `[feed]`
//! (Atom output).

mod parser;
mod types;
mod validation;

pub use parser::load_config;
pub use types::{Config, CrawlerConfig, FeedConfig, SourceConfig, UserAgentConfig};
pub use validation::validate;
