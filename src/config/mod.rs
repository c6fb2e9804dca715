//! Configuration module for Shiori
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use shiori::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("shiori.toml")).unwrap();
//! println!("Locator will search up to depth {}", config.locator.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ChapterFailurePolicy, Config, HttpConfig, LocatorConfig, OutputConfig, PatternConfig,
    PipelineConfig, SearchConfig, ValidatorConfig,
};

// Re-export parser functions
pub use parser::{load_config, parse_config};
