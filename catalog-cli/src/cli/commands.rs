// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI command definitions for the FlexiMart catalog

use clap::{Args, Parser, Subcommand, ValueEnum};
use fleximart_catalog::{EmptyReviewPolicy, StorageType};
use std::path::PathBuf;

/// Log level options
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only errors
    Error,
    /// Warnings and errors
    Warn,
    /// Info, warnings, and errors
    Info,
    /// Debug messages and above (verbose)
    Debug,
    /// All messages including trace (very verbose)
    Trace,
    /// Disable all logging
    Off,
}

impl LogLevel {
    /// Convert to log::LevelFilter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Off => log::LevelFilter::Off,
        }
    }
}

/// FlexiMart CLI - product catalog queries
#[derive(Parser)]
#[command(name = "fleximart")]
#[command(about = "FlexiMart - query the product catalog collection")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Output format (table, json, csv)
    #[arg(short, long, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Set log level (error, warn, info, debug, trace, off)
    #[arg(short = 'l', long = "log-level", global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Verbose mode (equivalent to --log-level debug)
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the product collection lives; each flag overrides the config file
#[derive(Args, Debug, Default)]
pub struct StoreArgs {
    /// JSON config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Storage backend (sled, redb, memory, mongo)
    #[arg(short, long, global = true)]
    pub storage: Option<StorageType>,

    /// Root directory of the embedded database
    #[arg(long, global = true)]
    pub path: Option<PathBuf>,

    /// Database name
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// Collection name
    #[arg(long, global = true)]
    pub collection: Option<String>,

    /// MongoDB connection string
    #[arg(long, global = true)]
    pub mongo_uri: Option<String>,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Show detailed version information
    Version,

    /// Bulk load a JSON array of product documents
    Load {
        /// Catalog file to import
        file: PathBuf,
    },

    /// Electronics priced below 50000
    Discounted,

    /// Products matching an optional category and price ceiling
    Find {
        /// Exact category
        #[arg(long)]
        category: Option<String>,

        /// Only prices strictly below this value
        #[arg(long)]
        below: Option<f64>,
    },

    /// Products whose average review rating reaches a threshold
    TopRated {
        /// Minimum average rating (defaults to the configured threshold)
        #[arg(short, long)]
        threshold: Option<f64>,

        /// How to treat unreviewed products (exclude, include-unrated, zero)
        #[arg(long)]
        empty_reviews: Option<EmptyReviewPolicy>,
    },

    /// Append a review to one product
    AddReview {
        /// Product to review
        product_id: String,

        /// Reviewer id
        #[arg(short, long)]
        user: String,

        /// Rating from 1 to 5
        #[arg(short, long)]
        rating: f64,

        /// Review text
        #[arg(long)]
        comment: Option<String>,

        /// Review date, RFC 3339 or YYYY-MM-DD (defaults to now)
        #[arg(long)]
        date: Option<String>,
    },

    /// Average price per category, highest first
    CategoryPrices,

    /// Show one full product document
    Show {
        product_id: String,
    },

    /// Number of products in the collection
    Count,
}

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}
