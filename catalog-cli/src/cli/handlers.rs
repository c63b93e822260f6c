// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Command handlers for the FlexiMart CLI

use colored::Colorize;
use fleximart_catalog::model::parse_review_date;
use fleximart_catalog::{CatalogConfig, CatalogService, ProductFilter, Review};
use serde_json::json;
use std::path::PathBuf;

use super::commands::{Commands, OutputFormat, StoreArgs};
use super::output::ResultFormatter;

type HandlerResult = Result<(), Box<dyn std::error::Error>>;

/// Build the catalog config: file values first, then command-line overrides
pub fn resolve_config(args: &StoreArgs) -> Result<CatalogConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => CatalogConfig::from_file(path)?,
        None => CatalogConfig::default(),
    };

    if let Some(storage) = args.storage {
        config.storage = storage;
    }
    if let Some(path) = &args.path {
        config.path = path.clone();
    }
    if let Some(database) = &args.database {
        config.database = database.clone();
    }
    if let Some(collection) = &args.collection {
        config.collection = collection.clone();
    }
    if let Some(uri) = &args.mongo_uri {
        config.mongo_uri = Some(uri.clone());
    }

    config.validate()?;
    Ok(config)
}

/// Run one catalog subcommand against the configured store
pub fn handle_command(command: Commands, store: &StoreArgs, format: OutputFormat) -> HandlerResult {
    if let Commands::Version = command {
        handle_version();
        return Ok(());
    }

    let config = resolve_config(store)?;
    let service = CatalogService::open(&config)?;

    match command {
        Commands::Version => Ok(()),
        Commands::Load { file } => handle_load(&service, file, format),
        Commands::Discounted => {
            let rows = service
                .find_discounted_electronics()?
                .collect::<Result<Vec<_>, _>>()?;
            println!("{}", ResultFormatter::summaries(&rows, format));
            Ok(())
        }
        Commands::Find { category, below } => {
            let mut filter = ProductFilter::new();
            if let Some(category) = category {
                filter = filter.category(category);
            }
            if let Some(ceiling) = below {
                filter = filter.price_below(ceiling);
            }
            let rows = service.find(&filter)?.collect::<Result<Vec<_>, _>>()?;
            println!("{}", ResultFormatter::summaries(&rows, format));
            Ok(())
        }
        Commands::TopRated {
            threshold,
            empty_reviews,
        } => {
            let service = match empty_reviews {
                Some(policy) => service.with_empty_review_policy(policy),
                None => service,
            };
            let rated = service.find_highly_rated(threshold.unwrap_or(config.rating_threshold))?;
            println!("{}", ResultFormatter::rated(&rated, format));
            Ok(())
        }
        Commands::AddReview {
            product_id,
            user,
            rating,
            comment,
            date,
        } => {
            let mut review = Review::new(user, rating, comment);
            if let Some(date) = date {
                review.date = parse_review_date(&date)?;
            }
            service.append_review(&product_id, &review)?;
            report(
                format,
                json!({ "product_id": product_id.as_str(), "appended": 1 }),
                format!("Review by {} added to {}", review.user_id, product_id),
            );
            Ok(())
        }
        Commands::CategoryPrices => {
            let rows = service.average_price_by_category()?;
            println!("{}", ResultFormatter::category_prices(&rows, format));
            Ok(())
        }
        Commands::Show { product_id } => {
            let product = service.get_product(&product_id)?;
            println!("{}", ResultFormatter::product(&product, format));
            Ok(())
        }
        Commands::Count => {
            let count = service.count()?;
            report(
                format,
                json!({ "count": count }),
                format!("{} products in {}", count, service.store().describe()),
            );
            Ok(())
        }
    }
}

fn handle_load(service: &CatalogService, file: PathBuf, format: OutputFormat) -> HandlerResult {
    let loaded = service.load_file(&file)?;
    report(
        format,
        json!({ "loaded": loaded }),
        format!("Loaded {} products from {:?}", loaded, file),
    );
    Ok(())
}

/// Print a write acknowledgement in the requested format
fn report(format: OutputFormat, value: serde_json::Value, message: String) {
    match format {
        OutputFormat::Json => println!("{}", value),
        OutputFormat::Csv => {
            if let Some(object) = value.as_object() {
                let keys: Vec<&str> = object.keys().map(String::as_str).collect();
                let values: Vec<String> = object
                    .values()
                    .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                    .collect();
                println!("{}\n{}", keys.join(","), values.join(","));
            }
        }
        OutputFormat::Table => println!("{}", message.green()),
    }
}

fn handle_version() {
    println!("{}", "FlexiMart Catalog".bold().green());
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!("Storage backends: {}", compiled_backends().join(", "));
}

fn compiled_backends() -> Vec<&'static str> {
    let mut backends = vec!["memory", "sled", "redb"];
    if cfg!(feature = "mongo") {
        backends.push("mongo");
    }
    backends
}
