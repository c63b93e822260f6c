// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Result formatting for table, JSON and CSV output

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use fleximart_catalog::{CategoryPriceSummary, Product, ProductSummary, RatedProduct};
use serde::Serialize;

use super::commands::OutputFormat;

/// Renders catalog results in the requested output format
pub struct ResultFormatter;

impl ResultFormatter {
    pub fn summaries(rows: &[ProductSummary], format: OutputFormat) -> String {
        Self::render(
            rows,
            format,
            &["name", "price", "stock"],
            |row| vec![row.name.clone(), format_number(row.price), row.stock.to_string()],
        )
    }

    pub fn rated(rows: &[RatedProduct], format: OutputFormat) -> String {
        Self::render(
            rows,
            format,
            &["product_id", "name", "category", "price", "reviews", "avgRating"],
            |row| {
                vec![
                    row.product.product_id.clone(),
                    row.product.name.clone(),
                    row.product.category.clone(),
                    format_number(row.product.price),
                    row.product.reviews.len().to_string(),
                    row.avg_rating
                        .map(|avg| format!("{:.2}", avg))
                        .unwrap_or_else(|| "null".to_string()),
                ]
            },
        )
    }

    pub fn category_prices(rows: &[CategoryPriceSummary], format: OutputFormat) -> String {
        Self::render(
            rows,
            format,
            &["category", "avg_price", "product_count"],
            |row| {
                vec![
                    row.category.clone(),
                    format!("{:.2}", row.avg_price),
                    row.product_count.to_string(),
                ]
            },
        )
    }

    /// A single document; table output lists fields, then its reviews
    pub fn product(product: &Product, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => to_json(product),
            OutputFormat::Csv => Self::render(
                &product.reviews,
                format,
                &["user_id", "rating", "comment", "date"],
                |review| {
                    vec![
                        review.user_id.clone(),
                        format_number(review.rating),
                        review.comment.clone().unwrap_or_default(),
                        review.date.to_rfc3339(),
                    ]
                },
            ),
            OutputFormat::Table => {
                let mut fields = new_table(&["field", "value"]);
                fields.add_row(vec!["product_id", product.product_id.as_str()]);
                fields.add_row(vec!["name", product.name.as_str()]);
                fields.add_row(vec!["category", product.category.as_str()]);
                fields.add_row(vec!["price".to_string(), format_number(product.price)]);
                fields.add_row(vec!["stock".to_string(), product.stock.to_string()]);
                for (key, value) in &product.attributes {
                    fields.add_row(vec![key.clone(), value.to_string()]);
                }

                if product.reviews.is_empty() {
                    return format!("{}\n(no reviews)", fields);
                }

                let mut reviews = new_table(&["user_id", "rating", "comment", "date"]);
                for review in &product.reviews {
                    reviews.add_row(vec![
                        review.user_id.clone(),
                        format_number(review.rating),
                        review.comment.clone().unwrap_or_default(),
                        review.date.to_rfc3339(),
                    ]);
                }
                format!("{}\n{}", fields, reviews)
            }
        }
    }

    fn render<T, F>(rows: &[T], format: OutputFormat, headers: &[&str], cells: F) -> String
    where
        T: Serialize,
        F: Fn(&T) -> Vec<String>,
    {
        match format {
            OutputFormat::Json => to_json(rows),
            OutputFormat::Csv => {
                let mut lines = vec![headers.join(",")];
                lines.extend(rows.iter().map(|row| {
                    cells(row)
                        .iter()
                        .map(|cell| csv_escape(cell))
                        .collect::<Vec<_>>()
                        .join(",")
                }));
                lines.join("\n")
            }
            OutputFormat::Table => {
                if rows.is_empty() {
                    return "(no results)".to_string();
                }
                let mut table = new_table(headers);
                for row in rows {
                    table.add_row(cells(row));
                }
                format!("{}\n{} row(s)", table, rows.len())
            }
        }
    }
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| Cell::new(h)));
    table
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to encode result: {}\"}}", e))
}

/// Whole numbers print without a trailing `.0`
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn csv_escape(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summaries() -> Vec<ProductSummary> {
        vec![ProductSummary {
            name: "Headphones, wireless".to_string(),
            price: 24999.0,
            stock: 75,
        }]
    }

    #[test]
    fn csv_quotes_cells_with_commas() {
        let csv = ResultFormatter::summaries(&summaries(), OutputFormat::Csv);
        assert_eq!(csv, "name,price,stock\n\"Headphones, wireless\",24999,75");
    }

    #[test]
    fn json_output_is_an_array_of_projections() {
        let json = ResultFormatter::summaries(&summaries(), OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["stock"], 75);
    }

    #[test]
    fn empty_table_says_so() {
        assert_eq!(
            ResultFormatter::category_prices(&[], OutputFormat::Table),
            "(no results)"
        );
    }

    #[test]
    fn unrated_products_show_null_average() {
        let rated = vec![RatedProduct {
            product: Product::new("BOOK002", "Dune", "Books", 399.0, 12),
            avg_rating: None,
        }];
        let table = ResultFormatter::rated(&rated, OutputFormat::Table);
        assert!(table.contains("null"));
    }
}
