//! Rendering of stored listings
//!
//! The read side of the store: a plain console listing and a markdown table.

use crate::listing::StoredListing;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Prints every listing to stdout, one block per listing
pub fn print_listings(listings: &[StoredListing]) {
    if listings.is_empty() {
        println!("No listings stored yet.");
        return;
    }

    for listing in listings {
        let record = &listing.record;
        println!(
            "{}. {} ({})",
            listing.id,
            record.title.as_deref().unwrap_or("<untitled>"),
            record.price.as_deref().unwrap_or("price unknown")
        );
        if let Some(address) = &record.address {
            println!("   {}", address);
        }
        if let Some(area) = &record.area {
            println!("   {}", area);
        }
        println!("   URL: {}", record.url.as_deref().unwrap_or("-"));
        println!("   Added: {}", listing.created_at.format("%Y-%m-%d %H:%M"));
        println!();
    }

    println!("{} listings", listings.len());
}

/// Writes the listings as a markdown document
pub fn write_markdown_listings(listings: &[StoredListing], output_path: &Path) -> io::Result<()> {
    let markdown = format_markdown_listings(listings);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats the listings as a markdown table
pub fn format_markdown_listings(listings: &[StoredListing]) -> String {
    let mut md = String::new();

    md.push_str("# Stored Listings\n\n");
    md.push_str(&format!("- **Total**: {}\n\n", listings.len()));

    if listings.is_empty() {
        return md;
    }

    md.push_str("| # | Title | Price | Area | Address | Added | Link |\n");
    md.push_str("|---|-------|-------|------|---------|-------|------|\n");

    for listing in listings {
        let record = &listing.record;
        let link = match record.url.as_deref() {
            Some(url) => format!("[link]({})", url),
            None => "-".to_string(),
        };

        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            listing.id,
            cell(record.title.as_deref()),
            cell(record.price.as_deref()),
            cell(record.area.as_deref()),
            cell(record.address.as_deref()),
            listing.created_at.format("%Y-%m-%d %H:%M"),
            link
        ));
    }

    md
}

/// Escapes a value for use inside a markdown table cell
fn cell(value: Option<&str>) -> String {
    match value {
        Some(v) => v.replace('|', "\\|").replace('\n', " "),
        None => "-".to_string(),
    }
}
