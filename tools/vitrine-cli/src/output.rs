//! Output formatting for the CLI.

use std::time::Duration;

use chrono::{DateTime, Utc};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use vitrine_catalog::Item;
use vitrine_query::QueryStatus;

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    /// Create a new output handler.
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    /// Print an info message.
    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: &str) {
        if self.json {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow(), msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    /// Print a header/title.
    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print JSON output.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// Print a key-value pair.
    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a table row.
    pub fn table_row(&self, cols: &[&str], widths: &[usize]) {
        if self.json {
            return;
        }
        let formatted: Vec<String> = cols
            .iter()
            .zip(widths.iter())
            .map(|(col, width)| format!("{:width$}", col, width = width))
            .collect();
        println!("  {}", formatted.join("  "));
    }

    /// Print one listing row.
    pub fn item_row(&self, item: &Item, now: DateTime<Utc>) {
        if self.json {
            return;
        }
        let name = truncate(&item.name, 28);
        let price = item.price.display();
        let category = item.sub_category.as_deref().unwrap_or(&item.category);
        let age = format_age(item.created_at, now);
        let row = [name.as_str(), price.as_str(), category, item.location.as_str(), age.as_str()];
        let widths = [28, 12, 14, 12, 10];

        let formatted: Vec<String> = row
            .iter()
            .zip(widths.iter())
            .map(|(col, width)| format!("{:width$}", col, width = width))
            .collect();
        let badge = discount_badge(item);
        if badge.is_empty() {
            println!("  {}", formatted.join("  "));
        } else {
            println!("  {}  {}", formatted.join("  "), badge);
        }
    }

    /// Create a spinner for indeterminate progress.
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        if self.json {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    /// Check if JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Status badge for query states.
pub fn status_badge(status: QueryStatus) -> String {
    match status {
        QueryStatus::Ready => style("ready").green().to_string(),
        QueryStatus::Loading(_) => style("loading").yellow().to_string(),
        QueryStatus::Error => style("error").red().to_string(),
        QueryStatus::Idle => style("idle").dim().to_string(),
    }
}

/// Discount label with the original price, empty when not discounted.
pub fn discount_badge(item: &Item) -> String {
    if !item.is_discounted() {
        return String::new();
    }
    match item.original_price {
        Some(ref original) => format!(
            "{} {}",
            style(format!("-{}%", item.discount)).red().bold(),
            style(original.display()).dim().strikethrough()
        ),
        None => style(format!("-{}%", item.discount)).red().bold().to_string(),
    }
}

/// Format how long ago an item was listed.
pub fn format_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(created_at);
    if age.num_days() >= 1 {
        format!("{}d ago", age.num_days())
    } else if age.num_hours() >= 1 {
        format!("{}h ago", age.num_hours())
    } else {
        "just now".to_string()
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
