//! Report rendering.
//!
//! `console` builds the plain-text views printed to the terminal;
//! `generator` builds Markdown and JSON documents and writes files.

pub mod console;
pub mod generator;

pub use console::{
    render_categorization, render_coverage, render_price_table, render_rentals,
    render_zone_table,
};
pub use generator::{
    generate_price_json, generate_price_markdown, generate_summary_json, generate_zone_json,
    generate_zone_markdown, write_categorization, write_report,
};

/// Format a rupee amount with Indian units: Cr (1e7), L (1e5), K (1e3).
pub fn format_price(price: f64) -> String {
    if price >= 10_000_000.0 {
        format!("₹{:.2} Cr", price / 10_000_000.0)
    } else if price >= 100_000.0 {
        format!("₹{:.2} L", price / 100_000.0)
    } else if price >= 1_000.0 {
        format!("₹{:.2} K", price / 1_000.0)
    } else {
        format!("₹{:.0}", price)
    }
}

/// File name for a bucket label: "North Bangalore" -> "north_bangalore.txt".
pub fn zone_file_name(label: &str) -> String {
    format!("{}.txt", label.replace(' ', "_").to_lowercase())
}

/// Cut `text` to at most `width` characters, marking the cut with "…".
pub(crate) fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price_units() {
        assert_eq!(format_price(25_000_000.0), "₹2.50 Cr");
        assert_eq!(format_price(10_000_000.0), "₹1.00 Cr");
        assert_eq!(format_price(7_000_000.0), "₹70.00 L");
        assert_eq!(format_price(27_500.0), "₹27.50 K");
        assert_eq!(format_price(999.0), "₹999");
        assert_eq!(format_price(0.0), "₹0");
    }

    #[test]
    fn test_zone_file_name() {
        assert_eq!(zone_file_name("North Bangalore"), "north_bangalore.txt");
        assert_eq!(zone_file_name("PAN Bangalore"), "pan_bangalore.txt");
        assert_eq!(zone_file_name("Central"), "central.txt");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Ravi", 10), "Ravi");
        assert_eq!(truncate("Ravi Kumar Sharma", 8), "Ravi Ku…");
    }
}
