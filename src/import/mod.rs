//! # CSV Import
//!
//! Bulk product entry from spreadsheet exports. The format is deliberately
//! forgiving: columns are positional (`Name, Quantity, MRP, OfferPrice`), a
//! header row is detected rather than required, and prices may carry
//! currency symbols or thousands separators. Rows that cannot be read are
//! skipped one by one; the rest of the file still imports.

use tracing::debug;

use crate::model::TagItem;

/// One parsed product row.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRow {
    pub name: String,
    pub quantity: String,
    pub mrp: f64,
    pub price: f64,
}

impl CsvRow {
    /// Turn the row into a new item with a fresh id.
    pub fn into_item(self) -> TagItem {
        TagItem::new(self.name, self.quantity, self.mrp, self.price)
    }
}

/// Parse CSV text into product rows.
pub fn parse_csv(text: &str) -> Vec<CsvRow> {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .collect();

    let Some(first) = lines.first() else {
        return Vec::new();
    };
    let skip = usize::from(is_header(first));

    let mut rows = Vec::with_capacity(lines.len());
    for (number, line) in lines.iter().enumerate().skip(skip) {
        let fields = split_fields(line);
        if fields.len() < 4 {
            debug!(line = number + 1, fields = fields.len(), "skipping short CSV row");
            continue;
        }
        rows.push(CsvRow {
            name: fields[0].clone(),
            quantity: fields[1].clone(),
            mrp: parse_amount(&fields[2]),
            price: parse_amount(&fields[3]),
        });
    }
    rows
}

/// Parse CSV text straight into new tag items.
pub fn import_products(text: &str) -> Vec<TagItem> {
    parse_csv(text).into_iter().map(CsvRow::into_item).collect()
}

/// A first line mentioning "mrp" is a header, not a product.
pub fn is_header(line: &str) -> bool {
    line.to_lowercase().contains("mrp")
}

/// Split one line on commas, honouring double quotes. Inside quotes a comma
/// is literal and `""` is an escaped quote. Fields are trimmed.
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// Keep only digits and dots, then parse. A second dot ends the number;
/// anything unreadable is 0.
pub fn parse_amount(field: &str) -> f64 {
    let cleaned: String = field
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let number = match cleaned.match_indices('.').nth(1) {
        Some((second_dot, _)) => &cleaned[..second_dot],
        None => cleaned.as_str(),
    };
    number
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
