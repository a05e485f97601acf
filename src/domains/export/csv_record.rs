// src/domains/export/csv_record.rs

use serde::Serialize;

/// Trait for types that can be exported to CSV
pub trait CsvRecord: Serialize {
    /// Get CSV headers for this type
    fn headers() -> Vec<&'static str>;

    /// Convert to CSV row
    fn to_csv(&self) -> Vec<String>;
}

// Helper for converting values to CSV strings
pub fn csv_value_to_string<T: std::fmt::Display>(value: &T) -> String {
    value.to_string()
}

// Helper for optional values
pub fn csv_optional_to_string<T: std::fmt::Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(|v| csv_value_to_string(v))
        .unwrap_or_default()
}

// Helper for calendar dates
pub fn csv_date_to_string(date: &chrono::NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
