//! Locale markers used to read and write host text.
//!
//! Defaults target the Simplified Chinese host UI.

use serde::Deserialize;

/// Unit and meridiem markers of the host's display language.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    /// Marker following the year number in date text. Absent = current year.
    pub year_marker: String,
    /// Marker following the month number.
    pub month_marker: String,
    /// Marker following the day number.
    pub day_marker: String,
    /// Morning marker in time text; also the AM value of the AM/PM field.
    pub morning_marker: String,
    /// PM value of the AM/PM field.
    pub afternoon_marker: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            year_marker: "年".to_string(),
            month_marker: "月".to_string(),
            day_marker: "日".to_string(),
            morning_marker: "上午".to_string(),
            afternoon_marker: "下午".to_string(),
        }
    }
}
