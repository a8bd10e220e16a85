//! Metadata extraction from the item's info panel.
//!
//! Reads the displayed filename, date, time and timezone into a
//! `PhotoMetadata` record. Never mutates page state.

use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;
use tracing::debug;

use crate::config::{Config, LocaleConfig};
use crate::surface::{ControlRole, DateField, HostSurface};

/// Half of the 12-hour clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    /// Text the host uses for this half of the day.
    pub fn marker<'a>(&self, locale: &'a LocaleConfig) -> &'a str {
        match self {
            Self::Am => &locale.morning_marker,
            Self::Pm => &locale.afternoon_marker,
        }
    }
}

/// Capture date/time as displayed, field by field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureFields {
    pub year: String,
    pub month: String,
    pub day: String,
    /// Zero-padded to two digits.
    pub hour: String,
    pub minutes: String,
    pub meridiem: Meridiem,
}

impl CaptureFields {
    /// Value the dialog field should hold for this capture time.
    pub fn value_for(&self, field: DateField, locale: &LocaleConfig) -> String {
        match field {
            DateField::Year => self.year.clone(),
            DateField::Month => self.month.clone(),
            DateField::Day => self.day.clone(),
            DateField::Hour => self.hour.clone(),
            DateField::Minutes => self.minutes.clone(),
            DateField::AmPm => self.meridiem.marker(locale).to_string(),
        }
    }
}

/// What extraction learned about the current photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoState {
    /// Displayed timezone already matches the target. No other fields read.
    AlreadyCorrect { reason: String },
    /// Photo needs review in the edit dialog.
    Capture(CaptureFields),
    /// Photo is displayed but its date/time text could not be read.
    Unreadable { date_text: String, time_text: String },
}

/// Snapshot of the current photo's metadata.
///
/// Produced fresh on every extraction and superseded by the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoMetadata {
    pub filename: String,
    pub state: PhotoState,
}

impl PhotoMetadata {
    pub fn already_correct(&self) -> bool {
        matches!(self.state, PhotoState::AlreadyCorrect { .. })
    }

    pub fn skip_reason(&self) -> Option<&str> {
        match &self.state {
            PhotoState::AlreadyCorrect { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn capture(&self) -> Option<&CaptureFields> {
        match &self.state {
            PhotoState::Capture(fields) => Some(fields),
            _ => None,
        }
    }
}

/// Filename of the displayed photo, `None` when nothing is displayed.
pub fn current_filename(surface: &dyn HostSurface) -> Option<String> {
    read_text(surface, ControlRole::FilenameLabel).filter(|f| !f.is_empty())
}

/// Read the currently displayed photo's metadata.
///
/// Returns `None` only when no filename is displayed. Date/time text that
/// cannot be parsed yields `PhotoState::Unreadable`.
pub fn extract_current(surface: &dyn HostSurface, config: &Config) -> Option<PhotoMetadata> {
    let filename = current_filename(surface)?;

    let timezone = read_text(surface, ControlRole::TimezoneLabel).unwrap_or_default();
    if timezone == config.target_timezone.trim() {
        return Some(PhotoMetadata {
            filename,
            state: PhotoState::AlreadyCorrect {
                reason: format!("already set to {}", config.target_timezone),
            },
        });
    }

    let date_text = read_text(surface, ControlRole::DateLabel).unwrap_or_default();
    let time_text = read_text(surface, ControlRole::TimeLabel).unwrap_or_default();

    let state = match parse_capture(&date_text, &time_text, &config.locale, current_year()) {
        Some(fields) => PhotoState::Capture(fields),
        None => {
            debug!(%filename, date = %date_text, time = %time_text, "Unreadable capture date/time");
            PhotoState::Unreadable {
                date_text,
                time_text,
            }
        }
    };
    Some(PhotoMetadata { filename, state })
}

fn read_text(surface: &dyn HostSurface, role: ControlRole) -> Option<String> {
    let handle = surface.find_control(role)?;
    surface
        .read_label(&handle)
        .map(|text| text.trim().to_string())
}

fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// First `H:MM` token of the time text. `:` may repeat.
static CLOCK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+):+(\d{1,2})").expect("clock regex should compile"));

/// Date patterns built from a locale's unit markers.
#[derive(Debug, Clone)]
pub struct DatePatterns {
    year: Regex,
    month: Regex,
    day: Regex,
}

impl DatePatterns {
    pub fn new(locale: &LocaleConfig) -> Result<Self, regex::Error> {
        let before = |digits: &str, marker: &str| {
            Regex::new(&format!(r"(\d{{{}}}){}", digits, regex::escape(marker)))
        };
        Ok(Self {
            year: before("4", &locale.year_marker)?,
            month: before("1,2", &locale.month_marker)?,
            day: before("1,2", &locale.day_marker)?,
        })
    }
}

fn first_capture<'a>(pattern: &Regex, text: &'a str) -> Option<&'a str> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parse displayed date and time text into capture fields.
///
/// The year defaults to `current_year` when the date text carries no year
/// marker. Hour and minutes come from the first `H:MM` token of the time
/// text; the meridiem is AM exactly when the morning marker is present.
pub fn parse_capture(
    date_text: &str,
    time_text: &str,
    locale: &LocaleConfig,
    current_year: i32,
) -> Option<CaptureFields> {
    let patterns = match DatePatterns::new(locale) {
        Ok(patterns) => patterns,
        Err(err) => {
            debug!(%err, "Locale markers do not form a date pattern");
            return None;
        }
    };

    let clock = CLOCK_PATTERN.captures(time_text)?;
    let hour = clock.get(1)?.as_str();
    let minutes = clock.get(2)?.as_str();

    let year = if date_text.contains(locale.year_marker.as_str()) {
        first_capture(&patterns.year, date_text)?.to_string()
    } else {
        current_year.to_string()
    };
    let month = first_capture(&patterns.month, date_text)?.to_string();
    let day = first_capture(&patterns.day, date_text)?.to_string();

    let meridiem = if time_text.contains(locale.morning_marker.as_str()) {
        Meridiem::Am
    } else {
        Meridiem::Pm
    };

    Some(CaptureFields {
        year,
        month,
        day,
        hour: pad_two(hour),
        minutes: minutes.to_string(),
        meridiem,
    })
}

/// Last two characters of the value prefixed with '0'.
fn pad_two(digits: &str) -> String {
    let padded = format!("0{}", digits);
    padded[padded.len() - 2..].to_string()
}
