//! album-tzfix-sim: dry run against a simulated album
//!
//! Loads an album fixture, runs the full traversal against the in-memory
//! host surface and prints the resulting tally.
//!
//! ## Configuration
//! - ALBUM_TZFIX_ALBUM: path to the album fixture (or pass it as the first argument)
//! - ALBUM_TZFIX_CONFIG: path to a configuration file (optional)
//! - ALBUM_TZFIX_LOG: log filter (default: info)
//!
//! ## Fixture format
//! ```yaml
//! photos:
//!   - filename: IMG_0001.jpg
//!     taken: "2019-03-14 21:05"
//!     offset_minutes: 540
//!   - filename: IMG_0002.jpg
//!     taken: "2019-03-15 08:30"
//!     offset_minutes: 480
//!     editable: false
//! ```

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::info;

use album_tzfix::config::{Config, ALBUM_ENV_VAR};
use album_tzfix::orchestration::{fix_album, Session};
use album_tzfix::surface::{MockPhoto, MockSurface, TimezonePolicy};
use album_tzfix::utils::bootstrap::init_tracing;

const TAKEN_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Deserialize)]
struct AlbumFixture {
    photos: Vec<PhotoFixture>,
}

#[derive(Debug, Deserialize)]
struct PhotoFixture {
    filename: String,
    taken: String,
    offset_minutes: i32,
    #[serde(default = "default_editable")]
    editable: bool,
    /// Host keeps the wall clock when the timezone is picked.
    #[serde(default)]
    keep_wall_clock: bool,
}

fn default_editable() -> bool {
    true
}

impl PhotoFixture {
    fn into_photo(self) -> Result<MockPhoto, Box<dyn std::error::Error>> {
        let taken = NaiveDateTime::parse_from_str(&self.taken, TAKEN_FORMAT)
            .map_err(|e| format!("{}: invalid taken '{}': {}", self.filename, self.taken, e))?;
        let mut photo = MockPhoto::new(self.filename, taken, self.offset_minutes);
        if !self.editable {
            photo = photo.read_only();
        }
        if self.keep_wall_clock {
            photo = photo.with_policy(TimezonePolicy::KeepWallClock);
        }
        Ok(photo)
    }
}

fn load_album(path: &str) -> Result<Vec<MockPhoto>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let fixture: AlbumFixture = serde_yaml::from_str(&content)?;
    fixture
        .photos
        .into_iter()
        .map(PhotoFixture::into_photo)
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let album_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(ALBUM_ENV_VAR).ok())
        .ok_or_else(|| format!("album fixture required: pass a path or set {}", ALBUM_ENV_VAR))?;

    let config = Config::load(None)?;
    let photos = load_album(&album_path)?;
    info!(
        album = %album_path,
        photos = photos.len(),
        timezone = %config.target_timezone,
        "album-tzfix-sim started"
    );

    let surface = Arc::new(MockSurface::new(photos, config.locale.clone()));
    let session = Session::with_tokio(surface.clone(), config);
    let report = fix_album(&session).await?;

    println!(
        "visited {} photos: {} saved, {} skipped, {} unchanged",
        report.visited, report.saved, report.skipped, report.unchanged
    );
    for photo in surface.photos() {
        println!(
            "  {}  {}  offset {:+} min",
            photo.filename,
            photo.taken.format(TAKEN_FORMAT),
            photo.offset_minutes
        );
    }

    Ok(())
}
