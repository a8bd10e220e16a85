//! Album traversal step definitions.

use std::sync::Arc;

use album_tzfix::config::Config;
use album_tzfix::orchestration::{fix_album, AlbumReport, Session};
use album_tzfix::surface::{
    ControlRole, HostSurface, MockPhoto, MockSurface, MockTimings, TimezonePolicy,
};
use album_tzfix::FixError;
use chrono::NaiveDateTime;
use cucumber::{given, then, when, World};

const TAKEN_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Test context for album traversal scenarios.
#[derive(World)]
#[world(init = Self::new)]
pub struct AlbumWorld {
    config: Config,
    photos: Vec<MockPhoto>,
    surface: Option<Arc<MockSurface>>,
    result: Option<Result<AlbumReport, FixError>>,
}

impl std::fmt::Debug for AlbumWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlbumWorld")
            .field("target_timezone", &self.config.target_timezone)
            .field("photos", &self.photos)
            .field("surface", &self.surface.as_ref().map(|_| "<MockSurface>"))
            .field("result", &self.result)
            .finish()
    }
}

impl AlbumWorld {
    fn new() -> Self {
        Self {
            config: Config::for_test(),
            photos: Vec::new(),
            surface: None,
            result: None,
        }
    }

    fn surface(&self) -> &MockSurface {
        self.surface
            .as_deref()
            .expect("Album has not been fixed yet")
    }

    fn report(&self) -> &AlbumReport {
        match self.result.as_ref().expect("Album has not been fixed yet") {
            Ok(report) => report,
            Err(err) => panic!("Album run failed: {}", err),
        }
    }

    fn stored_photo(&self, filename: &str) -> MockPhoto {
        self.surface()
            .photos()
            .into_iter()
            .find(|photo| photo.filename == filename)
            .unwrap_or_else(|| panic!("No photo named {}", filename))
    }

    fn last_photo(&mut self) -> &mut MockPhoto {
        self.photos.last_mut().expect("No photo defined yet")
    }
}

/// "GMT+09:00" to minutes east of GMT.
fn parse_offset(label: &str) -> i32 {
    let offset = label.strip_prefix("GMT").expect("Offset must start with GMT");
    let (sign, rest) = match offset.split_at(1) {
        ("+", rest) => (1, rest),
        ("-", rest) => (-1, rest),
        _ => panic!("Offset must be signed: {}", label),
    };
    let (hours, minutes) = rest.split_once(':').expect("Offset must be HH:MM");
    let hours: i32 = hours.parse().expect("Invalid offset hours");
    let minutes: i32 = minutes.parse().expect("Invalid offset minutes");
    sign * (hours * 60 + minutes)
}

fn parse_taken(text: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(text, TAKEN_FORMAT).expect("Invalid capture time")
}

// ==========================================================================
// Album setup
// ==========================================================================

#[given(expr = "the target timezone is {string}")]
async fn given_target_timezone(world: &mut AlbumWorld, timezone: String) {
    world.config.target_timezone = timezone;
}

#[given(expr = "a photo {string} taken at {string} in {string}")]
async fn given_photo(world: &mut AlbumWorld, filename: String, taken: String, offset: String) {
    world.photos.push(MockPhoto::new(
        filename,
        parse_taken(&taken),
        parse_offset(&offset),
    ));
}

#[given("the host keeps the wall clock when a timezone is picked")]
async fn given_keeps_wall_clock(world: &mut AlbumWorld) {
    let photo = world.last_photo();
    photo.policy = TimezonePolicy::KeepWallClock;
}

#[given(expr = "the photo {string} cannot be edited")]
async fn given_read_only(world: &mut AlbumWorld, filename: String) {
    let photo = world
        .photos
        .iter_mut()
        .find(|photo| photo.filename == filename)
        .expect("No such photo");
    photo.editable = false;
}

// ==========================================================================
// Traversal
// ==========================================================================

#[when("the album is fixed")]
async fn when_album_fixed(world: &mut AlbumWorld) {
    let surface = Arc::new(
        MockSurface::new(world.photos.clone(), world.config.locale.clone())
            .with_timings(MockTimings::fast()),
    );
    let session = Session::with_tokio(surface.clone(), world.config.clone());

    world.result = Some(fix_album(&session).await);
    world.surface = Some(surface);
}

// ==========================================================================
// Outcomes
// ==========================================================================

#[then("the album run succeeds")]
async fn then_run_succeeds(world: &mut AlbumWorld) {
    world.report();
}

#[then(expr = "the album run fails because the {string} is missing")]
async fn then_run_fails_missing(world: &mut AlbumWorld, control: String) {
    match world.result.as_ref().expect("Album has not been fixed yet") {
        Ok(report) => panic!("Expected failure, got {:?}", report),
        Err(err) => {
            assert!(
                matches!(err, FixError::NotFound(_)),
                "Expected a missing control, got: {}",
                err
            );
            assert_eq!(err.to_string(), format!("{} not found", control));
        }
    }
}

#[then(expr = "the report shows {int} visited, {int} skipped and {int} saved")]
async fn then_report_shows(world: &mut AlbumWorld, visited: usize, skipped: usize, saved: usize) {
    let report = world.report();
    assert_eq!(report.visited, visited, "visited");
    assert_eq!(report.skipped, skipped, "skipped");
    assert_eq!(report.saved, saved, "saved");
}

#[then("no edit dialog was opened")]
async fn then_no_dialog(world: &mut AlbumWorld) {
    assert_eq!(world.surface().clicks(ControlRole::EditDateButton), 0);
}

#[then("no field was typed")]
async fn then_no_field_typed(world: &mut AlbumWorld) {
    assert!(
        world.surface().writes().is_empty(),
        "Unexpected writes: {:?}",
        world.surface().writes()
    );
}

#[then(expr = "the photo {string} is in {string}")]
async fn then_photo_in(world: &mut AlbumWorld, filename: String, offset: String) {
    let photo = world.stored_photo(&filename);
    assert_eq!(photo.offset_minutes, parse_offset(&offset), "{}", filename);
}

#[then(expr = "the photo {string} was captured at {string}")]
async fn then_photo_captured_at(world: &mut AlbumWorld, filename: String, taken: String) {
    let photo = world.stored_photo(&filename);
    assert_eq!(photo.taken, parse_taken(&taken), "{}", filename);
}

#[then(expr = "the album stopped at {string}")]
async fn then_stopped_at(world: &mut AlbumWorld, filename: String) {
    let surface = world.surface();
    let label = surface
        .find_control(ControlRole::FilenameLabel)
        .and_then(|handle| surface.read_label(&handle));
    assert_eq!(label.as_deref(), Some(filename.as_str()));
}
