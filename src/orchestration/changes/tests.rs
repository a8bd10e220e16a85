use super::*;
use crate::config::Config;
use crate::metadata::{extract_current, PhotoState};
use crate::orchestration::dialog::open_dialog;
use crate::surface::{Interaction, MockPhoto, MockSurface, MockTimings, TimezonePolicy};
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;
use std::time::Duration;

fn taken(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, min, 0))
        .unwrap()
}

fn session(photo: MockPhoto, config: Config) -> (Arc<MockSurface>, Session) {
    let surface = Arc::new(MockSurface::new(vec![photo], config.locale.clone()));
    (surface.clone(), Session::with_tokio(surface, config))
}

fn capture_of(surface: &MockSurface, config: &Config) -> CaptureFields {
    match extract_current(surface, config).unwrap().state {
        PhotoState::Capture(capture) => capture,
        other => panic!("photo has no capture fields: {:?}", other),
    }
}

async fn run(surface: &MockSurface, session: &Session) -> Result<Finalized> {
    let queue = build_change_queue(&capture_of(surface, &session.config), &session.config);
    let dialog = open_dialog(session).await?;
    let save = surface.find_control(ControlRole::SaveButton);
    apply_changes(session, &dialog, queue, save.as_ref(), false).await
}

struct NeverApplies;

#[async_trait]
impl CustomAction for NeverApplies {
    async fn invoke(&self, _session: &Session, _dialog: &ControlHandle) -> Result<()> {
        Ok(())
    }

    fn verify(&self, _surface: &dyn HostSurface, _dialog: &ControlHandle) -> bool {
        false
    }
}

#[test]
fn test_queue_order_timezone_first() {
    let config = Config::default();
    let capture = CaptureFields {
        year: "2019".to_string(),
        month: "3".to_string(),
        day: "14".to_string(),
        hour: "09".to_string(),
        minutes: "05".to_string(),
        meridiem: crate::metadata::Meridiem::Am,
    };

    let queue = build_change_queue(&capture, &config);
    let order: Vec<&str> = queue.iter().map(|c| c.description.as_str()).collect();
    assert_eq!(
        order,
        vec!["timezone", "hour", "minutes", "am/pm", "year", "month", "day"]
    );

    let expected: Vec<&str> = queue.iter().map(|c| c.expected.as_str()).collect();
    assert_eq!(
        expected,
        vec!["GMT+08:00", "09", "05", "上午", "2019", "3", "14"]
    );
    assert!(matches!(queue[0].target, ChangeTarget::Custom(_)));
}

#[tokio::test(start_paused = true)]
async fn test_timezone_only_change_saves_without_writes() {
    let photo = MockPhoto::new("a.jpg", taken(2019, 3, 14, 9, 5), 9 * 60)
        .with_policy(TimezonePolicy::KeepWallClock);
    let (surface, session) = session(photo, Config::default());

    let finalized = run(&surface, &session).await.unwrap();
    assert_eq!(finalized, Finalized::Saved);
    assert!(surface.writes().is_empty());
    assert!(surface
        .interactions()
        .contains(&Interaction::PickTimezone("(GMT+08:00) 中国标准时间 - 北京".to_string())));
    assert_eq!(surface.clicks(ControlRole::SaveButton), 1);
    assert_eq!(surface.clicks(ControlRole::CancelButton), 0);

    let stored = &surface.photos()[0];
    assert_eq!(stored.offset_minutes, 8 * 60);
    assert_eq!(stored.taken, taken(2019, 3, 14, 9, 5));
}

#[tokio::test(start_paused = true)]
async fn test_shifted_hour_is_restored_after_timezone_pick() {
    let photo = MockPhoto::new("a.jpg", taken(2019, 3, 14, 9, 5), 9 * 60);
    let (surface, session) = session(photo, Config::default());

    let finalized = run(&surface, &session).await.unwrap();
    assert_eq!(finalized, Finalized::Saved);
    assert_eq!(surface.writes(), vec![(DateField::Hour, "09".to_string())]);

    let stored = &surface.photos()[0];
    assert_eq!(stored.offset_minutes, 8 * 60);
    assert_eq!(stored.taken, taken(2019, 3, 14, 9, 5));
}

#[tokio::test(start_paused = true)]
async fn test_timezone_pick_across_midnight_restores_date() {
    let photo = MockPhoto::new("a.jpg", taken(2019, 3, 14, 0, 30), 9 * 60);
    let (surface, session) = session(photo, Config::default());

    let finalized = run(&surface, &session).await.unwrap();
    assert_eq!(finalized, Finalized::Saved);

    let written: Vec<DateField> = surface.writes().into_iter().map(|(f, _)| f).collect();
    assert_eq!(
        written,
        vec![DateField::Hour, DateField::AmPm, DateField::Day]
    );

    let stored = &surface.photos()[0];
    assert_eq!(stored.offset_minutes, 8 * 60);
    assert_eq!(stored.taken, taken(2019, 3, 14, 0, 30));
}

#[tokio::test(start_paused = true)]
async fn test_nothing_to_change_cancels() {
    let config = Config {
        target_timezone: "GMT+09:00".to_string(),
        ..Config::default()
    };
    let photo = MockPhoto::new("a.jpg", taken(2019, 3, 14, 9, 5), 9 * 60);
    let (surface, session) = session(photo, config);

    let dialog = open_dialog(&session).await.unwrap();
    let capture = CaptureFields {
        year: "2019".to_string(),
        month: "3".to_string(),
        day: "14".to_string(),
        hour: "9".to_string(),
        minutes: "05".to_string(),
        meridiem: crate::metadata::Meridiem::Am,
    };
    let queue = build_change_queue(&capture, &session.config);

    let finalized = apply_changes(&session, &dialog, queue, None, false).await.unwrap();
    assert_eq!(finalized, Finalized::Cancelled);
    assert!(surface.writes().is_empty());
    assert_eq!(surface.clicks(ControlRole::TimezoneSelector), 0);
    assert_eq!(surface.clicks(ControlRole::CancelButton), 1);
    assert!(!surface.dialog_open());
}

#[tokio::test(start_paused = true)]
async fn test_unconfirmed_change_stops_queue() {
    let photo = MockPhoto::new("a.jpg", taken(2019, 3, 14, 9, 5), 9 * 60);
    let (surface, session) = session(photo, Config::default());
    let dialog = open_dialog(&session).await.unwrap();

    let mut queue = ChangeQueue::new();
    queue.push_back(ChangeDescriptor::custom(
        "stubborn",
        Box::new(NeverApplies),
        "anything",
    ));
    queue.push_back(ChangeDescriptor::field(DateField::Hour, "11"));

    let err = apply_changes(&session, &dialog, queue, None, false)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FixError::VerificationFailed { ref description, .. } if description == "stubborn"
    ));
    assert!(surface.writes().is_empty());
    assert_eq!(surface.clicks(ControlRole::SaveButton), 0);
    assert_eq!(surface.clicks(ControlRole::CancelButton), 0);
}

#[tokio::test(start_paused = true)]
async fn test_save_needed_without_save_control() {
    let photo = MockPhoto::new("a.jpg", taken(2019, 3, 14, 9, 5), 9 * 60);
    let (_surface, session) = session(photo, Config::default());
    let dialog = open_dialog(&session).await.unwrap();

    let err = apply_changes(&session, &dialog, ChangeQueue::new(), None, true)
        .await
        .unwrap_err();
    assert!(matches!(err, FixError::NotFound(ControlRole::SaveButton)));
}

#[tokio::test(start_paused = true)]
async fn test_field_already_matching_is_not_written() {
    let photo = MockPhoto::new("a.jpg", taken(2019, 3, 14, 9, 5), 9 * 60);
    let (surface, session) = session(photo, Config::default());
    let dialog = open_dialog(&session).await.unwrap();

    let mut queue = ChangeQueue::new();
    queue.push_back(ChangeDescriptor::field(DateField::Minutes, "05"));
    queue.push_back(ChangeDescriptor::field(DateField::Year, "2019"));

    let save = surface.find_control(ControlRole::SaveButton);
    let finalized = apply_changes(&session, &dialog, queue, save.as_ref(), false)
        .await
        .unwrap();
    assert_eq!(finalized, Finalized::Cancelled);
    assert!(surface.writes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_timezone_list_that_never_expands_times_out() {
    let config = Config::default();
    let timings = MockTimings {
        list_delay: Duration::from_secs(3600),
        ..MockTimings::default()
    };
    let surface = Arc::new(
        MockSurface::new(
            vec![MockPhoto::new("a.jpg", taken(2019, 3, 14, 9, 5), 9 * 60)],
            config.locale.clone(),
        )
        .with_timings(timings),
    );
    let session = Session::with_tokio(surface.clone(), config);
    let dialog = open_dialog(&session).await.unwrap();

    let err = TimezoneSelection::new("GMT+08:00")
        .invoke(&session, &dialog)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FixError::Timeout {
            phase: WaitPhase::TimezoneList,
            ..
        }
    ));
    assert_eq!(surface.clicks(ControlRole::TimezoneOption), 0);
}

#[tokio::test(start_paused = true)]
async fn test_timezone_not_offered_is_not_found() {
    let photo = MockPhoto::new("a.jpg", taken(2019, 3, 14, 9, 5), 9 * 60);
    let (surface, session) = session(photo, Config::default());
    let dialog = open_dialog(&session).await.unwrap();

    let err = TimezoneSelection::new("GMT+05:45")
        .invoke(&session, &dialog)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FixError::NotFound(ControlRole::TimezoneOption)
    ));
    assert_eq!(surface.clicks(ControlRole::TimezoneSelector), 1);
    assert_eq!(surface.clicks(ControlRole::TimezoneOption), 0);
}

#[tokio::test(start_paused = true)]
async fn test_unavailable_timezone_fails_verification() {
    let mut config = Config::default();
    config.target_timezone = "GMT+05:45".to_string();
    let photo = MockPhoto::new("a.jpg", taken(2019, 3, 14, 9, 5), 9 * 60);
    let (surface, session) = session(photo, config);

    let err = run(&surface, &session).await.unwrap_err();
    assert!(matches!(
        err,
        FixError::VerificationFailed { ref description, ref expected }
            if description == "timezone" && expected == "GMT+05:45"
    ));
    assert!(surface.writes().is_empty());
    assert_eq!(surface.clicks(ControlRole::SaveButton), 0);
    assert_eq!(surface.photos()[0].offset_minutes, 9 * 60);
}
