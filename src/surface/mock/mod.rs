//! Mock host surface for testing.
//!
//! A time-driven, in-memory album that behaves like the host page in the
//! ways the core depends on: the edit dialog slides in before settling, the
//! timezone list opens after a delay, picking a timezone recomputes the
//! form, typed values only commit when the AM/PM control is clicked, a save
//! flashes the "date changed" notification, and navigation lands after a
//! delay. Freshly opened dialogs render the hour without zero padding until
//! the form is first recomputed.
//!
//! All clocks read `tokio::time::Instant`, so tests can run under paused time.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use tokio::time::Instant;
use tracing::debug;

use super::{ControlHandle, ControlRole, DateField, HostSurface, Position, SurfaceError};
use crate::config::LocaleConfig;

/// Timezones offered by the simulated list: (offset minutes, name).
const ZONES: &[(i32, &str)] = &[
    (-480, "太平洋标准时间 - 洛杉矶"),
    (-300, "东部标准时间 - 纽约"),
    (0, "格林尼治标准时间"),
    (60, "中欧标准时间 - 柏林"),
    (330, "印度标准时间 - 加尔各答"),
    (420, "印度支那时间 - 曼谷"),
    (480, "中国标准时间 - 北京"),
    (540, "日本标准时间 - 东京"),
    (600, "澳大利亚东部标准时间 - 悉尼"),
];

const WEEKDAYS: [&str; 7] = ["周一", "周二", "周三", "周四", "周五", "周六", "周日"];

const CAPTION_PREFIX: &str = "修改日期和时间";

const SETTLED_TOP: f64 = 120.0;
const SETTLED_LEFT: f64 = 320.0;

/// How the host recomputes the form when a new timezone is picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimezonePolicy {
    /// Keep the captured instant; the displayed wall clock shifts.
    KeepInstant,
    /// Keep the displayed wall clock; only the zone changes.
    KeepWallClock,
}

/// Host-side latencies.
#[derive(Debug, Clone)]
pub struct MockTimings {
    /// Time the dialog keeps sliding after it opens.
    pub dialog_animation: Duration,
    /// Time from clicking "next" to the next photo being displayed.
    pub navigation_delay: Duration,
    /// Time from saving to the notification appearing.
    pub notice_delay: Duration,
    /// Time the notification stays on screen.
    pub notice_duration: Duration,
    /// Time from save/cancel to the dialog disappearing.
    pub close_delay: Duration,
    /// Time from clicking the timezone selector to the list being populated.
    pub list_delay: Duration,
}

impl Default for MockTimings {
    fn default() -> Self {
        Self {
            dialog_animation: Duration::from_millis(300),
            navigation_delay: Duration::from_millis(400),
            notice_delay: Duration::from_millis(300),
            notice_duration: Duration::from_millis(1500),
            close_delay: Duration::from_millis(200),
            list_delay: Duration::from_millis(150),
        }
    }
}

impl MockTimings {
    /// Millisecond-scale latencies for real-time test suites.
    pub fn fast() -> Self {
        Self {
            dialog_animation: Duration::from_millis(20),
            navigation_delay: Duration::from_millis(15),
            notice_delay: Duration::from_millis(10),
            notice_duration: Duration::from_millis(60),
            close_delay: Duration::from_millis(10),
            list_delay: Duration::from_millis(10),
        }
    }
}

/// A photo in the simulated album.
#[derive(Debug, Clone, PartialEq)]
pub struct MockPhoto {
    pub filename: String,
    /// Capture time as displayed (wall clock in `offset_minutes`).
    pub taken: NaiveDateTime,
    /// Capture timezone offset from GMT.
    pub offset_minutes: i32,
    /// Whether the edit-date control is offered.
    pub editable: bool,
    pub policy: TimezonePolicy,
}

impl MockPhoto {
    pub fn new(filename: impl Into<String>, taken: NaiveDateTime, offset_minutes: i32) -> Self {
        Self {
            filename: filename.into(),
            taken,
            offset_minutes,
            editable: true,
            policy: TimezonePolicy::KeepInstant,
        }
    }

    /// Photo whose date cannot be edited (shared or partner photos).
    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    pub fn with_policy(mut self, policy: TimezonePolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Interactions recorded for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Click(ControlRole),
    ClickField(DateField),
    Write { field: DateField, value: String },
    PickTimezone(String),
}

struct DialogState {
    opened_at: Instant,
    closing_at: Option<Instant>,
    committed: NaiveDateTime,
    offset_minutes: i32,
    policy: TimezonePolicy,
    fields: HashMap<DateField, String>,
    normalized: bool,
    list_opened_at: Option<Instant>,
}

struct AlbumState {
    photos: Vec<MockPhoto>,
    current: usize,
    arriving: Option<(Instant, usize)>,
    dialog: Option<DialogState>,
    notice: Option<(Instant, Instant)>,
    interactions: Vec<Interaction>,
}

impl AlbumState {
    /// Apply every transition due at `now`.
    fn advance(&mut self, now: Instant) {
        if let Some((at, index)) = self.arriving {
            if now >= at {
                self.current = index;
                self.arriving = None;
            }
        }
        if self
            .dialog
            .as_ref()
            .and_then(|d| d.closing_at)
            .is_some_and(|at| now >= at)
        {
            self.dialog = None;
        }
        if self.notice.is_some_and(|(_, hidden_at)| now >= hidden_at) {
            self.notice = None;
        }
    }

    fn photo(&self) -> Option<&MockPhoto> {
        self.photos.get(self.current)
    }
}

/// In-memory album implementing `HostSurface`.
pub struct MockSurface {
    locale: LocaleConfig,
    timings: MockTimings,
    state: Mutex<AlbumState>,
}

impl MockSurface {
    pub fn new(photos: Vec<MockPhoto>, locale: LocaleConfig) -> Self {
        Self {
            locale,
            timings: MockTimings::default(),
            state: Mutex::new(AlbumState {
                photos,
                current: 0,
                arriving: None,
                dialog: None,
                notice: None,
                interactions: Vec::new(),
            }),
        }
    }

    pub fn with_timings(mut self, timings: MockTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn interactions(&self) -> Vec<Interaction> {
        self.state().interactions.clone()
    }

    /// Values typed into dialog fields, in order.
    pub fn writes(&self) -> Vec<(DateField, String)> {
        self.state()
            .interactions
            .iter()
            .filter_map(|i| match i {
                Interaction::Write { field, value } => Some((*field, value.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn clicks(&self, role: ControlRole) -> usize {
        self.state()
            .interactions
            .iter()
            .filter(|i| **i == Interaction::Click(role))
            .count()
    }

    pub fn photos(&self) -> Vec<MockPhoto> {
        self.state().photos.clone()
    }

    pub fn current_index(&self) -> usize {
        let mut state = self.state();
        state.advance(Instant::now());
        state.current
    }

    pub fn dialog_open(&self) -> bool {
        let mut state = self.state();
        state.advance(Instant::now());
        state.dialog.is_some()
    }

    fn state(&self) -> MutexGuard<'_, AlbumState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn marker(&self, hour: u32) -> &str {
        if hour < 12 {
            &self.locale.morning_marker
        } else {
            &self.locale.afternoon_marker
        }
    }

    fn date_text(&self, taken: &NaiveDateTime) -> String {
        let l = &self.locale;
        if taken.year() == chrono::Local::now().year() {
            format!("{}{}{}{}", taken.month(), l.month_marker, taken.day(), l.day_marker)
        } else {
            format!(
                "{}{}{}{}{}{}",
                taken.year(),
                l.year_marker,
                taken.month(),
                l.month_marker,
                taken.day(),
                l.day_marker
            )
        }
    }

    fn time_text(&self, taken: &NaiveDateTime) -> String {
        let weekday = WEEKDAYS[taken.weekday().num_days_from_monday() as usize];
        format!(
            "{} {}{}:{:02}",
            weekday,
            self.marker(taken.hour()),
            hour12(taken.hour()),
            taken.minute()
        )
    }

    fn render_fields(&self, dialog: &mut DialogState) {
        let t = dialog.committed;
        let hour = if dialog.normalized {
            format!("{:02}", hour12(t.hour()))
        } else {
            hour12(t.hour()).to_string()
        };
        dialog.fields = HashMap::from([
            (DateField::Year, t.year().to_string()),
            (DateField::Month, t.month().to_string()),
            (DateField::Day, t.day().to_string()),
            (DateField::Hour, hour),
            (DateField::Minutes, format!("{:02}", t.minute())),
            (DateField::AmPm, self.marker(t.hour()).to_string()),
        ]);
    }

    /// Recompute the form from typed values, as the host does on AM/PM clicks.
    fn commit_fields(&self, dialog: &mut DialogState) {
        match self.parse_fields(&dialog.fields) {
            Some(committed) => {
                dialog.committed = committed;
                dialog.normalized = true;
                self.render_fields(dialog);
            }
            None => debug!("Mock dialog rejected typed values"),
        }
    }

    fn parse_fields(&self, fields: &HashMap<DateField, String>) -> Option<NaiveDateTime> {
        let get = |field| fields.get(&field).map(|v| v.trim());
        let hour12: u32 = get(DateField::Hour)?.parse().ok()?;
        let minute: u32 = get(DateField::Minutes)?.parse().ok()?;
        let year: i32 = get(DateField::Year)?.parse().ok()?;
        let month: u32 = get(DateField::Month)?.parse().ok()?;
        let day: u32 = get(DateField::Day)?.parse().ok()?;
        let ampm = get(DateField::AmPm)?;

        let pm = if ampm == self.locale.afternoon_marker {
            true
        } else if ampm == self.locale.morning_marker {
            false
        } else {
            return None;
        };
        if !(1..=12).contains(&hour12) {
            return None;
        }
        let hour = hour12 % 12 + if pm { 12 } else { 0 };

        NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)
    }

    fn caption(dialog: &DialogState) -> String {
        let t = dialog.committed;
        format!(
            "{} {} {:02}:{:02} GMT{}",
            CAPTION_PREFIX,
            t.date(),
            t.hour(),
            t.minute(),
            format_offset(dialog.offset_minutes)
        )
    }

    fn list_open(&self, dialog: &DialogState, now: Instant) -> bool {
        dialog
            .list_opened_at
            .is_some_and(|at| now >= at + self.timings.list_delay)
    }

    fn pick_timezone(&self, dialog: &mut DialogState, offset_minutes: i32) {
        if dialog.policy == TimezonePolicy::KeepInstant {
            let delta = chrono::Duration::minutes(i64::from(offset_minutes - dialog.offset_minutes));
            dialog.committed += delta;
        }
        dialog.offset_minutes = offset_minutes;
        dialog.list_opened_at = None;
        dialog.normalized = true;
        self.render_fields(dialog);
    }
}

fn hour12(hour: u32) -> u32 {
    match hour % 12 {
        0 => 12,
        h => h,
    }
}

/// "+08:00" style offset.
fn format_offset(minutes: i32) -> String {
    let sign = if minutes < 0 { '-' } else { '+' };
    let abs = minutes.abs();
    format!("{}{:02}:{:02}", sign, abs / 60, abs % 60)
}

fn zone_label(offset_minutes: i32) -> String {
    let name = ZONES
        .iter()
        .find(|(offset, _)| *offset == offset_minutes)
        .map(|(_, name)| *name)
        .unwrap_or("");
    format!("(GMT{}) {}", format_offset(offset_minutes), name)
        .trim_end()
        .to_string()
}

fn role_of(id: &str) -> Option<ControlRole> {
    let role = match id {
        "filename" => ControlRole::FilenameLabel,
        "date" => ControlRole::DateLabel,
        "time" => ControlRole::TimeLabel,
        "timezone" => ControlRole::TimezoneLabel,
        "edit-date" => ControlRole::EditDateButton,
        "dialog" => ControlRole::Dialog,
        "caption" => ControlRole::DialogCaption,
        "tz-selector" => ControlRole::TimezoneSelector,
        "save" => ControlRole::SaveButton,
        "cancel" => ControlRole::CancelButton,
        "notice" => ControlRole::DateChangedNotice,
        "next" => ControlRole::NextPhotoButton,
        _ if id == "tz-current" || id.starts_with("tz-option:") => ControlRole::TimezoneOption,
        _ => return None,
    };
    Some(role)
}

fn option_offset(id: &str) -> Option<i32> {
    id.strip_prefix("tz-option:")?.parse().ok()
}

impl HostSurface for MockSurface {
    fn find_control(&self, role: ControlRole) -> Option<ControlHandle> {
        let now = Instant::now();
        let mut state = self.state();
        state.advance(now);

        let present = match role {
            ControlRole::FilenameLabel
            | ControlRole::DateLabel
            | ControlRole::TimeLabel
            | ControlRole::TimezoneLabel => state.photo().is_some(),
            ControlRole::EditDateButton => {
                state.dialog.is_none() && state.photo().is_some_and(|p| p.editable)
            }
            ControlRole::Dialog
            | ControlRole::DialogCaption
            | ControlRole::TimezoneSelector
            | ControlRole::SaveButton
            | ControlRole::CancelButton
            | ControlRole::TimezoneOption => state.dialog.is_some(),
            ControlRole::DateChangedNotice => {
                state.notice.is_some_and(|(shown_at, _)| now >= shown_at)
            }
            ControlRole::NextPhotoButton => {
                state.dialog.is_none() && state.current + 1 < state.photos.len()
            }
        };
        if !present {
            return None;
        }

        let id = match role {
            ControlRole::FilenameLabel => "filename",
            ControlRole::DateLabel => "date",
            ControlRole::TimeLabel => "time",
            ControlRole::TimezoneLabel => "timezone",
            ControlRole::EditDateButton => "edit-date",
            ControlRole::Dialog => "dialog",
            ControlRole::DialogCaption => "caption",
            ControlRole::TimezoneSelector => "tz-selector",
            ControlRole::TimezoneOption => "tz-current",
            ControlRole::SaveButton => "save",
            ControlRole::CancelButton => "cancel",
            ControlRole::DateChangedNotice => "notice",
            ControlRole::NextPhotoButton => "next",
        };
        Some(ControlHandle::new(id))
    }

    fn find_all(&self, role: ControlRole) -> Vec<ControlHandle> {
        if role != ControlRole::TimezoneOption {
            return self.find_control(role).into_iter().collect();
        }

        let now = Instant::now();
        let mut state = self.state();
        state.advance(now);

        let Some(dialog) = state.dialog.as_ref() else {
            return Vec::new();
        };
        let mut handles = vec![ControlHandle::new("tz-current")];
        if self.list_open(dialog, now) {
            handles.extend(
                ZONES
                    .iter()
                    .map(|(offset, _)| ControlHandle::new(format!("tz-option:{}", offset))),
            );
        }
        handles
    }

    fn read_field(&self, dialog: &ControlHandle, field: DateField) -> Option<String> {
        if dialog.id() != "dialog" {
            return None;
        }
        let mut state = self.state();
        state.advance(Instant::now());
        state.dialog.as_ref()?.fields.get(&field).cloned()
    }

    fn write_field(
        &self,
        dialog: &ControlHandle,
        field: DateField,
        value: &str,
    ) -> Result<(), SurfaceError> {
        let mut state = self.state();
        state.advance(Instant::now());

        let open = match state.dialog.as_mut() {
            Some(open) if dialog.id() == "dialog" => open,
            _ => return Err(SurfaceError::Detached(dialog.id().to_string())),
        };
        open.fields.insert(field, value.to_string());
        state.interactions.push(Interaction::Write {
            field,
            value: value.to_string(),
        });
        Ok(())
    }

    fn read_label(&self, handle: &ControlHandle) -> Option<String> {
        let now = Instant::now();
        let mut state = self.state();
        state.advance(now);

        match role_of(handle.id())? {
            ControlRole::FilenameLabel => state.photo().map(|p| p.filename.clone()),
            ControlRole::DateLabel => state.photo().map(|p| self.date_text(&p.taken)),
            ControlRole::TimeLabel => state.photo().map(|p| self.time_text(&p.taken)),
            ControlRole::TimezoneLabel => state
                .photo()
                .map(|p| format!("GMT{}", format_offset(p.offset_minutes))),
            ControlRole::DialogCaption => state.dialog.as_ref().map(Self::caption),
            ControlRole::TimezoneOption => {
                let dialog = state.dialog.as_ref()?;
                match option_offset(handle.id()) {
                    Some(offset) if self.list_open(dialog, now) => Some(zone_label(offset)),
                    Some(_) => None,
                    None => Some(zone_label(dialog.offset_minutes)),
                }
            }
            _ => None,
        }
    }

    fn is_selected(&self, handle: &ControlHandle) -> bool {
        let mut state = self.state();
        state.advance(Instant::now());

        let Some(dialog) = state.dialog.as_ref() else {
            return false;
        };
        match option_offset(handle.id()) {
            Some(offset) => offset == dialog.offset_minutes,
            None => handle.id() == "tz-current",
        }
    }

    fn position(&self, handle: &ControlHandle) -> Option<Position> {
        let now = Instant::now();
        let mut state = self.state();
        state.advance(now);

        match role_of(handle.id())? {
            ControlRole::Dialog => {
                let dialog = state.dialog.as_ref()?;
                let elapsed = now.saturating_duration_since(dialog.opened_at);
                let remaining = self.timings.dialog_animation.saturating_sub(elapsed);
                Some(Position {
                    top: SETTLED_TOP + remaining.as_secs_f64() * 1000.0,
                    left: SETTLED_LEFT,
                })
            }
            ControlRole::DateChangedNotice => state
                .notice
                .filter(|(shown_at, _)| now >= *shown_at)
                .map(|_| Position {
                    top: 48.0,
                    left: 24.0,
                }),
            _ => Some(Position {
                top: 0.0,
                left: 0.0,
            }),
        }
    }

    fn click(&self, handle: &ControlHandle) -> Result<(), SurfaceError> {
        let now = Instant::now();
        let mut guard = self.state();
        let state = &mut *guard;
        state.advance(now);

        let role = role_of(handle.id())
            .ok_or_else(|| SurfaceError::Detached(handle.id().to_string()))?;
        state.interactions.push(Interaction::Click(role));

        match role {
            ControlRole::EditDateButton => {
                let photo = match state.photo() {
                    Some(photo) if photo.editable && state.dialog.is_none() => photo,
                    _ => return Err(SurfaceError::Detached(handle.id().to_string())),
                };
                let mut dialog = DialogState {
                    opened_at: now,
                    closing_at: None,
                    committed: photo.taken,
                    offset_minutes: photo.offset_minutes,
                    policy: photo.policy,
                    fields: HashMap::new(),
                    normalized: false,
                    list_opened_at: None,
                };
                self.render_fields(&mut dialog);
                state.dialog = Some(dialog);
            }
            ControlRole::TimezoneSelector => {
                if let Some(dialog) = state.dialog.as_mut() {
                    dialog.list_opened_at = Some(now);
                }
            }
            ControlRole::TimezoneOption => {
                let Some(dialog) = state.dialog.as_mut() else {
                    return Err(SurfaceError::Detached(handle.id().to_string()));
                };
                match option_offset(handle.id()) {
                    Some(offset) if self.list_open(dialog, now) => {
                        self.pick_timezone(dialog, offset);
                        state
                            .interactions
                            .push(Interaction::PickTimezone(zone_label(offset)));
                    }
                    Some(_) => return Err(SurfaceError::Detached(handle.id().to_string())),
                    None => dialog.list_opened_at = Some(now),
                }
            }
            ControlRole::SaveButton => {
                let current = state.current;
                let Some(dialog) = state.dialog.as_mut() else {
                    return Err(SurfaceError::Detached(handle.id().to_string()));
                };
                dialog.closing_at = Some(now + self.timings.close_delay);
                let (taken, offset) = (dialog.committed, dialog.offset_minutes);
                if let Some(photo) = state.photos.get_mut(current) {
                    photo.taken = taken;
                    photo.offset_minutes = offset;
                }
                let shown_at = now + self.timings.notice_delay;
                state.notice = Some((shown_at, shown_at + self.timings.notice_duration));
            }
            ControlRole::CancelButton => {
                if let Some(dialog) = state.dialog.as_mut() {
                    dialog.closing_at = Some(now + self.timings.close_delay);
                }
            }
            ControlRole::NextPhotoButton => {
                let next = state.current + 1;
                if state.arriving.is_none() && next < state.photos.len() {
                    state.arriving = Some((now + self.timings.navigation_delay, next));
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn click_field(&self, dialog: &ControlHandle, field: DateField) -> Result<(), SurfaceError> {
        let mut guard = self.state();
        let state = &mut *guard;
        state.advance(Instant::now());

        let open = match state.dialog.as_mut() {
            Some(open) if dialog.id() == "dialog" => open,
            _ => return Err(SurfaceError::Detached(dialog.id().to_string())),
        };
        // The host recomputes the whole form when the AM/PM input is touched.
        if field == DateField::AmPm {
            self.commit_fields(open);
        }
        state.interactions.push(Interaction::ClickField(field));
        Ok(())
    }
}
