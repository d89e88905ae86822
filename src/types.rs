/// Core timetable data types.
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// A date interval during which an activity or location is valid.
///
/// `end == None` is an instant interval covering a single day; otherwise
/// both endpoints are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateInterval {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl DateInterval {
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: None,
        }
    }

    pub fn range(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match self.end {
            Some(end) => self.start <= date && date <= end,
            None => date == self.start,
        }
    }
}

/// Returns true when `date` falls inside any of `intervals`.
///
/// An empty list means no constraint, so every date is valid.
pub fn date_in_intervals(date: NaiveDate, intervals: &[DateInterval]) -> bool {
    intervals.is_empty() || intervals.iter().any(|interval| interval.contains(date))
}

/// One location a class may occur in, scoped to its own validity window.
///
/// Represents the "Location" column of a course page, where a room can be
/// listed as `Jack Erskine 244 (27/2-27/3, 24/4-29/5)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub place: String,
    #[serde(default)]
    pub valid_intervals: Vec<DateInterval>,
}

impl Location {
    pub fn valid_for(&self, date: NaiveDate) -> bool {
        date_in_intervals(date, &self.valid_intervals)
    }
}

/// One scraped timetable row: a single scheduled instance of a course
/// activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEntry {
    /// Course identifier, e.g. "SENG201".
    pub course: String,
    /// Activity kind, e.g. "Computer Lab A".
    pub activity: String,
    /// Variant label exactly as scraped, e.g. "03-P1". `None` means the
    /// activity has a single unlabeled variant.
    pub variant: Option<String>,
    pub day: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
    /// The week intervals this entry runs in ("Weeks" column). Empty means
    /// every week.
    #[serde(default)]
    pub weeks: Vec<DateInterval>,
    #[serde(default)]
    pub locations: Vec<Location>,
}

impl RawEntry {
    /// True when this entry occurs on `date` (weekday and week intervals).
    pub fn valid_for(&self, date: NaiveDate) -> bool {
        date.weekday() == self.day && date_in_intervals(date, &self.weeks)
    }

    /// The first location valid on `date`, if any.
    pub fn location_on(&self, date: NaiveDate) -> Option<&Location> {
        self.locations.iter().find(|loc| loc.valid_for(date))
    }
}

/// Terminal colour a course can be displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Colour {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Colour {
    /// Escape sequence that resets the terminal colour.
    pub const RESET: &'static str = "\u{1b}[0m";

    /// The ANSI escape sequence for this colour (see console_codes(4)).
    pub fn ansi(self) -> &'static str {
        match self {
            Colour::Black => "\u{1b}[30m",
            Colour::Red => "\u{1b}[31m",
            Colour::Green => "\u{1b}[32m",
            Colour::Yellow => "\u{1b}[33m",
            Colour::Blue => "\u{1b}[34m",
            Colour::Magenta => "\u{1b}[35m",
            Colour::Cyan => "\u{1b}[36m",
            Colour::White => "\u{1b}[37m",
        }
    }
}

/// One resolved event in a day's schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEvent {
    pub course: String,
    pub activity: String,
    pub colour: Option<Colour>,
    pub start: NaiveTime,
    pub end: NaiveTime,
    /// The location valid on the resolved date, when one is listed.
    pub location: Option<String>,
}

impl ResolvedEvent {
    /// True when the two events' `[start, end)` intervals overlap.
    pub fn clashes_with(&self, other: &ResolvedEvent) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A (year, semester) teaching term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Term {
    pub year: i32,
    pub semester: u8,
}

impl Term {
    /// The term containing `date`: February through June is semester 1,
    /// July through November semester 2. December and January fall outside
    /// any teaching term.
    pub fn containing(date: NaiveDate) -> Option<Term> {
        let semester = match date.month() {
            2..=6 => 1,
            7..=11 => 2,
            _ => return None,
        };
        Some(Term {
            year: date.year(),
            semester,
        })
    }
}
