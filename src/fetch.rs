//! Scraping of course activity tables from the UC course information pages.
//!
//! Each configured course has a details page whose `#RepeatTable` lists the
//! scheduled activities: one `tbody` heading per activity kind followed by
//! `tr.datarow` rows carrying the activity id, day, time, location, and
//! week columns.

use crate::config::Config;
use crate::error::TimetableError;
use crate::types::{DateInterval, Location, RawEntry};
use chrono::{NaiveDate, NaiveTime, Weekday};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, info};
use url::Url;

const COURSE_INFO_URL: &str = "https://www.canterbury.ac.nz/courseinfo/GetCourseDetails.aspx";

// Static selectors - compiled once.
static SECTION_OR_ROW: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("table#RepeatTable tbody, table#RepeatTable tr.datarow").unwrap()
});
static ACTIVITY_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"td[data-title="Activity"]"#).unwrap());
static DAY_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"td[data-title="Day"]"#).unwrap());
static TIME_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"td[data-title="Time"]"#).unwrap());
static LOCATION_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"td[data-title="Location"]"#).unwrap());
static WEEKS_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"td[data-title="Weeks"]"#).unwrap());

// A location is "<place> (<d/m>, <d/m-d/m>, ...)"; the date section is
// optional.
static LOCATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<name>.+?)\s*\((?P<dates>.+?)\)$").unwrap());

/// Scrapes activity tables for the configured courses.
pub struct CourseFetcher {
    client: reqwest::Client,
}

impl Default for CourseFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl CourseFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// The course-details URL for one course occurrence, e.g.
    /// `GetCourseDetails.aspx?course=SENG201&occurrence=26S2(C)&year=2026`.
    fn course_url(course: &str, year: i32, semester: u8) -> Result<Url, TimetableError> {
        let occurrence = format!("{:02}S{semester}(C)", year.rem_euclid(100));
        Url::parse_with_params(
            COURSE_INFO_URL,
            &[
                ("course", course),
                ("occurrence", occurrence.as_str()),
                ("year", year.to_string().as_str()),
            ],
        )
        .map_err(|err| TimetableError::parse(err.to_string()))
    }

    /// Downloads and parses one course's activity rows.
    pub async fn fetch_course(
        &self,
        course: &str,
        year: i32,
        semester: u8,
    ) -> Result<Vec<RawEntry>, TimetableError> {
        let url = Self::course_url(course, year, semester)?;
        info!("fetching {course} activities from {url}");
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(TimetableError::fetch(format!(
                "{course}: server returned {}",
                response.status()
            )));
        }
        let html = response.text().await?;
        parse_course_page(course, year, &html)
    }

    /// Fetches every configured course, in identifier order.
    pub async fn fetch_all(&self, config: &Config) -> Result<Vec<RawEntry>, TimetableError> {
        let mut entries = Vec::new();
        for (course, pref) in &config.courses {
            entries.extend(self.fetch_course(course, pref.year, pref.semester).await?);
        }
        info!("scraped {} timetable entries", entries.len());
        Ok(entries)
    }
}

/// Parses a course details page into raw entries.
///
/// `tbody` elements carry the activity-kind heading; the `datarow` rows
/// that follow in document order belong to that kind, mirroring the portal
/// markup. Malformed rows are skipped rather than failing the whole page.
pub fn parse_course_page(
    course: &str,
    year: i32,
    html: &str,
) -> Result<Vec<RawEntry>, TimetableError> {
    let document = Html::parse_document(html);
    let mut entries = Vec::new();
    let mut activity: Option<String> = None;

    for element in document.select(&SECTION_OR_ROW) {
        if element.value().name() == "tbody" {
            activity = section_heading(&element);
            continue;
        }
        let Some(activity) = activity.clone() else {
            continue;
        };
        match parse_activity_row(course, &activity, year, &element) {
            Ok(entry) => entries.push(entry),
            Err(err) => debug!("{course}: skipping malformed activity row: {err}"),
        }
    }

    if entries.is_empty() {
        return Err(TimetableError::parse(format!(
            "{course}: no activity rows found (course page layout changed?)"
        )));
    }
    Ok(entries)
}

/// The activity-kind heading of a `tbody`: its first non-empty text node.
fn section_heading(element: &ElementRef) -> Option<String> {
    element
        .text()
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

fn parse_activity_row(
    course: &str,
    activity: &str,
    year: i32,
    row: &ElementRef,
) -> Result<RawEntry, TimetableError> {
    let variant = cell_text(row, &ACTIVITY_CELL)
        .ok_or_else(|| TimetableError::parse("missing activity cell"))?;
    let day_text =
        cell_text(row, &DAY_CELL).ok_or_else(|| TimetableError::parse("missing day cell"))?;
    let time_text =
        cell_text(row, &TIME_CELL).ok_or_else(|| TimetableError::parse("missing time cell"))?;

    let day: Weekday = day_text
        .parse()
        .map_err(|_| TimetableError::parse(format!("invalid weekday {day_text:?}")))?;
    let (start, end) = parse_time_range(&time_text)?;

    let weeks = cell_lines(row, &WEEKS_CELL)
        .iter()
        .filter_map(|line| parse_week_interval(year, line))
        .collect();
    let locations = cell_lines(row, &LOCATION_CELL)
        .iter()
        .map(|line| parse_location(year, line))
        .collect();

    Ok(RawEntry {
        course: course.to_string(),
        activity: activity.to_string(),
        variant: if variant.is_empty() {
            None
        } else {
            Some(variant)
        },
        day,
        start,
        end,
        weeks,
        locations,
    })
}

/// First matching cell's text, whitespace-collapsed.
fn cell_text(row: &ElementRef, selector: &Selector) -> Option<String> {
    row.select(selector)
        .next()
        .map(|cell| cell.text().collect::<String>().trim().to_string())
}

/// First matching cell's text split into its non-empty text nodes, one per
/// `<br>`-separated line.
fn cell_lines(row: &ElementRef, selector: &Selector) -> Vec<String> {
    row.select(selector)
        .next()
        .map(|cell| {
            cell.text()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Parses "09:00 - 10:00" into start and end times.
fn parse_time_range(raw: &str) -> Result<(NaiveTime, NaiveTime), TimetableError> {
    let mut parts = raw.splitn(2, '-').map(str::trim);
    let start = parts
        .next()
        .and_then(|t| NaiveTime::parse_from_str(t, "%H:%M").ok());
    let end = parts
        .next()
        .and_then(|t| NaiveTime::parse_from_str(t, "%H:%M").ok());
    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(TimetableError::parse(format!("invalid time range {raw:?}"))),
    }
}

/// Parses a "Weeks" line such as "23 Feb - 27 Mar" or a single "28 Mar".
fn parse_week_interval(year: i32, raw: &str) -> Option<DateInterval> {
    let mut parts = raw.splitn(2, '-').map(str::trim);
    let start = parse_day_month_name(year, parts.next()?)?;
    match parts.next() {
        Some(end) => Some(DateInterval::range(start, parse_day_month_name(year, end)?)),
        None => Some(DateInterval::single(start)),
    }
}

fn parse_day_month_name(year: i32, raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{raw} {year}"), "%d %b %Y").ok()
}

/// Parses a "Location" line, e.g. `Jack Erskine 244 (27/2-27/3, 24/4-29/5)`.
/// Without a date section the location is valid at all times.
fn parse_location(year: i32, raw: &str) -> Location {
    let Some(caps) = LOCATION_RE.captures(raw) else {
        return Location {
            place: raw.to_string(),
            valid_intervals: Vec::new(),
        };
    };
    let valid_intervals = caps["dates"]
        .split(',')
        .filter_map(|part| parse_day_month_interval(year, part.trim()))
        .collect();
    Location {
        place: caps["name"].trim().to_string(),
        valid_intervals,
    }
}

fn parse_day_month_interval(year: i32, raw: &str) -> Option<DateInterval> {
    let mut parts = raw.splitn(2, '-').map(str::trim);
    let start = parse_day_month(year, parts.next()?)?;
    match parts.next() {
        Some(end) => Some(DateInterval::range(start, parse_day_month(year, end)?)),
        None => Some(DateInterval::single(start)),
    }
}

fn parse_day_month(year: i32, raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{raw}/{year}"), "%d/%m/%Y").ok()
}
