//! Daily schedule construction and next-event search.

use crate::config::Config;
use crate::resolve;
use crate::types::{RawEntry, ResolvedEvent, Term};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeSet;
use tracing::debug;

/// How many days ahead [`next_event`] searches before giving up.
pub const SEARCH_WINDOW_DAYS: i64 = 14;

/// Builds the resolved schedule for `date`, ordered by start time with ties
/// broken by course identifier.
///
/// Courses configured for a different term are skipped, as are activities
/// with no matching entry on `date`. A day with no classes yields an empty
/// schedule, not an error.
pub fn build_schedule(entries: &[RawEntry], config: &Config, date: NaiveDate) -> Vec<ResolvedEvent> {
    let Some(term) = Term::containing(date) else {
        debug!("{date} falls outside any teaching term");
        return Vec::new();
    };

    // Scraped courses the config never mentions are skipped; only worth
    // hearing about in verbose mode.
    for course in entries
        .iter()
        .map(|entry| entry.course.as_str())
        .collect::<BTreeSet<_>>()
    {
        if config.course(course).is_none() {
            debug!("scraped entries reference unconfigured course {course}");
        }
    }

    let mut events = Vec::new();
    for (course, pref) in config.active_courses(term) {
        // Distinct activity kinds scraped for this course, in stable order.
        let kinds: BTreeSet<&str> = entries
            .iter()
            .filter(|entry| entry.course == course)
            .map(|entry| entry.activity.as_str())
            .collect();
        if kinds.is_empty() {
            debug!("{course} is configured but nothing was scraped for it");
            continue;
        }
        for kind in kinds {
            if let Some(event) = resolve::resolve(entries, course, kind, pref, date) {
                events.push(event);
            }
        }
    }

    events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.course.cmp(&b.course)));
    events
}

/// Finds the first event starting strictly after `now` in one day's ordered
/// schedule, with the time remaining until it starts.
///
/// Day-agnostic and stateless; searching across days is the caller's loop
/// (see [`next_event`]).
pub fn find_next(
    schedule: &[ResolvedEvent],
    now: NaiveTime,
) -> Option<(&ResolvedEvent, Duration)> {
    schedule
        .iter()
        .find(|event| event.start > now)
        .map(|event| (event, event.start - now))
}

/// Searches forward from `now` for the next class, rebuilding the schedule
/// day by day up to [`SEARCH_WINDOW_DAYS`] ahead.
pub fn next_event(
    entries: &[RawEntry],
    config: &Config,
    now: NaiveDateTime,
) -> Option<(ResolvedEvent, Duration)> {
    for offset in 0..=SEARCH_WINDOW_DAYS {
        let date = now.date() + Duration::days(offset);
        let schedule = build_schedule(entries, config, date);
        // Later days scan from midnight so their first class counts.
        let cutoff = if offset == 0 { now.time() } else { NaiveTime::MIN };
        if let Some((event, _)) = find_next(&schedule, cutoff) {
            let starts_at = date.and_time(event.start);
            return Some((event.clone(), starts_at - now));
        }
    }
    None
}
