//! Activity resolution: choosing the one concrete entry for a course
//! activity on a given day.

use crate::config::{CoursePreference, DEFAULT_GROUP};
use crate::types::{RawEntry, ResolvedEvent};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

// Activity ids are either "<NN>" or "<NN>-P<M>". The leading number is the
// enrollment group; the P suffix marks a sub-session of that group.
static VARIANT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<id>\d+)(-P(?P<part>\d+))?").unwrap());

/// Normalizes a variant label to its numeric group.
///
/// "03-P1" and "03-P2" are both group 3; a label with no leading number is
/// group 1, the single unlabeled variant case.
pub fn variant_group(label: &str) -> u32 {
    VARIANT_RE
        .captures(label)
        .and_then(|caps| caps.name("id"))
        .and_then(|id| id.as_str().parse().ok())
        .unwrap_or(DEFAULT_GROUP)
}

/// The group a raw entry belongs to.
pub fn entry_group(entry: &RawEntry) -> u32 {
    entry.variant.as_deref().map_or(DEFAULT_GROUP, variant_group)
}

/// Resolves the one entry for (course, activity) on `date`, honouring the
/// user's group selection.
///
/// Matching is by normalized group number, independent of the sub-session
/// suffix, so a group scheduled as "03-P1" one day and "03-P2" another
/// resolves on both days. When the selected group has no entry on `date`
/// at all, the default group's session is used instead.
///
/// Returns `None` when nothing matches; an absent activity is not an
/// error. Two same-group sessions colliding on one day resolve to the
/// earliest and are reported as a configuration warning.
pub fn resolve(
    entries: &[RawEntry],
    course: &str,
    activity: &str,
    pref: &CoursePreference,
    date: NaiveDate,
) -> Option<ResolvedEvent> {
    let candidates: Vec<&RawEntry> = entries
        .iter()
        .filter(|entry| {
            entry.course == course && entry.activity == activity && entry.valid_for(date)
        })
        .collect();
    if candidates.is_empty() {
        return None;
    }

    let preferred = pref.group_for(activity);
    let mut matched: Vec<&RawEntry> = candidates
        .iter()
        .copied()
        .filter(|entry| entry_group(entry) == preferred)
        .collect();
    if matched.is_empty() && preferred != DEFAULT_GROUP {
        matched = candidates
            .iter()
            .copied()
            .filter(|entry| entry_group(entry) == DEFAULT_GROUP)
            .collect();
    }

    let chosen = match matched.as_slice() {
        [] => return None,
        [only] => *only,
        _ => {
            let earliest = matched.iter().copied().min_by_key(|entry| entry.start)?;
            warn!(
                "{course} {activity}: {} group-{} sessions collide on {date}, taking the {} one",
                matched.len(),
                entry_group(earliest),
                earliest.start.format("%H:%M"),
            );
            earliest
        }
    };

    Some(ResolvedEvent {
        course: chosen.course.clone(),
        activity: chosen.activity.clone(),
        colour: pref.colour,
        start: chosen.start,
        end: chosen.end,
        location: chosen.location_on(date).map(|loc| loc.place.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Colour;
    use chrono::{NaiveTime, Weekday};

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn entry(course: &str, activity: &str, variant: Option<&str>, day: Weekday, h: u32) -> RawEntry {
        RawEntry {
            course: course.into(),
            activity: activity.into(),
            variant: variant.map(Into::into),
            day,
            start: time(h, 0),
            end: time(h + 1, 0),
            weeks: Vec::new(),
            locations: Vec::new(),
        }
    }

    fn pref(activity: &str, group: u32) -> CoursePreference {
        CoursePreference {
            year: 2026,
            semester: 1,
            colour: Some(Colour::Cyan),
            activities: [(activity.to_string(), group)].into(),
        }
    }

    // 2026-03-02 is a Monday, 2026-03-03 a Tuesday.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn tuesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 3).unwrap()
    }

    #[test]
    fn variant_labels_normalize_to_groups() {
        assert_eq!(variant_group("03-P1"), 3);
        assert_eq!(variant_group("03-P2"), 3);
        assert_eq!(variant_group("01"), 1);
        assert_eq!(variant_group("12"), 12);
        // No leading number means the single unlabeled variant.
        assert_eq!(variant_group("Stream"), 1);
    }

    #[test]
    fn swaps_between_variants_of_the_same_group() {
        let entries = vec![
            entry("SENG201", "Computer Lab A", Some("03-P1"), Weekday::Mon, 9),
            entry("SENG201", "Computer Lab A", Some("03-P2"), Weekday::Tue, 9),
        ];
        let pref = pref("Computer Lab A", 3);

        let mon = resolve(&entries, "SENG201", "Computer Lab A", &pref, monday()).unwrap();
        assert_eq!(mon.start, time(9, 0));

        let tue = resolve(&entries, "SENG201", "Computer Lab A", &pref, tuesday()).unwrap();
        assert_eq!(tue.start, time(9, 0));
    }

    #[test]
    fn preferred_group_beats_default_group() {
        let entries = vec![
            entry("SENG201", "Computer Lab A", Some("01-P1"), Weekday::Mon, 9),
            entry("SENG201", "Computer Lab A", Some("03-P1"), Weekday::Mon, 11),
        ];
        let event = resolve(
            &entries,
            "SENG201",
            "Computer Lab A",
            &pref("Computer Lab A", 3),
            monday(),
        )
        .unwrap();
        assert_eq!(event.start, time(11, 0));
    }

    #[test]
    fn unconfigured_activity_uses_group_one_only() {
        let entries = vec![
            entry("SENG201", "Tutorial A", Some("01"), Weekday::Mon, 10),
            entry("SENG201", "Tutorial A", Some("02"), Weekday::Mon, 13),
        ];
        // The preference carries no "Tutorial A" selection.
        let event = resolve(
            &entries,
            "SENG201",
            "Tutorial A",
            &pref("Computer Lab A", 3),
            monday(),
        )
        .unwrap();
        assert_eq!(event.start, time(10, 0));
    }

    #[test]
    fn falls_back_to_default_group_when_selected_group_has_no_session() {
        let entries = vec![
            entry("SENG201", "Tutorial A", Some("01"), Weekday::Mon, 10),
            entry("SENG201", "Tutorial A", Some("03"), Weekday::Tue, 14),
        ];
        // Group 3 only runs on Tuesday, so Monday falls back to group 1.
        let pref = pref("Tutorial A", 3);
        let mon = resolve(&entries, "SENG201", "Tutorial A", &pref, monday()).unwrap();
        assert_eq!(mon.start, time(10, 0));
        // Tuesday still resolves to the selected group.
        let tue = resolve(&entries, "SENG201", "Tutorial A", &pref, tuesday()).unwrap();
        assert_eq!(tue.start, time(14, 0));
    }

    #[test]
    fn colliding_same_group_sessions_resolve_to_earliest() {
        let entries = vec![
            entry("SENG201", "Computer Lab A", Some("03-P2"), Weekday::Mon, 14),
            entry("SENG201", "Computer Lab A", Some("03-P1"), Weekday::Mon, 9),
        ];
        let event = resolve(
            &entries,
            "SENG201",
            "Computer Lab A",
            &pref("Computer Lab A", 3),
            monday(),
        )
        .unwrap();
        assert_eq!(event.start, time(9, 0));
    }

    #[test]
    fn absent_activity_resolves_to_none() {
        let entries = vec![entry(
            "SENG201",
            "Computer Lab A",
            Some("03-P1"),
            Weekday::Mon,
            9,
        )];
        let pref = pref("Computer Lab A", 3);
        assert!(resolve(&entries, "SENG201", "Computer Lab A", &pref, tuesday()).is_none());
        assert!(resolve(&entries, "SENG201", "Lecture A", &pref, monday()).is_none());
        assert!(resolve(&entries, "COSC262", "Computer Lab A", &pref, monday()).is_none());
    }

    #[test]
    fn week_intervals_exclude_out_of_range_dates() {
        let mut lab = entry("SENG201", "Computer Lab A", Some("03-P1"), Weekday::Mon, 9);
        lab.weeks = vec![crate::types::DateInterval::range(
            NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
        )];
        let entries = vec![lab];
        let pref = pref("Computer Lab A", 3);
        // Weekday matches but the week interval excludes this Monday.
        assert!(resolve(&entries, "SENG201", "Computer Lab A", &pref, monday()).is_none());
        // A Monday inside the interval resolves.
        let in_range = NaiveDate::from_ymd_opt(2026, 4, 6).unwrap();
        assert!(resolve(&entries, "SENG201", "Computer Lab A", &pref, in_range).is_some());
    }

    #[test]
    fn resolved_event_carries_colour_and_location() {
        let mut lab = entry("SENG201", "Computer Lab A", Some("03-P1"), Weekday::Mon, 9);
        lab.locations = vec![crate::types::Location {
            place: "Jack Erskine 001 Computer Lab".into(),
            valid_intervals: Vec::new(),
        }];
        let event = resolve(
            &[lab],
            "SENG201",
            "Computer Lab A",
            &pref("Computer Lab A", 3),
            monday(),
        )
        .unwrap();
        assert_eq!(event.colour, Some(Colour::Cyan));
        assert_eq!(
            event.location.as_deref(),
            Some("Jack Erskine 001 Computer Lab")
        );
    }
}
