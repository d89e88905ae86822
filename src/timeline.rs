//! Clash-aware track layout for a day's schedule.

use crate::types::ResolvedEvent;
use chrono::NaiveTime;

/// Assigns each event a track such that no two events sharing a track
/// overlap in time.
///
/// Greedy interval colouring: events are taken in start order and placed on
/// the lowest-numbered track whose most recent event has ended. The number
/// of tracks used equals the maximum number of events overlapping at any
/// instant, so the layout is optimal, not merely valid.
pub fn layout(schedule: &[ResolvedEvent]) -> Vec<(ResolvedEvent, usize)> {
    let mut ordered: Vec<&ResolvedEvent> = schedule.iter().collect();
    ordered.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.course.cmp(&b.course)));

    // End time of the last event placed on each track.
    let mut track_ends: Vec<NaiveTime> = Vec::new();
    let mut placed = Vec::with_capacity(schedule.len());
    for event in ordered {
        let track = match track_ends.iter().position(|&end| end <= event.start) {
            Some(track) => {
                track_ends[track] = event.end;
                track
            }
            None => {
                track_ends.push(event.end);
                track_ends.len() - 1
            }
        };
        placed.push((event.clone(), track));
    }
    placed
}

/// Number of tracks a laid-out schedule occupies.
pub fn track_count(placed: &[(ResolvedEvent, usize)]) -> usize {
    placed.iter().map(|(_, track)| track + 1).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn event(course: &str, start: NaiveTime, end: NaiveTime) -> ResolvedEvent {
        ResolvedEvent {
            course: course.into(),
            activity: "Lecture A".into(),
            colour: None,
            start,
            end,
            location: None,
        }
    }

    fn assert_tracks_disjoint(placed: &[(ResolvedEvent, usize)]) {
        for (i, (a, track_a)) in placed.iter().enumerate() {
            for (b, track_b) in placed.iter().skip(i + 1) {
                if track_a == track_b {
                    assert!(
                        !a.clashes_with(b),
                        "{} and {} clash on track {track_a}",
                        a.course,
                        b.course
                    );
                }
            }
        }
    }

    #[test]
    fn disjoint_events_share_one_track() {
        let schedule = vec![
            event("COSC262", time(9, 0), time(10, 0)),
            event("SENG201", time(10, 0), time(11, 0)),
            event("MATH203", time(13, 0), time(14, 0)),
        ];
        let placed = layout(&schedule);
        assert_eq!(track_count(&placed), 1);
        assert!(placed.iter().all(|(_, track)| *track == 0));
    }

    #[test]
    fn mutually_overlapping_events_each_get_a_track() {
        let mut schedule = vec![
            event("COSC262", time(9, 0), time(12, 0)),
            event("MATH203", time(10, 0), time(12, 0)),
            event("SENG201", time(11, 0), time(12, 0)),
        ];
        // Optimality and disjointness hold under any input permutation.
        for rotation in 0..schedule.len() {
            schedule.rotate_left(1);
            let placed = layout(&schedule);
            assert_eq!(track_count(&placed), 3, "rotation {rotation}");
            assert_tracks_disjoint(&placed);
        }
    }

    #[test]
    fn track_count_matches_peak_overlap_not_total_clashes() {
        // Two separate clashing pairs: four events but never more than two
        // at once, so two tracks suffice.
        let schedule = vec![
            event("COSC262", time(9, 0), time(11, 0)),
            event("SENG201", time(10, 0), time(11, 0)),
            event("MATH203", time(13, 0), time(15, 0)),
            event("PHYS101", time(14, 0), time(15, 0)),
        ];
        let placed = layout(&schedule);
        assert_eq!(track_count(&placed), 2);
        assert_tracks_disjoint(&placed);
    }

    #[test]
    fn back_to_back_events_do_not_clash() {
        // [start, end) intervals: an event may start the minute another ends.
        let schedule = vec![
            event("COSC262", time(9, 0), time(10, 0)),
            event("SENG201", time(10, 0), time(11, 0)),
        ];
        let placed = layout(&schedule);
        assert_eq!(track_count(&placed), 1);
    }

    #[test]
    fn empty_schedule_lays_out_empty() {
        assert!(layout(&[]).is_empty());
        assert_eq!(track_count(&[]), 0);
    }
}
