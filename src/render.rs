//! Terminal output: flat listings, the clash timeline, and the week grid.

use crate::timeline;
use crate::types::{Colour, ResolvedEvent};
use chrono::{Datelike, Duration, NaiveDate, Timelike};

/// Width of one column in the week grid.
const WEEK_COLUMN: usize = 22;

/// Indentation of one timeline track.
const TRACK_INDENT: usize = 6;

/// One flat line: `09:00 - 10:00 :: SENG201 Computer Lab A @ Jack Erskine
/// 001 Computer Lab`, with the course title in its configured colour.
pub fn format_event(event: &ResolvedEvent) -> String {
    let title = match event.colour {
        Some(colour) => format!("{}{}{}", colour.ansi(), event.course, Colour::RESET),
        None => event.course.clone(),
    };
    let location = event.location.as_deref().unwrap_or("no listed location");
    format!(
        "{} - {} :: {title} {} @ {location}",
        event.start.format("%H:%M"),
        event.end.format("%H:%M"),
        event.activity,
    )
}

pub fn print_flat(schedule: &[ResolvedEvent]) {
    for event in schedule {
        println!("{}", format_event(event));
    }
}

/// Prints the vertical timeline. Clashing events are pushed one track to
/// the right so overlaps sit side by side instead of interleaving.
pub fn print_timeline(schedule: &[ResolvedEvent]) {
    let placed = timeline::layout(schedule);
    if placed.is_empty() {
        return;
    }
    if timeline::track_count(&placed) > 1 {
        println!("(clashing classes are indented to their own column)");
    }
    for (event, track) in &placed {
        let indent = " ".repeat(TRACK_INDENT * track);
        println!("{} │ {indent}{}", event.start.format("%H:%M"), format_event(event));
    }
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Prints Monday through Friday as an hour-by-weekday grid.
pub fn print_week(days: &[(NaiveDate, Vec<ResolvedEvent>)]) {
    let events: Vec<&ResolvedEvent> = days.iter().flat_map(|(_, sched)| sched).collect();
    if events.is_empty() {
        println!("No classes this week.");
        return;
    }
    let first_hour = events.iter().map(|e| e.start.hour()).min().unwrap_or(8);
    let last_hour = events
        .iter()
        .map(|e| e.end.hour() + u32::from(e.end.minute() > 0))
        .max()
        .unwrap_or(17);

    let mut header = String::from("      ");
    for (date, _) in days {
        header.push_str(&pad(&date.format("%A").to_string(), WEEK_COLUMN));
    }
    println!("{}", header.trim_end());

    for hour in first_hour..last_hour {
        let mut row = format!("{hour:02}:00 ");
        for (_, schedule) in days {
            let cell = schedule
                .iter()
                .find(|e| covers_hour(e, hour))
                .map(|e| format!("{} {}", e.course, e.activity))
                .unwrap_or_default();
            row.push_str(&pad(&cell, WEEK_COLUMN));
        }
        println!("{}", row.trim_end());
    }
}

/// True when `event` occupies any part of `[hour:00, hour+1:00)`.
fn covers_hour(event: &ResolvedEvent, hour: u32) -> bool {
    let end_hour = event.end.hour() + u32::from(event.end.minute() > 0);
    event.start.hour() <= hour && hour < end_hour
}

fn pad(text: &str, width: usize) -> String {
    let mut cell: String = text.chars().take(width - 2).collect();
    while cell.chars().count() < width {
        cell.push(' ');
    }
    cell
}
