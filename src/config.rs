/// User configuration: course metadata and activity-group selections.
use crate::error::TimetableError;
use crate::types::{Colour, Term};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// The group assumed for any activity the user never configured.
pub const DEFAULT_GROUP: u32 = 1;

/// Preferences for a single course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoursePreference {
    pub year: i32,
    pub semester: u8,
    /// Display colour for the course title, unset by default.
    #[serde(default)]
    pub colour: Option<Colour>,
    /// Activity kind -> the group number the user is enrolled in. Absent
    /// kinds default to group 1.
    #[serde(default)]
    pub activities: HashMap<String, u32>,
}

impl CoursePreference {
    /// The group the user selected for `activity`.
    pub fn group_for(&self, activity: &str) -> u32 {
        self.activities
            .get(activity)
            .copied()
            .unwrap_or(DEFAULT_GROUP)
    }

    pub fn active_in(&self, term: Term) -> bool {
        self.year == term.year && self.semester == term.semester
    }
}

/// Full configuration, one entry per course.
///
/// A `BTreeMap` keeps course iteration in identifier order, which the
/// schedule builder relies on for deterministic output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub courses: BTreeMap<String, CoursePreference>,
}

impl Config {
    /// Loads and validates a configuration file.
    pub fn load(path: &Path) -> Result<Self, TimetableError> {
        let content = fs::read_to_string(path)
            .map_err(|err| TimetableError::config(format!("{}: {err}", path.display())))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| TimetableError::config(format!("{}: {err}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Schema-level validation: positive year and group numbers, semester
    /// 1 or 2.
    fn validate(&self) -> Result<(), TimetableError> {
        for (course, pref) in &self.courses {
            if pref.year <= 0 {
                return Err(TimetableError::config(format!(
                    "{course}: year must be a positive integer"
                )));
            }
            if !(1..=2).contains(&pref.semester) {
                return Err(TimetableError::config(format!(
                    "{course}: semester must be 1 or 2"
                )));
            }
            if let Some((activity, _)) = pref.activities.iter().find(|(_, group)| **group == 0) {
                return Err(TimetableError::config(format!(
                    "{course}/{activity}: group must be a positive integer"
                )));
            }
        }
        Ok(())
    }

    pub fn course(&self, course: &str) -> Option<&CoursePreference> {
        self.courses.get(course)
    }

    /// Courses active in `term`, in identifier order.
    pub fn active_courses(&self, term: Term) -> impl Iterator<Item = (&str, &CoursePreference)> {
        self.courses
            .iter()
            .filter(move |(_, pref)| pref.active_in(term))
            .map(|(course, pref)| (course.as_str(), pref))
    }
}
