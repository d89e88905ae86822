//! Core library for the UC timetable tool.
//!
//! The pipeline is: scraped entries (live via [`fetch`] or replayed from
//! [`cache`]) are resolved against the user's [`config`] by [`resolve`] and
//! [`schedule`], then presented by [`render`] either flat or through the
//! clash-aware [`timeline`] layout.

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod render;
pub mod resolve;
pub mod schedule;
pub mod timeline;
pub mod types;

pub use error::TimetableError;
