//! Interview slot scheduling: a grid of time ranges by dates, a roster of
//! applicants, and the moves that place applicants into slots.

pub mod config;
pub mod display;
pub mod error;
pub mod form;
pub mod logging;
pub mod parser;
pub mod roster;
pub mod schedule;
pub mod store;
pub mod web;

pub use error::{CsvError, FormError, Rejection, SeedError};
pub use store::{Outcome, ScheduleStore};
