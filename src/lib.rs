//! Load music track tables, derive `duration_s` and `year`, slice them by
//! year, popularity and duration, and chart the result.

pub mod app;
pub mod chart;
pub mod color;
pub mod data;
pub mod settings;
pub mod state;
pub mod ui;
