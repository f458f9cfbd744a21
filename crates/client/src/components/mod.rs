//! Reusable components.

pub mod ui;
