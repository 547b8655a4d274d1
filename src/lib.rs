//! hydrafit: a conversational water and calorie tracker.

pub mod bot;
pub mod channels;
pub mod chart;
pub mod config;
pub mod error;
pub mod food;
pub mod lookup;
pub mod profile;
pub mod tracker;
