//! Nearest bike-share station finder.
//!
//! Answers: "where is the closest station with a bike I can take right
//! now?" for a user who has shared their device location.

pub mod bikes;
pub mod config;
pub mod domain;
pub mod finder;
pub mod permission;
pub mod web;
