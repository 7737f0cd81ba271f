//! Summoner growth system.
//!
//! # Responsibility
//! - Hold the static growth catalog and the shared leveling curve.
//! - Own persisted spirit/avatar progression and profession selection.

pub mod catalog;
pub mod leveling;
pub mod progression;
