mod tables;

pub use tables::{note_score, tiers_for, time_score, ScoreTier, MAX_POINTS, MIN_POINTS};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::word_count;
use super::lifecycle::Transition;
use tables::{clamp_points, weighted_total};

/// Points earned by a single transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsSummary {
    pub minutes_taken: u64,
    pub time_points: u8,
    pub note_points: u8,
    pub total_points: u8,
    pub note_word_count: u32,
}

/// Whole minutes between two instants, rounded to nearest and floored at zero.
pub fn elapsed_minutes(since: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (now - since).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    let millis = millis as u64;
    (millis + 30_000) / 60_000
}

/// Composite score for a transition. Only terminal moves weigh in the note.
pub fn score_transition(transition: Transition, minutes: u64, note: Option<&str>) -> PointsSummary {
    let time_points = time_score(transition, minutes);
    let note_word_count = note.map(word_count).unwrap_or(0);

    let (note_points, total_points) = if transition.is_terminal() {
        let note_points = note_score(note_word_count);
        (note_points, weighted_total(time_points, note_points))
    } else {
        (0, clamp_points(time_points))
    };

    PointsSummary {
        minutes_taken: minutes,
        time_points,
        note_points,
        total_points,
        note_word_count,
    }
}

#[cfg(test)]
pub(crate) fn weighted_total_for_tests(time_points: u8, note_points: u8) -> u8 {
    weighted_total(time_points, note_points)
}
