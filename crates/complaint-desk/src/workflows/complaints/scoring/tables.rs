use super::super::lifecycle::{ComplaintStatus, Transition};

pub const MIN_POINTS: u8 = 0;
pub const MAX_POINTS: u8 = 5;
pub(crate) const FLOOR_SCORE: u8 = 1;

/// Inclusive upper bound in minutes and the score it earns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreTier {
    pub max_minutes: u64,
    pub score: u8,
}

const fn tier(max_minutes: u64, score: u8) -> ScoreTier {
    ScoreTier { max_minutes, score }
}

const PICKUP_TIERS: [ScoreTier; 4] = [tier(10, 5), tier(60, 4), tier(240, 3), tier(1440, 2)];

// Under an hour of investigation scores below the 1-5 hour band.
const INVESTIGATION_TIERS: [ScoreTier; 4] =
    [tier(60, 4), tier(300, 5), tier(720, 3), tier(1440, 2)];

const NOTIFICATION_TIERS: [ScoreTier; 4] =
    [tier(360, 5), tier(720, 4), tier(1440, 3), tier(2880, 2)];

const NOTE_TIERS: [(u32, u8); 4] = [(4, 1), (7, 2), (12, 3), (20, 4)];
const NOTE_CEILING: u8 = 5;

/// Ordered tier table for a transition, or `None` when the pair is not a scored move.
pub fn tiers_for(transition: Transition) -> Option<&'static [ScoreTier]> {
    use ComplaintStatus::*;
    match (transition.from, transition.to) {
        (Pending, Processing) => Some(&PICKUP_TIERS),
        (Processing, Solved) => Some(&INVESTIGATION_TIERS),
        (Solved, Informed) => Some(&NOTIFICATION_TIERS),
        _ => None,
    }
}

/// Time score in 1..=5. The first tier whose bound covers `minutes` wins.
pub fn time_score(transition: Transition, minutes: u64) -> u8 {
    tiers_for(transition)
        .and_then(|tiers| tiers.iter().find(|tier| minutes <= tier.max_minutes))
        .map(|tier| tier.score)
        .unwrap_or(FLOOR_SCORE)
}

/// Note score in 1..=5 from the closing note's word count.
pub fn note_score(word_count: u32) -> u8 {
    NOTE_TIERS
        .iter()
        .find(|(max_words, _)| word_count <= *max_words)
        .map(|(_, score)| *score)
        .unwrap_or(NOTE_CEILING)
}

pub(crate) fn clamp_points(points: u8) -> u8 {
    points.clamp(MIN_POINTS, MAX_POINTS)
}

/// `round(time * 0.7 + note * 0.3)` in integer tenths, half rounding up.
pub(crate) fn weighted_total(time_points: u8, note_points: u8) -> u8 {
    let tenths = 7 * u32::from(time_points) + 3 * u32::from(note_points);
    let rounded = (tenths + 5) / 10;
    clamp_points(rounded.min(u32::from(MAX_POINTS)) as u8)
}
