use chrono::Duration;

use super::common::start;
use crate::workflows::complaints::lifecycle::{ComplaintStatus, Transition};
use crate::workflows::complaints::scoring::{
    elapsed_minutes, note_score, score_transition, time_score, weighted_total_for_tests,
    MAX_POINTS,
};

const PICKUP: Transition = Transition::new(ComplaintStatus::Pending, ComplaintStatus::Processing);
const INVESTIGATION: Transition =
    Transition::new(ComplaintStatus::Processing, ComplaintStatus::Solved);
const NOTIFICATION: Transition =
    Transition::new(ComplaintStatus::Solved, ComplaintStatus::Informed);

#[test]
fn pickup_rewards_response_within_ten_minutes() {
    let expectations = [
        (0, 5),
        (10, 5),
        (11, 4),
        (60, 4),
        (61, 3),
        (240, 3),
        (241, 2),
        (1440, 2),
        (1441, 1),
        (1500, 1),
    ];
    for (minutes, expected) in expectations {
        assert_eq!(time_score(PICKUP, minutes), expected, "{minutes} minutes");
    }
}

#[test]
fn investigation_band_peaks_between_one_and_five_hours() {
    assert_eq!(time_score(INVESTIGATION, 30), 4);
    assert_eq!(time_score(INVESTIGATION, 60), 4);
    assert_eq!(time_score(INVESTIGATION, 61), 5);
    assert_eq!(time_score(INVESTIGATION, 300), 5);
    assert_eq!(time_score(INVESTIGATION, 301), 3);
    assert_eq!(time_score(INVESTIGATION, 1440), 2);
    assert_eq!(time_score(INVESTIGATION, 10_000), 1);
}

#[test]
fn notification_rewards_closure_within_six_hours() {
    assert_eq!(time_score(NOTIFICATION, 360), 5);
    assert_eq!(time_score(NOTIFICATION, 361), 4);
    assert_eq!(time_score(NOTIFICATION, 1440), 3);
    assert_eq!(time_score(NOTIFICATION, 2880), 2);
    assert_eq!(time_score(NOTIFICATION, 2881), 1);
}

#[test]
fn unrecognized_transitions_score_the_floor() {
    let skip = Transition::new(ComplaintStatus::Pending, ComplaintStatus::Solved);
    let reverse = Transition::new(ComplaintStatus::Informed, ComplaintStatus::Pending);
    assert_eq!(time_score(skip, 0), 1);
    assert_eq!(time_score(reverse, 5), 1);
}

#[test]
fn time_score_is_deterministic() {
    for minutes in [0, 9, 10, 11, 59, 61, 299, 301, 1439, 5000] {
        for transition in [PICKUP, INVESTIGATION, NOTIFICATION] {
            assert_eq!(
                time_score(transition, minutes),
                time_score(transition, minutes)
            );
        }
    }
}

#[test]
fn note_score_band_boundaries() {
    let counts = [4, 5, 7, 8, 12, 13, 20, 21];
    let scores: Vec<u8> = counts.iter().map(|count| note_score(*count)).collect();
    assert_eq!(scores, vec![1, 2, 2, 3, 3, 4, 4, 5]);
    assert_eq!(note_score(0), 1);
}

#[test]
fn terminal_composite_weighs_time_and_note() {
    assert_eq!(weighted_total_for_tests(5, 5), 5);
    assert_eq!(weighted_total_for_tests(1, 1), 1);
    assert_eq!(weighted_total_for_tests(5, 1), 4);
    assert_eq!(weighted_total_for_tests(3, 4), 3);
    assert_eq!(weighted_total_for_tests(4, 5), 4);
}

#[test]
fn non_terminal_transitions_ignore_the_note() {
    let points = score_transition(PICKUP, 11, Some("one two three four five six"));
    assert_eq!(points.time_points, 4);
    assert_eq!(points.note_points, 0);
    assert_eq!(points.total_points, 4);
    assert_eq!(points.note_word_count, 6);
}

#[test]
fn terminal_transition_combines_scores() {
    let note = "Called customer, replaced faulty router";
    let points = score_transition(NOTIFICATION, 90, Some(note));
    assert_eq!(points.time_points, 5);
    assert_eq!(points.note_points, 2);
    assert_eq!(points.total_points, 4);
    assert_eq!(points.note_word_count, 5);
    assert_eq!(points.minutes_taken, 90);
    assert!(points.total_points <= MAX_POINTS);
}

#[test]
fn elapsed_minutes_round_to_nearest_and_never_go_negative() {
    let t0 = start();
    assert_eq!(elapsed_minutes(t0, t0 + Duration::seconds(29)), 0);
    assert_eq!(elapsed_minutes(t0, t0 + Duration::seconds(30)), 1);
    assert_eq!(elapsed_minutes(t0, t0 + Duration::seconds(89)), 1);
    assert_eq!(elapsed_minutes(t0, t0 + Duration::seconds(90)), 2);
    assert_eq!(elapsed_minutes(t0, t0 - Duration::minutes(5)), 0);
}
