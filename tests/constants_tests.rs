// SPDX-License-Identifier: MPL-2.0

//! Integration tests for constants module

use pinch_sketch::constants::{gesture, landmarks, status, surface};
use pinch_sketch::gesture::agent_size;

#[test]
fn test_landmark_indices() {
    assert_eq!(landmarks::COUNT, 21);
    assert_eq!(landmarks::WRIST, 0);
    assert_eq!(landmarks::THUMB_TIP, 4);
    assert_eq!(landmarks::INDEX_FINGER_TIP, 8);
    assert_eq!(landmarks::PINKY_TIP, landmarks::COUNT - 1);
}

#[test]
fn test_gesture_defaults() {
    assert_eq!(gesture::PINCH_THRESHOLD_PX, 45.0);
    assert_eq!(gesture::SPEED_THRESHOLD, 8.0);
    assert_eq!(gesture::LEARNING_RATE, 0.05);
    assert!(gesture::PINCH_THRESHOLD_SPAN > 0.0 && gesture::PINCH_THRESHOLD_SPAN < 1.0);
}

#[test]
fn test_agent_size_range() {
    // The remap clamps to the output range at both ends
    let (low, high) = gesture::AGENT_SIZE_RANGE;
    assert_eq!(agent_size(0.0), low);
    assert_eq!(agent_size(1000.0), high);
    assert_eq!(agent_size(110.0), 35.0);
}

#[test]
fn test_surface_defaults() {
    assert_eq!((surface::WIDTH, surface::HEIGHT), (1280, 960));
    assert_eq!(surface::BRUSH_WIDTH, 10.0);
    assert_eq!(surface::SNAPSHOT_SIZE, 256);
}

#[test]
fn test_status_strings_are_distinct() {
    assert_ne!(status::PROMPT, status::ANALYZING);
    assert_ne!(status::ANALYZING, status::CLASSIFY_ERROR);
    assert!(!status::PROMPT.is_empty());
}
