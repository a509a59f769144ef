// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Hand landmark indices (21-point hand model)
///
/// Only the thumb and index tips drive the gesture logic; the rest are kept
/// so hand-span normalization and overlays can address them by name.
#[allow(dead_code)]
pub mod landmarks {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_FINGER_MCP: usize = 5;
    pub const INDEX_FINGER_PIP: usize = 6;
    pub const INDEX_FINGER_DIP: usize = 7;
    pub const INDEX_FINGER_TIP: usize = 8;
    pub const MIDDLE_FINGER_MCP: usize = 9;
    pub const MIDDLE_FINGER_PIP: usize = 10;
    pub const MIDDLE_FINGER_DIP: usize = 11;
    pub const MIDDLE_FINGER_TIP: usize = 12;
    pub const RING_FINGER_MCP: usize = 13;
    pub const RING_FINGER_PIP: usize = 14;
    pub const RING_FINGER_DIP: usize = 15;
    pub const RING_FINGER_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;

    /// Number of landmarks in a complete hand
    pub const COUNT: usize = 21;
}

/// Gesture thresholds and remap ranges
pub mod gesture {
    /// Pinch threshold in display pixels
    pub const PINCH_THRESHOLD_PX: f32 = 45.0;

    /// Pinch threshold as a fraction of the hand span
    pub const PINCH_THRESHOLD_SPAN: f32 = 0.25;

    /// Maximum index-tip travel per frame that still counts as a grab
    pub const SPEED_THRESHOLD: f32 = 8.0;

    /// Step size of the adaptive threshold moving average
    pub const LEARNING_RATE: f32 = 0.05;

    /// Pinch distance domain for the agent size remap
    pub const AGENT_SIZE_DOMAIN: (f32, f32) = (20.0, 200.0);

    /// Agent size range for the remap
    pub const AGENT_SIZE_RANGE: (f32, f32) = (10.0, 60.0);

    /// Smallest hand span accepted as a normalization reference
    pub const MIN_HAND_SPAN: f32 = 1.0;
}

/// Drawing surface defaults
pub mod surface {
    /// Surface width in pixels
    pub const WIDTH: u32 = 1280;

    /// Surface height in pixels
    pub const HEIGHT: u32 = 960;

    /// Stroke width in pixels
    pub const BRUSH_WIDTH: f32 = 10.0;

    /// Classifier input edge length
    pub const SNAPSHOT_SIZE: u32 = 256;
}

/// User-visible status strings
pub mod status {
    /// Shown before anything has been classified and after a clear
    pub const PROMPT: &str = "Draw something and press 'Classify'";

    /// Shown while a classification request is in flight
    pub const ANALYZING: &str = "Analyzing...";

    /// Shown when the classifier reports an error
    pub const CLASSIFY_ERROR: &str = "Classification failed.";
}

/// Default replay rate in frames per second
pub const DEFAULT_FPS: u32 = 30;

/// Terminal redraw/poll interval
pub const TERMINAL_POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Application directory name used under config/cache/pictures
pub const APP_DIR_NAME: &str = "pinch-sketch";
