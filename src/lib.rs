// SPDX-License-Identifier: GPL-3.0-only

//! Pinch Sketch - drawing with pinch gestures
//!
//! Hand-landmark detections drive a small interaction state machine: the
//! index fingertip moves a brush, and pinching thumb and index together
//! lays down ink on a persistent surface. The finished sketch can be handed
//! to an external classifier.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`gesture`]: Landmark types, coordinate mapping, thresholds and the
//!   per-frame state machine
//! - [`sketch`]: The stroke surface and the classification bridge
//! - [`session`]: Per-session pipeline state and async plumbing
//! - [`providers`]: Detection sources (traces, detector processes, pointer)
//! - [`config`]: User configuration handling
//! - [`storage`]: Saving sketches
//! - [`terminal`]: Interactive terminal sketch pad
//!
//! # Example
//!
//! ```
//! use pinch_sketch::{Config, SketchSession};
//!
//! let mut session = SketchSession::new(&Config::default());
//! let report = session.tick(None);
//! assert_eq!(report.state, pinch_sketch::InteractionState::Idle);
//! ```

pub mod config;
pub mod constants;
pub mod errors;
pub mod gesture;
pub mod providers;
pub mod session;
pub mod sketch;
pub mod storage;
pub mod terminal;

// Re-export commonly used types
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use gesture::{DetectionFrame, FrameSize, InteractionState, LandmarkSet, Point};
pub use session::{FrameReport, SketchSession};
pub use sketch::{Classification, SketchClassifier, StrokeSurface};
