// SPDX-License-Identifier: GPL-3.0-only

//! Drawing surface and sketch classification

pub mod classifier;
pub mod surface;

pub use classifier::{
    Classification, CommandClassifier, SketchClassifier, UnconfiguredClassifier,
    classifier_for_command, status_text,
};
pub use surface::{SketchSnapshot, StrokeSurface};
