// SPDX-License-Identifier: GPL-3.0-only

//! User configuration
//!
//! Stored as JSON under the user's config directory. Missing fields take
//! their defaults, so older files keep loading as options are added.

use crate::constants::{APP_DIR_NAME, gesture, surface};
use crate::errors::AppResult;
use crate::gesture::{
    DrawGate, EvaluatorConfig, FrameSize, GrabRule, MappingPolicy, PinchThreshold, ThresholdUnit,
    TrackingPoint,
};
use crate::session::StaleReplyPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How detector coordinates are fitted into the drawing surface
    pub mapping_policy: MappingPolicy,
    /// Mirror the preview horizontally (selfie mode); never affects ink
    pub mirror_preview: bool,
    /// Unit of the pinch threshold
    pub threshold_unit: ThresholdUnit,
    /// Pinch threshold; `None` uses the unit's default
    pub pinch_threshold: Option<f32>,
    /// Maximum index-tip travel per frame for a grab, display pixels
    pub speed_threshold: f32,
    /// Learn the pinch threshold from observed grabs
    pub adaptive_threshold: bool,
    /// Moving-average rate for the adaptive threshold
    pub learning_rate: f32,
    pub grab_rule: GrabRule,
    pub draw_gate: DrawGate,
    pub tracking_point: TrackingPoint,
    /// Stroke width in surface pixels
    pub brush_width: f32,
    pub surface_width: u32,
    pub surface_height: u32,
    /// Edge length of the square image sent to the classifier
    pub snapshot_size: u32,
    /// Classifier program and arguments; the snapshot path is appended
    pub classifier_command: Vec<String>,
    /// What to do with classification replies that arrive out of order
    pub stale_replies: StaleReplyPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mapping_policy: MappingPolicy::default(),
            mirror_preview: true,
            threshold_unit: ThresholdUnit::default(),
            pinch_threshold: None,
            speed_threshold: gesture::SPEED_THRESHOLD,
            adaptive_threshold: false,
            learning_rate: gesture::LEARNING_RATE,
            grab_rule: GrabRule::default(),
            draw_gate: DrawGate::default(),
            tracking_point: TrackingPoint::default(),
            brush_width: surface::BRUSH_WIDTH,
            surface_width: surface::WIDTH,
            surface_height: surface::HEIGHT,
            snapshot_size: surface::SNAPSHOT_SIZE,
            classifier_command: Vec::new(),
            stale_replies: StaleReplyPolicy::default(),
        }
    }
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from the default location
    ///
    /// Never fails: a missing file yields defaults, a broken one is logged and
    /// replaced by defaults.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable config");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        info!(path = %path.display(), "Loaded config");
        Ok(config.validated())
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        debug!(path = %path.display(), "Saved config");
        Ok(())
    }

    /// Clamp out-of-range values back to usable ones
    pub fn validated(mut self) -> Self {
        if !(0.0..=1.0).contains(&self.learning_rate) {
            warn!(value = self.learning_rate, "Learning rate outside [0, 1], clamping");
            self.learning_rate = self.learning_rate.clamp(0.0, 1.0);
        }
        if let Some(t) = self.pinch_threshold
            && !(t.is_finite() && t > 0.0)
        {
            warn!(value = t, "Invalid pinch threshold, using default");
            self.pinch_threshold = None;
        }
        if !(self.speed_threshold.is_finite() && self.speed_threshold > 0.0) {
            warn!(value = self.speed_threshold, "Invalid speed threshold, using default");
            self.speed_threshold = gesture::SPEED_THRESHOLD;
        }
        if !(self.brush_width.is_finite() && self.brush_width >= 1.0) {
            self.brush_width = surface::BRUSH_WIDTH;
        }
        if self.surface_width == 0 || self.surface_height == 0 {
            warn!(
                width = self.surface_width,
                height = self.surface_height,
                "Empty surface size, using default"
            );
            self.surface_width = surface::WIDTH;
            self.surface_height = surface::HEIGHT;
        }
        if self.snapshot_size == 0 {
            self.snapshot_size = surface::SNAPSHOT_SIZE;
        }
        self
    }

    pub fn surface_size(&self) -> FrameSize {
        FrameSize::new(self.surface_width, self.surface_height)
    }

    pub fn evaluator_config(&self) -> EvaluatorConfig {
        EvaluatorConfig {
            grab_rule: self.grab_rule,
            draw_gate: self.draw_gate,
            tracking_point: self.tracking_point,
            speed_threshold: self.speed_threshold,
        }
    }

    pub fn pinch_threshold(&self) -> PinchThreshold {
        let value = self
            .pinch_threshold
            .unwrap_or_else(|| self.threshold_unit.default_threshold());
        if self.adaptive_threshold {
            PinchThreshold::adaptive(self.threshold_unit, value, self.learning_rate)
        } else {
            PinchThreshold::fixed(self.threshold_unit, value)
        }
    }
}
