// SPDX-License-Identifier: GPL-3.0-only

//! JSON-lines detection format
//!
//! One object per frame:
//!
//! ```text
//! {"width":640,"height":480,"hands":[{"landmarks":[[x,y], ... 21 pairs]}]}
//! {"width":640,"height":480,"hands":[]}
//! {"width":640,"height":480,"error":"model not loaded"}
//! ```
//!
//! Coordinates are pixels in the detector's frame. Replay files and live
//! detector processes share this format.

use crate::errors::ProviderError;
use crate::gesture::{DetectionFrame, FrameSize, LandmarkSet, Point};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Wire form of one detection callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub hands: Vec<HandRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Wire form of one hand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandRecord {
    pub landmarks: Vec<Point>,
}

impl DetectionRecord {
    /// Convert to a frame
    ///
    /// Only the first hand is kept. A first hand without exactly 21
    /// landmarks, or any hand in a frame with an empty source size, yields a
    /// frame with no hands.
    pub fn into_frame(self) -> Result<DetectionFrame, ProviderError> {
        if let Some(error) = self.error {
            return Err(ProviderError::DetectorFailed(error));
        }

        let source = FrameSize::new(self.width, self.height);
        let Some(first) = self.hands.into_iter().next() else {
            return Ok(DetectionFrame::empty(source));
        };

        if source.is_empty() {
            debug!(%source, "Dropping hand from frame with empty source size");
            return Ok(DetectionFrame::empty(source));
        }

        match LandmarkSet::try_from(first.landmarks) {
            Ok(hand) => Ok(DetectionFrame::new(source, vec![hand])),
            Err(count) => {
                debug!(count, "Dropping hand with wrong landmark count");
                Ok(DetectionFrame::empty(source))
            }
        }
    }
}

impl From<&DetectionFrame> for DetectionRecord {
    fn from(frame: &DetectionFrame) -> Self {
        Self {
            width: frame.source.width,
            height: frame.source.height,
            hands: frame
                .hands
                .iter()
                .map(|hand| HandRecord {
                    landmarks: hand.iter().copied().collect(),
                })
                .collect(),
            error: None,
        }
    }
}

/// Decode one line of detector output
pub fn decode_line(line: &str) -> Result<DetectionFrame, ProviderError> {
    let record: DetectionRecord = serde_json::from_str(line.trim())?;
    record.into_frame()
}

/// Encode a frame as one line (without the trailing newline)
pub fn encode_line(frame: &DetectionFrame) -> Result<String, ProviderError> {
    serde_json::to_string(&DetectionRecord::from(frame))
        .map_err(|e| ProviderError::MalformedFrame(e.to_string()))
}

/// Whether a line carries no data (blank or `#` comment)
pub fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}
