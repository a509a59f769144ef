// SPDX-License-Identifier: GPL-3.0-only

//! Recorded detection playback

use crate::errors::ProviderError;
use crate::gesture::DetectionFrame;
use crate::providers::trace::{decode_line, is_skippable};
use crate::session::LatestSender;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Parse a trace file's contents
///
/// Lines the detector marked as failed, and lines that fail to parse, become
/// empty frames so playback timing is preserved.
pub fn parse_trace(text: &str) -> Vec<DetectionFrame> {
    let mut frames = Vec::new();
    for (number, line) in text.lines().enumerate() {
        if is_skippable(line) {
            continue;
        }
        match decode_line(line) {
            Ok(frame) => frames.push(frame),
            Err(ProviderError::DetectorFailed(msg)) => {
                debug!(line = number + 1, error = %msg, "Detector error in trace");
                frames.push(DetectionFrame::default());
            }
            Err(e) => {
                warn!(line = number + 1, error = %e, "Skipping malformed trace line");
                frames.push(DetectionFrame::default());
            }
        }
    }
    frames
}

/// Load a trace file from disk
pub async fn load_trace(path: &Path) -> Result<Vec<DetectionFrame>, ProviderError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ProviderError::TraceUnreadable(format!("{}: {}", path.display(), e)))?;
    let frames = parse_trace(&text);
    info!(path = %path.display(), frames = frames.len(), "Loaded trace");
    Ok(frames)
}

/// Publish frames into a latest-value slot at a fixed rate
///
/// Stops early when the consumer goes away. Returns the number of frames
/// published.
pub async fn play(
    frames: Vec<DetectionFrame>,
    fps: u32,
    sender: LatestSender<DetectionFrame>,
) -> usize {
    let period = Duration::from_secs_f64(1.0 / fps.max(1) as f64);
    let mut interval = tokio::time::interval(period);
    let mut published = 0;

    for frame in frames {
        interval.tick().await;
        if !sender.publish(frame) {
            debug!(published, "Replay consumer gone");
            break;
        }
        published += 1;
    }

    published
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::latest_slot;

    #[test]
    fn test_parse_trace_keeps_timing() {
        let text = "# header\n\
                    {\"width\":4,\"height\":4,\"hands\":[]}\n\
                    \n\
                    {\"width\":4,\"height\":4,\"error\":\"lost\"}\n\
                    garbage\n";
        let frames = parse_trace(text);
        assert_eq!(frames.len(), 3);
        assert!(frames.iter().all(|f| f.primary_hand().is_none()));
    }

    #[tokio::test]
    async fn test_play_publishes_all_frames() {
        let (tx, mut rx) = latest_slot();
        let frames = vec![DetectionFrame::default(); 5];
        let published = play(frames, 200, tx).await;
        assert_eq!(published, 5);
        assert!(rx.latest().is_some());
    }

    #[tokio::test]
    async fn test_play_stops_without_consumer() {
        let (tx, rx) = latest_slot();
        drop(rx);
        assert_eq!(play(vec![DetectionFrame::default(); 3], 30, tx).await, 0);
    }

    #[tokio::test]
    async fn test_missing_trace_file() {
        let err = load_trace(Path::new("/nonexistent/trace.jsonl"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::TraceUnreadable(_)));
    }
}
