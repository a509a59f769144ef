// SPDX-License-Identifier: GPL-3.0-only

//! External hand detector process
//!
//! Runs any program that prints detection frames as JSON lines on stdout
//! (for example a MediaPipe wrapper reading a webcam) and forwards each frame
//! into a latest-value slot.

use crate::errors::ProviderError;
use crate::gesture::DetectionFrame;
use crate::providers::trace::{decode_line, is_skippable};
use crate::session::LatestSender;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Counters reported when a detector's output ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectorStats {
    pub frames: u64,
    pub detector_errors: u64,
    pub malformed: u64,
}

/// A running detector and the task reading its output
pub struct DetectorProcess {
    child: Child,
    reader: JoinHandle<DetectorStats>,
}

impl DetectorProcess {
    /// Start `command[0]` with the remaining elements as arguments
    pub fn spawn(
        command: &[String],
        sender: LatestSender<DetectionFrame>,
    ) -> Result<Self, ProviderError> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| ProviderError::SpawnFailed("empty detector command".to_string()))?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ProviderError::SpawnFailed(format!("{}: {}", program, e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ProviderError::SpawnFailed("detector stdout unavailable".to_string()))?;

        info!(program = %program, pid = ?child.id(), "Detector started");

        let reader = tokio::spawn(forward_lines(BufReader::new(stdout), sender));
        Ok(Self { child, reader })
    }

    /// Whether the detector's output has ended
    pub fn is_finished(&self) -> bool {
        self.reader.is_finished()
    }

    /// Wait for the output to end and the process to exit
    pub async fn wait(mut self) -> Result<DetectorStats, ProviderError> {
        let stats = self
            .reader
            .await
            .map_err(|e| ProviderError::DetectorFailed(e.to_string()))?;

        let status = self
            .child
            .wait()
            .await
            .map_err(|e| ProviderError::DetectorFailed(e.to_string()))?;

        if !status.success() {
            warn!(%status, "Detector exited with failure");
        }
        info!(frames = stats.frames, "Detector finished");
        Ok(stats)
    }

    /// Terminate the detector
    pub async fn stop(mut self) {
        if let Err(e) = self.child.kill().await {
            debug!(error = %e, "Detector already gone");
        }
        self.reader.abort();
    }
}

/// Read JSON lines and publish every decodable frame
///
/// A line reporting a detector error publishes an empty frame, so the
/// session falls back to idle rather than holding a stale hand.
pub(crate) async fn forward_lines<R>(
    reader: R,
    sender: LatestSender<DetectionFrame>,
) -> DetectorStats
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut stats = DetectorStats::default();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Detector output unreadable");
                break;
            }
        };

        if is_skippable(&line) {
            continue;
        }

        let frame = match decode_line(&line) {
            Ok(frame) => frame,
            Err(ProviderError::DetectorFailed(msg)) => {
                warn!(error = %msg, "Detector reported an error");
                stats.detector_errors += 1;
                DetectionFrame::default()
            }
            Err(e) => {
                debug!(error = %e, "Ignoring malformed detector line");
                stats.malformed += 1;
                continue;
            }
        };

        stats.frames += 1;
        if !sender.publish(frame) {
            debug!("Frame consumer gone, stopping detector reader");
            break;
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::latest_slot;

    #[tokio::test]
    async fn test_forward_lines_counts() {
        let input = b"{\"width\":2,\"height\":2,\"hands\":[]}\n\
                      oops\n\
                      {\"width\":2,\"height\":2,\"error\":\"camera busy\"}\n\
                      \n\
                      {\"width\":8,\"height\":6,\"hands\":[]}\n";
        let (tx, mut rx) = latest_slot();
        let stats = forward_lines(&input[..], tx).await;

        assert_eq!(
            stats,
            DetectorStats {
                frames: 3,
                detector_errors: 1,
                malformed: 1,
            }
        );
        let last = rx.latest().unwrap();
        assert_eq!(last.source.width, 8);
    }

    #[tokio::test]
    async fn test_spawn_missing_program() {
        let (tx, _rx) = latest_slot();
        let err = DetectorProcess::spawn(&["/nonexistent/hand-detector".to_string()], tx)
            .err()
            .unwrap();
        assert!(matches!(err, ProviderError::SpawnFailed(_)));
    }

    #[tokio::test]
    async fn test_spawn_empty_command() {
        let (tx, _rx) = latest_slot();
        assert!(DetectorProcess::spawn(&[], tx).is_err());
    }
}
