// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for headless sketching
//!
//! This module provides command-line functionality for:
//! - Replaying recorded detection traces
//! - Sketching from a live detector process
//! - Classifying existing images

use pinch_sketch::Config;
use pinch_sketch::errors::{AppError, AppResult};
use pinch_sketch::gesture::{DetectionFrame, InteractionState};
use pinch_sketch::providers::{DetectorProcess, load_trace, play};
use pinch_sketch::session::{
    ClassifyDispatcher, FrameReport, LatestReceiver, SketchSession, latest_slot,
};
use pinch_sketch::sketch::{SketchSnapshot, classifier_for_command};
use pinch_sketch::storage::save_sketch;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tracing::info;

/// Options shared by the headless sketching commands
pub struct RunOptions {
    pub output: Option<PathBuf>,
    pub fps: u32,
    pub classify: bool,
}

/// Per-run counters
#[derive(Debug, Default)]
struct RunSummary {
    frames: u64,
    idle: u64,
    tracking: u64,
    grabbing: u64,
    segments: u64,
}

impl RunSummary {
    fn record(&mut self, report: &FrameReport) {
        self.frames += 1;
        match report.state {
            InteractionState::Idle => self.idle += 1,
            InteractionState::Tracking => self.tracking += 1,
            InteractionState::Grabbing => self.grabbing += 1,
        }
        if report.drew {
            self.segments += 1;
        }
    }

    fn print(&self, session: &SketchSession, elapsed: Duration) {
        println!();
        println!("Frames:    {}", self.frames);
        println!(
            "States:    idle {} | tracking {} | grabbing {}",
            self.idle, self.tracking, self.grabbing
        );
        println!("Segments:  {}", self.segments);
        println!("Ink:       {} px", session.surface().ink_pixel_count());
        let threshold = session.threshold();
        if threshold.is_adaptive() {
            println!(
                "Threshold: {:.3} after {} updates",
                threshold.value(),
                threshold.updates()
            );
        }
        println!("Time:      {:.2}s", elapsed.as_secs_f64());
    }
}

/// Run a recorded trace through the pipeline
///
/// By default every recorded frame is processed exactly once. With
/// `realtime`, frames are published at `fps` and the frame loop samples the
/// latest one on its own clock, like a live session would.
pub fn replay_trace(
    config: Config,
    trace: PathBuf,
    options: RunOptions,
    realtime: bool,
) -> AppResult<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let frames = load_trace(&trace).await?;
        println!("Trace: {} ({} frames)", trace.display(), frames.len());

        let mut session = SketchSession::new(&config);
        let mut summary = RunSummary::default();
        let start = Instant::now();

        if realtime {
            let (tx, rx) = latest_slot();
            let player = tokio::spawn(play(frames, options.fps, tx));
            run_frame_loop(&mut session, &mut summary, rx, options.fps, || {
                player.is_finished()
            })
            .await;
        } else {
            for frame in &frames {
                let report = session.tick(Some(frame));
                summary.record(&report);
            }
        }

        summary.print(&session, start.elapsed());
        finish(&config, &mut session, &options).await
    })
}

/// Sketch from an external detector until its output ends
pub fn run_detector(
    config: Config,
    command: Vec<String>,
    options: RunOptions,
) -> AppResult<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let (tx, rx) = latest_slot();
        let detector = DetectorProcess::spawn(&command, tx)?;
        println!("Detector: {}", command.join(" "));
        println!("Sketching... (press Ctrl+C to stop early)");

        let mut session = SketchSession::new(&config);
        let mut summary = RunSummary::default();
        let start = Instant::now();

        let frame_loop = run_frame_loop(&mut session, &mut summary, rx, options.fps, || {
            detector.is_finished()
        });
        let interrupted = tokio::select! {
            _ = frame_loop => false,
            _ = tokio::signal::ctrl_c() => true,
        };

        if interrupted {
            println!();
            println!("Stopping early...");
            detector.stop().await;
        } else {
            let stats = detector.wait().await?;
            println!(
                "Detector output ended: {} frames, {} detector errors, {} malformed lines",
                stats.frames, stats.detector_errors, stats.malformed
            );
        }

        summary.print(&session, start.elapsed());
        finish(&config, &mut session, &options).await
    })
}

/// Classify an existing image with the configured classifier
pub fn classify_image(config: Config, path: PathBuf) -> AppResult<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let size = config.snapshot_size;
        let snapshot = tokio::task::spawn_blocking(move || load_snapshot(path, size))
            .await
            .map_err(|e| AppError::Other(format!("Image loading task failed: {}", e)))??;

        let classifier = classifier_for_command(&config.classifier_command);
        let results = classifier.classify(snapshot).await?;
        for result in &results {
            println!("{}", result.display_text());
        }
        Ok(())
    })
}

/// Tick the session at `fps` until `done` reports the producer finished
///
/// One more tick runs after that so the final published frame is seen.
async fn run_frame_loop(
    session: &mut SketchSession,
    summary: &mut RunSummary,
    mut frames: LatestReceiver<DetectionFrame>,
    fps: u32,
    done: impl Fn() -> bool,
) {
    let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / fps.max(1) as f64));
    loop {
        interval.tick().await;
        let finished = done();
        let report = session.tick(frames.latest().as_ref());
        summary.record(&report);
        if finished {
            break;
        }
    }
}

/// Save the sketch and optionally classify it
async fn finish(
    config: &Config,
    session: &mut SketchSession,
    options: &RunOptions,
) -> AppResult<()> {
    let path = save_sketch(session.surface(), options.output.as_deref())?;
    println!("Sketch saved: {}", path.display());

    if options.classify {
        let mut dispatcher = ClassifyDispatcher::new(
            classifier_for_command(&config.classifier_command),
            Handle::current(),
        );
        dispatcher.request(session);
        println!("{}", session.status());
        dispatcher.wait_one(session).await;
        println!("{}", session.status());
    }

    info!(frames = session.frame_count(), "Run finished");
    Ok(())
}

/// Load an image as a classifier-ready square snapshot over white
fn load_snapshot(path: PathBuf, size: u32) -> AppResult<SketchSnapshot> {
    let img = image::open(&path)?.to_rgba8();

    let mut canvas =
        image::RgbaImage::from_pixel(img.width(), img.height(), image::Rgba([255, 255, 255, 255]));
    image::imageops::overlay(&mut canvas, &img, 0, 0);

    let resized =
        image::imageops::resize(&canvas, size, size, image::imageops::FilterType::Triangle);
    Ok(SketchSnapshot::from_image(resized))
}
