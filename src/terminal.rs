// SPDX-License-Identifier: GPL-3.0-only

//! Terminal sketch pad
//!
//! Renders the drawing surface to the terminal using Unicode half-block
//! characters. The mouse stands in for a hand detector: moving it moves the
//! index fingertip, holding the left button pinches.

use crate::config::Config;
use crate::constants::TERMINAL_POLL_INTERVAL;
use crate::gesture::{
    CoordinateMapper, FrameSize, InteractionState, PinchThreshold, Point, ThresholdUnit, Transform,
    mirror_x,
};
use crate::providers::{PointerHand, encode_line};
use crate::session::{ClassifyDispatcher, FrameReport, SketchSession, latest_slot};
use crate::sketch::{StrokeSurface, classifier_for_command};

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
        MouseButton, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal, backend::CrosstermBackend, buffer::Buffer, layout::Rect, style::Color,
    widgets::Widget,
};
use std::fs::File;
use std::io::{self, BufWriter, Write, stdout};
use std::path::PathBuf;
use tracing::{error, info};

/// Lines reserved below the canvas
const HUD_LINES: u16 = 2;

/// Mouse input is quantized to cells; a steady drag moves up to about two
/// source pixels per event, so the speed limit must allow at least this many.
const MIN_SPEED_SOURCE_PIXELS: f32 = 3.0;

/// Run the terminal sketch pad
///
/// `record` optionally receives every synthesized detection frame as JSON
/// lines, which `replay` can play back later.
pub fn run(config: Config, record: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;

    let recorder = match record {
        Some(path) => {
            info!(path = %path.display(), "Recording pointer frames");
            Some(BufWriter::new(File::create(path)?))
        }
        None => None,
    };

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &runtime, config, recorder);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    runtime: &tokio::runtime::Runtime,
    mut config: Config,
    mut recorder: Option<BufWriter<File>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let size = terminal.size()?;
    let surface_size = config.surface_size();
    let mut layout = CanvasLayout::fit(
        canvas_area(Rect::new(0, 0, size.width, size.height)),
        surface_size,
    );

    // Keep ordinary drags from reading as fast motion
    let scale = CoordinateMapper::new(config.mapping_policy, surface_size)
        .transform(layout.source_size())
        .scale_x;
    config.speed_threshold = config.speed_threshold.max(scale * MIN_SPEED_SOURCE_PIXELS);
    info!(
        speed_threshold = config.speed_threshold,
        canvas = %layout.source_size(),
        "Terminal session starting"
    );

    let mut session = SketchSession::new(&config);
    let mut dispatcher = ClassifyDispatcher::new(
        classifier_for_command(&config.classifier_command),
        runtime.handle().clone(),
    );
    let (frames_tx, mut frames_rx) = latest_slot();

    let mut mirror = config.mirror_preview;
    let mut pointer: Option<Point> = None;
    let mut pressed = false;

    loop {
        dispatcher.drain(&mut session);

        let hand = PointerHand::new(layout.source_size());
        frames_tx.publish(hand.frame(pointer, pressed));
        let detection = frames_rx.latest();
        let report = session.tick(detection.as_ref());

        if let (Some(writer), Some(frame)) = (recorder.as_mut(), detection.as_ref()) {
            writeln!(writer, "{}", encode_line(frame)?)?;
        }

        terminal.draw(|f| {
            let area = f.area();
            let canvas = canvas_area(area);
            layout = CanvasLayout::fit(canvas, surface_size);

            f.render_widget(
                SketchView {
                    session: &session,
                    layout,
                    mirror,
                },
                canvas,
            );

            let hud = hud_line(&session, &report);
            let help = format!(
                "drag: draw | 'c' clear | 'k' classify | 'm' mirror ({}) | 'q' quit",
                if mirror { "on" } else { "off" }
            );
            let bottom = area.y + area.height;
            f.render_widget(
                StatusBar { message: &hud },
                Rect::new(area.x, bottom.saturating_sub(2), area.width, 1),
            );
            f.render_widget(
                StatusBar { message: &help },
                Rect::new(area.x, bottom.saturating_sub(1), area.width, 1),
            );
        })?;

        if !event::poll(TERMINAL_POLL_INTERVAL)? {
            continue;
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    break;
                }
                match key.code {
                    KeyCode::Char('q') => break,
                    KeyCode::Char('c') => session.clear(),
                    KeyCode::Char('k') => {
                        let ticket = dispatcher.request(&mut session);
                        info!(sequence = ticket.sequence(), "Classification requested");
                    }
                    KeyCode::Char('m') => {
                        mirror = !mirror;
                        // The same screen position is a different camera position now
                        pointer = None;
                    }
                    _ => {}
                }
            }
            Event::Mouse(mouse) => {
                pointer = layout.pointer(mouse.column, mouse.row, mirror);
                match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => pressed = true,
                    MouseEventKind::Up(MouseButton::Left) => pressed = false,
                    _ => {}
                }
            }
            Event::FocusLost => {
                pointer = None;
                pressed = false;
            }
            _ => {}
        }
    }

    if let Some(mut writer) = recorder
        && let Err(e) = writer.flush()
    {
        error!(error = %e, "Failed to flush recording");
    }

    Ok(())
}

/// Area above the HUD
fn canvas_area(area: Rect) -> Rect {
    Rect {
        x: area.x,
        y: area.y,
        width: area.width,
        height: area.height.saturating_sub(HUD_LINES),
    }
}

fn hud_line(session: &SketchSession, report: &FrameReport) -> String {
    let pinch = if report.state.hand_present() {
        format!("{:.1}px", report.metrics.pinch_distance)
    } else {
        "--".to_string()
    };
    format!(
        "{} | pinch {} | threshold {} | {}",
        report.state,
        pinch,
        threshold_label(session.threshold()),
        session.status()
    )
}

fn threshold_label(threshold: &PinchThreshold) -> String {
    let value = match threshold.unit() {
        ThresholdUnit::DisplayPixels => format!("{:.1}px", threshold.value()),
        ThresholdUnit::HandSpan => format!("{:.2} span", threshold.value()),
    };
    if threshold.is_adaptive() {
        format!("{} (adaptive)", value)
    } else {
        value
    }
}

/// Placement of the canvas in terminal cells
///
/// Each cell shows two vertically stacked canvas pixels. The canvas pixel
/// grid is also the frame size reported by the pointer hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct CanvasLayout {
    x: u16,
    y: u16,
    width: u16,
    height: u16,
}

impl CanvasLayout {
    /// Largest centered area with the surface's aspect ratio
    fn fit(area: Rect, surface: FrameSize) -> Self {
        if surface.is_empty() || area.width == 0 || area.height == 0 {
            return Self::default();
        }

        let surface_aspect = surface.width as f64 / surface.height as f64;
        let term_width = area.width as f64;
        let term_height = (area.height * 2) as f64; // *2 because half-blocks

        let (width, height) = if term_width / term_height > surface_aspect {
            // Terminal is wider - fit to height
            let w = term_height * surface_aspect;
            (w as u16, area.height)
        } else {
            // Terminal is taller - fit to width
            let h = term_width / surface_aspect;
            (area.width, (h / 2.0) as u16)
        };

        Self {
            x: area.x + area.width.saturating_sub(width) / 2,
            y: area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        }
    }

    fn source_size(&self) -> FrameSize {
        FrameSize::new(self.width as u32, self.height as u32 * 2)
    }

    /// Canvas pixel under a mouse cell, undoing the preview mirror
    fn pointer(&self, column: u16, row: u16, mirror: bool) -> Option<Point> {
        if column < self.x
            || row < self.y
            || column >= self.x + self.width
            || row >= self.y + self.height
        {
            return None;
        }

        let p = Point::new(
            (column - self.x) as f32 + 0.5,
            (row - self.y) as f32 * 2.0 + 1.0,
        );
        Some(if mirror {
            mirror_x(p, self.source_size())
        } else {
            p
        })
    }
}

/// Widget that renders the surface and the hand overlay
struct SketchView<'a> {
    session: &'a SketchSession,
    layout: CanvasLayout,
    mirror: bool,
}

impl SketchView<'_> {
    /// Terminal cell showing a display-space point, if on the canvas
    fn cell_for(&self, transform: &Transform, p: Point) -> Option<(u16, u16)> {
        if transform.scale_x <= 0.0 || transform.scale_y <= 0.0 {
            return None;
        }
        let sx = ((p.x - transform.offset_x) / transform.scale_x).floor();
        let sy = ((p.y - transform.offset_y) / transform.scale_y / 2.0).floor();
        if sx < 0.0 || sy < 0.0 || sx >= self.layout.width as f32 || sy >= self.layout.height as f32
        {
            return None;
        }
        let column = sx as u16;
        let column = if self.mirror {
            self.layout.width - 1 - column
        } else {
            column
        };
        Some((self.layout.x + column, self.layout.y + sy as u16))
    }
}

impl Widget for SketchView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.layout.width == 0 || self.layout.height == 0 {
            let msg = "Terminal too small";
            buf.set_string(area.x, area.y, msg, ratatui::style::Style::default());
            return;
        }

        let transform = self
            .session
            .mapper()
            .transform(self.layout.source_size());
        let surface = self.session.surface();

        // Each terminal cell represents 2 vertical pixels:
        // - Upper half (▀) colored with fg
        // - Lower half colored with bg
        for ty in 0..self.layout.height {
            for tx in 0..self.layout.width {
                let term_x = self.layout.x + tx;
                let term_y = self.layout.y + ty;
                if term_x >= area.x + area.width || term_y >= area.y + area.height {
                    continue;
                }

                let sx = if self.mirror {
                    self.layout.width - 1 - tx
                } else {
                    tx
                } as f32;
                let top = ink_color(surface, &transform, sx, ty as f32 * 2.0);
                let bottom = ink_color(surface, &transform, sx, ty as f32 * 2.0 + 1.0);

                if let Some(cell) = buf.cell_mut((term_x, term_y)) {
                    cell.set_char('▀');
                    cell.set_fg(top);
                    cell.set_bg(bottom);
                }
            }
        }

        // Landmarks and the brush indicator
        let Some(hand) = self.session.mapped_hand() else {
            return;
        };
        for p in hand.iter() {
            if let Some(pos) = self.cell_for(&transform, *p)
                && let Some(cell) = buf.cell_mut(pos)
            {
                cell.set_char('•');
                cell.set_fg(Color::Green);
            }
        }

        let metrics = self.session.metrics();
        let color = match self.session.state() {
            InteractionState::Grabbing => Color::Red,
            _ => Color::Blue,
        };
        if let Some(pos) = self.cell_for(&transform, metrics.position)
            && let Some(cell) = buf.cell_mut(pos)
        {
            cell.set_char('●');
            cell.set_fg(color);
        }
    }
}

/// Color of one canvas pixel: black if any of its surface area is inked
fn ink_color(surface: &StrokeSurface, transform: &Transform, sx: f32, sy: f32) -> Color {
    const SAMPLES: u32 = 3;

    for j in 0..SAMPLES {
        for i in 0..SAMPLES {
            let p = transform.apply(Point::new(
                sx + (i as f32 + 0.5) / SAMPLES as f32,
                sy + (j as f32 + 0.5) / SAMPLES as f32,
            ));
            if p.x >= 0.0 && p.y >= 0.0 && surface.is_inked(p.x as u32, p.y as u32) {
                return Color::Black;
            }
        }
    }
    Color::White
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Fill background
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }

        let text: String = self.message.chars().take(area.width as usize).collect();
        buf.set_string(
            area.x,
            area.y,
            text,
            ratatui::style::Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray),
        );
    }
}
