//! Terminal host for the waveform: a canvas surface and a frame scheduler.
//!
//! The surface measures everything in canvas dots. With the braille marker
//! every cell holds 2x4 dots, so the marker plays the role of the device
//! pixel ratio and the terminal size times that ratio is the surface size.

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::canvas::{Canvas, Context, Line as CanvasLine},
};
use std::io::{self, stdout, Stdout};

use crate::config::DotMarker;
use crate::waveform::error::Result;
use crate::waveform::{
    DisplayList, FillRect, FrameTimer, Scheduler, StopHandle, Surface, VisualizerError,
};

/// Full-screen terminal canvas.
///
/// Enters raw mode and the alternate screen on creation and restores the
/// terminal when dropped.
pub struct TerminalSurface {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    marker: DotMarker,
    display: DisplayList,
    restored: bool,
}

impl TerminalSurface {
    /// Takes over the terminal.
    ///
    /// # Errors
    /// - If raw mode cannot be enabled
    /// - If the alternate screen cannot be entered
    /// - If the terminal size cannot be read
    pub fn new(marker: DotMarker) -> Result<Self> {
        enable_raw_mode().map_err(surface_error)?;

        let terminal = match enter_alternate_screen() {
            Ok(terminal) => terminal,
            Err(e) => {
                let _ = disable_raw_mode();
                return Err(surface_error(e));
            }
        };

        let mut surface = TerminalSurface {
            terminal,
            marker,
            display: DisplayList::default(),
            restored: false,
        };
        surface.sync_size()?;
        Ok(surface)
    }

    /// Re-reads the terminal size so resizes are picked up on the next frame.
    fn sync_size(&mut self) -> Result<()> {
        let size = self.terminal.size().map_err(surface_error)?;
        let (width, height) = surface_size(size.width, size.height, self.marker);
        self.display.resize(width, height);
        Ok(())
    }

    /// Leaves the alternate screen and raw mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    /// - If cursor cannot be shown
    pub fn restore(&mut self) -> io::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

fn enter_alternate_screen() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn surface_error(e: io::Error) -> VisualizerError {
    VisualizerError::Surface(format!("terminal: {e}"))
}

/// Surface size in dots for a terminal of `columns` x `rows` cells.
pub fn surface_size(columns: u16, rows: u16, marker: DotMarker) -> (f64, f64) {
    let (dots_x, dots_y) = marker.dots_per_cell();
    (
        f64::from(columns) * f64::from(dots_x),
        f64::from(rows) * f64::from(dots_y),
    )
}

impl Surface for TerminalSurface {
    fn width(&self) -> f64 {
        self.display.width()
    }

    fn height(&self) -> f64 {
        self.display.height()
    }

    fn clear(&mut self) {
        if let Err(e) = self.sync_size() {
            tracing::debug!("Keeping previous surface size: {}", e);
        }
        self.display.clear();
    }

    fn fill_rect(&mut self, rect: FillRect, color: Color) {
        self.display.fill_rect(rect, color);
    }

    fn present(&mut self) -> Result<()> {
        let canvas = dot_canvas(
            self.display.shapes(),
            self.display.width(),
            self.display.height(),
            self.marker.symbol(),
        );

        self.terminal.draw(|frame| {
            frame.render_widget(canvas, frame.area());
        })?;

        Ok(())
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

/// Canvas painting `shapes` on a `width` x `height` dot grid.
///
/// Bounds run from 0 to `size - 1`, so one surface unit is exactly one dot.
fn dot_canvas(
    shapes: &[(FillRect, Color)],
    width: f64,
    height: f64,
    marker: Marker,
) -> Canvas<'_, impl Fn(&mut Context<'_>) + '_> {
    Canvas::default()
        .marker(marker)
        .x_bounds([0.0, width - 1.0])
        .y_bounds([0.0, height - 1.0])
        .paint(move |ctx| {
            for (rect, color) in shapes {
                draw_filled(ctx, rect, *color, height);
            }
        })
}

/// Fills a rectangle with one vertical canvas line per dot column.
///
/// Canvas lines include both endpoints, so a rect covers rows `y` through
/// `y + height - 1`. Surface y grows downward while canvas y grows upward,
/// hence the flip.
fn draw_filled(ctx: &mut Context<'_>, rect: &FillRect, color: Color, surface_height: f64) {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return;
    }

    let bottom = surface_height - (rect.y + rect.height);
    let top = surface_height - rect.y - 1.0;
    let mut x = rect.x;
    while x < rect.x + rect.width {
        ctx.draw(&CanvasLine {
            x1: x,
            y1: bottom,
            x2: x,
            y2: top.max(bottom),
            color,
        });
        x += 1.0;
    }
}

/// Fixed-rate scheduler that listens to the keyboard between frames.
///
/// `q`, `Esc` and `Ctrl+C` cancel it, as does the shared [`StopHandle`].
pub struct TerminalScheduler {
    timer: FrameTimer,
    stop: StopHandle,
}

impl TerminalScheduler {
    pub fn new(frame_rate: u32, stop: StopHandle) -> Self {
        Self {
            timer: FrameTimer::from_rate(frame_rate),
            stop,
        }
    }
}

impl Scheduler for TerminalScheduler {
    fn wait_next(&mut self) -> bool {
        loop {
            if self.stop.is_cancelled() {
                return false;
            }

            let remaining = self.timer.remaining();
            if remaining.is_zero() {
                self.timer.advance();
                return true;
            }

            match event::poll(remaining) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if is_quit_key(&key) => {
                        tracing::debug!("{:?} pressed: stopping waveform", key.code);
                        self.cancel();
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!("Failed to read terminal event: {}", e),
                },
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!("Input polling failed: {}", e);
                    std::thread::sleep(remaining);
                }
            }
        }
    }

    fn cancel(&mut self) {
        self.stop.cancel();
    }
}

/// Keys that end the visualization.
pub fn is_quit_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}
