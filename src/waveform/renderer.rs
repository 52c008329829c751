//! Per-frame painting of the bar timeline.
//!
//! Every frame starts from a cleared surface. Bars are drawn as filled
//! rectangles centred on the horizontal midline; bars that carry no visible
//! signal collapse to a thin dot so the strip keeps its rhythm.

use std::str::FromStr;

use ratatui::style::Color;

use super::error::{Result, VisualizerError};
use super::surface::{FillRect, Surface};
use super::timeline::{Bar, BarKind, BarTimeline};
use crate::config::WaveformConfig;

/// Height of the flat dot drawn for placeholders and quiet bars.
pub const DOT_HEIGHT: f64 = 2.0;

/// Colors used by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Recorded bars above the noise threshold
    pub bar: Color,
    /// Recorded bars below the noise threshold
    pub quiet: Color,
    /// Bars seeded before audio arrived
    pub placeholder: Color,
}

impl Palette {
    /// Parses the palette from color names or `#rrggbb` strings.
    ///
    /// # Errors
    /// - If any of the configured colors cannot be parsed
    pub fn from_config(config: &WaveformConfig) -> Result<Self> {
        Ok(Self {
            bar: parse_color("bar_color", &config.bar_color)?,
            quiet: parse_color("quiet_color", &config.quiet_color)?,
            placeholder: parse_color("placeholder_color", &config.placeholder_color)?,
        })
    }
}

fn parse_color(field: &'static str, value: &str) -> Result<Color> {
    Color::from_str(value.trim()).map_err(|_| VisualizerError::InvalidColor {
        field,
        value: value.to_string(),
    })
}

/// Paints a [`BarTimeline`] onto a [`Surface`].
#[derive(Debug, Clone)]
pub struct Renderer {
    palette: Palette,
    noise_threshold: f64,
}

impl Renderer {
    /// `noise_threshold` is a fraction of the surface height.
    pub fn new(palette: Palette, noise_threshold: f64) -> Self {
        Self {
            palette,
            noise_threshold,
        }
    }

    /// Clears the surface and draws every bar of the timeline.
    pub fn paint<S: Surface + ?Sized>(&self, timeline: &BarTimeline, surface: &mut S) {
        surface.clear();

        let surface_height = surface.height();
        let quiet_below = self.noise_threshold * surface_height;

        for bar in timeline.bars() {
            let (rect, color) = match bar.kind {
                BarKind::Placeholder => (dot(bar, surface_height), self.palette.placeholder),
                BarKind::Recorded if bar.target_height < quiet_below => {
                    (dot(bar, surface_height), self.palette.quiet)
                }
                BarKind::Recorded => (
                    FillRect::new(
                        bar.position,
                        surface_height / 2.0 - bar.current_height / 2.0,
                        bar.width,
                        bar.current_height,
                    ),
                    self.palette.bar,
                ),
            };
            surface.fill_rect(rect, color);
        }
    }
}

/// Thin strip centred on the midline.
fn dot(bar: &Bar, surface_height: f64) -> FillRect {
    FillRect::new(
        bar.position,
        surface_height / 2.0 - DOT_HEIGHT / 2.0,
        bar.width,
        DOT_HEIGHT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waveform::surface::DisplayList;

    fn palette() -> Palette {
        Palette {
            bar: Color::Rgb(206, 224, 220),
            quiet: Color::Rgb(185, 207, 212),
            placeholder: Color::DarkGray,
        }
    }

    #[test]
    fn test_placeholders_render_as_centered_dots() {
        let mut timeline = BarTimeline::new(3.0, 10.0);
        timeline.seed_placeholders(100.0, 3.0, 10.0);
        let mut surface = DisplayList::new(100.0, 100.0);

        Renderer::new(palette(), 0.01).paint(&timeline, &mut surface);

        assert_eq!(surface.shapes().len(), 8);
        for ((rect, color), bar) in surface.shapes().iter().zip(timeline.bars()) {
            assert_eq!(*color, Color::DarkGray);
            assert_eq!(*rect, FillRect::new(bar.position, 49.0, 3.0, DOT_HEIGHT));
        }
    }

    #[test]
    fn test_quiet_bars_render_as_dots_regardless_of_height() {
        let mut timeline = BarTimeline::new(3.0, 10.0);
        timeline.try_append(0.0, 0.0, 100.0);
        timeline.update_heights(1_000.0, 200.0, |p| p);
        let mut surface = DisplayList::new(100.0, 100.0);

        Renderer::new(palette(), 0.01).paint(&timeline, &mut surface);

        let (rect, color) = surface.shapes()[0];
        assert_eq!(color, palette().quiet);
        assert_eq!(rect, FillRect::new(97.0, 49.0, 3.0, DOT_HEIGHT));
    }

    #[test]
    fn test_threshold_is_a_fraction_of_surface_height() {
        // Threshold 0.1 of 200 is 20: a target of 15 is quiet, 25 is not.
        let mut timeline = BarTimeline::new(3.0, 0.0);
        timeline.try_append(15.0, 0.0, 100.0);
        timeline.advance_and_cull(3.0);
        timeline.try_append(25.0, 0.0, 100.0);
        timeline.update_heights(1_000.0, 200.0, |p| p);
        let mut surface = DisplayList::new(100.0, 200.0);

        Renderer::new(palette(), 0.1).paint(&timeline, &mut surface);

        assert_eq!(surface.shapes()[0].1, palette().quiet);
        assert_eq!(surface.shapes()[0].0.height, DOT_HEIGHT);
        assert_eq!(surface.shapes()[1].1, palette().bar);
        assert_eq!(surface.shapes()[1].0.height, 25.0);
    }

    #[test]
    fn test_recorded_bars_are_vertically_centered() {
        let mut timeline = BarTimeline::new(3.0, 10.0);
        timeline.try_append(50.0, 0.0, 100.0);
        timeline.update_heights(100.0, 200.0, |p| p);
        let mut surface = DisplayList::new(100.0, 100.0);

        Renderer::new(palette(), 0.01).paint(&timeline, &mut surface);

        let (rect, color) = surface.shapes()[0];
        assert_eq!(color, palette().bar);
        assert_eq!(rect, FillRect::new(97.0, 37.5, 3.0, 25.0));
        assert_eq!(rect.y + rect.height / 2.0, 50.0);
    }

    #[test]
    fn test_every_frame_starts_from_a_clear_surface() {
        let mut timeline = BarTimeline::new(3.0, 10.0);
        timeline.seed_placeholders(100.0, 3.0, 10.0);
        let mut surface = DisplayList::new(100.0, 100.0);
        let renderer = Renderer::new(palette(), 0.01);

        renderer.paint(&timeline, &mut surface);
        renderer.paint(&timeline, &mut surface);
        assert_eq!(surface.shapes().len(), timeline.len());
    }

    #[test]
    fn test_palette_parses_hex_and_named_colors() {
        let mut config = WaveformConfig::default();
        config.bar_color = "#ff0000".to_string();
        config.quiet_color = "blue".to_string();

        let palette = Palette::from_config(&config).unwrap();
        assert_eq!(palette.bar, Color::Rgb(255, 0, 0));
        assert_eq!(palette.quiet, Color::Blue);
    }

    #[test]
    fn test_palette_rejects_unknown_colors() {
        let mut config = WaveformConfig::default();
        config.placeholder_color = "not-a-color".to_string();

        let err = Palette::from_config(&config).unwrap_err();
        assert!(matches!(
            err,
            VisualizerError::InvalidColor { field: "placeholder_color", .. }
        ));
    }
}
