//! Color assignment for drawn elements.
//!
//! A [`ColorPolicy`] turns a [`ColorScheme`] into a per-element [`Paint`].
//! The gradient scheme is bound to absolute surface coordinates, so the
//! policy remembers the width it was built for and must be rebuilt when the
//! surface width changes.

use std::{fmt, str::FromStr, sync::Arc};

use colorgrad::{Gradient, GradientBuilder, LinearGradient};

use crate::{Result, VisualizerError};

pub use colorgrad::Color;

/// Stops of the built-in horizontal gradient: blue, green, yellow, red.
pub const GRADIENT_STOPS: [(f32, &str); 4] = [
    (0.0, "#4285f4"),
    (0.33, "#34a853"),
    (0.66, "#fbbc04"),
    (1.0, "#ea4335"),
];

pub const RAINBOW_SATURATION: f32 = 0.8;
pub const RAINBOW_LIGHTNESS: f32 = 0.6;

/// Coloring scheme selected by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorScheme {
    /// Fixed four-stop gradient spanning the surface width.
    Gradient,
    /// Hue rotates with the element index.
    Rainbow,
    /// A single literal color for every element.
    Literal(Color),
}

impl ColorScheme {
    /// Returns whether paints of this scheme depend on the surface width.
    pub fn depends_on_width(&self) -> bool {
        matches!(self, ColorScheme::Gradient)
    }
}

impl FromStr for ColorScheme {
    type Err = VisualizerError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "gradient" => Ok(ColorScheme::Gradient),
            "rainbow" => Ok(ColorScheme::Rainbow),
            literal => parse_color(literal).map(ColorScheme::Literal),
        }
    }
}

/// Parses a literal CSS color such as `#4285f4`, `rgba(0,0,0,0.1)` or `teal`.
pub fn parse_color(value: &str) -> Result<Color> {
    value
        .trim()
        .parse::<Color>()
        .map_err(|err| VisualizerError::InvalidColor {
            value: value.to_string(),
            reason: err.to_string(),
        })
}

/// Drawable color value handed to a surface.
#[derive(Debug, Clone)]
pub enum Paint {
    Solid(Color),
    Hsl(Hsl),
    Gradient(HorizontalGradient),
}

impl Paint {
    /// Resolves the paint to a concrete color at the given surface x coordinate.
    pub fn color_at(&self, x: f32) -> Color {
        match self {
            Paint::Solid(color) => color.clone(),
            Paint::Hsl(hsl) => hsl.to_color(),
            Paint::Gradient(gradient) => gradient.color_at(x),
        }
    }
}

/// Hue in degrees, saturation and lightness in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl Hsl {
    pub fn to_color(self) -> Color {
        Color::from_hsla(self.hue, self.saturation, self.lightness, 1.0)
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({}, {}%, {}%)",
            hundredths(self.hue),
            hundredths(self.saturation * 100.0),
            hundredths(self.lightness * 100.0)
        )
    }
}

/// Drops f32 noise such as `60.000004` before printing.
fn hundredths(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// Horizontal gradient between two absolute x coordinates.
///
/// Positions left of `start_x` take the first stop and positions right of
/// `end_x` take the last one.
#[derive(Clone)]
pub struct HorizontalGradient {
    start_x: f32,
    end_x: f32,
    gradient: Arc<LinearGradient>,
}

impl HorizontalGradient {
    pub fn new(start_x: f32, end_x: f32) -> Result<Self> {
        let colors = GRADIENT_STOPS
            .iter()
            .map(|(_, hex)| parse_color(hex))
            .collect::<Result<Vec<_>>>()?;
        let positions: Vec<f32> = GRADIENT_STOPS.iter().map(|(position, _)| *position).collect();

        let gradient = GradientBuilder::new()
            .colors(&colors)
            .domain(&positions)
            .build::<LinearGradient>()
            .map_err(|err| VisualizerError::msg(format!("gradient build failed: {err}")))?;

        Ok(Self {
            start_x,
            end_x,
            gradient: Arc::new(gradient),
        })
    }

    pub fn span(&self) -> (f32, f32) {
        (self.start_x, self.end_x)
    }

    pub fn color_at(&self, x: f32) -> Color {
        let length = self.end_x - self.start_x;
        let t = if length > f32::EPSILON {
            ((x - self.start_x) / length).clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.gradient.at(t)
    }
}

impl fmt::Debug for HorizontalGradient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HorizontalGradient")
            .field("start_x", &self.start_x)
            .field("end_x", &self.end_x)
            .finish()
    }
}

/// Per-element coloring function built from a scheme.
#[derive(Debug, Clone)]
pub struct ColorPolicy {
    scheme: ColorScheme,
    gradient: Option<HorizontalGradient>,
    built_width: u32,
}

impl ColorPolicy {
    /// Builds the coloring function for `scheme` on a surface `surface_width`
    /// pixels wide.
    pub fn build(scheme: ColorScheme, surface_width: u32) -> Result<Self> {
        let gradient = match scheme {
            ColorScheme::Gradient => Some(HorizontalGradient::new(0.0, surface_width as f32)?),
            _ => None,
        };

        Ok(Self {
            scheme,
            gradient,
            built_width: surface_width,
        })
    }

    pub fn scheme(&self) -> &ColorScheme {
        &self.scheme
    }

    /// Width the cached gradient was bound to.
    pub fn built_width(&self) -> u32 {
        self.built_width
    }

    /// Returns whether the cached paints are stale for a surface of `width`.
    pub fn needs_rebuild(&self, width: u32) -> bool {
        self.scheme.depends_on_width() && self.built_width != width
    }

    pub fn rebuild(&mut self, width: u32) -> Result<()> {
        *self = Self::build(self.scheme.clone(), width)?;
        Ok(())
    }

    /// Replaces the scheme and rebuilds against `width`.
    pub fn set_scheme(&mut self, scheme: ColorScheme, width: u32) -> Result<()> {
        *self = Self::build(scheme, width)?;
        Ok(())
    }

    /// Paint for element `index` of `total`.
    pub fn paint(&self, index: usize, total: usize) -> Paint {
        match (&self.scheme, &self.gradient) {
            (ColorScheme::Gradient, Some(gradient)) => Paint::Gradient(gradient.clone()),
            (ColorScheme::Rainbow, _) => Paint::Hsl(rainbow(index, total)),
            (ColorScheme::Literal(color), _) => Paint::Solid(color.clone()),
            (ColorScheme::Gradient, None) => {
                Paint::Solid(Color::from_rgba8(0x42, 0x85, 0xf4, 0xff))
            }
        }
    }
}

/// Rainbow hue for element `index` of `total`; an empty set maps to hue 0.
pub fn rainbow(index: usize, total: usize) -> Hsl {
    let hue = if total == 0 {
        0.0
    } else {
        index as f32 / total as f32 * 360.0
    };

    Hsl {
        hue,
        saturation: RAINBOW_SATURATION,
        lightness: RAINBOW_LIGHTNESS,
    }
}
