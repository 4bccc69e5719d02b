//! Transforms from sample buffers to drawing primitives.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    audio::{AnalysisNode, SampleBuffers},
    color::ColorPolicy,
    config::VisualOptions,
    surface::{Point, Surface},
    Result,
};

pub mod particles;
pub mod spectrum;
pub mod waveform;

/// Drawing style applied by the frame driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum RenderMode {
    /// Poly-line through the time-domain samples.
    Waveform,
    /// Bottom-anchored bars over the frequency bins. Also known as `bars`.
    Spectrum,
    /// Circle of dots pushed outwards by frequency magnitude.
    Particles,
}

impl From<String> for RenderMode {
    fn from(name: String) -> Self {
        Self::resolve(&name)
    }
}

impl RenderMode {
    /// Mode used for any name that is not recognised.
    pub const FALLBACK: RenderMode = RenderMode::Waveform;

    /// Looks up a mode by name. `bars` is an alias for [`RenderMode::Spectrum`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "waveform" => Some(RenderMode::Waveform),
            "spectrum" | "bars" => Some(RenderMode::Spectrum),
            "particles" => Some(RenderMode::Particles),
            _ => None,
        }
    }

    /// Like [`RenderMode::from_name`] but maps unknown names to
    /// [`RenderMode::FALLBACK`].
    pub fn resolve(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            warn!(mode = name, fallback = %Self::FALLBACK, "unknown render mode");
            Self::FALLBACK
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RenderMode::Waveform => "waveform",
            RenderMode::Spectrum => "spectrum",
            RenderMode::Particles => "particles",
        }
    }

    /// Reads the buffer this mode consumes and draws one frame of it.
    pub fn render<S, N>(
        self,
        surface: &mut S,
        samples: &mut SampleBuffers<N>,
        colors: &ColorPolicy,
        options: &VisualOptions,
        scratch: &mut Vec<Point>,
    ) -> Result<()>
    where
        S: Surface + ?Sized,
        N: AnalysisNode,
    {
        match self {
            RenderMode::Waveform => {
                let data = samples.time_domain_samples()?;
                waveform::draw(surface, data, colors, options.line_width as f32, scratch);
            }
            RenderMode::Spectrum => {
                let data = samples.frequency_samples()?;
                spectrum::draw(surface, data, colors, spectrum::BarLayout::from(options));
            }
            RenderMode::Particles => {
                let data = samples.frequency_samples()?;
                particles::draw(surface, data, colors);
            }
        }
        Ok(())
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_names_and_aliases() {
        assert_eq!(RenderMode::resolve("waveform"), RenderMode::Waveform);
        assert_eq!(RenderMode::resolve("spectrum"), RenderMode::Spectrum);
        assert_eq!(RenderMode::resolve("bars"), RenderMode::Spectrum);
        assert_eq!(RenderMode::resolve("particles"), RenderMode::Particles);
    }

    #[test]
    fn unknown_names_fall_back_to_waveform() {
        assert_eq!(RenderMode::from_name("bogus"), None);
        assert_eq!(RenderMode::resolve("bogus"), RenderMode::Waveform);
        assert_eq!(RenderMode::resolve(""), RenderMode::Waveform);
        assert_eq!(RenderMode::resolve("Spectrum"), RenderMode::Waveform);
    }

    #[test]
    fn json_names_follow_the_same_policy() {
        let parse = |json: &str| serde_json::from_str::<RenderMode>(json).unwrap();
        assert_eq!(parse(r#""bars""#), RenderMode::Spectrum);
        assert_eq!(parse(r#""particles""#), RenderMode::Particles);
        assert_eq!(parse(r#""bogus""#), RenderMode::Waveform);
        assert_eq!(
            serde_json::to_string(&RenderMode::Spectrum).unwrap(),
            r#""spectrum""#
        );
    }
}
