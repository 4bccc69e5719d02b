use std::path::Path;

use serde::Deserialize;

use crate::{
    color::{parse_color, Color, ColorScheme},
    render::RenderMode,
    Result, VisualizerError,
};

pub const DEFAULT_FFT_SIZE: usize = 2048;
pub const MIN_FFT_SIZE: usize = 32;
pub const MAX_FFT_SIZE: usize = 32768;
pub const DEFAULT_SMOOTHING: f32 = 0.8;
pub const DEFAULT_MIN_DECIBELS: f32 = -100.0;
pub const DEFAULT_MAX_DECIBELS: f32 = -30.0;
pub const DEFAULT_REFRESH_RATE: f32 = 60.0;
/// Upper bound on `barWidth` and `barSpacing`, in pixels.
pub const MAX_BAR_DIMENSION: u32 = 4096;

/// Options object accepted at construction, as supplied by the host.
///
/// Every field is optional in the serialized form and falls back to its
/// default. Nothing here is trusted until [`VisualizerOptions::validate`]
/// has turned it into a [`VisualizerConfig`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct VisualizerOptions {
    pub fft_size: usize,
    pub smoothing: f32,
    pub min_decibels: f32,
    pub max_decibels: f32,
    pub mode: String,
    pub bar_width: u32,
    pub bar_spacing: u32,
    pub bar_min_height: u32,
    pub color: String,
    pub background_color: String,
    pub responsive: bool,
    pub line_width: u32,
    /// Ticks per second of the frame driver.
    pub refresh_rate: f32,
}

impl Default for VisualizerOptions {
    fn default() -> Self {
        Self {
            fft_size: DEFAULT_FFT_SIZE,
            smoothing: DEFAULT_SMOOTHING,
            min_decibels: DEFAULT_MIN_DECIBELS,
            max_decibels: DEFAULT_MAX_DECIBELS,
            mode: "waveform".to_string(),
            bar_width: 4,
            bar_spacing: 1,
            bar_min_height: 5,
            color: "gradient".to_string(),
            background_color: "rgba(0,0,0,0.1)".to_string(),
            responsive: true,
            line_width: 2,
            refresh_rate: DEFAULT_REFRESH_RATE,
        }
    }
}

impl VisualizerOptions {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Checks every option and produces the typed configuration.
    pub fn validate(&self) -> Result<VisualizerConfig> {
        let analysis = AnalysisConfig::with_decibels(
            self.fft_size,
            self.smoothing,
            self.min_decibels,
            self.max_decibels,
        )?;

        if self.bar_width == 0 {
            return Err(VisualizerError::invalid_config("barWidth", "must be at least 1"));
        }
        if self.bar_width > MAX_BAR_DIMENSION {
            return Err(VisualizerError::invalid_config(
                "barWidth",
                format!("must be at most {MAX_BAR_DIMENSION}"),
            ));
        }
        if self.bar_spacing > MAX_BAR_DIMENSION {
            return Err(VisualizerError::invalid_config(
                "barSpacing",
                format!("must be at most {MAX_BAR_DIMENSION}"),
            ));
        }
        if self.bar_min_height == 0 {
            return Err(VisualizerError::invalid_config(
                "barMinHeight",
                "must be at least 1",
            ));
        }
        if self.line_width == 0 {
            return Err(VisualizerError::invalid_config("lineWidth", "must be at least 1"));
        }
        if !self.refresh_rate.is_finite() || self.refresh_rate <= 0.0 {
            return Err(VisualizerError::invalid_config(
                "refreshRate",
                format!("{} is not a positive rate", self.refresh_rate),
            ));
        }

        let visual = VisualOptions {
            mode: RenderMode::resolve(&self.mode),
            bar_width: self.bar_width,
            bar_spacing: self.bar_spacing,
            bar_min_height: self.bar_min_height,
            color: self.color.parse()?,
            background_color: parse_color(&self.background_color)?,
            responsive: self.responsive,
            line_width: self.line_width,
        };

        Ok(VisualizerConfig {
            analysis,
            visual,
            refresh_rate: self.refresh_rate,
        })
    }
}

/// Validated configuration for a single visualizer instance.
#[derive(Debug, Clone)]
pub struct VisualizerConfig {
    pub analysis: AnalysisConfig,
    pub visual: VisualOptions,
    pub refresh_rate: f32,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            visual: VisualOptions::default(),
            refresh_rate: DEFAULT_REFRESH_RATE,
        }
    }
}

/// Drawing options. Only `mode` changes after construction.
#[derive(Debug, Clone)]
pub struct VisualOptions {
    pub mode: RenderMode,
    pub bar_width: u32,
    pub bar_spacing: u32,
    pub bar_min_height: u32,
    pub color: ColorScheme,
    pub background_color: Color,
    pub responsive: bool,
    pub line_width: u32,
}

impl Default for VisualOptions {
    fn default() -> Self {
        Self {
            mode: RenderMode::Waveform,
            bar_width: 4,
            bar_spacing: 1,
            bar_min_height: 5,
            color: ColorScheme::Gradient,
            background_color: Color::new(0.0, 0.0, 0.0, 0.1),
            responsive: true,
            line_width: 2,
        }
    }
}

/// Transform parameters of the analysis stage. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisConfig {
    fft_size: usize,
    smoothing: f32,
    min_decibels: f32,
    max_decibels: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fft_size: DEFAULT_FFT_SIZE,
            smoothing: DEFAULT_SMOOTHING,
            min_decibels: DEFAULT_MIN_DECIBELS,
            max_decibels: DEFAULT_MAX_DECIBELS,
        }
    }
}

impl AnalysisConfig {
    pub fn new(fft_size: usize, smoothing: f32) -> Result<Self> {
        Self::with_decibels(fft_size, smoothing, DEFAULT_MIN_DECIBELS, DEFAULT_MAX_DECIBELS)
    }

    pub fn with_decibels(
        fft_size: usize,
        smoothing: f32,
        min_decibels: f32,
        max_decibels: f32,
    ) -> Result<Self> {
        if !fft_size.is_power_of_two() || !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&fft_size) {
            return Err(VisualizerError::invalid_config(
                "fftSize",
                format!("{fft_size} is not a power of two in [{MIN_FFT_SIZE}, {MAX_FFT_SIZE}]"),
            ));
        }
        if !(0.0..=1.0).contains(&smoothing) {
            return Err(VisualizerError::invalid_config(
                "smoothing",
                format!("{smoothing} is outside [0, 1]"),
            ));
        }
        if !min_decibels.is_finite() || !max_decibels.is_finite() || min_decibels >= max_decibels
        {
            return Err(VisualizerError::invalid_config(
                "minDecibels",
                format!("{min_decibels} must be below maxDecibels {max_decibels}"),
            ));
        }

        Ok(Self {
            fft_size,
            smoothing,
            min_decibels,
            max_decibels,
        })
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    pub fn min_decibels(&self) -> f32 {
        self.min_decibels
    }

    pub fn max_decibels(&self) -> f32 {
        self.max_decibels
    }

    /// Length of both sample buffers.
    pub fn buffer_len(&self) -> usize {
        self.fft_size / 2
    }
}
