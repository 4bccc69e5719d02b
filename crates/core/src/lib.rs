//! Core library for the Voice Visualizer.
//!
//! Audio flows one way per frame: an analysis node produces byte
//! snapshots, a render mode turns them into drawing primitives, and the
//! frame driver pushes those onto a surface at the display refresh cadence.
//! Each module owns one stage of that pipeline.

pub mod analysis;
pub mod audio;
pub mod color;
pub mod config;
pub mod driver;
pub mod error;
pub mod record;
pub mod render;
pub mod surface;
pub mod visualizer;

pub use analysis::{AnalyserHandle, AudioSink};
pub use audio::{AnalysisNode, AudioSource, SampleBuffers, SnapshotNode, ToneSource, Waveshape};
pub use color::{ColorPolicy, ColorScheme, Paint};
pub use config::{AnalysisConfig, VisualOptions, VisualizerConfig, VisualizerOptions};
pub use driver::{DriverHandle, FrameDriver, ResizeEvents, ResizeNotifier};
pub use error::{Result, VisualizerError};
pub use record::{Recorder, RecordingSettings};
pub use render::RenderMode;
pub use surface::{Canvas, Container, RecordingSurface, Surface, SurfaceHost};
pub use visualizer::{Lifecycle, Visualizer};
