use std::{fs, path::Path, path::PathBuf};

use crate::{surface::Canvas, Result, Surface, VisualizerError};

/// Configuration options for the recording subsystem.
#[derive(Debug, Clone)]
pub struct RecordingSettings {
    pub output_dir: PathBuf,
    /// File name prefix, followed by a zero padded frame number.
    pub prefix: String,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("frames"),
            prefix: "frame".to_string(),
        }
    }
}

/// Writes rendered canvases to disk as numbered PNG images.
#[derive(Debug, Default)]
pub struct Recorder {
    settings: RecordingSettings,
    is_recording: bool,
    frames_written: usize,
}

impl Recorder {
    pub fn new(settings: RecordingSettings) -> Self {
        Self {
            settings,
            is_recording: false,
            frames_written: 0,
        }
    }

    pub fn start(&mut self) -> Result<()> {
        fs::create_dir_all(&self.settings.output_dir)?;
        self.is_recording = true;
        Ok(())
    }

    pub fn stop(&mut self) -> Result<()> {
        self.is_recording = false;
        Ok(())
    }

    pub fn is_recording(&self) -> bool {
        self.is_recording
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    /// Writes `canvas` as the next frame and returns its path.
    pub fn capture(&mut self, canvas: &Canvas) -> Result<PathBuf> {
        if !self.is_recording {
            return Err(VisualizerError::msg("recorder has not been started"));
        }

        let path = self.settings.output_dir.join(format!(
            "{}-{:05}.png",
            self.settings.prefix, self.frames_written
        ));
        write_png(&path, canvas)?;
        self.frames_written += 1;
        Ok(path)
    }
}

/// Saves the RGBA contents of `canvas` as a PNG at `path`.
pub fn write_png(path: &Path, canvas: &Canvas) -> Result<()> {
    image::save_buffer(
        path,
        canvas.pixels(),
        canvas.width(),
        canvas.height(),
        image::ColorType::Rgba8,
    )?;
    Ok(())
}
