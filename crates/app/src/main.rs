use std::{collections::HashMap, path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use voice_visualizer_core::{
    record::write_png, Canvas, Container, FrameDriver, Recorder, RecordingSettings, RenderMode,
    ResizeNotifier, ToneSource, Visualizer, VisualizerError, VisualizerOptions, Waveshape,
};

const SURFACE_ID: &str = "visualizer";

fn main() -> voice_visualizer_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            common,
            frames,
            output,
        } => run_render(&common, frames, output),
        Commands::Run {
            common,
            seconds,
            output,
        } => run_live(&common, seconds, output),
    }
}

fn run_render(
    common: &CommonArgs,
    frames: usize,
    output: PathBuf,
) -> voice_visualizer_core::Result<()> {
    let options = common.options()?;
    let config = options.validate()?;
    tracing::info!(frames, ?output, mode = %config.visual.mode, "rendering frames");

    let mut host = common.host();
    let mut visualizer = Visualizer::attach(&mut host, SURFACE_ID, &config)?;
    let mut tone = common.tone();
    visualizer.connect(&mut tone);

    let mut recorder = Recorder::new(RecordingSettings {
        output_dir: output,
        ..Default::default()
    });
    recorder.start()?;

    let block = common.block_len(config.refresh_rate);
    for frame in 0..frames {
        tone.set_frequency(common.frequency * (1.0 + frame as f32 / frames.max(1) as f32));
        tone.pump(block)?;
        visualizer.tick()?;
        if let Some(canvas) = visualizer.surface() {
            recorder.capture(canvas)?;
        }
    }

    recorder.stop()?;
    visualizer.stop()?;
    tracing::info!(written = recorder.frames_written(), "done");
    Ok(())
}

fn run_live(
    common: &CommonArgs,
    seconds: f32,
    output: PathBuf,
) -> voice_visualizer_core::Result<()> {
    let options = common.options()?;
    let config = options.validate()?;
    tracing::info!(seconds, mode = %config.visual.mode, "starting frame driver");

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let mut host = common.host();
        let visualizer = Visualizer::attach(&mut host, SURFACE_ID, &config)?;
        let mut tone = common.tone();
        visualizer.connect(&mut tone);

        let notifier = ResizeNotifier::new();
        let driver = FrameDriver::spawn(visualizer, Some(notifier.subscribe()));

        let modes = [RenderMode::Waveform, RenderMode::Spectrum, RenderMode::Particles];
        let period = Duration::from_millis(10);
        let block = common.block_len(100.0);
        let steps = (seconds.max(0.0) * 100.0) as usize;
        for step in 0..steps {
            tone.pump(block)?;
            if step % 100 == 99 {
                let mode = modes[(step / 100 + 1) % modes.len()];
                tracing::info!(%mode, "switching mode");
                driver.set_render_mode(mode);
            }
            tokio::time::sleep(period).await;
        }

        let visualizer = driver.stop().await?;
        tracing::info!(frames = visualizer.frames_rendered(), "frame driver stopped");
        if let Some(canvas) = visualizer.surface() {
            write_png(&output, canvas)?;
            tracing::info!(?output, "wrote last frame");
        }
        Ok::<(), VisualizerError>(())
    })
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Real-time audio visualizer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Drive a test tone through the visualizer and record every frame.
    Render {
        #[command(flatten)]
        common: CommonArgs,
        /// Number of frames to render.
        #[arg(short, long, default_value_t = 120)]
        frames: usize,
        /// Directory receiving the PNG frames.
        #[arg(short, long, default_value = "frames")]
        output: PathBuf,
    },
    /// Run the frame driver in real time, cycling modes every second.
    Run {
        #[command(flatten)]
        common: CommonArgs,
        /// How long to run for.
        #[arg(short, long, default_value_t = 3.0)]
        seconds: f32,
        /// Path of the PNG file receiving the last frame.
        #[arg(short, long, default_value = "last-frame.png")]
        output: PathBuf,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// JSON options file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Overrides the render mode from the options file.
    #[arg(short, long)]
    mode: Option<String>,
    /// Container width in pixels.
    #[arg(long, default_value_t = 800)]
    width: u32,
    /// Surface height when responsive sizing is disabled.
    #[arg(long, default_value_t = 200)]
    height: u32,
    /// Test tone shape.
    #[arg(long, value_enum, default_value_t = Shape::Sine)]
    shape: Shape,
    /// Test tone frequency in Hz.
    #[arg(long, default_value_t = 440.0)]
    frequency: f32,
    #[arg(long, default_value_t = 48_000.0)]
    sample_rate: f32,
}

impl CommonArgs {
    fn options(&self) -> voice_visualizer_core::Result<VisualizerOptions> {
        let mut options = match &self.config {
            Some(path) => VisualizerOptions::load(path)?,
            None => VisualizerOptions::default(),
        };
        if let Some(mode) = &self.mode {
            options.mode = mode.clone();
        }
        Ok(options)
    }

    fn host(&self) -> HashMap<String, Canvas> {
        let canvas =
            Canvas::new(self.width, self.height).with_container(Container::new(self.width));
        HashMap::from([(SURFACE_ID.to_string(), canvas)])
    }

    fn tone(&self) -> ToneSource {
        let shape = match self.shape {
            Shape::Sine => Waveshape::Sine,
            Shape::Square => Waveshape::Square,
            Shape::Silence => Waveshape::Silence,
        };
        ToneSource::new(shape, self.frequency, self.sample_rate).with_amplitude(0.8)
    }

    /// Samples produced per step at `steps_per_second`.
    fn block_len(&self, steps_per_second: f32) -> usize {
        (self.sample_rate / steps_per_second.max(1.0)).round() as usize
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Shape {
    Sine,
    Square,
    Silence,
}
