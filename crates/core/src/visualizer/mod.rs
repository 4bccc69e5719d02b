//! Per-instance visualizer state: one surface, one set of sample buffers
//! and one color policy.

use tracing::{debug, error};

use crate::{
    analysis::AnalyserHandle,
    audio::{AnalysisNode, AudioSource, SampleBuffers},
    color::{ColorPolicy, ColorScheme, Paint},
    config::{VisualOptions, VisualizerConfig},
    render::RenderMode,
    surface::{sizing, Point, Rect, Surface, SurfaceHost},
    Result,
};

/// Lifecycle of a visualizer instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Configured but no frame has run yet.
    Created,
    /// Frames are being produced.
    Running,
    /// Torn down; every operation is a no-op.
    Stopped,
}

struct Stage<S, N> {
    surface: S,
    samples: SampleBuffers<N>,
    colors: ColorPolicy,
}

/// Samples an analysis node and draws it onto a surface once per tick.
///
/// When the target surface cannot be resolved the visualizer is inert:
/// construction succeeds, the failure is logged once, and every later
/// operation does nothing.
pub struct Visualizer<S, N = AnalyserHandle> {
    surface_id: String,
    stage: Option<Stage<S, N>>,
    options: VisualOptions,
    refresh_rate: f32,
    lifecycle: Lifecycle,
    resize_registered: bool,
    frames: u64,
    scratch: Vec<Point>,
}

impl<S: Surface> Visualizer<S, AnalyserHandle> {
    /// Resolves the surface `surface_id` and attaches a new analyser built
    /// from the configured transform parameters.
    pub fn attach<H>(host: &mut H, surface_id: &str, config: &VisualizerConfig) -> Result<Self>
    where
        H: SurfaceHost<S> + ?Sized,
    {
        let node = AnalyserHandle::new(config.analysis);
        Self::with_node(host, surface_id, node, config)
    }
}

impl<S: Surface, N: AnalysisNode> Visualizer<S, N> {
    pub fn with_node<H>(
        host: &mut H,
        surface_id: &str,
        node: N,
        config: &VisualizerConfig,
    ) -> Result<Self>
    where
        H: SurfaceHost<S> + ?Sized,
    {
        let options = config.visual.clone();
        let mut resize_registered = false;

        let stage = match host.resolve(surface_id) {
            Some(mut surface) => {
                if options.responsive {
                    sizing::apply_responsive_size(&mut surface);
                    resize_registered = true;
                }
                let colors = ColorPolicy::build(options.color.clone(), surface.width())?;
                Some(Stage {
                    surface,
                    samples: SampleBuffers::new(node),
                    colors,
                })
            }
            None => {
                error!(surface = surface_id, "surface not found, visualizer is inert");
                None
            }
        };

        Ok(Self {
            surface_id: surface_id.to_string(),
            stage,
            options,
            refresh_rate: config.refresh_rate,
            lifecycle: Lifecycle::Created,
            resize_registered,
            frames: 0,
            scratch: Vec::new(),
        })
    }

    pub fn surface_id(&self) -> &str {
        &self.surface_id
    }

    pub fn is_attached(&self) -> bool {
        self.stage.is_some()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn mode(&self) -> RenderMode {
        self.options.mode
    }

    pub fn options(&self) -> &VisualOptions {
        &self.options
    }

    pub fn refresh_rate(&self) -> f32 {
        self.refresh_rate
    }

    /// Whether container resize notifications are currently honoured.
    pub fn resize_registered(&self) -> bool {
        self.resize_registered
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn surface(&self) -> Option<&S> {
        self.stage.as_ref().map(|stage| &stage.surface)
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.stage.as_mut().map(|stage| &mut stage.surface)
    }

    pub fn colors(&self) -> Option<&ColorPolicy> {
        self.stage.as_ref().map(|stage| &stage.colors)
    }

    pub fn node(&self) -> Option<&N> {
        self.stage.as_ref().map(|stage| stage.samples.node())
    }

    /// Attaches `source` upstream of the analysis node and returns the node.
    pub fn connect<Src>(&self, source: &mut Src) -> Option<N>
    where
        Src: AudioSource<N> + ?Sized,
    {
        let stage = self.stage.as_ref()?;
        Some(stage.samples.connect(source))
    }

    pub fn disconnect(&self) -> Result<()> {
        match &self.stage {
            Some(stage) => stage.samples.disconnect(),
            None => Ok(()),
        }
    }

    /// Selects the mode by name. Unknown names fall back to
    /// [`RenderMode::FALLBACK`]; nothing is rejected.
    pub fn set_mode(&mut self, name: &str) {
        self.set_render_mode(RenderMode::resolve(name));
    }

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        if self.stage.is_none() || self.lifecycle == Lifecycle::Stopped {
            return;
        }
        debug!(%mode, "render mode changed");
        self.options.mode = mode;
    }

    /// Swaps the color scheme, rebuilding the policy against the current
    /// surface width.
    pub fn set_color_scheme(&mut self, scheme: ColorScheme) -> Result<()> {
        if self.lifecycle == Lifecycle::Stopped {
            return Ok(());
        }
        let Some(stage) = self.stage.as_mut() else {
            return Ok(());
        };
        stage.colors.set_scheme(scheme.clone(), stage.surface.width())?;
        self.options.color = scheme;
        Ok(())
    }

    /// Marks the instance as running. Ticking a created instance does the
    /// same.
    pub fn start(&mut self) {
        if self.lifecycle == Lifecycle::Created {
            debug!(surface = %self.surface_id, "visualizer started");
            self.lifecycle = Lifecycle::Running;
        }
    }

    /// Runs one frame: fades the surface with the background color, then
    /// draws the current mode.
    pub fn tick(&mut self) -> Result<()> {
        self.start();
        if self.lifecycle != Lifecycle::Running {
            return Ok(());
        }
        let Some(stage) = self.stage.as_mut() else {
            return Ok(());
        };

        let width = stage.surface.width();
        if stage.colors.needs_rebuild(width) {
            stage.colors.rebuild(width)?;
        }

        let background = Paint::Solid(self.options.background_color.clone());
        let bounds = Rect::new(
            0.0,
            0.0,
            stage.surface.width() as f32,
            stage.surface.height() as f32,
        );
        stage.surface.fill_rect(bounds, &background);

        self.options.mode.render(
            &mut stage.surface,
            &mut stage.samples,
            &stage.colors,
            &self.options,
            &mut self.scratch,
        )?;
        self.frames += 1;
        Ok(())
    }

    /// Recomputes the surface size from its container after a host resize
    /// notification.
    pub fn handle_resize(&mut self) -> Result<()> {
        if !self.resize_registered || self.lifecycle == Lifecycle::Stopped {
            return Ok(());
        }
        let Some(stage) = self.stage.as_mut() else {
            return Ok(());
        };

        if let Some((width, _)) = sizing::apply_responsive_size(&mut stage.surface) {
            if stage.colors.needs_rebuild(width) {
                stage.colors.rebuild(width)?;
            }
        }
        Ok(())
    }

    /// Tears the instance down: stops honouring resize notifications and
    /// disconnects the analysis node. Calling it again is a no-op.
    pub fn stop(&mut self) -> Result<()> {
        if self.lifecycle == Lifecycle::Stopped {
            return Ok(());
        }
        self.lifecycle = Lifecycle::Stopped;
        self.resize_registered = false;
        debug!(surface = %self.surface_id, frames = self.frames, "visualizer stopped");
        self.disconnect()
    }
}

impl<S, N> std::fmt::Debug for Visualizer<S, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Visualizer")
            .field("surface_id", &self.surface_id)
            .field("attached", &self.stage.is_some())
            .field("mode", &self.options.mode)
            .field("lifecycle", &self.lifecycle)
            .field("frames", &self.frames)
            .finish()
    }
}
