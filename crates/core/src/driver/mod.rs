//! Frame driver: runs a [`Visualizer`] at the display refresh cadence on a
//! tokio task until it is stopped.
//!
//! Ticks never overlap. A tick that overruns its slot causes the missed
//! slots to be skipped rather than queued.

use std::time::Duration;

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, warn};

use crate::{
    audio::AnalysisNode,
    config::DEFAULT_REFRESH_RATE,
    render::RenderMode,
    surface::Surface,
    visualizer::Visualizer,
    Result, VisualizerError,
};

/// Host side of the global resize notification.
#[derive(Debug)]
pub struct ResizeNotifier {
    sender: watch::Sender<u64>,
}

impl ResizeNotifier {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(0);
        Self { sender }
    }

    /// Signals that containers may have changed size.
    pub fn notify(&self) {
        self.sender.send_modify(|generation| *generation += 1);
    }

    pub fn subscribe(&self) -> ResizeEvents {
        ResizeEvents {
            receiver: self.sender.subscribe(),
        }
    }
}

impl Default for ResizeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Subscription to a [`ResizeNotifier`]. Notifications that arrive while a
/// previous one is still pending are coalesced.
#[derive(Debug, Clone)]
pub struct ResizeEvents {
    receiver: watch::Receiver<u64>,
}

impl ResizeEvents {
    /// Waits for the next notification. Returns `false` once the notifier
    /// is gone.
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }
}

#[derive(Debug)]
enum Command {
    SetMode(RenderMode),
    Stop,
}

/// Cancellation handle for a running visualizer.
///
/// Dropping the handle stops the loop as well; use [`DriverHandle::stop`]
/// to wait for teardown and get the visualizer back.
pub struct DriverHandle<S, N> {
    commands: mpsc::UnboundedSender<Command>,
    task: JoinHandle<Visualizer<S, N>>,
}

impl<S, N> DriverHandle<S, N> {
    /// Switches mode by name. The change applies to the next tick.
    pub fn set_mode(&self, name: &str) {
        self.set_render_mode(RenderMode::resolve(name));
    }

    pub fn set_render_mode(&self, mode: RenderMode) {
        if self.commands.send(Command::SetMode(mode)).is_err() {
            debug!(%mode, "frame driver already stopped, mode change ignored");
        }
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stops ticking, tears the visualizer down and returns it.
    pub async fn stop(self) -> Result<Visualizer<S, N>> {
        let _ = self.commands.send(Command::Stop);
        self.task
            .await
            .map_err(|err| VisualizerError::Driver(err.to_string()))
    }
}

impl<S, N> std::fmt::Debug for DriverHandle<S, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverHandle")
            .field("running", &!self.task.is_finished())
            .finish()
    }
}

pub struct FrameDriver;

impl FrameDriver {
    /// Starts ticking `visualizer` immediately on the current tokio runtime.
    ///
    /// `resize` is only listened to when the visualizer is responsive.
    pub fn spawn<S, N>(
        visualizer: Visualizer<S, N>,
        resize: Option<ResizeEvents>,
    ) -> DriverHandle<S, N>
    where
        S: Surface + Send + 'static,
        N: AnalysisNode,
    {
        let (commands, receiver) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(visualizer, receiver, resize));
        DriverHandle { commands, task }
    }
}

/// Interval between ticks for `refresh_rate` ticks per second.
pub fn frame_period(refresh_rate: f32) -> Duration {
    let rate = if refresh_rate.is_finite() && refresh_rate > 0.0 {
        refresh_rate
    } else {
        DEFAULT_REFRESH_RATE
    };
    Duration::from_secs_f64(1.0 / f64::from(rate))
}

async fn run<S, N>(
    mut visualizer: Visualizer<S, N>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    resize: Option<ResizeEvents>,
) -> Visualizer<S, N>
where
    S: Surface,
    N: AnalysisNode,
{
    let mut ticker = time::interval(frame_period(visualizer.refresh_rate()));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut resize = resize.filter(|_| visualizer.resize_registered());

    visualizer.start();
    loop {
        tokio::select! {
            biased;
            command = commands.recv() => match command {
                Some(Command::SetMode(mode)) => visualizer.set_render_mode(mode),
                Some(Command::Stop) | None => break,
            },
            alive = next_resize(&mut resize) => {
                if !alive {
                    resize = None;
                } else if let Err(err) = visualizer.handle_resize() {
                    warn!(%err, "resize failed");
                }
            }
            _ = ticker.tick() => {
                if let Err(err) = visualizer.tick() {
                    warn!(%err, "frame failed");
                }
            }
        }
    }

    if let Err(err) = visualizer.stop() {
        warn!(%err, "teardown failed");
    }
    visualizer
}

async fn next_resize(events: &mut Option<ResizeEvents>) -> bool {
    match events {
        Some(events) => events.changed().await,
        None => std::future::pending().await,
    }
}
