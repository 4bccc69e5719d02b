//! Drawing surfaces and their host-side plumbing.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
};

use crate::color::Paint;

mod canvas;
mod recording;
pub mod sizing;

pub use canvas::Canvas;
pub use recording::{DrawCommand, RecordingSurface};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Two dimensional drawing target with mutable pixel dimensions.
///
/// Render modes read `width` and `height` on every frame since the host may
/// resize the surface between ticks.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Sets new pixel dimensions. Existing content may be discarded.
    fn resize(&mut self, width: u32, height: u32);
    /// Content width of the enclosing container, if the surface has one.
    fn container_width(&self) -> Option<u32>;
    /// Fills `rect`, blending over the existing content.
    fn fill_rect(&mut self, rect: Rect, paint: &Paint);
    /// Strokes an open poly-line through `points`.
    fn stroke_path(&mut self, points: &[Point], line_width: f32, paint: &Paint);
    fn fill_circle(&mut self, center: Point, radius: f32, paint: &Paint);
}

/// Shared view of the content width of the element hosting a surface.
#[derive(Debug, Clone, Default)]
pub struct Container {
    width: Arc<AtomicU32>,
}

impl Container {
    pub fn new(width: u32) -> Self {
        Self {
            width: Arc::new(AtomicU32::new(width)),
        }
    }

    pub fn width(&self) -> u32 {
        self.width.load(Ordering::Relaxed)
    }

    pub fn set_width(&self, width: u32) {
        self.width.store(width, Ordering::Relaxed);
    }
}

/// Looks surfaces up by identifier.
pub trait SurfaceHost<S> {
    /// Hands out the surface registered under `id`, if any.
    fn resolve(&mut self, id: &str) -> Option<S>;
}

impl<S> SurfaceHost<S> for HashMap<String, S> {
    fn resolve(&mut self, id: &str) -> Option<S> {
        self.remove(id)
    }
}
