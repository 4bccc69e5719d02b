//! Responsive sizing of a surface from its container.

use tracing::debug;

use super::Surface;

/// Upper bound on the height of a responsive surface.
pub const MAX_RESPONSIVE_HEIGHT: u32 = 200;

/// Pixel dimensions for a container `container_width` pixels wide: the full
/// width and a quarter of it as height, capped at [`MAX_RESPONSIVE_HEIGHT`].
pub fn responsive_size(container_width: u32) -> (u32, u32) {
    (
        container_width,
        MAX_RESPONSIVE_HEIGHT.min(container_width / 4),
    )
}

/// Resizes `surface` to fit its container. Returns the new size, or `None`
/// when the surface has no container.
pub fn apply_responsive_size<S: Surface + ?Sized>(surface: &mut S) -> Option<(u32, u32)> {
    let container_width = surface.container_width()?;
    let (width, height) = responsive_size(container_width);
    if (width, height) != (surface.width(), surface.height()) {
        debug!(width, height, "resizing surface to container");
        surface.resize(width, height);
    }
    Some((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Container, RecordingSurface};

    #[test]
    fn computes_width_and_capped_height() {
        assert_eq!(responsive_size(0), (0, 0));
        assert_eq!(responsive_size(400), (400, 100));
        assert_eq!(responsive_size(4000), (4000, 200));
        assert_eq!(responsive_size(802), (802, 200));
        assert_eq!(responsive_size(799), (799, 199));
    }

    #[test]
    fn applies_container_width() {
        let container = Container::new(400);
        let mut surface = RecordingSurface::new(10, 10).with_container(container.clone());

        assert_eq!(apply_responsive_size(&mut surface), Some((400, 100)));
        assert_eq!((surface.width(), surface.height()), (400, 100));

        container.set_width(4000);
        apply_responsive_size(&mut surface);
        assert_eq!((surface.width(), surface.height()), (4000, 200));
    }

    #[test]
    fn leaves_uncontained_surfaces_alone() {
        let mut surface = RecordingSurface::new(300, 150);
        assert_eq!(apply_responsive_size(&mut surface), None);
        assert_eq!((surface.width(), surface.height()), (300, 150));
    }
}
