//! Zoom/pan gesture clamping. Pure functions: the session decides whether a
//! gesture applies at all, this module only bounds it.

use kurbo::Size;

/// Minimum zoom scale.
pub const MIN_ZOOM: f64 = 1.0;
/// Divisor turning the leaf count into the maximum zoom scale; bushier trees
/// permit deeper zoom.
pub const MAX_ZOOM_FACTOR: f64 = 20.0;

/// A clamped translate/scale pair, applied by the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub dx: f64,
    pub dy: f64,
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            dx: 0.0,
            dy: 0.0,
            scale: 1.0,
        }
    }
}

/// The allowable scale range for a tree with the given leaf count:
/// `[MIN_ZOOM, max(MIN_ZOOM + 1, num_leaves / MAX_ZOOM_FACTOR)]`.
pub fn scale_extent(num_leaves: usize) -> (f64, f64) {
    let max = (MIN_ZOOM + 1.0).max(num_leaves as f64 / MAX_ZOOM_FACTOR);
    (MIN_ZOOM, max)
}

/// Clamps a raw gesture so the content can never be panned fully out of view
/// at the resulting scale. Each translate axis is bounded to
/// `[min((1 - scale) * extent, 0), 0]`.
pub fn clamp_transform(
    scale: f64,
    translate: (f64, f64),
    viewport: Size,
    num_leaves: usize,
) -> Transform {
    let (min_scale, max_scale) = scale_extent(num_leaves);
    let scale = scale.clamp(min_scale, max_scale);

    let clamp_axis = |t: f64, extent: f64| {
        let low = ((1.0 - scale) * extent).min(0.0);
        t.clamp(low, 0.0)
    };

    Transform {
        dx: clamp_axis(translate.0, viewport.width),
        dy: clamp_axis(translate.1, viewport.height),
        scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Size = Size::new(800.0, 600.0);

    #[test]
    fn scale_extent_grows_with_leaf_count() {
        assert_eq!(scale_extent(4), (1.0, 2.0));
        assert_eq!(scale_extent(40), (1.0, 2.0));
        assert_eq!(scale_extent(100), (1.0, 5.0));
        assert_eq!(scale_extent(1000), (1.0, 50.0));
    }

    #[test]
    fn translate_clamps_to_keep_content_visible() {
        let t = clamp_transform(2.0, (-10_000.0, 500.0), VIEWPORT, 100);
        assert_eq!(t.scale, 2.0);
        assert_eq!(t.dx, (1.0 - 2.0) * VIEWPORT.width); // fully panned left
        assert_eq!(t.dy, 0.0); // positive pan clamps to origin
    }

    #[test]
    fn in_range_gestures_pass_through() {
        let t = clamp_transform(1.5, (-100.0, -50.0), VIEWPORT, 100);
        assert_eq!(t, Transform { dx: -100.0, dy: -50.0, scale: 1.5 });
    }

    #[test]
    fn scale_clamps_to_extent() {
        let t = clamp_transform(99.0, (0.0, 0.0), VIEWPORT, 40);
        assert_eq!(t.scale, 2.0);
        let t = clamp_transform(0.1, (0.0, 0.0), VIEWPORT, 40);
        assert_eq!(t.scale, 1.0);
    }

    #[test]
    fn identity_at_unit_scale() {
        let t = clamp_transform(1.0, (-5.0, -5.0), VIEWPORT, 4);
        // At scale 1 the pan bounds collapse to zero.
        assert_eq!(t, Transform::default());
    }
}
