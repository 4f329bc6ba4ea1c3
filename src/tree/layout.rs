//! Orientation-aware dendrogram layout: primary-axis tree placement,
//! distance-scaled secondary axis, and link-path geometry.

use kurbo::{BezPath, Point, Size};

use super::{ClusterTree, NodeId};

/// Window margin reserved around the tree. The thirds/halves of this value
/// used below are a fixed layout convention, not a per-call tunable.
pub const TREE_MARGIN: f64 = 100.0;
pub const NODE_RADIUS: f64 = 2.0;
pub const NUM_SCALE_TICKS: usize = 5;
/// Step count for range controls built from the distance domain.
pub const NUM_RANGE_STEPS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Root at the top, leaves along the bottom.
    #[default]
    Vertical,
    /// Root at the right, leaves along the left.
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkStyle {
    /// Smooth cubic between parent and child.
    #[default]
    Curved,
    /// Right-angle elbow connectors.
    Straight,
}

/// Session-wide layout configuration, mutated in place by UI handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub orientation: Orientation,
    pub link_style: LinkStyle,
    pub viewport: Size,
    pub margin: f64,
    pub node_radius: f64,
    pub show_labels: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::default(),
            link_style: LinkStyle::default(),
            viewport: Size::new(800.0, 600.0),
            margin: TREE_MARGIN,
            node_radius: NODE_RADIUS,
            show_labels: false,
        }
    }
}

/// An exact affine domain-to-range map.
///
/// A degenerate domain (zero width, as with a single-leaf tree or all-equal
/// merge distances) degrades to a constant map at the range start instead of
/// dividing by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn apply(&self, value: f64) -> f64 {
        let span = self.domain.1 - self.domain.0;
        if span.abs() < f64::EPSILON {
            return self.range.0;
        }
        self.range.0 + (value - self.domain.0) / span * (self.range.1 - self.range.0)
    }

    /// Round-stepped tick values covering the domain, d3-style: the step is a
    /// power of ten times 1, 2, or 5, chosen to yield close to `count` ticks.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (start, stop) = if self.domain.0 <= self.domain.1 {
            (self.domain.0, self.domain.1)
        } else {
            (self.domain.1, self.domain.0)
        };
        let span = stop - start;
        if span.abs() < f64::EPSILON || count == 0 {
            return vec![start];
        }

        let raw_step = span / count as f64;
        let magnitude = 10f64.powf(raw_step.log10().floor());
        let residual = raw_step / magnitude;
        let step = magnitude
            * if residual >= 50f64.sqrt() {
                10.0
            } else if residual >= 10f64.sqrt() {
                5.0
            } else if residual >= 2f64.sqrt() {
                2.0
            } else {
                1.0
            };

        let first = (start / step).ceil();
        let last = (stop / step).floor();
        let mut ticks = Vec::new();
        let mut i = first;
        while i <= last {
            ticks.push(i * step);
            i += 1.0;
        }
        ticks
    }
}

/// Computed node geometry: per-node axis coordinates plus their projection
/// into display space. Link paths are derived separately (see
/// [`compute_links`]) so they can be rebuilt from cached positions when only
/// the link style changes.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeLayout {
    /// Display-space position per node id.
    pub positions: Vec<Point>,
    /// Primary-axis coordinate per node id (leaf spread / child mean).
    pub primary: Vec<f64>,
    /// Secondary-axis coordinate per node id (scaled merge distance).
    pub secondary: Vec<f64>,
    pub distance_scale: LinearScale,
    pub inverse_distance_scale: LinearScale,
    pub size: Size,
}

impl TreeLayout {
    /// Runs the positions pass for the given tree and configuration.
    pub fn compute(tree: &ClusterTree, config: &LayoutConfig) -> Self {
        let primary_extent = primary_extent(config);
        let secondary_extent = secondary_extent(config);

        // Collapsed domains fall back to the degenerate constant scale.
        let (d_min, d_max) = tree.distance_domain().unwrap_or((0.0, 0.0));
        let distance_scale = LinearScale::new((d_min, d_max), (0.0, secondary_extent));
        let inverse_distance_scale = LinearScale::new((d_max, d_min), (0.0, secondary_extent));

        let mut primary = vec![0.0; tree.nodes.len()];
        let mut next_leaf = 0usize;
        assign_primary(
            tree,
            tree.root,
            primary_extent,
            &mut primary,
            &mut next_leaf,
        );

        let mut secondary = vec![0.0; tree.nodes.len()];
        for node in &tree.nodes {
            // Leaves and distance-less internals sit at the d_min end.
            let d = node.distance.unwrap_or(d_min);
            secondary[node.id] = match config.orientation {
                Orientation::Vertical => inverse_distance_scale.apply(d),
                Orientation::Horizontal => distance_scale.apply(d),
            };
        }

        let positions = (0..tree.nodes.len())
            .map(|id| project(config, primary[id], secondary[id]))
            .collect();

        Self {
            positions,
            primary,
            secondary,
            distance_scale,
            inverse_distance_scale,
            size: config.viewport,
        }
    }

    /// Display position of the threshold indicator line.
    pub fn threshold_line(&self, config: &LayoutConfig, threshold: f64) -> (Point, Point) {
        let third = config.margin / 3.0;
        let half = config.margin / 2.0;
        match config.orientation {
            Orientation::Vertical => {
                let y = half + self.inverse_distance_scale.apply(threshold);
                (Point::new(third, y), Point::new(self.size.width - third, y))
            }
            Orientation::Horizontal => {
                let x = half + self.distance_scale.apply(threshold);
                (Point::new(x, third), Point::new(x, self.size.height - third))
            }
        }
    }

    /// Endpoints of the distance-scale axis line in display space.
    pub fn scale_axis(&self, config: &LayoutConfig) -> (Point, Point) {
        let (d_min, d_max) = self.distance_scale.domain();
        (
            self.scale_point(config, d_min),
            self.scale_point(config, d_max),
        )
    }

    /// Display position for a tick at the given distance value.
    pub fn scale_point(&self, config: &LayoutConfig, value: f64) -> Point {
        let third = config.margin / 3.0;
        let half = config.margin / 2.0;
        match config.orientation {
            Orientation::Vertical => {
                Point::new(third, half + self.inverse_distance_scale.apply(value))
            }
            Orientation::Horizontal => Point::new(half + self.distance_scale.apply(value), third),
        }
    }
}

/// A link from a parent to one of its children, as drawable path geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkPath {
    pub parent: NodeId,
    pub child: NodeId,
    pub path: BezPath,
}

/// Runs the links pass against already-computed positions.
///
/// Pure in the cached axis coordinates plus the link style; colors and
/// thresholds never feed into it.
pub fn compute_links(
    tree: &ClusterTree,
    layout: &TreeLayout,
    config: &LayoutConfig,
) -> Vec<LinkPath> {
    let mut links = Vec::with_capacity(tree.nodes.len().saturating_sub(1));
    for node in &tree.nodes {
        for &child in &node.children {
            links.push(LinkPath {
                parent: node.id,
                child,
                path: link_path(layout, config, node.id, child),
            });
        }
    }
    links
}

fn link_path(layout: &TreeLayout, config: &LayoutConfig, parent: NodeId, child: NodeId) -> BezPath {
    let (p0, s0) = (layout.primary[parent], layout.secondary[parent]);
    let (p1, s1) = (layout.primary[child], layout.secondary[child]);

    let mut path = BezPath::new();
    path.move_to(project(config, p0, s0));
    match config.link_style {
        LinkStyle::Straight => {
            // Elbow: across to the child's primary coordinate, then down.
            path.line_to(project(config, p1, s0));
            path.line_to(project(config, p1, s1));
        }
        LinkStyle::Curved => {
            // Diagonal cubic with control points at the secondary midpoint.
            let mid = (s0 + s1) / 2.0;
            path.curve_to(
                project(config, p0, mid),
                project(config, p1, mid),
                project(config, p1, s1),
            );
        }
    }
    path
}

/// Maps (primary, secondary) axis coordinates into display space, applying
/// the fixed margin fractions: two thirds ahead of the primary axis, one half
/// ahead of the secondary.
fn project(config: &LayoutConfig, primary: f64, secondary: f64) -> Point {
    let two_thirds = config.margin * 2.0 / 3.0;
    let half = config.margin / 2.0;
    match config.orientation {
        Orientation::Vertical => Point::new(two_thirds + primary, half + secondary),
        Orientation::Horizontal => Point::new(half + secondary, two_thirds + primary),
    }
}

fn primary_extent(config: &LayoutConfig) -> f64 {
    let total = match config.orientation {
        Orientation::Vertical => config.viewport.width,
        Orientation::Horizontal => config.viewport.height,
    };
    (total - config.margin).max(0.0)
}

fn secondary_extent(config: &LayoutConfig) -> f64 {
    let total = match config.orientation {
        Orientation::Vertical => config.viewport.height,
        Orientation::Horizontal => config.viewport.width,
    };
    (total - config.margin).max(0.0)
}

/// Spreads leaves evenly along the primary axis in traversal order and puts
/// each internal node at the mean of its children. Returns the node's
/// primary coordinate.
fn assign_primary(
    tree: &ClusterTree,
    node_id: NodeId,
    extent: f64,
    primary: &mut [f64],
    next_leaf: &mut usize,
) -> f64 {
    let node = &tree.nodes[node_id];
    let value = if node.is_leaf() {
        let leaf_count = tree.num_leaves();
        let value = if leaf_count > 1 {
            *next_leaf as f64 * extent / (leaf_count - 1) as f64
        } else {
            extent / 2.0
        };
        *next_leaf += 1;
        value
    } else {
        let sum: f64 = node
            .children
            .iter()
            .map(|&child| assign_primary(tree, child, extent, primary, next_leaf))
            .sum();
        sum / node.children.len() as f64
    };

    primary[node_id] = value;
    value
}
