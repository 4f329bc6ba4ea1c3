//! The dendrogram session: one explicit object holding the loaded tree, the
//! layout configuration, the dirty flags, and the cached recompute passes.
//! UI handlers mutate it; [`DendrogramSession::refresh`] runs the minimal set
//! of passes in dependency order.

use kurbo::Size;
use serde_json::Value;

use crate::error::Result;
use crate::tree::color::{assign_colors, Palette, Rgb, DEFAULT_STROKE};
use crate::tree::layout::{
    compute_links, LayoutConfig, LinkPath, LinkStyle, Orientation, TreeLayout, NUM_RANGE_STEPS,
};
use crate::tree::painter::{build_snapshot, RenderSnapshot};
use crate::tree::threshold::{
    clusters_at_threshold, threshold_for_cluster_count, validate_threshold,
};
use crate::tree::ClusterTree;
use crate::zoom::{clamp_transform, Transform};

/// Invalidation state for the three recompute passes. All true after a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirtyFlags {
    pub positions: bool,
    pub links: bool,
    pub colors: bool,
}

impl DirtyFlags {
    fn all() -> Self {
        Self {
            positions: true,
            links: true,
            colors: true,
        }
    }

    pub fn any(&self) -> bool {
        self.positions || self.links || self.colors
    }
}

/// Which passes a [`DendrogramSession::refresh`] actually ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecomputeReport {
    pub positions: bool,
    pub links: bool,
    pub colors: bool,
}

/// Process-wide dendrogram state. Single-threaded by design: every handler
/// and the refresh that follows it run synchronously to completion.
#[derive(Debug, Clone)]
pub struct DendrogramSession {
    tree: Option<ClusterTree>,
    config: LayoutConfig,
    palette: Palette,
    grayscale: bool,
    threshold: f64,
    cluster_count: usize,
    zoom_enabled: bool,
    transform: Transform,
    dirty: DirtyFlags,
    layout: Option<TreeLayout>,
    links: Vec<LinkPath>,
    colors: Vec<Rgb>,
}

impl Default for DendrogramSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DendrogramSession {
    pub fn new() -> Self {
        Self {
            tree: None,
            config: LayoutConfig::default(),
            palette: Palette::default(),
            grayscale: false,
            threshold: 0.0,
            cluster_count: 0,
            zoom_enabled: true,
            transform: Transform::default(),
            dirty: DirtyFlags::default(),
            layout: None,
            links: Vec::new(),
            colors: Vec::new(),
        }
    }

    /// Replaces the session tree with a freshly normalized document.
    ///
    /// Atomic from the engine's perspective: normalization happens first, and
    /// a structural failure leaves the previous tree, caches, and flags
    /// untouched. On success the threshold resets to `d_max`, the zoom
    /// transform resets, and every pass is marked dirty.
    pub fn load_document(&mut self, doc: &Value) -> Result<()> {
        let tree = ClusterTree::from_document(doc)?;

        log::info!(
            "loaded tree: {} leaves, dissimilarity domain {:?}",
            tree.num_leaves(),
            tree.distance_domain()
        );

        self.threshold = tree.distance_domain().map_or(0.0, |(_, max)| max);
        self.tree = Some(tree);
        self.layout = None;
        self.links.clear();
        self.colors.clear();
        self.transform = Transform::default();
        self.dirty = DirtyFlags::all();
        Ok(())
    }

    // --- control handlers -------------------------------------------------

    pub fn set_orientation(&mut self, orientation: Orientation) {
        if self.config.orientation != orientation {
            self.config.orientation = orientation;
            self.dirty = DirtyFlags::all();
        }
    }

    pub fn set_link_style(&mut self, style: LinkStyle) {
        if self.config.link_style != style {
            self.config.link_style = style;
            self.dirty.links = true;
        }
    }

    /// Resize invalidates geometry but never colors.
    pub fn set_viewport(&mut self, viewport: Size) {
        if self.config.viewport != viewport {
            self.config.viewport = viewport;
            self.dirty.positions = true;
            self.dirty.links = true;
        }
    }

    /// Sets the dissimilarity threshold, clamped into the distance domain.
    pub fn set_threshold(&mut self, value: f64) {
        let Some(tree) = &self.tree else { return };
        let value = match validate_threshold(tree, value) {
            Ok(value) => value,
            Err(err) => {
                let (min, max) = tree.distance_domain().unwrap_or((0.0, 0.0));
                let clamped = if value.is_finite() {
                    value.clamp(min, max)
                } else {
                    max
                };
                log::debug!("{err}; clamping to {clamped}");
                clamped
            }
        };
        if value != self.threshold {
            self.threshold = value;
            self.dirty.colors = true;
        }
    }

    /// Sets the threshold indirectly from a target cluster count.
    pub fn set_cluster_count(&mut self, k: usize) {
        let Some(tree) = &self.tree else { return };
        let threshold = threshold_for_cluster_count(tree, k);
        if threshold != self.threshold {
            self.threshold = threshold;
            self.dirty.colors = true;
        }
    }

    pub fn set_palette(&mut self, palette: Palette) {
        if self.palette != palette {
            self.palette = palette;
            self.dirty.colors = true;
        }
    }

    pub fn set_grayscale(&mut self, grayscale: bool) {
        if self.grayscale != grayscale {
            self.grayscale = grayscale;
            self.dirty.colors = true;
        }
    }

    /// Label visibility affects snapshot assembly only; no pass reruns.
    pub fn set_show_labels(&mut self, show: bool) {
        self.config.show_labels = show;
    }

    pub fn set_zoom_enabled(&mut self, enabled: bool) {
        self.zoom_enabled = enabled;
    }

    /// Applies a raw zoom/pan gesture. When zoom is disabled the gesture is
    /// dropped and the prior transform retained.
    pub fn apply_zoom(&mut self, scale: f64, translate: (f64, f64)) -> Transform {
        if self.zoom_enabled {
            let num_leaves = self.tree.as_ref().map_or(1, ClusterTree::num_leaves);
            self.transform =
                clamp_transform(scale, translate, self.config.viewport, num_leaves);
        }
        self.transform
    }

    pub fn reset_zoom(&mut self) {
        self.transform = Transform::default();
    }

    // --- recompute scheduler ----------------------------------------------

    /// Runs the dirty passes in dependency order and reports which ran.
    ///
    /// Positions force a link rebuild (link geometry is a function of node
    /// positions), links never run on stale positions, and colors are
    /// independent of both. The published cluster count is re-derived on
    /// every call.
    pub fn refresh(&mut self) -> RecomputeReport {
        let mut report = RecomputeReport::default();
        let Some(tree) = &self.tree else {
            self.dirty = DirtyFlags::default();
            return report;
        };

        if self.dirty.positions {
            self.layout = Some(TreeLayout::compute(tree, &self.config));
            self.dirty.positions = false;
            self.dirty.links = true;
            report.positions = true;
        }

        if self.dirty.links {
            if let Some(layout) = &self.layout {
                self.links = compute_links(tree, layout, &self.config);
                report.links = true;
            }
            self.dirty.links = false;
        }

        if self.dirty.colors {
            let count = clusters_at_threshold(tree, self.threshold);
            let palette = self.palette.colors(count);
            self.colors = assign_colors(tree, self.threshold, &palette, DEFAULT_STROKE);
            self.dirty.colors = false;
            report.colors = true;
        }

        self.cluster_count = clusters_at_threshold(tree, self.threshold);
        report
    }

    /// Assembles the current caches into a renderer snapshot. Returns `None`
    /// until a tree is loaded and [`refresh`](Self::refresh) has run.
    pub fn snapshot(&self) -> Option<RenderSnapshot> {
        let tree = self.tree.as_ref()?;
        let layout = self.layout.as_ref()?;
        if self.colors.len() != tree.nodes.len() {
            return None;
        }
        Some(build_snapshot(
            tree,
            layout,
            &self.links,
            &self.colors,
            &self.config,
            self.threshold,
            self.cluster_count,
            self.grayscale,
        ))
    }

    // --- control-facing getters -------------------------------------------

    pub fn tree(&self) -> Option<&ClusterTree> {
        self.tree.as_ref()
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn dirty(&self) -> DirtyFlags {
        self.dirty
    }

    pub fn distance_domain(&self) -> Option<(f64, f64)> {
        self.tree.as_ref().and_then(ClusterTree::distance_domain)
    }

    /// Slider step for threshold range controls.
    pub fn threshold_step(&self) -> f64 {
        self.distance_domain()
            .map_or(0.0, |(min, max)| (max - min) / NUM_RANGE_STEPS as f64)
    }

    /// Valid bounds for cluster-count range controls.
    pub fn cluster_count_bounds(&self) -> (usize, usize) {
        (1, self.tree.as_ref().map_or(1, ClusterTree::num_leaves))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn loaded_session() -> DendrogramSession {
        let mut session = DendrogramSession::new();
        let doc = json!({
            "d": 3.0,
            "c": [
                { "d": 1.0, "c": [ { "n": "A" }, { "n": "B" } ] },
                { "d": 2.0, "c": [ { "n": "C" }, { "n": "D" } ] },
            ],
        });
        session.load_document(&doc).expect("valid document");
        session
    }

    #[test]
    fn load_marks_everything_dirty_and_resets_threshold() {
        let session = loaded_session();
        assert_eq!(session.dirty(), DirtyFlags::all());
        assert_eq!(session.threshold(), 3.0);
        assert_eq!(session.cluster_count_bounds(), (1, 4));
    }

    #[test]
    fn first_refresh_runs_all_passes() {
        let mut session = loaded_session();
        let report = session.refresh();
        assert_eq!(
            report,
            RecomputeReport {
                positions: true,
                links: true,
                colors: true
            }
        );
        assert_eq!(session.cluster_count(), 1); // threshold at d_max
        assert!(session.snapshot().is_some());
    }

    #[test]
    fn refresh_is_idempotent_when_clean() {
        let mut session = loaded_session();
        session.refresh();
        let before = session.snapshot().unwrap();

        let report = session.refresh();
        assert_eq!(report, RecomputeReport::default());
        assert_eq!(session.snapshot().unwrap(), before);
    }

    #[test]
    fn position_invalidation_forces_link_rebuild() {
        let mut session = loaded_session();
        session.refresh();

        session.set_viewport(Size::new(1200.0, 900.0));
        assert!(session.dirty().positions);

        let report = session.refresh();
        assert!(report.positions);
        assert!(report.links, "links must never survive a position change");
        assert!(!report.colors);
    }

    #[test]
    fn resize_leaves_colors_untouched() {
        let mut session = loaded_session();
        session.set_threshold(1.5);
        session.refresh();
        let before: Vec<_> = session.snapshot().unwrap().nodes;

        session.set_viewport(Size::new(640.0, 480.0));
        session.refresh();
        let after = session.snapshot().unwrap().nodes;

        for (a, b) in before.iter().zip(&after) {
            assert_eq!(a.color, b.color);
        }
    }

    #[test]
    fn link_style_change_reuses_positions() {
        let mut session = loaded_session();
        session.refresh();
        let before = session.snapshot().unwrap();

        session.set_link_style(LinkStyle::Straight);
        let report = session.refresh();
        assert_eq!(
            report,
            RecomputeReport {
                positions: false,
                links: true,
                colors: false
            }
        );

        let after = session.snapshot().unwrap();
        let positions_before: Vec<_> = before.nodes.iter().map(|n| n.position).collect();
        let positions_after: Vec<_> = after.nodes.iter().map(|n| n.position).collect();
        assert_eq!(positions_before, positions_after);
        assert_ne!(before.links[0].path.elements(), after.links[0].path.elements());
    }

    #[test]
    fn cluster_count_handler_round_trips() {
        let mut session = loaded_session();
        session.set_cluster_count(3);
        session.refresh();
        assert_eq!(session.cluster_count(), 3);
        assert!((session.threshold() - 0.999).abs() < 1e-12);
    }

    #[test]
    fn out_of_domain_threshold_clamps() {
        let mut session = loaded_session();
        session.set_threshold(99.0);
        session.refresh();
        assert_eq!(session.threshold(), 3.0);
        session.set_threshold(-5.0);
        session.refresh();
        assert_eq!(session.threshold(), 1.0);
        assert_eq!(session.cluster_count(), 3); // A,B merged; C; D
    }

    #[test]
    fn failed_load_keeps_previous_tree() {
        let mut session = loaded_session();
        session.refresh();
        let before = session.snapshot().unwrap();

        let bad = json!({ "d": 1.0, "c": "not-a-sequence" });
        assert!(session.load_document(&bad).is_err());

        assert_eq!(session.snapshot().unwrap(), before);
        assert_eq!(session.cluster_count_bounds(), (1, 4));
        assert!(!session.dirty().any());
    }

    #[test]
    fn zoom_gate_retains_prior_transform() {
        let mut session = loaded_session();
        let applied = session.apply_zoom(1.5, (-50.0, -20.0));
        assert_eq!(applied.scale, 1.5);

        session.set_zoom_enabled(false);
        let retained = session.apply_zoom(3.0, (-500.0, -500.0));
        assert_eq!(retained, applied);

        session.reset_zoom();
        assert_eq!(session.transform(), Transform::default());
    }

    #[test]
    fn orientation_change_invalidates_all_passes() {
        let mut session = loaded_session();
        session.refresh();
        session.set_orientation(Orientation::Horizontal);
        assert_eq!(session.dirty(), DirtyFlags::all());
        let report = session.refresh();
        assert!(report.positions && report.links && report.colors);
    }

    #[test]
    fn refresh_without_tree_is_a_no_op() {
        let mut session = DendrogramSession::new();
        assert_eq!(session.refresh(), RecomputeReport::default());
        assert!(session.snapshot().is_none());
    }
}
