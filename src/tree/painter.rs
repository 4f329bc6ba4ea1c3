//! Assembles the engine's outputs into a renderer-facing snapshot: node
//! positions and colors, link path geometry with strokes, the distance-scale
//! legend, and the threshold indicator line.

use kurbo::{BezPath, Point, Size};

use super::color::Rgb;
use super::layout::{LayoutConfig, LinkPath, TreeLayout, NUM_SCALE_TICKS};
use super::{ClusterTree, NodeId};

#[derive(Debug, Clone, PartialEq)]
pub struct NodeVisual {
    pub id: NodeId,
    pub position: Point,
    pub color: Rgb,
    pub radius: f64,
    /// Label text, present only when labels are enabled and the node has one.
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkVisual {
    pub parent: NodeId,
    pub child: NodeId,
    pub path: BezPath,
    pub stroke: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScaleTick {
    pub value: f64,
    pub position: Point,
    pub label: String,
}

/// One complete frame of geometry and color, handed to the rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSnapshot {
    pub nodes: Vec<NodeVisual>,
    pub links: Vec<LinkVisual>,
    pub scale_axis: (Point, Point),
    pub ticks: Vec<ScaleTick>,
    pub threshold_line: (Point, Point),
    pub cluster_count: usize,
    pub distance_domain: (f64, f64),
    pub size: Size,
}

/// Builds a snapshot from the cached passes. Pure assembly: no layout or
/// color recomputation happens here, and grayscale is applied as a derived
/// view without touching the stored colors.
#[allow(clippy::too_many_arguments)]
pub fn build_snapshot(
    tree: &ClusterTree,
    layout: &TreeLayout,
    links: &[LinkPath],
    colors: &[Rgb],
    config: &LayoutConfig,
    threshold: f64,
    cluster_count: usize,
    grayscale: bool,
) -> RenderSnapshot {
    let view = |color: Rgb| if grayscale { color.grayscale() } else { color };

    let nodes = tree
        .nodes
        .iter()
        .map(|node| NodeVisual {
            id: node.id,
            position: layout.positions[node.id],
            color: view(colors[node.id]),
            radius: config.node_radius,
            label: if config.show_labels {
                node.name.clone()
            } else {
                None
            },
        })
        .collect();

    // Links take the child end's color, so each cluster's subtree reads as
    // one colored component.
    let links = links
        .iter()
        .map(|link| LinkVisual {
            parent: link.parent,
            child: link.child,
            path: link.path.clone(),
            stroke: view(colors[link.child]),
        })
        .collect();

    let ticks = layout
        .distance_scale
        .ticks(NUM_SCALE_TICKS)
        .into_iter()
        .map(|value| ScaleTick {
            value,
            position: layout.scale_point(config, value),
            label: format_tick(value),
        })
        .collect();

    RenderSnapshot {
        nodes,
        links,
        scale_axis: layout.scale_axis(config),
        ticks,
        threshold_line: layout.threshold_line(config, threshold),
        cluster_count,
        distance_domain: layout.distance_scale.domain(),
        size: layout.size,
    }
}

fn format_tick(value: f64) -> String {
    if value == value.trunc() {
        format!("{value:.0}")
    } else {
        let text = format!("{value}");
        if text.len() > 6 {
            format!("{value:.3}")
        } else {
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::color::{assign_colors, Palette, DEFAULT_STROKE};
    use crate::tree::layout::compute_links;
    use crate::tree::tests::four_leaf_tree;
    use crate::tree::threshold::clusters_at_threshold;

    fn snapshot(grayscale: bool, show_labels: bool) -> RenderSnapshot {
        let tree = four_leaf_tree();
        let config = LayoutConfig {
            show_labels,
            ..LayoutConfig::default()
        };
        let layout = TreeLayout::compute(&tree, &config);
        let links = compute_links(&tree, &layout, &config);
        let threshold = 1.5;
        let count = clusters_at_threshold(&tree, threshold);
        let palette = Palette::BrewerPaired.colors(count);
        let colors = assign_colors(&tree, threshold, &palette, DEFAULT_STROKE);
        build_snapshot(
            &tree, &layout, &links, &colors, &config, threshold, count, grayscale,
        )
    }

    #[test]
    fn snapshot_carries_full_scene() {
        let snap = snapshot(false, false);
        assert_eq!(snap.nodes.len(), 7);
        assert_eq!(snap.links.len(), 6);
        assert_eq!(snap.cluster_count, 3);
        assert_eq!(snap.distance_domain, (1.0, 3.0));
        assert!(!snap.ticks.is_empty());
    }

    #[test]
    fn link_stroke_follows_child_color() {
        let snap = snapshot(false, false);
        for link in &snap.links {
            let child = snap.nodes.iter().find(|n| n.id == link.child).unwrap();
            assert_eq!(link.stroke, child.color);
        }
    }

    #[test]
    fn grayscale_is_a_derived_view() {
        let color = snapshot(false, false);
        let gray = snapshot(true, false);
        for (c, g) in color.nodes.iter().zip(&gray.nodes) {
            assert_eq!(c.color.grayscale(), g.color);
            assert_eq!(g.color.r, g.color.g);
            assert_eq!(g.color.g, g.color.b);
        }
    }

    #[test]
    fn labels_follow_visibility_flag() {
        let hidden = snapshot(false, false);
        assert!(hidden.nodes.iter().all(|n| n.label.is_none()));

        let shown = snapshot(false, true);
        let labeled: Vec<_> = shown.nodes.iter().filter_map(|n| n.label.clone()).collect();
        assert_eq!(labeled, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn tick_labels_are_compact() {
        assert_eq!(format_tick(2.0), "2");
        assert_eq!(format_tick(1.5), "1.5");
        assert_eq!(format_tick(1.0 / 3.0), "0.333");
    }
}
