//! Cluster color propagation: palettes, the recursive below-threshold
//! coloring pass, and the grayscale view transform.

use super::{ClusterTree, NodeId};

/// Default stroke color for links and nodes above the threshold.
pub const DEFAULT_STROKE: Rgb = Rgb::new(0xbb, 0xbb, 0xbb);

/// An RGB color stored as the canonical hex triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `"rrggbb"` or `"#rrggbb"`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 {
            return None;
        }
        let value = u32::from_str_radix(hex, 16).ok()?;
        Some(Self::new(
            (value >> 16) as u8,
            (value >> 8) as u8,
            value as u8,
        ))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Luminance-weighted grayscale, replicated to all channels.
    pub fn grayscale(self) -> Self {
        let luminance =
            0.2126 * f64::from(self.r) + 0.7152 * f64::from(self.g) + 0.0722 * f64::from(self.b);
        let v = luminance.round().clamp(0.0, 255.0) as u8;
        Self::new(v, v, v)
    }
}

/// Built-in cluster palettes, assigned to clusters in traversal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Palette {
    #[default]
    TolQualitative,
    BrewerSet3,
    BrewerPaired,
    BrewerAccent,
    BrewerPastel1,
    /// Evenly spaced HSV hues.
    Rainbow,
}

const TOL_QUALITATIVE: &[&str] = &[
    "4477aa", "ee6677", "228833", "ccbb44", "66ccee", "aa3377", "bbbbbb",
];
const BREWER_SET3: &[&str] = &[
    "8dd3c7", "ffffb3", "bebada", "fb8072", "80b1d3", "fdb462", "b3de69", "fccde5", "d9d9d9",
    "bc80bd", "ccebc5", "ffed6f",
];
const BREWER_PAIRED: &[&str] = &[
    "a6cee3", "1f78b4", "b2df8a", "33a02c", "fb9a99", "e31a1c", "fdbf6f", "ff7f00", "cab2d6",
    "6a3d9a", "ffff99", "b15928",
];
const BREWER_ACCENT: &[&str] = &[
    "7fc97f", "beaed4", "fdc086", "ffff99", "386cb0", "f0027f", "bf5b17", "666666",
];
const BREWER_PASTEL1: &[&str] = &[
    "fbb4ae", "b3cde3", "ccebc5", "decbe4", "fed9a6", "ffffcc", "e5d8bd", "fddaec", "f2f2f2",
];

impl Palette {
    /// Yields `n` colors, cycling the base sequence when `n` exceeds it and
    /// reversed so the strongest hues land on the deepest clusters.
    pub fn colors(self, n: usize) -> Vec<Rgb> {
        let n = n.max(1);
        let mut colors: Vec<Rgb> = match self {
            Palette::Rainbow => (0..n)
                .map(|i| hsv_to_rgb(i as f64 / n as f64 * 360.0, 1.0, 0.9))
                .collect(),
            _ => {
                let base: Vec<Rgb> = self
                    .base_hex()
                    .iter()
                    .map(|hex| Rgb::from_hex(hex).unwrap_or(DEFAULT_STROKE))
                    .collect();
                (0..n).map(|i| base[i % base.len()]).collect()
            }
        };
        colors.reverse();
        colors
    }

    fn base_hex(self) -> &'static [&'static str] {
        match self {
            Palette::TolQualitative => TOL_QUALITATIVE,
            Palette::BrewerSet3 => BREWER_SET3,
            Palette::BrewerPaired => BREWER_PAIRED,
            Palette::BrewerAccent => BREWER_ACCENT,
            Palette::BrewerPastel1 => BREWER_PASTEL1,
            Palette::Rainbow => TOL_QUALITATIVE,
        }
    }
}

fn hsv_to_rgb(h: f64, s: f64, v: f64) -> Rgb {
    let c = v * s;
    let hp = (h % 360.0) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = v - c;
    Rgb::new(
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
    )
}

/// Assigns a color to every node, returning a NodeId-indexed table.
///
/// Pre-order walk with a running palette index: the first node on a branch
/// whose merge distance falls at or below the threshold (or which is a leaf)
/// claims the next palette color for its entire subtree; everything above
/// inherits `default`. The number of distinct palette colors consumed equals
/// `clusters_at_threshold(tree, threshold)` exactly. A short palette wraps
/// its index rather than panicking; an empty one paints everything `default`.
pub fn assign_colors(
    tree: &ClusterTree,
    threshold: f64,
    palette: &[Rgb],
    default: Rgb,
) -> Vec<Rgb> {
    let mut colors = vec![default; tree.nodes.len()];
    let mut next_color = 0usize;
    paint(
        tree,
        tree.root,
        threshold,
        palette,
        default,
        true,
        &mut colors,
        &mut next_color,
    );
    colors
}

#[allow(clippy::too_many_arguments)]
fn paint(
    tree: &ClusterTree,
    node_id: NodeId,
    threshold: f64,
    palette: &[Rgb],
    inherited: Rgb,
    armed: bool,
    colors: &mut [Rgb],
    next_color: &mut usize,
) {
    let node = &tree.nodes[node_id];

    let triggers = armed && (node.is_leaf() || node.distance.is_some_and(|d| d <= threshold));
    let (color, armed) = if triggers && !palette.is_empty() {
        let color = palette[*next_color % palette.len()];
        *next_color += 1;
        (color, false)
    } else if triggers {
        (inherited, false)
    } else {
        (inherited, armed)
    };

    colors[node_id] = color;
    for &child in &node.children {
        paint(
            tree, child, threshold, palette, color, armed, colors, next_color,
        );
    }
}
