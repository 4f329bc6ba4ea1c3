//! `dendroview` — an interactive hierarchical-clustering dendrogram engine.
//!
//! The crate owns the in-memory cluster tree, the threshold/cluster-count
//! inversion, the orientation-aware layout and link geometry, the recursive
//! cluster coloring pass, and the dirty-flag recompute scheduler. Rendering,
//! widgets, and file loading live outside: callers feed parsed JSON documents
//! in and receive [`tree::painter::RenderSnapshot`] frames out.
//!
//! ```
//! use dendroview::session::DendrogramSession;
//! use serde_json::json;
//!
//! let mut session = DendrogramSession::new();
//! session
//!     .load_document(&json!({
//!         "d": 2.0,
//!         "c": [ { "n": "left" }, { "n": "right" } ],
//!     }))
//!     .unwrap();
//! session.refresh();
//!
//! let snapshot = session.snapshot().unwrap();
//! assert_eq!(snapshot.cluster_count, 1);
//! ```

pub mod error;
pub mod session;
pub mod tree;
pub mod zoom;

pub use error::{Error, Result};
pub use session::{DendrogramSession, DirtyFlags, RecomputeReport};
pub use tree::color::{Palette, Rgb};
pub use tree::layout::{LayoutConfig, LinkStyle, Orientation};
pub use tree::painter::RenderSnapshot;
pub use tree::{ClusterNode, ClusterTree, NodeId};
pub use zoom::Transform;
