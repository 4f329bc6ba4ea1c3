use thiserror::Error;

/// Result alias for `dendroview`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the dendrogram engine.
///
/// The structural variants (`MalformedTree`, `CyclicTree`) are fatal to the
/// load that produced them; the session keeps the previously loaded tree when
/// one occurs. The range variants are recovered locally by clamping and never
/// surface through the event-handler API.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A node's child list was present but not an ordered sequence, or a node
    /// was not an object shape at all.
    #[error("malformed tree document at {path}: {reason}")]
    MalformedTree { path: String, reason: String },

    /// The normalization walk exceeded the depth guard, which only happens
    /// when the input links back into itself (or is absurdly deep).
    #[error("tree exceeds maximum depth {max_depth}; document appears cyclic")]
    CyclicTree { max_depth: usize },

    /// A dissimilarity threshold outside the tree's distance domain.
    #[error("threshold {value} outside distance domain [{min}, {max}]")]
    InvalidThreshold { value: f64, min: f64, max: f64 },

    /// A requested cluster count outside `[1, num_leaves]`.
    #[error("cluster count {requested} outside valid range [1, {num_leaves}]")]
    InvalidClusterCount { requested: usize, num_leaves: usize },
}
