// crates/tessera-core/src/lib.rs
pub mod config;
pub mod layout_units;
pub mod style;

pub use config::*;
pub use layout_units::*;
pub use style::*;

#[derive(Debug, thiserror::Error)]
pub enum TesseraError {
    #[error("Child already has an owner, it must be removed first")]
    ChildAlreadyHasOwner,

    #[error("Cannot add child: the child is an ancestor of the parent")]
    ChildIsAncestor,

    #[error("Cannot add child: nodes with measure functions cannot have children")]
    MeasureFuncHasChildren,

    #[error("Cannot set measure function: nodes with measure functions cannot have children")]
    ChildrenPreventMeasureFunc,

    #[error("Only leaf nodes with custom measure functions should manually mark themselves as dirty")]
    MarkDirtyWithoutMeasureFunc,

    #[error("UseWebDefaults may not be changed after a layout pass")]
    UseWebDefaultsAfterLayout,

    #[error("Cannot swap to a config with a different UseWebDefaults setting")]
    UseWebDefaultsMismatch,

    #[error("Point scale factor must be >= 0, got {0}")]
    InvalidPointScaleFactor(f32),

    #[error("Unknown {kind} keyword: {value}")]
    UnknownKeyword { kind: &'static str, value: String },

    #[error("Cannot reset a node that still has an owner or children attached")]
    ResetAttachedNode,

    #[error("Node not found in tree")]
    NodeNotFound,

    #[error("Child index {index} out of bounds for {count} children")]
    ChildIndexOutOfBounds { index: usize, count: usize },

    #[error("Measure function returned an invalid dimension: [width={width}, height={height}]")]
    InvalidMeasurement { width: f32, height: f32 },

    #[error("Expected custom baseline function to not return NaN")]
    BaselineIsNaN,

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

pub type Result<T> = std::result::Result<T, TesseraError>;
