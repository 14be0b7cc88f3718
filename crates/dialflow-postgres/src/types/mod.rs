//! Contains constraints, enumerations and other custom types.

mod constraints;
mod enums;
mod scope;

pub use constraints::{
    ChangeSetConstraints, ConstraintCategory, ConstraintViolation, SegmentNodeConstraints,
    TransitionEdgeConstraints,
};
pub use enums::ChangeSetStatus;
pub use scope::GraphScope;
