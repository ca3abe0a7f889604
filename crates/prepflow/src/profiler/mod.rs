//! Column type inference.
//!
//! Semantic column kinds drive which detectors look at which columns and
//! which default fix methods apply. Kinds are derived, never stored:
//! transformations change them, so they are recomputed as needed.

mod type_inference;

pub use type_inference::{ColumnKind, infer_kind, infer_kinds};
pub(crate) use type_inference::is_date_like;
