//! Declarative macros exported at the crate root.
//!
//! - `field_paths!` -> `FieldPaths` implementation (ordering-key reflection)

mod field_paths;
