//! Statement builders: SELECT, INSERT, UPDATE, DELETE, MERGE, and raw.
//!
//! Each builder is a fluent accumulation of clauses; nothing is validated
//! until a terminal operation renders the statement. Misuse (missing
//! model, empty MERGE, unsupported dialect feature) surfaces then, so
//! statements can be assembled conditionally.

mod delete;
mod insert;
mod merge;
mod raw;
mod select;
mod update;

pub use delete::Delete;
pub use insert::{Insert, OnConflict};
pub use merge::{Merge, MergeAction, MergeSource, WhenBranch, WhenKind};
pub use raw::Raw;
pub use select::{LockMode, Select, SelectExpr, SetOpKind};
pub use update::Update;
