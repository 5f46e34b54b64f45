//! Change lifecycle: apply, revert and the per-assessment change set

pub mod change;
pub mod change_set;
pub mod error;

pub use change::{ApplyFn, BoxError, Change, RevertFn};
pub use change_set::ChangeSet;
pub use error::ChangeError;
