pub mod repo;
pub mod repo_types;

pub use repo::{PgShiftStore, ShiftStore};
pub use repo_types::{NewShift, Shift};
