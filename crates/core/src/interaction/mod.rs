//! Framework-free interaction helpers.
//!
//! - [`Debouncer`]: runs an action once a quiet period follows the last call
//! - [`DoubleCheck`]: two-step arm/confirm control for destructive actions

pub mod debounce;
pub mod double_check;

pub use debounce::Debouncer;
pub use double_check::{CheckState, ControlEvent, DoubleCheck, EventKind};
