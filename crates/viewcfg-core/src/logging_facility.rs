//! Structured logging for view operations
//!
//! `init` installs the process subscriber for a [`Profile`]. The
//! `log_op_*` macros emit the lifecycle events of one boundary operation,
//! and [`TestCapture`] records those events in memory for assertions.
//!
//! Only the engine layer emits lifecycle events. Store and core code log
//! internal details with `tracing::debug!`.
//!
//! ```rust
//! use viewcfg_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
