//! Field keys and event names shared by the logging macros and test capture

pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";

/// Emitted once when a boundary operation begins
pub const EVENT_START: &str = "start";
/// Emitted once when it succeeds
pub const EVENT_END: &str = "end";
/// Emitted once when it fails, instead of `EVENT_END`
pub const EVENT_END_ERROR: &str = "end_error";
