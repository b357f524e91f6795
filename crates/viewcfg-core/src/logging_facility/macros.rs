//! Operation lifecycle macros
//!
//! Every boundary operation emits exactly one `start` event and then either
//! one `end` or one `end_error` event. All three carry `component` (the
//! calling module), `op` and `event`; extra fields follow as in `tracing`.

/// Emit one lifecycle event at `$level`
#[doc(hidden)]
#[macro_export]
macro_rules! __log_op_event {
    ($level:ident, $op:expr, $event:expr) => {
        tracing::$level!(component = module_path!(), op = $op, event = $event)
    };
    ($level:ident, $op:expr, $event:expr, $($field:tt)+) => {
        tracing::$level!(component = module_path!(), op = $op, event = $event, $($field)+)
    };
}

/// Log the start of an operation
///
/// ```
/// # use viewcfg_core::log_op_start;
/// log_op_start!("save_view");
/// log_op_start!("save_view", entity_type_id = "movie");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)+)?) => {
        $crate::__log_op_event!(
            info,
            $op,
            $crate::core_types::schema::EVENT_START
            $(, $($field)+)?
        )
    };
}

/// Log the successful end of an operation
///
/// `duration_ms` is required.
///
/// ```
/// # use viewcfg_core::log_op_end;
/// log_op_end!("save_view", duration_ms = 42, slug = "all");
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {
        $crate::__log_op_event!(
            info,
            $op,
            $crate::core_types::schema::EVENT_END,
            duration_ms = $duration
            $(, $($field)+)?
        )
    };
}

/// Log a failed operation
///
/// Anything convertible into `ExError` is accepted; the event carries its
/// `err_kind` and stable `err_code`.
///
/// ```
/// # use viewcfg_core::{log_op_error, errors::ViewError};
/// log_op_error!("save_view", ViewError::MissingLabel, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::__log_op_event!(
            error,
            $op,
            $crate::core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code()
            $(, $($field)+)?
        )
    }};
}
