//! Formatting macros over [`Logger::emit`](crate::Logger::emit).
//!
//! ```
//! use rask_logger::{Context, MemoryLogger, info, warn};
//!
//! let logger = MemoryLogger::new("checkout");
//! let ctx = Context::new().with_request_id("req-7");
//! let order_id = 42;
//!
//! info!(logger, "order {order_id} placed");
//! warn!(ctx: &ctx, logger, "retrying payment for {}", order_id; "attempt" => 2);
//!
//! assert_eq!(logger.len(), 2);
//! ```

/// Emits at an explicit level.
///
/// Accepts an optional `ctx: <&Context>,` prefix, the logger, the level, a format string
/// with arguments, and optional `; key => value, ...` fields.
#[macro_export]
macro_rules! log {
    (ctx: $ctx:expr, $logger:expr, $level:expr, $($rest:tt)+) => {
        $crate::__emit!(::core::option::Option::Some($ctx), $logger, $level, $($rest)+)
    };
    ($logger:expr, $level:expr, $($rest:tt)+) => {
        $crate::__emit!(::core::option::Option::None, $logger, $level, $($rest)+)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __emit {
    ($ctx:expr, $logger:expr, $level:expr, $fmt:literal $(, $arg:expr)* ; $($key:expr => $value:expr),* $(,)?) => {{
        use $crate::Logger as _;
        ($logger).emit(
            $ctx,
            $level,
            $crate::Message::from(::core::format_args!($fmt $(, $arg)*)),
            &[$($crate::Field::new($key, $value)),*],
        )
    }};
    ($ctx:expr, $logger:expr, $level:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        use $crate::Logger as _;
        ($logger).emit(
            $ctx,
            $level,
            $crate::Message::from(::core::format_args!($fmt $(, $arg)*)),
            &[],
        )
    }};
}

#[macro_export]
macro_rules! error {
    (ctx: $ctx:expr, $logger:expr, $($rest:tt)+) => {
        $crate::log!(ctx: $ctx, $logger, $crate::Level::Error, $($rest)+)
    };
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::Error, $($rest)+)
    };
}

#[macro_export]
macro_rules! warn {
    (ctx: $ctx:expr, $logger:expr, $($rest:tt)+) => {
        $crate::log!(ctx: $ctx, $logger, $crate::Level::Warn, $($rest)+)
    };
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::Warn, $($rest)+)
    };
}

#[macro_export]
macro_rules! info {
    (ctx: $ctx:expr, $logger:expr, $($rest:tt)+) => {
        $crate::log!(ctx: $ctx, $logger, $crate::Level::Info, $($rest)+)
    };
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::Info, $($rest)+)
    };
}

#[macro_export]
macro_rules! debug {
    (ctx: $ctx:expr, $logger:expr, $($rest:tt)+) => {
        $crate::log!(ctx: $ctx, $logger, $crate::Level::Debug, $($rest)+)
    };
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::Debug, $($rest)+)
    };
}
