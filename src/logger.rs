//! The logging facade.
//!
//! Application code depends on [`Logger`] only. Every logging method funnels into
//! [`Logger::emit`], which renders the message and hands a [`Record`] to the
//! implementation. No method reports failure to the caller.

use crate::domain::{Context, Field, Level, Message, Record};
use std::sync::Arc;

/// A logger shared between components.
pub type SharedLogger = Arc<dyn Logger>;

/// Capability every concrete logger provides.
///
/// Implementations must be safe to call from many threads at once and must absorb
/// their own failures (drop, retry, fall back) instead of surfacing them.
pub trait Logger: Send + Sync {
    /// Delivers one record to the backend.
    fn log(&self, record: &Record<'_>);

    /// Pushes buffered entries to the next layer before returning.
    ///
    /// A no-op when nothing is buffered.
    fn flush(&self);

    /// Returns a logger scoped under `name` that inherits this logger's configuration.
    fn child(&self, name: &str) -> SharedLogger;

    /// Name used to attribute entries, empty for the root.
    fn name(&self) -> &str {
        ""
    }

    fn enabled(&self, _level: Level) -> bool {
        true
    }

    fn emit(&self, ctx: Option<&Context>, level: Level, message: Message<'_>, fields: &[Field]) {
        if !self.enabled(level) {
            return;
        }
        let text = message.render();
        let record = Record::new(level, self.name(), &text)
            .with_fields(fields)
            .with_context(ctx);
        self.log(&record);
    }

    fn error(&self, message: Message<'_>) {
        self.emit(None, Level::Error, message, &[]);
    }

    fn warn(&self, message: Message<'_>) {
        self.emit(None, Level::Warn, message, &[]);
    }

    fn info(&self, message: Message<'_>) {
        self.emit(None, Level::Info, message, &[]);
    }

    fn debug(&self, message: Message<'_>) {
        self.emit(None, Level::Debug, message, &[]);
    }

    fn error_ctx(&self, ctx: &Context, message: Message<'_>) {
        self.emit(Some(ctx), Level::Error, message, &[]);
    }

    fn warn_ctx(&self, ctx: &Context, message: Message<'_>) {
        self.emit(Some(ctx), Level::Warn, message, &[]);
    }

    fn info_ctx(&self, ctx: &Context, message: Message<'_>) {
        self.emit(Some(ctx), Level::Info, message, &[]);
    }

    fn debug_ctx(&self, ctx: &Context, message: Message<'_>) {
        self.emit(Some(ctx), Level::Debug, message, &[]);
    }

    fn error_with(&self, message: Message<'_>, fields: &[Field]) {
        self.emit(None, Level::Error, message, fields);
    }

    fn warn_with(&self, message: Message<'_>, fields: &[Field]) {
        self.emit(None, Level::Warn, message, fields);
    }

    fn info_with(&self, message: Message<'_>, fields: &[Field]) {
        self.emit(None, Level::Info, message, fields);
    }

    fn debug_with(&self, message: Message<'_>, fields: &[Field]) {
        self.emit(None, Level::Debug, message, fields);
    }

    fn error_with_ctx(&self, ctx: &Context, message: Message<'_>, fields: &[Field]) {
        self.emit(Some(ctx), Level::Error, message, fields);
    }

    fn warn_with_ctx(&self, ctx: &Context, message: Message<'_>, fields: &[Field]) {
        self.emit(Some(ctx), Level::Warn, message, fields);
    }

    fn info_with_ctx(&self, ctx: &Context, message: Message<'_>, fields: &[Field]) {
        self.emit(Some(ctx), Level::Info, message, fields);
    }

    fn debug_with_ctx(&self, ctx: &Context, message: Message<'_>, fields: &[Field]) {
        self.emit(Some(ctx), Level::Debug, message, fields);
    }
}

impl<L: Logger + ?Sized> Logger for Arc<L> {
    fn log(&self, record: &Record<'_>) {
        (**self).log(record);
    }

    fn flush(&self) {
        (**self).flush();
    }

    fn child(&self, name: &str) -> SharedLogger {
        (**self).child(name)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn enabled(&self, level: Level) -> bool {
        (**self).enabled(level)
    }

    fn emit(&self, ctx: Option<&Context>, level: Level, message: Message<'_>, fields: &[Field]) {
        (**self).emit(ctx, level, message, fields);
    }
}
