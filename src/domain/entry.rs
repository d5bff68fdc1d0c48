use super::context::Context;
use super::level::Level;
use super::value::{Field, FieldMap};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt::Write as _;

/// A single log call as seen by a `Logger` implementation.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    pub level: Level,
    pub logger: &'a str,
    pub message: &'a str,
    pub fields: &'a [Field],
    pub context: Option<&'a Context>,
    pub timestamp: DateTime<Utc>,
}

impl<'a> Record<'a> {
    pub fn new(level: Level, logger: &'a str, message: &'a str) -> Self {
        Self {
            level,
            logger,
            message,
            fields: &[],
            context: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_fields(mut self, fields: &'a [Field]) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_context(mut self, context: Option<&'a Context>) -> Self {
        self.context = context;
        self
    }
}

/// Owned form of a record, as buffered and serialized by the sinks.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub logger: String,
    pub message: String,
    pub trace_id: Option<String>,
    pub span_id: Option<String>,
    pub request_id: Option<String>,
    /// Inherited scope fields first, then call-site fields.
    pub fields: Vec<Field>,
}

impl LogEntry {
    /// Captures a record, prepending the fields inherited from the emitting logger's scope.
    ///
    /// Context baggage lands between the inherited and the call-site fields.
    /// The record's own logger name wins over `scope_name` unless it is empty.
    pub fn capture(record: &Record<'_>, scope_name: &str, inherited: &[Field]) -> Self {
        let logger = if record.logger.is_empty() {
            scope_name
        } else {
            record.logger
        };

        let ctx = record.context;
        let mut fields = Vec::with_capacity(inherited.len() + record.fields.len());
        fields.extend_from_slice(inherited);
        if let Some(ctx) = ctx {
            fields.extend(ctx.baggage_entries().map(|(k, v)| Field::new(k, v)));
        }
        fields.extend_from_slice(record.fields);

        Self {
            timestamp: record.timestamp,
            level: record.level,
            logger: logger.to_string(),
            message: record.message.to_string(),
            trace_id: ctx.and_then(Context::trace_id).map(str::to_string),
            span_id: ctx.and_then(Context::span_id).map(str::to_string),
            request_id: ctx.and_then(Context::request_id).map(str::to_string),
            fields,
        }
    }

    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Single-line human readable rendering:
    /// `<timestamp> <LEVEL> <logger>: <message> [key=value ...]`.
    pub fn to_text(&self) -> String {
        let mut line = String::with_capacity(64 + self.message.len() + self.fields.len() * 16);
        let _ = write!(
            line,
            "{} {:<5} ",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
            self.level.label()
        );
        if !self.logger.is_empty() {
            line.push_str(&self.logger);
            line.push_str(": ");
        }
        // Newlines inside the message would split one entry across several lines.
        line.push_str(&self.message.replace('\n', "\\n"));

        for field in &self.fields {
            let _ = write!(line, " {field}");
        }
        for (key, value) in self.correlation() {
            let _ = write!(line, " {key}={value}");
        }
        line
    }

    /// Newline-free JSON rendering.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    fn correlation(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("trace_id", self.trace_id.as_deref()),
            ("span_id", self.span_id.as_deref()),
            ("request_id", self.request_id.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
    }
}

impl Serialize for LogEntry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("LogEntry", 8)?;
        state.serialize_field(
            "timestamp",
            &self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
        )?;
        state.serialize_field("level", &self.level)?;
        state.serialize_field("logger", &self.logger)?;
        state.serialize_field("message", &self.message)?;
        if let Some(trace_id) = &self.trace_id {
            state.serialize_field("trace_id", trace_id)?;
        } else {
            state.skip_field("trace_id")?;
        }
        if let Some(span_id) = &self.span_id {
            state.serialize_field("span_id", span_id)?;
        } else {
            state.skip_field("span_id")?;
        }
        if let Some(request_id) = &self.request_id {
            state.serialize_field("request_id", request_id)?;
        } else {
            state.skip_field("request_id")?;
        }
        state.serialize_field("fields", &FieldMap(&self.fields))?;
        state.end()
    }
}
