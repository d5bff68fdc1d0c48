use super::error::LoggerError;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Request/trace-scoped data threaded through a call chain.
///
/// Loggers read correlation identifiers out of it; an empty context adds nothing to
/// the emitted entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    trace_id: Option<String>,
    span_id: Option<String>,
    request_id: Option<String>,
    baggage: BTreeMap<String, String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context carrying a freshly generated request id.
    pub fn new_request() -> Self {
        Self::default().with_request_id(Uuid::new_v4().to_string())
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_span_id(mut self, span_id: impl Into<String>) -> Self {
        self.span_id = Some(span_id.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_baggage(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.baggage.insert(key.into(), value.into());
        self
    }

    /// Parses a W3C `traceparent` header: `version-traceid-spanid-flags`.
    pub fn from_traceparent(header: &str) -> Result<Self, LoggerError> {
        let invalid = |reason: &str| LoggerError::InvalidTraceparent {
            input: header.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = header.trim().split('-').collect();
        let [version, trace_id, span_id, flags] = parts.as_slice() else {
            return Err(invalid("expected 4 dash-separated parts"));
        };

        if version.len() != 2 || *version == "ff" {
            return Err(invalid("unsupported version"));
        }
        let trace_bytes = decode_lower_hex(trace_id, 16).ok_or_else(|| invalid("bad trace id"))?;
        let span_bytes = decode_lower_hex(span_id, 8).ok_or_else(|| invalid("bad span id"))?;
        decode_lower_hex(version, 1).ok_or_else(|| invalid("bad version"))?;
        decode_lower_hex(flags, 1).ok_or_else(|| invalid("bad flags"))?;

        if trace_bytes.iter().all(|b| *b == 0) {
            return Err(invalid("all-zero trace id"));
        }
        if span_bytes.iter().all(|b| *b == 0) {
            return Err(invalid("all-zero span id"));
        }

        Ok(Self::default()
            .with_trace_id(*trace_id)
            .with_span_id(*span_id))
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    pub fn span_id(&self) -> Option<&str> {
        self.span_id.as_deref()
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn baggage(&self, key: &str) -> Option<&str> {
        self.baggage.get(key).map(String::as_str)
    }

    /// Baggage entries in key order.
    pub fn baggage_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.baggage.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// True when the context carries no correlation data at all.
    pub fn is_empty(&self) -> bool {
        self.trace_id.is_none()
            && self.span_id.is_none()
            && self.request_id.is_none()
            && self.baggage.is_empty()
    }
}

fn decode_lower_hex(input: &str, expected_len: usize) -> Option<Vec<u8>> {
    if input.len() != expected_len * 2 || input.chars().any(|c| c.is_ascii_uppercase()) {
        return None;
    }
    hex::decode(input).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

    #[test]
    fn test_empty_context() {
        let ctx = Context::new();
        assert!(ctx.is_empty());
        assert_eq!(ctx.trace_id(), None);
    }

    #[test]
    fn test_builder() {
        let ctx = Context::new()
            .with_trace_id("t1")
            .with_span_id("s1")
            .with_request_id("r1")
            .with_baggage("tenant", "acme");

        assert!(!ctx.is_empty());
        assert_eq!(ctx.trace_id(), Some("t1"));
        assert_eq!(ctx.span_id(), Some("s1"));
        assert_eq!(ctx.request_id(), Some("r1"));
        assert_eq!(ctx.baggage("tenant"), Some("acme"));
    }

    #[test]
    fn test_new_request_has_uuid() {
        let ctx = Context::new_request();
        let id = ctx.request_id().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
        assert_ne!(Context::new_request(), ctx);
    }

    #[test]
    fn test_traceparent_valid() {
        let ctx = Context::from_traceparent(VALID).unwrap();
        assert_eq!(ctx.trace_id(), Some("4bf92f3577b34da6a3ce929d0e0e4736"));
        assert_eq!(ctx.span_id(), Some("00f067aa0ba902b7"));
        assert_eq!(ctx.request_id(), None);
    }

    #[test]
    fn test_traceparent_invalid() {
        let cases = [
            "",
            "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7",
            "00-4bf92f3577b34da6a3ce929d0e0e473-00f067aa0ba902b7-01",
            "00-4BF92F3577B34DA6A3CE929D0E0E4736-00f067aa0ba902b7-01",
            "00-00000000000000000000000000000000-00f067aa0ba902b7-01",
            "00-4bf92f3577b34da6a3ce929d0e0e4736-0000000000000000-01",
            "ff-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01",
            "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-zz",
        ];

        for case in cases {
            let result = Context::from_traceparent(case);
            assert!(
                matches!(result, Err(LoggerError::InvalidTraceparent { .. })),
                "Header: {case}"
            );
        }
    }
}
