use actix_web::http::header::HeaderMap;

pub const TRACEPARENT_HEADER: &str = "traceparent";
pub const CLOUD_TRACE_CONTEXT_HEADER: &str = "X-Cloud-Trace-Context";

/// Distributed-trace identifiers propagated by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    pub trace_id: String,
    pub span_id: Option<String>,
}

fn is_hex_of_len(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_hexdigit())
}

impl TraceContext {
    /// W3C `traceparent` takes precedence over the legacy Google header.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

        header(TRACEPARENT_HEADER)
            .and_then(Self::parse_traceparent)
            .or_else(|| header(CLOUD_TRACE_CONTEXT_HEADER).and_then(Self::parse_cloud_trace_context))
    }

    /// `00-<32 hex trace id>-<16 hex parent id>-<2 hex flags>`
    pub fn parse_traceparent(value: &str) -> Option<Self> {
        let pieces: Vec<_> = value.trim().split('-').collect();
        let [version, trace_id, span_id, flags] = pieces.as_slice() else {
            return None;
        };

        if !is_hex_of_len(version, 2)
            || !is_hex_of_len(trace_id, 32)
            || !is_hex_of_len(span_id, 16)
            || !is_hex_of_len(flags, 2)
        {
            return None;
        }
        // All-zero ids are invalid.
        if trace_id.chars().all(|c| c == '0') || span_id.chars().all(|c| c == '0') {
            return None;
        }

        Some(Self {
            trace_id: trace_id.to_ascii_lowercase(),
            span_id: Some(span_id.to_ascii_lowercase()),
        })
    }

    /// `TRACE_ID[/SPAN_ID][;o=OPTIONS]`, the span id being decimal. It is
    /// re-encoded as 16 hex digits to match `traceparent`.
    pub fn parse_cloud_trace_context(value: &str) -> Option<Self> {
        let value = value.trim();
        let ids = value.split(';').next().unwrap_or_default();
        let (trace_id, span_id) = match ids.split_once('/') {
            Some((trace_id, span_id)) => (trace_id, Some(span_id)),
            None => (ids, None),
        };

        if !is_hex_of_len(trace_id, 32) {
            return None;
        }

        // The legacy header carries the span id as a decimal u64.
        let span_id = span_id
            .filter(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))
            .and_then(|s| s.parse::<u64>().ok())
            .map(|id| format!("{id:016x}"));

        Some(Self {
            trace_id: trace_id.to_ascii_lowercase(),
            span_id,
        })
    }
}
