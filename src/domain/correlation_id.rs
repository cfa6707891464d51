/// Identifier threading together every log line of one inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Uses the caller-supplied value verbatim when it is present and non-empty,
    /// otherwise the server-generated trace identifier of the request.
    pub fn from_inbound(supplied: Option<&str>, trace_identifier: &str) -> Self {
        match supplied {
            Some(id) if !id.is_empty() => Self(id.to_owned()),
            _ => Self(trace_identifier.to_owned()),
        }
    }
}

impl AsRef<str> for CorrelationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
