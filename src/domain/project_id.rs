/// Identifier of the cloud project the process runs under.
///
/// Resolved once at startup and only read afterwards; it namespaces the trace
/// references written into every log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectId(String);

impl ProjectId {
    pub const UNKNOWN: &'static str = "unknown";

    /// Accepts the value trimmed, rejects it when nothing is left.
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_owned()))
    }

    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_owned())
    }

    #[cfg(test)]
    pub fn is_unknown(&self) -> bool {
        self.0 == Self::UNKNOWN
    }
}

impl AsRef<str> for ProjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
