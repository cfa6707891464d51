use tracing::Level;

/// Internal severity of a log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Verbose,
    Debug,
    Information,
    Warning,
    Error,
    Fatal,
}

impl Severity {
    /// Case-sensitive lookup by enumeration name.
    #[cfg(test)]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Verbose" => Some(Severity::Verbose),
            "Debug" => Some(Severity::Debug),
            "Information" => Some(Severity::Information),
            "Warning" => Some(Severity::Warning),
            "Error" => Some(Severity::Error),
            "Fatal" => Some(Severity::Fatal),
            _ => None,
        }
    }

    pub fn from_level(level: &Level, fatal: bool) -> Self {
        match *level {
            Level::TRACE => Severity::Verbose,
            Level::DEBUG => Severity::Debug,
            Level::INFO => Severity::Information,
            Level::WARN => Severity::Warning,
            _ if fatal => Severity::Fatal,
            _ => Severity::Error,
        }
    }

    pub fn as_gcp(&self) -> &'static str {
        match self {
            Severity::Verbose | Severity::Debug => "DEBUG",
            Severity::Information => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Fatal => "CRITICAL",
        }
    }
}

/// Unmapped or missing severities are reported as `INFO`.
pub fn gcp_severity(severity: Option<Severity>) -> &'static str {
    severity.map_or("INFO", |s| s.as_gcp())
}
