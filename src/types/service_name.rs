// ABOUTME: Validated service name used for container naming and proxy upstreams.
// ABOUTME: Follows RFC 1123 label rules so derived names stay DNS-compatible.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceNameError {
    #[error("service name cannot be empty")]
    Empty,

    #[error("service name exceeds maximum length of 57 characters")]
    TooLong,

    #[error("service name cannot start or end with a hyphen")]
    EdgeHyphen,

    #[error("invalid character in service name: '{0}' (lowercase alphanumeric and '-' only)")]
    InvalidChar(char),
}

/// A service name valid as an RFC 1123 label. Container names
/// (`<service>-blue`, `<service>-green`) and the default upstream name
/// are derived from it, so the validation here covers those too.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceName(String);

impl ServiceName {
    pub fn new(value: &str) -> Result<Self, ServiceNameError> {
        if value.is_empty() {
            return Err(ServiceNameError::Empty);
        }
        // Leaves room for the "-green" suffix within the 63-char label limit.
        if value.len() > 57 {
            return Err(ServiceNameError::TooLong);
        }
        if value.starts_with('-') || value.ends_with('-') {
            return Err(ServiceNameError::EdgeHyphen);
        }
        if let Some(c) = value
            .chars()
            .find(|c| !c.is_ascii_lowercase() && !c.is_ascii_digit() && *c != '-')
        {
            return Err(ServiceNameError::InvalidChar(c));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_dns_labels() {
        assert!(ServiceName::new("chat").is_ok());
        assert!(ServiceName::new("chat-app2").is_ok());
    }

    #[test]
    fn rejects_invalid_names() {
        assert!(matches!(ServiceName::new(""), Err(ServiceNameError::Empty)));
        assert!(matches!(
            ServiceName::new("-chat"),
            Err(ServiceNameError::EdgeHyphen)
        ));
        assert!(matches!(
            ServiceName::new("chat-"),
            Err(ServiceNameError::EdgeHyphen)
        ));
        assert!(matches!(
            ServiceName::new("Chat"),
            Err(ServiceNameError::InvalidChar('C'))
        ));
        assert!(matches!(
            ServiceName::new("chat app"),
            Err(ServiceNameError::InvalidChar(' '))
        ));
        assert!(ServiceName::new(&"a".repeat(58)).is_err());
    }
}
