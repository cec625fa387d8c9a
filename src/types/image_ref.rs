// ABOUTME: Container image reference validation.
// ABOUTME: Accepts name, name:tag, and registry/name:tag forms; defaults the tag.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseImageRefError {
    #[error("image reference cannot be empty")]
    Empty,

    #[error("invalid character in image reference: {0}")]
    InvalidChar(char),
}

/// A validated container image reference, stored in its full
/// `[registry/]name:tag` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn parse(input: &str) -> Result<Self, ParseImageRefError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseImageRefError::Empty);
        }

        if let Some(c) = input.chars().find(|c| {
            !c.is_ascii_alphanumeric()
                && !matches!(c, '/' | ':' | '.' | '-' | '_' | '@')
        }) {
            return Err(ParseImageRefError::InvalidChar(c));
        }

        // A colon introduces a tag only when it appears after the last
        // slash; otherwise it belongs to a registry port.
        let has_tag = match input.rsplit_once(':') {
            Some((_, after)) => !after.contains('/'),
            None => false,
        };
        let has_digest = input.contains('@');

        let full = if has_tag || has_digest {
            input.to_string()
        } else {
            format!("{input}:latest")
        };

        Ok(Self(full))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_name_gets_latest_tag() {
        assert_eq!(ImageRef::parse("nginx").unwrap().as_str(), "nginx:latest");
    }

    #[test]
    fn explicit_tag_is_kept() {
        assert_eq!(
            ImageRef::parse("ghcr.io/acme/chat:v2").unwrap().as_str(),
            "ghcr.io/acme/chat:v2"
        );
    }

    #[test]
    fn registry_port_is_not_a_tag() {
        assert_eq!(
            ImageRef::parse("localhost:5000/chat").unwrap().as_str(),
            "localhost:5000/chat:latest"
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(ImageRef::parse("").is_err());
        assert!(ImageRef::parse("chat app").is_err());
    }
}
