//! Authorization credentials attached to every request

use std::fmt;

/// Supplies the `Authorization` header value for an identifier
pub trait CredentialSource: Send + Sync + fmt::Debug {
    /// `None` sends the request without an `Authorization` header
    fn credential_for(&self, identifier: &str) -> Option<String>;
}

/// Same token for every identifier
#[derive(Clone)]
pub struct StaticCredential {
    token: String,
}

impl StaticCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl fmt::Debug for StaticCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredential")
            .field("configured", &!self.token.is_empty())
            .finish()
    }
}

impl CredentialSource for StaticCredential {
    fn credential_for(&self, _identifier: &str) -> Option<String> {
        if self.token.is_empty() {
            None
        } else {
            Some(self.token.clone())
        }
    }
}

/// Token computed per identifier
pub struct DerivedCredential<F> {
    derive: F,
}

impl<F> DerivedCredential<F>
where
    F: Fn(&str) -> String + Send + Sync,
{
    pub fn new(derive: F) -> Self {
        Self { derive }
    }
}

impl<F> fmt::Debug for DerivedCredential<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedCredential").finish_non_exhaustive()
    }
}

impl<F> CredentialSource for DerivedCredential<F>
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn credential_for(&self, identifier: &str) -> Option<String> {
        Some((self.derive)(identifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_credential() {
        let creds = StaticCredential::new("token-123");
        assert_eq!(creds.credential_for("a"), Some("token-123".to_string()));
        assert_eq!(creds.credential_for("b"), Some("token-123".to_string()));
    }

    #[test]
    fn test_empty_static_credential_sends_no_header() {
        assert_eq!(StaticCredential::new("").credential_for("a"), None);
    }

    #[test]
    fn test_static_credential_debug_hides_token() {
        let debug = format!("{:?}", StaticCredential::new("secret"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_derived_credential() {
        let creds = DerivedCredential::new(|id: &str| format!("Bearer {id}"));
        assert_eq!(creds.credential_for("x1"), Some("Bearer x1".to_string()));
    }
}
