use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque bearer credential. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Access/refresh pair. Also used as a partial update where `None` means
/// "keep the current value".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    pub access: Option<Token>,
    pub refresh: Option<Token>,
}

impl CredentialPair {
    pub fn new(access: impl Into<Token>, refresh: impl Into<Token>) -> Self {
        Self {
            access: Some(access.into()),
            refresh: Some(refresh.into()),
        }
    }

    pub fn access_only(access: impl Into<Token>) -> Self {
        Self {
            access: Some(access.into()),
            refresh: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }

    /// Overwrites only the fields present in `update`.
    pub fn merge(&mut self, update: CredentialPair) {
        if let Some(access) = update.access {
            self.access = Some(access);
        }
        if let Some(refresh) = update.refresh {
            self.refresh = Some(refresh);
        }
    }
}

/// Body of a successful renewal exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct RenewedCredentials {
    pub access: Token,
    #[serde(default)]
    pub refresh: Option<Token>,
}

impl From<RenewedCredentials> for CredentialPair {
    fn from(renewed: RenewedCredentials) -> Self {
        Self {
            access: Some(renewed.access),
            refresh: renewed.refresh,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RenewalBody<'a> {
    pub refresh: &'a Token,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_debug_is_redacted() {
        let token = Token::new("secret-value");
        assert_eq!(format!("{:?}", token), "Token(***)");
        assert_eq!(token.bearer_header(), "Bearer secret-value");
    }

    #[test]
    fn test_merge_keeps_absent_fields() {
        let mut pair = CredentialPair::new("a1", "r1");
        pair.merge(CredentialPair::access_only("a2"));
        assert_eq!(pair, CredentialPair::new("a2", "r1"));

        pair.merge(CredentialPair::default());
        assert_eq!(pair, CredentialPair::new("a2", "r1"));
    }

    #[test]
    fn test_renewed_refresh_is_optional() {
        let renewed: RenewedCredentials = serde_json::from_str(r#"{"access":"a2"}"#).unwrap();
        assert_eq!(renewed.access, Token::new("a2"));
        assert!(renewed.refresh.is_none());

        let pair: CredentialPair =
            serde_json::from_str::<RenewedCredentials>(r#"{"access":"a3","refresh":"r3"}"#)
                .unwrap()
                .into();
        assert_eq!(pair, CredentialPair::new("a3", "r3"));
    }
}
