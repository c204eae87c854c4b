use serde::de::DeserializeOwned;

pub const UNAUTHORIZED: u16 = 401;

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: serde_json::Value) -> Self {
        Self { status, body }
    }

    pub fn ok(body: serde_json::Value) -> Self {
        Self::new(200, body)
    }

    pub fn unauthorized() -> Self {
        Self::new(
            UNAUTHORIZED,
            serde_json::json!({ "detail": "Given token not valid for any token type" }),
        )
    }

    /// Empty bodies become `null`; bodies that are not JSON are kept as a string.
    pub fn from_raw(status: u16, raw: &[u8]) -> Self {
        let body = if raw.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(raw)
                .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(raw).into()))
        };
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == UNAUTHORIZED
    }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(self.body.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_bodies() {
        assert_eq!(ApiResponse::from_raw(204, b"").body, serde_json::Value::Null);
        assert_eq!(
            ApiResponse::from_raw(502, b"Bad Gateway").body,
            serde_json::Value::String("Bad Gateway".into())
        );
        assert_eq!(
            ApiResponse::from_raw(200, br#"{"balance":"12.50"}"#).body["balance"],
            "12.50"
        );
    }

    #[test]
    fn test_status_classes() {
        assert!(ApiResponse::ok(serde_json::Value::Null).is_success());
        assert!(ApiResponse::unauthorized().is_unauthorized());
        assert!(!ApiResponse::unauthorized().is_success());
    }
}
