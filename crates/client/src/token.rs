use serde::{Deserialize, Serialize};

/// An API token, wrapped so we don't print it by accident
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiToken(String);

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiToken (******)")
    }
}

impl From<String> for ApiToken {
    fn from(value: String) -> Self {
        ApiToken(value)
    }
}

impl From<ApiToken> for String {
    fn from(val: ApiToken) -> Self {
        val.0
    }
}

impl AsRef<str> for ApiToken {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::ApiToken;

    #[test]
    fn test_debug_is_redacted() {
        let token = ApiToken::from("s3cret".to_string());
        assert_eq!(format!("{:?}", token), "ApiToken (******)");
        assert_eq!(token.as_ref(), "s3cret");
    }
}
