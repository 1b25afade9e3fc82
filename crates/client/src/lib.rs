mod token;
pub mod entry;

pub use entry::{Entry, EntryId, Filter};
pub use token::ApiToken;

use std::time::Duration;

use log::debug;
use reqwest::{
    blocking::{RequestBuilder, Response},
    StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A client, for using the CMS content API
pub struct Client {
    base: String,
    token: Option<ApiToken>,
    http: reqwest::blocking::Client,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("http error: {}", .0)]
    HTTPError(#[from] reqwest::Error),

    #[error("serde error: {}", .0)]
    SerdeError(#[from] serde_json::Error),

    #[error("cms returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("cms response was malformed: {}", .0)]
    MalformedResponse(String),
}

impl Client {
    pub fn new(base: &str, token: Option<ApiToken>, timeout: Duration) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Client {
            base: base.trim_end_matches('/').to_string(),
            token,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token.as_ref()),
            None => req,
        }
    }

    /// Send a request and decode the JSON body, failing on any non-2xx status
    pub(crate) fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let resp = self.authorized(req).send()?;
        let resp = check_status(resp)?;

        let s = resp.text()?;
        if log::log_enabled!(log::Level::Debug) {
            debug!("response: {}", s);
        }
        Ok(serde_json::from_str(&s)?)
    }

    /// Call server health endpoint
    pub fn health(&self) -> Result<()> {
        let resp = self.authorized(self.http.get(self.url("_health"))).send()?;
        check_status(resp)?;
        Ok(())
    }
}

fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().unwrap_or_default();
    Err(Error::Status {
        status,
        body: error_message(&body).unwrap_or(body),
    })
}

/// Error body given by the content API
#[derive(Debug, Deserialize)]
struct ErrorResp {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorResp>(body)
        .ok()
        .map(|r| r.error.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = Client::new("http://localhost:1337/", None, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(client.base_url(), "http://localhost:1337");
        assert_eq!(
            client.url("/api/courses"),
            "http://localhost:1337/api/courses"
        );
    }

    #[test]
    fn test_error_message_extracted() {
        let body = r#"{"data":null,"error":{"status":400,"name":"ValidationError","message":"slug must be unique"}}"#;
        assert_eq!(error_message(body).as_deref(), Some("slug must be unique"));
        assert_eq!(error_message("<html>bad gateway</html>"), None);
    }
}
