use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};

use crate::io::store;
use crate::model::task::TaskList;

use super::{RemoteStore, SyncError};

/// Fixed path the task document lives at on the server
pub const API_ENDPOINT: &str = "/api/todos";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Basic-auth credentials, only sent when both halves are present
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

/// A generic JSON endpoint: `GET` returns the document, `POST` replaces it.
#[derive(Debug, Clone)]
pub struct HttpStore {
    base_url: String,
    credentials: Credentials,
    client: Client,
}

impl HttpStore {
    pub fn new(base_url: &str, credentials: Credentials, timeout: Duration) -> Result<Self, SyncError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(HttpStore {
            base_url: base_url.to_string(),
            credentials,
            client,
        })
    }

    /// `http://host/` + `/api/todos` -> `http://host/api/todos`
    pub fn endpoint(&self) -> String {
        endpoint_url(&self.base_url)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        if self.credentials.is_complete() {
            req.basic_auth(&self.credentials.username, Some(&self.credentials.password))
        } else {
            req
        }
    }
}

pub fn endpoint_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), API_ENDPOINT)
}

/// Any 2xx passes; anything else becomes `Status` with the body text
fn check_status(resp: Response) -> Result<Response, SyncError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    Err(SyncError::Status {
        code: status.as_u16(),
        body: body.trim().to_string(),
    })
}

impl RemoteStore for HttpStore {
    fn describe(&self) -> String {
        self.base_url.clone()
    }

    fn fetch(&self) -> Result<TaskList, SyncError> {
        let url = self.endpoint();
        tracing::debug!(%url, "GET tasks");
        let resp = self.authorize(self.client.get(&url)).send()?;
        let body = check_status(resp)?.bytes()?;
        Ok(store::decode(&body)?)
    }

    fn store(&self, list: &TaskList) -> Result<(), SyncError> {
        let url = self.endpoint();
        tracing::debug!(%url, tasks = list.len(), "POST tasks");
        let body = serde_json::to_vec(list)?;
        let req = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        let resp = self.authorize(req).send()?;
        check_status(resp)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_trims_trailing_slash() {
        assert_eq!(endpoint_url("http://localhost:8080"), "http://localhost:8080/api/todos");
        assert_eq!(endpoint_url("http://localhost:8080/"), "http://localhost:8080/api/todos");
        assert_eq!(endpoint_url("https://x.dev/base//"), "https://x.dev/base/api/todos");
    }

    #[test]
    fn credentials_need_both_halves() {
        assert!(!Credentials::default().is_complete());
        assert!(!Credentials::new("user", "").is_complete());
        assert!(!Credentials::new("", "pass").is_complete());
        assert!(Credentials::new("user", "pass").is_complete());
    }

    #[test]
    fn unreachable_endpoint_is_transport_error() {
        // Port 9 (discard) on loopback is closed on test machines
        let store = HttpStore::new("http://127.0.0.1:9", Credentials::default(), Duration::from_secs(2)).unwrap();
        assert!(matches!(store.fetch(), Err(SyncError::Transport(_))));
        assert!(matches!(store.store(&TaskList::default()), Err(SyncError::Transport(_))));
    }
}
