//! Google OAuth for the Drive backend.
//!
//! The application credential file (`credentials.json`) comes from the
//! Google Cloud console. On first use the user is sent through the consent
//! page and pastes the authorization code back; the resulting token is
//! cached (`token.json`) and refreshed when it expires.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use reqwest::Url;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::io::store::atomic_write;
use crate::model::config::DriveConfig;

use super::SyncError;

/// Only files this app created or opened
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const DEFAULT_REDIRECT: &str = "http://localhost";
const STATE: &str = "state-token";

/// Refresh this long before the recorded expiry
const EXPIRY_SKEW_SECS: i64 = 60;

/// The OAuth client section of `credentials.json`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Console downloads wrap the client in `installed` or `web`
#[derive(Deserialize)]
struct CredentialsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    pub fn parse(json: &str) -> Result<Self, SyncError> {
        let file: CredentialsFile = serde_json::from_str(json)
            .map_err(|e| SyncError::Auth(format!("unable to parse client secret file: {}", e)))?;
        file.installed
            .or(file.web)
            .ok_or_else(|| SyncError::Auth("client secret file has no installed or web client".into()))
    }

    pub fn load(path: &Path) -> Result<Self, SyncError> {
        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(SyncError::Auth(missing_credentials_help(path)));
            }
            Err(e) => return Err(SyncError::Io(e)),
        };
        Self::parse(&text)
    }

    pub fn redirect_uri(&self) -> &str {
        self.redirect_uris
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_REDIRECT)
    }

    /// Consent page URL the user opens in a browser
    pub fn auth_url(&self) -> Result<String, SyncError> {
        let url = Url::parse_with_params(
            &self.auth_uri,
            [
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri()),
                ("response_type", "code"),
                ("scope", DRIVE_SCOPE),
                ("access_type", "offline"),
                ("state", STATE),
            ],
        )
        .map_err(|e| SyncError::Auth(e.to_string()))?;
        Ok(url.to_string())
    }
}

fn missing_credentials_help(path: &Path) -> String {
    format!(
        "Google Drive credentials not found at '{}'.\n\
         To get credentials:\n\
         1. Go to the Google Cloud Console\n\
         2. Create a new project or select an existing one\n\
         3. Enable the Google Drive API\n\
         4. Create credentials (OAuth 2.0 Client ID, desktop app)\n\
         5. Download the JSON and save it as '{}'",
        path.display(),
        path.display()
    )
}

/// Cached token, field-compatible with the common `token.json` layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, deserialize_with = "deserialize_expiry")]
    pub expiry: Option<DateTime<Utc>>,
}

fn bearer() -> String {
    "Bearer".to_string()
}

/// Zero times (year 1) mean "never expires"
fn deserialize_expiry<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<DateTime<Utc>> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|t| t.timestamp() > 0))
}

impl Token {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry
            .is_some_and(|exp| exp <= now + Duration::seconds(EXPIRY_SKEW_SECS))
    }

    pub fn load(path: &Path) -> Result<Option<Self>, SyncError> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SyncError::Io(e)),
        }
    }

    /// Write with owner-only permissions
    pub fn save(&self, path: &Path) -> Result<(), SyncError> {
        let content = serde_json::to_string_pretty(self)?;
        atomic_write(path, content.as_bytes())?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "bearer")]
    token_type: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

fn token_request(client: &Client, secrets: &ClientSecrets, form: &[(&str, &str)]) -> Result<TokenResponse, SyncError> {
    let resp = client.post(&secrets.token_uri).form(form).send()?;
    let status = resp.status();
    let body = resp.text()?;
    if !status.is_success() {
        let message = match serde_json::from_str::<TokenErrorResponse>(&body) {
            Ok(err) => match err.error_description {
                Some(desc) => format!("{}: {}", err.error, desc),
                None => err.error,
            },
            Err(_) => format!("HTTP {}", status.as_u16()),
        };
        return Err(SyncError::Auth(message));
    }
    Ok(serde_json::from_str(&body)?)
}

fn into_token(resp: TokenResponse, previous_refresh: Option<&str>, now: DateTime<Utc>) -> Token {
    Token {
        access_token: resp.access_token,
        token_type: resp.token_type,
        refresh_token: resp
            .refresh_token
            .or_else(|| previous_refresh.map(str::to_string)),
        expiry: resp.expires_in.map(|secs| now + Duration::seconds(secs)),
    }
}

pub fn exchange_code(client: &Client, secrets: &ClientSecrets, code: &str) -> Result<Token, SyncError> {
    let resp = token_request(
        client,
        secrets,
        &[
            ("code", code),
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
            ("redirect_uri", secrets.redirect_uri()),
            ("grant_type", "authorization_code"),
        ],
    )?;
    Ok(into_token(resp, None, Utc::now()))
}

pub fn refresh_token(client: &Client, secrets: &ClientSecrets, refresh: &str) -> Result<Token, SyncError> {
    let resp = token_request(
        client,
        secrets,
        &[
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
            ("refresh_token", refresh),
            ("grant_type", "refresh_token"),
        ],
    )?;
    Ok(into_token(resp, Some(refresh), Utc::now()))
}

/// Produce a usable access token: cached, refreshed, or from a fresh
/// consent. `prompt` shows the consent URL and returns the pasted code.
pub fn access_token(
    client: &Client,
    config: &DriveConfig,
    prompt: &mut dyn FnMut(&str) -> io::Result<String>,
) -> Result<String, SyncError> {
    let secrets = ClientSecrets::load(&config.credentials_file)?;

    if let Some(token) = Token::load(&config.token_file)? {
        if !token.is_expired(Utc::now()) {
            return Ok(token.access_token);
        }
        if let Some(refresh) = token.refresh_token.as_deref() {
            match refresh_token(client, &secrets, refresh) {
                Ok(fresh) => {
                    fresh.save(&config.token_file)?;
                    tracing::info!("refreshed Google access token");
                    return Ok(fresh.access_token);
                }
                Err(e) => tracing::warn!(error = %e, "token refresh failed; asking for consent again"),
            }
        }
    }

    let code = prompt(&secrets.auth_url()?)?;
    let code = code.trim();
    if code.is_empty() {
        return Err(SyncError::Auth("no authorization code entered".into()));
    }
    let token = exchange_code(client, &secrets, code)?;
    token.save(&config.token_file)?;
    tracing::info!(path = %config.token_file.display(), "cached Google access token");
    Ok(token.access_token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    const INSTALLED: &str = r#"{"installed":{"client_id":"abc.apps.googleusercontent.com","project_id":"p","auth_uri":"https://accounts.google.com/o/oauth2/auth","token_uri":"https://oauth2.googleapis.com/token","client_secret":"shh","redirect_uris":["http://localhost"]}}"#;

    #[test]
    fn parses_installed_client() {
        let secrets = ClientSecrets::parse(INSTALLED).unwrap();
        assert_eq!(secrets.client_id, "abc.apps.googleusercontent.com");
        assert_eq!(secrets.client_secret, "shh");
        assert_eq!(secrets.redirect_uri(), "http://localhost");
    }

    #[test]
    fn parses_web_client_with_defaults() {
        let secrets = ClientSecrets::parse(r#"{"web":{"client_id":"id","client_secret":"s"}}"#).unwrap();
        assert_eq!(secrets.token_uri, DEFAULT_TOKEN_URI);
        assert_eq!(secrets.redirect_uri(), DEFAULT_REDIRECT);
    }

    #[test]
    fn rejects_file_without_client() {
        assert!(matches!(ClientSecrets::parse("{}"), Err(SyncError::Auth(_))));
        assert!(matches!(ClientSecrets::parse("nope"), Err(SyncError::Auth(_))));
    }

    #[test]
    fn missing_credentials_explains_setup() {
        let dir = TempDir::new().unwrap();
        let err = ClientSecrets::load(&dir.path().join("credentials.json")).unwrap_err();
        let SyncError::Auth(msg) = err else {
            panic!("expected auth error");
        };
        assert!(msg.contains("Enable the Google Drive API"));
    }

    #[test]
    fn auth_url_carries_client_and_scope() {
        let secrets = ClientSecrets::parse(INSTALLED).unwrap();
        let url = secrets.auth_url().unwrap();
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/auth?"));
        assert!(url.contains("client_id=abc.apps.googleusercontent.com"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("drive.file"));
    }

    #[test]
    fn token_expiry() {
        let now = Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap();
        let mut token = Token {
            access_token: "a".into(),
            token_type: "Bearer".into(),
            refresh_token: None,
            expiry: None,
        };
        assert!(!token.is_expired(now));
        token.expiry = Some(now + Duration::minutes(30));
        assert!(!token.is_expired(now));
        token.expiry = Some(now + Duration::seconds(30));
        assert!(token.is_expired(now));
    }

    #[test]
    fn zero_expiry_means_none() {
        let token: Token = serde_json::from_str(
            r#"{"access_token":"a","token_type":"Bearer","refresh_token":"r","expiry":"0001-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert!(token.expiry.is_none());
        assert_eq!(token.refresh_token.as_deref(), Some("r"));
    }

    #[test]
    fn token_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token.json");
        assert!(Token::load(&path).unwrap().is_none());
        let token = Token {
            access_token: "a".into(),
            token_type: "Bearer".into(),
            refresh_token: Some("r".into()),
            expiry: Some(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()),
        };
        token.save(&path).unwrap();
        assert_eq!(Token::load(&path).unwrap(), Some(token));
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn cached_token_skips_consent() {
        let dir = TempDir::new().unwrap();
        let config = DriveConfig {
            credentials_file: dir.path().join("credentials.json"),
            token_file: dir.path().join("token.json"),
        };
        fs::write(&config.credentials_file, INSTALLED).unwrap();
        fs::write(&config.token_file, r#"{"access_token":"cached","token_type":"Bearer"}"#).unwrap();

        let mut prompted = false;
        let token = access_token(&Client::new(), &config, &mut |_url: &str| {
            prompted = true;
            Ok(String::new())
        })
        .unwrap();
        assert_eq!(token, "cached");
        assert!(!prompted);
    }

    #[test]
    fn empty_code_is_rejected() {
        let dir = TempDir::new().unwrap();
        let config = DriveConfig {
            credentials_file: dir.path().join("credentials.json"),
            token_file: dir.path().join("token.json"),
        };
        fs::write(&config.credentials_file, INSTALLED).unwrap();
        let err = access_token(&Client::new(), &config, &mut |_url: &str| Ok("  \n".to_string())).unwrap_err();
        assert!(matches!(err, SyncError::Auth(_)));
        assert!(!config.token_file.exists());
    }
}
