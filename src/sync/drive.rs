//! Google Drive as a remote: the whole task list lives in one named file.

use reqwest::blocking::{Client, Response};
use serde::Deserialize;

use crate::io::store;
use crate::model::task::TaskList;

use super::{RemoteStore, SyncError};

/// Name of the backup file in the user's Drive
pub const BLOB_NAME: &str = "todos-backup.json";

const FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";
const BOUNDARY: &str = "todos-backup-boundary";

/// Minimal named-file storage. Ids are opaque to callers.
pub trait BlobClient {
    /// Id of the first live file called `name`, if any
    fn find_by_name(&self, name: &str) -> Result<Option<String>, SyncError>;
    /// Create a new file and return its id
    fn create(&self, name: &str, content: &[u8]) -> Result<String, SyncError>;
    /// Overwrite an existing file's content
    fn update(&self, id: &str, content: &[u8]) -> Result<String, SyncError>;
    fn download(&self, id: &str) -> Result<Vec<u8>, SyncError>;
}

/// What an upload did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upload {
    Created(String),
    Updated(String),
}

impl Upload {
    pub fn id(&self) -> &str {
        match self {
            Upload::Created(id) | Upload::Updated(id) => id,
        }
    }
}

/// A task list stored as a single blob
pub struct CloudStore<C: BlobClient> {
    client: C,
    name: String,
}

impl<C: BlobClient> CloudStore<C> {
    pub fn new(client: C) -> Self {
        Self::named(client, BLOB_NAME)
    }

    pub fn named(client: C, name: impl Into<String>) -> Self {
        CloudStore {
            client,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Update the blob in place when it exists, otherwise create it
    pub fn upload(&self, list: &TaskList) -> Result<Upload, SyncError> {
        let body = store::encode(list)?;
        match self.client.find_by_name(&self.name)? {
            Some(id) => {
                let id = self.client.update(&id, body.as_bytes())?;
                tracing::info!(file = %self.name, %id, "updated cloud backup");
                Ok(Upload::Updated(id))
            }
            None => {
                let id = self.client.create(&self.name, body.as_bytes())?;
                tracing::info!(file = %self.name, %id, "created cloud backup");
                Ok(Upload::Created(id))
            }
        }
    }
}

impl<C: BlobClient> RemoteStore for CloudStore<C> {
    fn describe(&self) -> String {
        format!("Google Drive ({})", self.name)
    }

    fn fetch(&self) -> Result<TaskList, SyncError> {
        let id = self
            .client
            .find_by_name(&self.name)?
            .ok_or_else(|| SyncError::NotFound(format!("'{}' in Google Drive", self.name)))?;
        let bytes = self.client.download(&id)?;
        Ok(store::decode(&bytes)?)
    }

    fn store(&self, list: &TaskList) -> Result<(), SyncError> {
        self.upload(list).map(|_| ())
    }
}

// ---------------------------------------------------------------------------
// Drive v3 REST client
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileEntry>,
}

#[derive(Deserialize)]
struct FileEntry {
    id: String,
}

/// Talks to the Drive v3 REST API with a bearer token
pub struct DriveClient {
    client: Client,
    access_token: String,
}

impl DriveClient {
    pub fn new(client: Client, access_token: impl Into<String>) -> Self {
        DriveClient {
            client,
            access_token: access_token.into(),
        }
    }
}

/// Drive query for a non-trashed file with an exact name
pub fn name_query(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
    format!("name='{}' and trashed=false", escaped)
}

/// `multipart/related` body carrying metadata and content in one request
fn multipart_body(name: &str, content: &[u8]) -> Result<Vec<u8>, SyncError> {
    let metadata = serde_json::json!({ "name": name, "mimeType": "application/json" });
    let mut body = Vec::with_capacity(content.len() + 256);
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(serde_json::to_string(&metadata)?.as_bytes());
    body.extend_from_slice(format!("\r\n--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(b"Content-Type: application/json\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    Ok(body)
}

fn check_status(resp: Response) -> Result<Response, SyncError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(SyncError::Auth(format!("Google Drive rejected the token: {}", body.trim())));
    }
    Err(SyncError::Status {
        code: status.as_u16(),
        body: body.trim().to_string(),
    })
}

impl BlobClient for DriveClient {
    fn find_by_name(&self, name: &str) -> Result<Option<String>, SyncError> {
        let query = name_query(name);
        let resp = self
            .client
            .get(FILES_URL)
            .bearer_auth(&self.access_token)
            .query(&[("q", query.as_str()), ("fields", "files(id, name)"), ("spaces", "drive")])
            .send()?;
        let list: FileList = check_status(resp)?.json()?;
        Ok(list.files.into_iter().next().map(|f| f.id))
    }

    fn create(&self, name: &str, content: &[u8]) -> Result<String, SyncError> {
        let resp = self
            .client
            .post(UPLOAD_URL)
            .bearer_auth(&self.access_token)
            .query(&[("uploadType", "multipart"), ("fields", "id")])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", BOUNDARY),
            )
            .body(multipart_body(name, content)?)
            .send()?;
        let entry: FileEntry = check_status(resp)?.json()?;
        Ok(entry.id)
    }

    fn update(&self, id: &str, content: &[u8]) -> Result<String, SyncError> {
        let resp = self
            .client
            .patch(format!("{}/{}", UPLOAD_URL, id))
            .bearer_auth(&self.access_token)
            .query(&[("uploadType", "media"), ("fields", "id")])
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(content.to_vec())
            .send()?;
        let entry: FileEntry = check_status(resp)?.json()?;
        Ok(entry.id)
    }

    fn download(&self, id: &str) -> Result<Vec<u8>, SyncError> {
        let resp = self
            .client
            .get(format!("{}/{}", FILES_URL, id))
            .bearer_auth(&self.access_token)
            .query(&[("alt", "media")])
            .send()?;
        Ok(check_status(resp)?.bytes()?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::task_ops::{self, NewTask};
    use std::cell::RefCell;

    /// In-memory blob store keyed by generated ids
    #[derive(Default)]
    struct MemoryBlobs {
        files: RefCell<Vec<(String, String, Vec<u8>)>>,
        creates: RefCell<usize>,
    }

    impl BlobClient for &MemoryBlobs {
        fn find_by_name(&self, name: &str) -> Result<Option<String>, SyncError> {
            Ok(self
                .files
                .borrow()
                .iter()
                .find(|(_, n, _)| n == name)
                .map(|(id, _, _)| id.clone()))
        }

        fn create(&self, name: &str, content: &[u8]) -> Result<String, SyncError> {
            *self.creates.borrow_mut() += 1;
            let id = format!("file-{}", self.files.borrow().len() + 1);
            self.files
                .borrow_mut()
                .push((id.clone(), name.to_string(), content.to_vec()));
            Ok(id)
        }

        fn update(&self, id: &str, content: &[u8]) -> Result<String, SyncError> {
            let mut files = self.files.borrow_mut();
            let entry = files
                .iter_mut()
                .find(|(fid, _, _)| fid == id)
                .ok_or_else(|| SyncError::NotFound(id.to_string()))?;
            entry.2 = content.to_vec();
            Ok(id.to_string())
        }

        fn download(&self, id: &str) -> Result<Vec<u8>, SyncError> {
            self.files
                .borrow()
                .iter()
                .find(|(fid, _, _)| fid == id)
                .map(|(_, _, bytes)| bytes.clone())
                .ok_or_else(|| SyncError::NotFound(id.to_string()))
        }
    }

    fn sample(titles: &[&str]) -> TaskList {
        let mut list = TaskList::default();
        for title in titles {
            task_ops::add_task(&mut list, NewTask::titled(*title)).unwrap();
        }
        list
    }

    #[test]
    fn first_upload_creates_then_updates() {
        let blobs = MemoryBlobs::default();
        let cloud = CloudStore::new(&blobs);

        let first = cloud.upload(&sample(&["a"])).unwrap();
        assert_eq!(first, Upload::Created("file-1".into()));
        let second = cloud.upload(&sample(&["a", "b"])).unwrap();
        assert_eq!(second, Upload::Updated("file-1".into()));

        assert_eq!(*blobs.creates.borrow(), 1);
        assert_eq!(blobs.files.borrow().len(), 1);
        assert_eq!(blobs.files.borrow()[0].1, BLOB_NAME);
    }

    #[test]
    fn fetch_reads_back_what_was_stored() {
        let blobs = MemoryBlobs::default();
        let cloud = CloudStore::new(&blobs);
        let list = sample(&["one", "two"]);
        cloud.store(&list).unwrap();
        assert_eq!(cloud.fetch().unwrap(), list);
    }

    #[test]
    fn stored_blob_is_pretty_json() {
        let blobs = MemoryBlobs::default();
        let cloud = CloudStore::new(&blobs);
        cloud.store(&sample(&["one"])).unwrap();
        let text = String::from_utf8(blobs.files.borrow()[0].2.clone()).unwrap();
        assert!(text.contains("\n  \"todos\""));
    }

    #[test]
    fn fetch_without_blob_is_not_found() {
        let blobs = MemoryBlobs::default();
        let cloud = CloudStore::new(&blobs);
        let err = cloud.fetch().unwrap_err();
        assert!(matches!(err, SyncError::NotFound(ref what) if what.contains(BLOB_NAME)));
    }

    #[test]
    fn fetch_rejects_garbage_blob() {
        let blobs = MemoryBlobs::default();
        (&blobs).create(BLOB_NAME, b"not json").unwrap();
        let cloud = CloudStore::new(&blobs);
        assert!(matches!(cloud.fetch(), Err(SyncError::Decode(_))));
    }

    #[test]
    fn query_escapes_quotes() {
        assert_eq!(name_query(BLOB_NAME), "name='todos-backup.json' and trashed=false");
        assert_eq!(name_query("it's"), "name='it\\'s' and trashed=false");
    }

    #[test]
    fn multipart_carries_metadata_and_content() {
        let body = String::from_utf8(multipart_body("x.json", b"{\"todos\":[]}").unwrap()).unwrap();
        assert!(body.starts_with(&format!("--{}\r\n", BOUNDARY)));
        assert!(body.contains("\"name\":\"x.json\""));
        assert!(body.contains("{\"todos\":[]}"));
        assert!(body.ends_with(&format!("--{}--\r\n", BOUNDARY)));
    }
}
