//! Object store reader. Downloads bucket documents to local snapshot files,
//! always fetching the latest version and overwriting any existing copy.

use std::path::Path;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

pub const LEDGER_OBJECT: &str = "unique_words.json";
pub const PROMPTS_OBJECT: &str = "prompts.md";

const DEFAULT_BASE_URL: &str = "https://storage.googleapis.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to build the object store HTTP client")]
    ClientBuild(#[source] reqwest::Error),
    #[error("failed to fetch {object:?} from bucket {bucket:?}")]
    Request {
        bucket: String,
        object: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("object store returned HTTP {status} for {object:?} in bucket {bucket:?}")]
    Status {
        bucket: String,
        object: String,
        status: u16,
    },
    #[error("failed to write snapshot of {object:?} to {path}")]
    Write {
        object: String,
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read snapshot at {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub struct ObjectStore {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
    access_token: Option<String>,
}

impl ObjectStore {
    pub fn new(
        bucket: impl Into<String>,
        access_token: Option<String>,
    ) -> Result<Self, StorageError> {
        Self::with_base_url(DEFAULT_BASE_URL, bucket, access_token)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        bucket: impl Into<String>,
        access_token: Option<String>,
    ) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("wordform-report/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(StorageError::ClientBuild)?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            bucket: bucket.into(),
            access_token,
        })
    }

    /// Download `object` into `dir` (created if missing, snapshot overwritten)
    /// and return the document contents.
    pub async fn download_to_dir(&self, object: &str, dir: &Path) -> Result<String, StorageError> {
        let dest = dir.join(object);
        self.download_to_file(object, &dest).await?;

        tokio::fs::read_to_string(&dest)
            .await
            .map_err(|source| StorageError::Read {
                path: dest.display().to_string(),
                source,
            })
    }

    pub async fn download_to_file(&self, object: &str, dest: &Path) -> Result<(), StorageError> {
        let url = format!("{}/{}/{}", self.base_url, self.bucket, object);
        let mut request = self.client.get(&url);
        if let Some(ref token) = self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|source| StorageError::Request {
            bucket: self.bucket.clone(),
            object: object.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Status {
                bucket: self.bucket.clone(),
                object: object.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| StorageError::Request {
                bucket: self.bucket.clone(),
                object: object.to_string(),
                source,
            })?;

        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| write_error(object, parent, source))?;
            }
        }
        tokio::fs::write(dest, &bytes)
            .await
            .map_err(|source| write_error(object, dest, source))?;

        debug!(object, path = %dest.display(), bytes = bytes.len(), "downloaded object");
        Ok(())
    }
}

fn write_error(object: &str, path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Write {
        object: object.to_string(),
        path: path.display().to_string(),
        source,
    }
}

impl std::fmt::Debug for ObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStore")
            .field("base_url", &self.base_url)
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn serve(object: &str, body: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/word-bucket/{object}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn download_writes_the_snapshot_and_returns_contents() {
        let server = serve(LEDGER_OBJECT, r#"{"files":[]}"#).await;
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::with_base_url(server.uri(), "word-bucket", None).unwrap();

        let raw = store
            .download_to_dir(LEDGER_OBJECT, dir.path())
            .await
            .unwrap();

        assert_eq!(raw, r#"{"files":[]}"#);
        let on_disk = std::fs::read_to_string(dir.path().join(LEDGER_OBJECT)).unwrap();
        assert_eq!(on_disk, raw);
    }

    #[tokio::test]
    async fn download_overwrites_a_stale_snapshot() {
        let server = serve(PROMPTS_OBJECT, "# fresh\nnew prompt").await;
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PROMPTS_OBJECT), "# stale").unwrap();
        let store = ObjectStore::with_base_url(server.uri(), "word-bucket", None).unwrap();

        let raw = store
            .download_to_dir(PROMPTS_OBJECT, dir.path())
            .await
            .unwrap();

        assert_eq!(raw, "# fresh\nnew prompt");
    }

    #[tokio::test]
    async fn download_creates_a_missing_scratch_directory() {
        let server = serve(LEDGER_OBJECT, "{}").await;
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("downloads");
        let store = ObjectStore::with_base_url(server.uri(), "word-bucket", None).unwrap();

        store.download_to_dir(LEDGER_OBJECT, &nested).await.unwrap();

        assert!(nested.join(LEDGER_OBJECT).exists());
    }

    #[tokio::test]
    async fn missing_object_is_a_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::with_base_url(server.uri(), "word-bucket", None).unwrap();

        let err = store
            .download_to_dir(LEDGER_OBJECT, dir.path())
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn bearer_token_is_attached_when_configured() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/word-bucket/{LEDGER_OBJECT}")))
            .and(header("authorization", "Bearer sekrit"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();
        let store =
            ObjectStore::with_base_url(server.uri(), "word-bucket", Some("sekrit".to_string()))
                .unwrap();

        let raw = store
            .download_to_dir(LEDGER_OBJECT, dir.path())
            .await
            .unwrap();
        assert_eq!(raw, "{}");
    }
}
