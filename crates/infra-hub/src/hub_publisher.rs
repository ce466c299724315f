// Hub publisher (preupload -> optional LFS transfer -> commit)
// reason: reqwest for HTTP, base64 for inline content, sha2/hex for LFS object ids
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::{debug, info};

use trainpush_core::domain::HubToken;
use trainpush_core::port::{ArtifactPublisher, ArtifactUpload, PublishError, PublishReceipt};

/// Hub base URL override
pub const HF_ENDPOINT_VAR: &str = "HF_ENDPOINT";

pub const DEFAULT_ENDPOINT: &str = "https://huggingface.co";

pub const REVISION: &str = "main";

/// Leading bytes sent to the preupload endpoint so the hub can classify the file
const PREUPLOAD_SAMPLE_BYTES: usize = 512;

const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

const LFS_CONTENT_TYPE: &str = "application/vnd.git-lfs+json";

/// Multipart transfers announce their part size under this header key
const CHUNK_SIZE_KEY: &str = "chunk_size";

/// Subset of the commit response we surface
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitResponse {
    commit_url: Option<String>,
    commit_oid: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum UploadMode {
    Regular,
    Lfs,
}

#[derive(Debug, Deserialize)]
struct PreuploadResponse {
    files: Vec<PreuploadFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreuploadFile {
    path: String,
    upload_mode: UploadMode,
    #[serde(default)]
    should_ignore: bool,
}

#[derive(Debug, Deserialize)]
struct LfsBatchResponse {
    objects: Vec<LfsObject>,
}

#[derive(Debug, Deserialize)]
struct LfsObject {
    oid: String,
    #[serde(default)]
    actions: Option<LfsActions>,
    #[serde(default)]
    error: Option<LfsObjectError>,
}

#[derive(Debug, Deserialize)]
struct LfsActions {
    upload: Option<LfsAction>,
    verify: Option<LfsAction>,
}

#[derive(Debug, Deserialize)]
struct LfsAction {
    href: String,
    #[serde(default)]
    header: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct LfsObjectError {
    code: i64,
    message: String,
}

/// Content-addressed id of the artifact in LFS storage
#[derive(Debug, Clone, PartialEq, Eq)]
struct LfsPointer {
    oid: String,
    size: usize,
}

impl LfsPointer {
    fn of(content: &[u8]) -> Self {
        Self {
            oid: hex::encode(Sha256::digest(content)),
            size: content.len(),
        }
    }
}

/// Header values arrive as strings or numbers
fn header_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Uploads one file to a model repository
///
/// The hub decides per file whether content travels inline in the commit
/// (`regular`) or through LFS storage first (`lfs`). Weights files are LFS.
pub struct HubPublisher {
    client: reqwest::Client,
    endpoint: String,
}

impl HubPublisher {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    /// Endpoint from `HF_ENDPOINT`, defaulting to the public hub
    pub fn from_env() -> Self {
        let endpoint = std::env::var(HF_ENDPOINT_VAR)
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        Self::new(endpoint)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn preupload_url(&self, upload: &ArtifactUpload) -> String {
        format!(
            "{}/api/models/{}/preupload/{}",
            self.endpoint, upload.repo_id, REVISION
        )
    }

    fn commit_url(&self, upload: &ArtifactUpload) -> String {
        format!(
            "{}/api/models/{}/commit/{}",
            self.endpoint, upload.repo_id, REVISION
        )
    }

    fn lfs_batch_url(&self, upload: &ArtifactUpload) -> String {
        format!(
            "{}/{}.git/info/lfs/objects/batch",
            self.endpoint, upload.repo_id
        )
    }

    fn repo_url(&self, upload: &ArtifactUpload) -> String {
        format!("{}/{}", self.endpoint, upload.repo_id)
    }

    async fn read_artifact(upload: &ArtifactUpload) -> Result<Vec<u8>, PublishError> {
        match tokio::fs::read(&upload.local_path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(
                PublishError::ArtifactMissing(upload.local_path.display().to_string()),
            ),
            Err(e) => Err(PublishError::Io(e.to_string())),
        }
    }

    /// Send a request and parse a JSON body from a 2xx response
    async fn send_json<T: DeserializeOwned>(
        request: reqwest::RequestBuilder,
    ) -> Result<T, PublishError> {
        let response = request
            .send()
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(PublishError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            PublishError::InvalidResponse(format!("failed to parse response: {}, body: {}", e, body))
        })
    }

    /// Ask the hub how this file must be transferred
    async fn preupload(
        &self,
        upload: &ArtifactUpload,
        content: &[u8],
        token: &HubToken,
    ) -> Result<UploadMode, PublishError> {
        let sample = &content[..content.len().min(PREUPLOAD_SAMPLE_BYTES)];
        let request = self
            .client
            .post(self.preupload_url(upload))
            .bearer_auth(token.expose())
            .json(&json!({
                "files": [{
                    "path": upload.path_in_repo,
                    "sample": BASE64.encode(sample),
                    "size": content.len(),
                }]
            }));

        let response: PreuploadResponse = Self::send_json(request).await?;
        let file = response
            .files
            .into_iter()
            .find(|f| f.path == upload.path_in_repo)
            .ok_or_else(|| {
                PublishError::InvalidResponse(format!(
                    "preupload response does not mention {}",
                    upload.path_in_repo
                ))
            })?;

        if file.should_ignore {
            return Err(PublishError::PathIgnored(file.path));
        }

        debug!(path = %file.path, mode = ?file.upload_mode, "Preupload classified file");
        Ok(file.upload_mode)
    }

    /// Put the content into LFS storage (no-op when the hub already has it)
    async fn lfs_upload(
        &self,
        upload: &ArtifactUpload,
        content: Vec<u8>,
        pointer: &LfsPointer,
        token: &HubToken,
    ) -> Result<(), PublishError> {
        let request = self
            .client
            .post(self.lfs_batch_url(upload))
            .bearer_auth(token.expose())
            .header(reqwest::header::ACCEPT, LFS_CONTENT_TYPE)
            .header(reqwest::header::CONTENT_TYPE, LFS_CONTENT_TYPE)
            .body(
                json!({
                    "operation": "upload",
                    "transfers": ["basic", "multipart"],
                    "objects": [{ "oid": pointer.oid, "size": pointer.size }],
                    "hash_algo": "sha256",
                    "ref": { "name": REVISION },
                })
                .to_string(),
            );

        let batch: LfsBatchResponse = Self::send_json(request).await?;
        let object = batch
            .objects
            .into_iter()
            .find(|o| o.oid == pointer.oid)
            .ok_or_else(|| {
                PublishError::InvalidResponse("LFS batch response has no matching object".to_string())
            })?;

        if let Some(err) = object.error {
            return Err(PublishError::LfsTransfer(format!(
                "{}: {}",
                err.code, err.message
            )));
        }

        let Some(actions) = object.actions else {
            info!(oid = %pointer.oid, "Object already in LFS storage");
            return Ok(());
        };
        let Some(upload_action) = actions.upload else {
            info!(oid = %pointer.oid, "Object already in LFS storage");
            return Ok(());
        };

        info!(
            oid = %pointer.oid,
            bytes = pointer.size,
            multipart = upload_action.header.contains_key(CHUNK_SIZE_KEY),
            "Uploading object to LFS storage"
        );

        if upload_action.header.contains_key(CHUNK_SIZE_KEY) {
            self.put_multipart(&upload_action, content, pointer).await?;
        } else {
            self.put_single(&upload_action, content).await?;
        }

        if let Some(verify) = actions.verify {
            let mut request = self
                .client
                .post(&verify.href)
                .bearer_auth(token.expose())
                .header(reqwest::header::ACCEPT, LFS_CONTENT_TYPE)
                .header(reqwest::header::CONTENT_TYPE, LFS_CONTENT_TYPE);
            for (name, value) in &verify.header {
                request = request.header(name.as_str(), header_value(value));
            }
            let response = request
                .body(json!({ "oid": pointer.oid, "size": pointer.size }).to_string())
                .send()
                .await
                .map_err(|e| PublishError::Transport(e.to_string()))?;
            if !response.status().is_success() {
                return Err(PublishError::LfsTransfer(format!(
                    "verify returned {}",
                    response.status()
                )));
            }
        }

        Ok(())
    }

    async fn put_single(&self, action: &LfsAction, content: Vec<u8>) -> Result<(), PublishError> {
        let mut request = self.client.put(&action.href);
        for (name, value) in &action.header {
            request = request.header(name.as_str(), header_value(value));
        }

        let response = request
            .body(content)
            .send()
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PublishError::LfsTransfer(format!(
                "storage returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    /// One PUT per announced part URL, then a completion call on the action href
    async fn put_multipart(
        &self,
        action: &LfsAction,
        content: Vec<u8>,
        pointer: &LfsPointer,
    ) -> Result<(), PublishError> {
        let chunk_size = action
            .header
            .get(CHUNK_SIZE_KEY)
            .and_then(|v| header_value(v).parse::<usize>().ok())
            .filter(|size| *size > 0)
            .ok_or_else(|| PublishError::LfsTransfer("invalid chunk_size".to_string()))?;

        let mut part_urls: Vec<(u32, String)> = action
            .header
            .iter()
            .filter_map(|(key, value)| key.parse::<u32>().ok().map(|n| (n, header_value(value))))
            .collect();
        part_urls.sort_by_key(|(n, _)| *n);

        let chunks: Vec<&[u8]> = content.chunks(chunk_size).collect();
        if chunks.len() != part_urls.len() {
            return Err(PublishError::LfsTransfer(format!(
                "{} parts announced for {} chunks",
                part_urls.len(),
                chunks.len()
            )));
        }

        let mut parts = Vec::with_capacity(chunks.len());
        for (index, (chunk, (_, url))) in chunks.into_iter().zip(&part_urls).enumerate() {
            let response = self
                .client
                .put(url)
                .body(chunk.to_vec())
                .send()
                .await
                .map_err(|e| PublishError::Transport(e.to_string()))?;

            if !response.status().is_success() {
                return Err(PublishError::LfsTransfer(format!(
                    "part {} returned {}",
                    index + 1,
                    response.status()
                )));
            }

            let etag = response
                .headers()
                .get(reqwest::header::ETAG)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| {
                    PublishError::LfsTransfer(format!("part {} returned no etag", index + 1))
                })?
                .to_string();

            debug!(part = index + 1, "LFS part stored");
            parts.push(json!({ "partNumber": index + 1, "etag": etag }));
        }

        let response = self
            .client
            .post(&action.href)
            .header(reqwest::header::ACCEPT, LFS_CONTENT_TYPE)
            .header(reqwest::header::CONTENT_TYPE, LFS_CONTENT_TYPE)
            .body(json!({ "oid": pointer.oid, "parts": parts }).to_string())
            .send()
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PublishError::LfsTransfer(format!(
                "multipart completion returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Second NDJSON line: inline content or an LFS pointer
fn file_line(upload: &ArtifactUpload, content: &[u8], pointer: Option<&LfsPointer>) -> Value {
    match pointer {
        Some(pointer) => json!({
            "key": "lfsFile",
            "value": {
                "path": upload.path_in_repo,
                "algo": "sha256",
                "oid": pointer.oid,
            }
        }),
        None => json!({
            "key": "file",
            "value": {
                "content": BASE64.encode(content),
                "path": upload.path_in_repo,
                "encoding": "base64",
            }
        }),
    }
}

/// Header line + one file line
fn build_commit_body(upload: &ArtifactUpload, file: Value) -> String {
    let header = json!({
        "key": "header",
        "value": {
            "summary": format!("Upload {} with trainpush", upload.path_in_repo),
            "description": "",
        }
    });

    format!("{}\n{}\n", header, file)
}

#[async_trait]
impl ArtifactPublisher for HubPublisher {
    async fn publish(
        &self,
        upload: &ArtifactUpload,
        token: &HubToken,
    ) -> Result<PublishReceipt, PublishError> {
        let content = Self::read_artifact(upload).await?;
        let mode = self.preupload(upload, &content, token).await?;

        let file = match mode {
            UploadMode::Regular => file_line(upload, &content, None),
            UploadMode::Lfs => {
                let pointer = LfsPointer::of(&content);
                self.lfs_upload(upload, content, &pointer, token).await?;
                file_line(upload, &[], Some(&pointer))
            }
        };

        let url = self.commit_url(upload);
        info!(
            url = %url,
            mode = ?mode,
            path_in_repo = %upload.path_in_repo,
            "Committing artifact to hub"
        );

        let request = self
            .client
            .post(&url)
            .bearer_auth(token.expose())
            .header(reqwest::header::CONTENT_TYPE, NDJSON_CONTENT_TYPE)
            .body(build_commit_body(upload, file));
        let commit: CommitResponse = Self::send_json(request).await?;

        debug!(commit_oid = ?commit.commit_oid, "Hub accepted commit");

        Ok(PublishReceipt {
            repo_url: self.repo_url(upload),
            commit_url: commit.commit_url,
            commit_oid: commit.commit_oid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::path::PathBuf;

    const PREUPLOAD_PATH: &str = "/api/models/someone/flux-lora/preupload/main";
    const COMMIT_PATH: &str = "/api/models/someone/flux-lora/commit/main";
    const BATCH_PATH: &str = "/someone/flux-lora.git/info/lfs/objects/batch";

    fn upload_for(local_path: PathBuf) -> ArtifactUpload {
        ArtifactUpload {
            local_path,
            path_in_repo: "flux_lora.safetensors".to_string(),
            repo_id: "someone/flux-lora".to_string(),
        }
    }

    fn write_artifact(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("flux_lora.safetensors");
        std::fs::write(&path, b"fake-weights").unwrap();
        path
    }

    fn fake_weights_oid() -> String {
        hex::encode(Sha256::digest(b"fake-weights"))
    }

    fn preupload_body(mode: &str, should_ignore: bool) -> String {
        json!({
            "files": [{
                "path": "flux_lora.safetensors",
                "uploadMode": mode,
                "shouldIgnore": should_ignore,
            }]
        })
        .to_string()
    }

    async fn mock_preupload(server: &mut mockito::ServerGuard, mode: &str) -> mockito::Mock {
        server
            .mock("POST", PREUPLOAD_PATH)
            .match_header("authorization", "Bearer hf_second")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#""path":"flux_lora.safetensors""#.to_string()),
                Matcher::Regex(r#""size":12"#.to_string()),
            ]))
            .with_status(200)
            .with_body(preupload_body(mode, false))
            .create_async()
            .await
    }

    async fn mock_commit(server: &mut mockito::ServerGuard, body: Matcher) -> mockito::Mock {
        server
            .mock("POST", COMMIT_PATH)
            .match_header("authorization", "Bearer hf_second")
            .match_header("content-type", "application/x-ndjson")
            .match_body(body)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"success":true,"commitOid":"abc123","commitUrl":"https://hub.test/someone/flux-lora/commit/abc123"}"#,
            )
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_regular_file_is_committed_inline() {
        let dir = tempfile::tempdir().unwrap();
        let upload = upload_for(write_artifact(dir.path()));

        let mut server = mockito::Server::new_async().await;
        let preupload = mock_preupload(&mut server, "regular").await;
        let commit = mock_commit(
            &mut server,
            Matcher::AllOf(vec![
                Matcher::Regex(r#""path":"flux_lora.safetensors""#.to_string()),
                Matcher::Regex(r#""encoding":"base64""#.to_string()),
                Matcher::Regex(BASE64.encode(b"fake-weights")),
            ]),
        )
        .await;

        let publisher = HubPublisher::new(server.url());
        let receipt = publisher
            .publish(&upload, &HubToken::new("hf_second"))
            .await
            .unwrap();

        preupload.assert_async().await;
        commit.assert_async().await;
        assert_eq!(receipt.repo_url, format!("{}/someone/flux-lora", server.url()));
        assert_eq!(receipt.commit_oid.as_deref(), Some("abc123"));
        assert!(receipt.commit_url.is_some());
    }

    #[tokio::test]
    async fn test_lfs_file_goes_through_storage() {
        let dir = tempfile::tempdir().unwrap();
        let upload = upload_for(write_artifact(dir.path()));
        let oid = fake_weights_oid();

        let mut server = mockito::Server::new_async().await;
        let _preupload = mock_preupload(&mut server, "lfs").await;
        let batch = server
            .mock("POST", BATCH_PATH)
            .match_header("authorization", "Bearer hf_second")
            .match_header("accept", LFS_CONTENT_TYPE)
            .match_body(Matcher::AllOf(vec![
                Matcher::PartialJson(json!({ "operation": "upload", "hash_algo": "sha256" })),
                Matcher::Regex(format!(r#""oid":"{}""#, oid)),
            ]))
            .with_status(200)
            .with_body(
                json!({
                    "objects": [{
                        "oid": oid,
                        "size": 12,
                        "actions": {
                            "upload": {
                                "href": format!("{}/lfs-storage/object", server.url()),
                                "header": { "x-amz-acl": "private" }
                            },
                            "verify": {
                                "href": format!("{}/lfs-verify", server.url())
                            }
                        }
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;
        let storage = server
            .mock("PUT", "/lfs-storage/object")
            .match_header("x-amz-acl", "private")
            .match_body("fake-weights")
            .with_status(200)
            .create_async()
            .await;
        let verify = server
            .mock("POST", "/lfs-verify")
            .match_body(Matcher::Json(json!({ "oid": oid, "size": 12 })))
            .with_status(200)
            .create_async()
            .await;
        let commit = mock_commit(
            &mut server,
            Matcher::AllOf(vec![
                Matcher::Regex(r#""key":"lfsFile""#.to_string()),
                Matcher::Regex(format!(r#""oid":"{}""#, oid)),
            ]),
        )
        .await;

        let publisher = HubPublisher::new(server.url());
        let receipt = publisher
            .publish(&upload, &HubToken::new("hf_second"))
            .await
            .unwrap();

        batch.assert_async().await;
        storage.assert_async().await;
        verify.assert_async().await;
        commit.assert_async().await;
        assert_eq!(receipt.commit_oid.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_lfs_object_already_stored() {
        let dir = tempfile::tempdir().unwrap();
        let upload = upload_for(write_artifact(dir.path()));
        let oid = fake_weights_oid();

        let mut server = mockito::Server::new_async().await;
        let _preupload = mock_preupload(&mut server, "lfs").await;
        let _batch = server
            .mock("POST", BATCH_PATH)
            .with_status(200)
            .with_body(json!({ "objects": [{ "oid": oid, "size": 12 }] }).to_string())
            .create_async()
            .await;
        let storage = server
            .mock("PUT", Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let commit = mock_commit(&mut server, Matcher::Regex(r#""key":"lfsFile""#.to_string())).await;

        let publisher = HubPublisher::new(server.url());
        publisher
            .publish(&upload, &HubToken::new("hf_second"))
            .await
            .unwrap();

        storage.assert_async().await;
        commit.assert_async().await;
    }

    #[tokio::test]
    async fn test_lfs_multipart_upload() {
        let dir = tempfile::tempdir().unwrap();
        let upload = upload_for(write_artifact(dir.path()));
        let oid = fake_weights_oid();

        let mut server = mockito::Server::new_async().await;
        let _preupload = mock_preupload(&mut server, "lfs").await;
        let _batch = server
            .mock("POST", BATCH_PATH)
            .with_status(200)
            .with_body(
                json!({
                    "objects": [{
                        "oid": oid,
                        "size": 12,
                        "actions": {
                            "upload": {
                                "href": format!("{}/lfs-complete", server.url()),
                                "header": {
                                    "chunk_size": "5",
                                    "00002": format!("{}/part/2", server.url()),
                                    "00001": format!("{}/part/1", server.url()),
                                    "00003": format!("{}/part/3", server.url()),
                                }
                            }
                        }
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let mut part_mocks = Vec::new();
        for (n, chunk) in [(1, "fake-"), (2, "weigh"), (3, "ts")] {
            part_mocks.push(
                server
                    .mock("PUT", format!("/part/{}", n).as_str())
                    .match_body(chunk)
                    .with_status(200)
                    .with_header("etag", &format!("etag-{}", n))
                    .create_async()
                    .await,
            );
        }
        let complete = server
            .mock("POST", "/lfs-complete")
            .match_body(Matcher::Json(json!({
                "oid": oid,
                "parts": [
                    { "partNumber": 1, "etag": "etag-1" },
                    { "partNumber": 2, "etag": "etag-2" },
                    { "partNumber": 3, "etag": "etag-3" },
                ]
            })))
            .with_status(200)
            .create_async()
            .await;
        let commit = mock_commit(&mut server, Matcher::Regex(r#""key":"lfsFile""#.to_string())).await;

        let publisher = HubPublisher::new(server.url());
        publisher
            .publish(&upload, &HubToken::new("hf_second"))
            .await
            .unwrap();

        for part in &part_mocks {
            part.assert_async().await;
        }
        complete.assert_async().await;
        commit.assert_async().await;
    }

    #[tokio::test]
    async fn test_lfs_object_error_stops_before_commit() {
        let dir = tempfile::tempdir().unwrap();
        let upload = upload_for(write_artifact(dir.path()));
        let oid = fake_weights_oid();

        let mut server = mockito::Server::new_async().await;
        let _preupload = mock_preupload(&mut server, "lfs").await;
        let _batch = server
            .mock("POST", BATCH_PATH)
            .with_status(200)
            .with_body(
                json!({
                    "objects": [{
                        "oid": oid,
                        "size": 12,
                        "error": { "code": 422, "message": "Object too large" }
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;
        let commit = server
            .mock("POST", COMMIT_PATH)
            .expect(0)
            .create_async()
            .await;

        let publisher = HubPublisher::new(server.url());
        let result = publisher.publish(&upload, &HubToken::new("hf_second")).await;

        match result {
            Err(PublishError::LfsTransfer(msg)) => assert!(msg.contains("Object too large")),
            other => panic!("expected LFS failure, got {:?}", other),
        }
        commit.assert_async().await;
    }

    #[tokio::test]
    async fn test_ignored_path_is_not_committed() {
        let dir = tempfile::tempdir().unwrap();
        let upload = upload_for(write_artifact(dir.path()));

        let mut server = mockito::Server::new_async().await;
        let _preupload = server
            .mock("POST", PREUPLOAD_PATH)
            .with_status(200)
            .with_body(preupload_body("regular", true))
            .create_async()
            .await;
        let commit = server
            .mock("POST", COMMIT_PATH)
            .expect(0)
            .create_async()
            .await;

        let publisher = HubPublisher::new(server.url());
        let result = publisher.publish(&upload, &HubToken::new("hf_second")).await;

        assert!(matches!(result, Err(PublishError::PathIgnored(_))));
        commit.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_token() {
        let dir = tempfile::tempdir().unwrap();
        let upload = upload_for(write_artifact(dir.path()));

        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", PREUPLOAD_PATH)
            .with_status(401)
            .with_body("Invalid credentials in Authorization header")
            .create_async()
            .await;

        let publisher = HubPublisher::new(server.url());
        let result = publisher.publish(&upload, &HubToken::new("bad")).await;

        match result {
            Err(PublishError::Rejected { status, body }) => {
                assert_eq!(status, 401);
                assert!(body.contains("Invalid credentials"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_artifact_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let upload = upload_for(dir.path().join("absent.safetensors"));

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let publisher = HubPublisher::new(server.url());
        let result = publisher.publish(&upload, &HubToken::new("tok")).await;

        assert!(matches!(result, Err(PublishError::ArtifactMissing(_))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unparseable_commit_body() {
        let dir = tempfile::tempdir().unwrap();
        let upload = upload_for(write_artifact(dir.path()));

        let mut server = mockito::Server::new_async().await;
        let _preupload = mock_preupload(&mut server, "regular").await;
        let _mock = server
            .mock("POST", COMMIT_PATH)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let publisher = HubPublisher::new(server.url());
        let result = publisher.publish(&upload, &HubToken::new("hf_second")).await;

        assert!(matches!(result, Err(PublishError::InvalidResponse(_))));
    }

    #[test]
    fn test_model_repository_urls() {
        let publisher = HubPublisher::new("https://hub.example/");
        let upload = upload_for(PathBuf::from("/x"));

        assert_eq!(publisher.endpoint(), "https://hub.example");
        assert_eq!(
            publisher.preupload_url(&upload),
            "https://hub.example/api/models/someone/flux-lora/preupload/main"
        );
        assert_eq!(
            publisher.commit_url(&upload),
            "https://hub.example/api/models/someone/flux-lora/commit/main"
        );
        assert_eq!(
            publisher.lfs_batch_url(&upload),
            "https://hub.example/someone/flux-lora.git/info/lfs/objects/batch"
        );
        assert_eq!(publisher.repo_url(&upload), "https://hub.example/someone/flux-lora");
    }

    #[test]
    fn test_commit_body_lines() {
        let upload = upload_for(PathBuf::from("/x"));

        let inline = build_commit_body(&upload, file_line(&upload, b"abc", None));
        let lines: Vec<Value> = inline
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["key"], "header");
        assert_eq!(lines[1]["key"], "file");
        assert_eq!(lines[1]["value"]["content"], "YWJj");

        let pointer = LfsPointer::of(b"abc");
        let lfs = build_commit_body(&upload, file_line(&upload, &[], Some(&pointer)));
        let lines: Vec<Value> = lfs
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines[1]["key"], "lfsFile");
        assert_eq!(lines[1]["value"]["algo"], "sha256");
        assert_eq!(
            lines[1]["value"]["oid"],
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert!(lines[1]["value"].get("content").is_none());
    }
}
