//! GitHub API payload types
//!
//! Serde types for repository and content responses. Only the fields the
//! client uses are modeled; everything else in the API payloads is ignored.

use serde::Deserialize;

fn default_branch_fallback() -> String {
    "main".to_string()
}

/// Repository metadata from `/user/repos` and `/repos/{owner}/{name}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoInfo {
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub private: bool,
    /// Branch content operations resolve against; the API may omit it for
    /// freshly created empty repositories.
    #[serde(default = "default_branch_fallback")]
    pub default_branch: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// One entry from a contents listing, or the metadata of a single file.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    /// Blob revision hash; the optimistic-concurrency token required to
    /// update or delete this file.
    pub sha: String,
    /// `"file"`, `"dir"`, `"symlink"`, or `"submodule"`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub size: u64,
    /// Direct raw-content link; absent for some blobs (e.g. in submodules).
    #[serde(default)]
    pub download_url: Option<String>,
    /// Inline base64 payload, present on single-file metadata responses.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
}

impl ContentEntry {
    pub fn is_file(&self) -> bool {
        self.kind == "file"
    }

    pub fn is_dir(&self) -> bool {
        self.kind == "dir"
    }
}

/// Commit created by a content write or delete.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitInfo {
    pub sha: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Response envelope for content writes and deletes.
///
/// `content` is the new blob metadata on writes and `null` on deletes.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentWriteResponse {
    #[serde(default)]
    pub content: Option<ContentEntry>,
    pub commit: CommitInfo,
}
