//! Data Model
//!
//! The handful of types shared by the backend client and the views.
//!
//! - [`Message`]: one chat line, user or bot
//! - [`Document`]: one entry of the record store's history
//! - [`UploadSelection`]: a local file picked for upload
//! - [`UploadFile`]: the bytes of a selection, read at dispatch time
//! - [`HealthReport`]: what `/api/query/health` says about the backend

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Chat
// ============================================================================

/// Who wrote a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Typed by the user
    User,
    /// Answer or notice from PolicyBot
    Bot,
}

impl Sender {
    /// Transcript prefix for this sender
    #[must_use]
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::User => "You: ",
            Self::Bot => "PolicyBot: ",
        }
    }
}

/// A chat message
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who wrote it
    pub sender: Sender,
    /// Message text, shown verbatim
    pub text: String,
}

impl Message {
    /// A message typed by the user
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    /// A message from PolicyBot
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
        }
    }
}

// ============================================================================
// Documents
// ============================================================================

/// Backend-assigned document identifier
///
/// The record store uses numeric ids, but nothing here depends on that;
/// string ids are carried through unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentId {
    /// Numeric id (the record store's auto-increment key)
    Number(i64),
    /// Any other id shape
    Text(String),
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for DocumentId {
    fn from(id: i64) -> Self {
        Self::Number(id)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

/// One document in the record store's history
///
/// Extra fields the backend sends (stored content, for instance) are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Backend identifier, used for deletes
    pub id: DocumentId,
    /// Original filename
    pub name: String,
    /// Upload time as reported by the record store
    #[serde(
        default,
        rename = "uploadedAt",
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub uploaded_at: Option<NaiveDateTime>,
}

impl Document {
    /// Create a document entry without an upload time
    pub fn new(id: impl Into<DocumentId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            uploaded_at: None,
        }
    }
}

/// Accepts an ISO-8601 string or a `[y, m, d, h, min, s, nanos]` array.
///
/// Both shapes show up depending on how the backend's JSON mapper is set up.
/// Anything else becomes `None` rather than failing the whole history.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::String(s) => NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S"))
            .ok(),
        serde_json::Value::Array(parts) => {
            let nums: Vec<i64> = parts.iter().filter_map(serde_json::Value::as_i64).collect();
            if nums.len() < 3 {
                return None;
            }
            let part = |i: usize| nums.get(i).copied().unwrap_or(0);
            let date = NaiveDate::from_ymd_opt(
                i32::try_from(part(0)).ok()?,
                u32::try_from(part(1)).ok()?,
                u32::try_from(part(2)).ok()?,
            )?;
            date.and_hms_nano_opt(
                u32::try_from(part(3)).ok()?,
                u32::try_from(part(4)).ok()?,
                u32::try_from(part(5)).ok()?,
                u32::try_from(part(6)).ok()?,
            )
        }
        _ => None,
    }))
}

// ============================================================================
// Uploads
// ============================================================================

/// A local file chosen for upload
///
/// Exists only between selection and a successful upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadSelection {
    /// Where the file lives
    pub path: PathBuf,
    /// Filename sent to the backend
    pub name: String,
}

impl UploadSelection {
    /// Select a file by path; the name is the last path component
    ///
    /// Returns `None` for paths without a file name (`/`, `..`, empty).
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        let name = path.file_name()?.to_string_lossy().into_owned();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            path: path.to_path_buf(),
            name,
        })
    }
}

/// File contents ready to send as the multipart `file` field
#[derive(Clone, Debug)]
pub struct UploadFile {
    /// Filename reported to the backend
    pub name: String,
    /// Raw file bytes
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Build an upload from in-memory bytes
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

// ============================================================================
// Health
// ============================================================================

/// Backend self-report from `/api/query/health`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthReport {
    /// Overall status ("healthy" / "unhealthy")
    pub status: String,
    /// Vector store connectivity line
    pub vector_store: Option<String>,
    /// LLM service connectivity line
    pub llm_service: Option<String>,
    /// Documents returned by the probe search
    pub documents_count: Option<u64>,
}

impl HealthReport {
    /// Whether the backend calls itself healthy
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}
