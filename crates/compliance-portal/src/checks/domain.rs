use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier correlating a receipt with its audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckId(pub Uuid);

impl CheckId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Principal the check is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actor(pub String);

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Category of verification requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckType {
    Criminal,
    Credit,
    Employment,
    Identity,
}

impl CheckType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "criminal" => Some(Self::Criminal),
            "credit" => Some(Self::Credit),
            "employment" => Some(Self::Employment),
            "identity" => Some(Self::Identity),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Criminal => "criminal",
            Self::Credit => "credit",
            Self::Employment => "employment",
            Self::Identity => "identity",
        }
    }
}

impl fmt::Display for CheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Verdict reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    Clear,
    Hit,
    Review,
}

impl CheckStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Clear => "CLEAR",
            Self::Hit => "HIT",
            Self::Review => "REVIEW",
        }
    }
}

/// Individual being checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    pub cpf: String,
    pub dob: NaiveDate,
}

/// File part received with a submission. Contents never leave the upload store.
#[derive(Clone, Default)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Raw form fields as received; nothing here has been validated.
#[derive(Debug, Clone, Default)]
pub struct CheckSubmission {
    pub name: Option<String>,
    pub cpf: Option<String>,
    pub dob: Option<String>,
    pub check_type: Option<String>,
    pub purpose: Option<String>,
    pub email: Option<String>,
    pub consent: Option<String>,
    pub file: Option<UploadedFile>,
}

/// Submission that passed intake validation.
#[derive(Debug, Clone)]
pub struct CheckRequest {
    pub subject: Subject,
    pub check_type: CheckType,
    pub purpose: String,
    pub email: String,
    pub file: Option<UploadedFile>,
}

/// Metadata describing a staged upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub original_name: String,
    pub stored_as: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderResult {
    pub provider: String,
    #[serde(rename = "type")]
    pub check_type: CheckType,
    pub subject: Subject,
    pub status: CheckStatus,
    pub notes: String,
    pub link: Option<String>,
}

/// One line of the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub check_id: CheckId,
    pub timestamp: DateTime<Utc>,
    pub actor: Actor,
    pub purpose: String,
    pub email: String,
    pub check_type: CheckType,
    pub subject: Subject,
    pub attachment: Option<Attachment>,
    pub result_status: CheckStatus,
}

/// Body returned to the caller for a completed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReceipt {
    pub check_id: CheckId,
    pub timestamp: DateTime<Utc>,
    pub actor: Actor,
    pub result: ProviderResult,
}
