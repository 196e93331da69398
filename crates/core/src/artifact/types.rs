//! Types for the artifact module.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Base name used when the source has no usable title.
pub const FALLBACK_BASE_NAME: &str = "media";

/// Infix that marks intermediate artifact names.
const INTERMEDIATE_INFIX: &str = "_input";

/// How long an artifact is expected to live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactRole {
    /// Input to a later processing step, deleted right after that step.
    Intermediate,
    /// Offered to the client, deleted after delivery.
    Final,
}

/// A file location inside the artifact store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPath {
    base_dir: PathBuf,
    file_name: String,
    role: ArtifactRole,
}

impl ArtifactPath {
    pub(crate) fn new(base_dir: PathBuf, file_name: String, role: ArtifactRole) -> Self {
        Self {
            base_dir,
            file_name,
            role,
        }
    }

    /// Builds the name for a new artifact: `<base>[_input]_<unique>.<ext>`.
    pub(crate) fn compose_name(
        base_name: &str,
        unique: &str,
        extension: &str,
        role: ArtifactRole,
    ) -> String {
        let base = sanitize_base_name(base_name);
        let infix = match role {
            ArtifactRole::Intermediate => INTERMEDIATE_INFIX,
            ArtifactRole::Final => "",
        };
        let ext = extension.trim_start_matches('.');
        format!("{}{}_{}.{}", base, infix, unique, ext)
    }

    /// Directory the artifact lives in.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Generated file name, also used as the delivery token for finals.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn role(&self) -> ArtifactRole {
        self.role
    }

    /// Full filesystem path.
    pub fn path(&self) -> PathBuf {
        self.base_dir.join(&self.file_name)
    }

    /// File extension, lowercased.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }

    /// The delivery token clients use to fetch this artifact.
    pub fn token(&self) -> DeliveryToken {
        DeliveryToken(self.file_name.clone())
    }
}

impl std::fmt::Display for ArtifactPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path().display())
    }
}

/// Opaque identifier under which a final artifact is downloadable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryToken(String);

impl DeliveryToken {
    /// Parses a client-supplied token.
    ///
    /// Returns `None` for anything that could escape the store directory.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty()
            || raw == "."
            || raw == ".."
            || raw.contains('/')
            || raw.contains('\\')
            || raw.contains('\0')
        {
            return None;
        }
        Some(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DeliveryToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a best-effort delete.
///
/// Cleanup never fails the surrounding operation; callers either inspect
/// the outcome or discard it explicitly.
#[must_use = "discard cleanup outcomes explicitly with `let _ =`"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// The file existed and was removed.
    Removed,
    /// There was nothing to remove.
    Absent,
    /// Removal failed; the reason has already been logged.
    Failed(String),
}

/// Replaces every character that is not a word character, whitespace,
/// `.` or `-` with `_`.
///
/// Leading dots are replaced as well so a title can never produce a
/// hidden file or a `..` component.
pub fn sanitize_base_name(title: &str) -> String {
    static DISALLOWED: OnceLock<Regex> = OnceLock::new();
    let re = DISALLOWED
        .get_or_init(|| Regex::new(r"[^\w\s.\-]").expect("sanitizer pattern is valid"));

    let trimmed = title.trim();
    if trimmed.is_empty() {
        return FALLBACK_BASE_NAME.to_string();
    }

    let replaced = re.replace_all(trimmed, "_").into_owned();

    let dots = replaced.len() - replaced.trim_start_matches('.').len();
    format!("{}{}", "_".repeat(dots), &replaced[dots..])
}
