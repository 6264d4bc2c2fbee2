use std::fmt;

use serde::Serialize;

/// Longest upload id the server accepts.
pub const MAX_UPLOAD_ID_LEN: usize = 200;

/// Length of the random component.
const RANDOM_LEN: usize = 13;

/// Identifies one upload attempt of one file.
///
/// Format: `{unix_millis}_{random}_{sanitized_name}`. The time and random
/// parts make two attempts of the same file distinct, so resumption only
/// applies within the attempt that generated the id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UploadId(String);

impl UploadId {
    /// Generates a fresh id for `file_name`.
    pub fn generate(file_name: &str) -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        let random = uuid::Uuid::new_v4().simple().to_string();
        Self::compose(millis, &random[..RANDOM_LEN], file_name)
    }

    fn compose(millis: i64, random: &str, file_name: &str) -> Self {
        let prefix = format!("{millis}_{random}_");
        let mut name = sanitize_file_name(file_name);
        // Sanitized names are ASCII, so byte truncation is safe.
        name.truncate(MAX_UPLOAD_ID_LEN.saturating_sub(prefix.len()));
        Self(prefix + &name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UploadId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Replaces every character outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
