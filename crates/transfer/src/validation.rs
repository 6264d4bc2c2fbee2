use chunkdrop_protocol::constants::MAX_FILE_SIZE;

use crate::types::FileDescriptor;

/// File extensions accepted for upload (lowercase, without the dot).
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    // Documents
    "pdf", "doc", "docx", "txt", "rtf", "odt", "xls", "xlsx", "ppt", "pptx",
    // Images
    "jpg", "jpeg", "png", "gif", "bmp", "svg", "webp",
    // Audio
    "mp3", "wav", "ogg", "flac",
    // Video
    "mp4", "avi", "mov", "mkv", "webm",
    // Archives
    "zip", "rar", "7z", "tar", "gz", "tgz", "bz2", "xz",
    // Text and data
    "csv", "json", "xml", "html", "css", "js", "log", "md", "yaml", "yml",
];

/// Why a file was refused before any task was created for it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("file name is empty")]
    EmptyName,

    #[error("exceeds size limit ({size} > {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },

    #[error("file type not allowed: .{extension}")]
    DisallowedType { extension: String },
}

/// Checks submitted files against the server's size and type policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validator {
    /// Largest accepted file in bytes.
    pub max_file_size: u64,
    /// Reject files whose extension is not in [`ALLOWED_EXTENSIONS`].
    pub enforce_allowed_types: bool,
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            enforce_allowed_types: true,
        }
    }
}

impl Validator {
    /// Validates one file. Size is checked before type.
    pub fn validate(&self, file: &FileDescriptor) -> Result<(), ValidationError> {
        if file.name().is_empty() {
            return Err(ValidationError::EmptyName);
        }

        if file.size() > self.max_file_size {
            return Err(ValidationError::TooLarge {
                size: file.size(),
                limit: self.max_file_size,
            });
        }

        if self.enforce_allowed_types && !is_file_type_allowed(file.name()) {
            return Err(ValidationError::DisallowedType {
                extension: extension_of(file.name()),
            });
        }

        Ok(())
    }
}

/// Returns `true` if the text after the last `.` is an allowed extension.
///
/// A name without a dot is matched as a whole.
pub fn is_file_type_allowed(file_name: &str) -> bool {
    let extension = extension_of(file_name);
    ALLOWED_EXTENSIONS.contains(&extension.as_str())
}

fn extension_of(file_name: &str) -> String {
    file_name
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}
