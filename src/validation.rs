//! Pre-submission validation gate
//!
//! Checks a selected file's declared media type and byte size, and parses
//! the raw price field, before any network call is made. Type checking is
//! by declared media type only; the file content is never sniffed.

use crate::models::CandidateFile;
use thiserror::Error;

/// Declared media types accepted at selection time.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/png", "image/jpeg", "image/jpg"];

/// Upper bound on the candidate file size, in megabytes.
pub const MAX_FILE_SIZE_MB: f64 = 5.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Please select an image file (png or jpeg)")]
    UnsupportedType { content_type: String },

    #[error("Please select an image file (png or jpeg)")]
    MissingFile,

    #[error("File size must be less than 5MB")]
    FileTooLarge { size_bytes: u64 },

    #[error("Price must be a number")]
    InvalidPrice { raw: String },
}

/// Gate a freshly selected file on its declared media type.
///
/// Returns the candidate unchanged when the declared type is on the
/// allow-list; otherwise the candidate is dropped and the caller gets the
/// user-visible rejection.
pub fn select_file(candidate: CandidateFile) -> Result<CandidateFile, ValidationError> {
    if ALLOWED_IMAGE_TYPES.contains(&candidate.content_type.as_str()) {
        Ok(candidate)
    } else {
        Err(ValidationError::UnsupportedType {
            content_type: candidate.content_type,
        })
    }
}

/// Enforce the size ceiling. Evaluated on every submission attempt, never
/// cached from selection time.
pub fn check_size(file: &CandidateFile) -> Result<(), ValidationError> {
    let size_mb = file.size_bytes() as f64 / (1024.0 * 1024.0);
    if size_mb > MAX_FILE_SIZE_MB {
        return Err(ValidationError::FileTooLarge {
            size_bytes: file.size_bytes(),
        });
    }
    Ok(())
}

/// Parse the raw price field into a number.
///
/// Non-numeric and non-finite input is rejected here rather than flowing
/// into the record as an invalid value.
pub fn parse_price(raw: &str) -> Result<f64, ValidationError> {
    let invalid = || ValidationError::InvalidPrice {
        raw: raw.to_string(),
    };

    let price: f64 = raw.trim().parse().map_err(|_| invalid())?;
    if !price.is_finite() {
        return Err(invalid());
    }
    Ok(price)
}
