//! Image attachment validation
//!
//! Attachments travel as base64 data URLs (`data:image/png;base64,...`).
//! Validation happens before the turn is dispatched; a malformed or
//! oversized attachment set never enters the pipeline.

use crate::core::error::DomainError;

/// Maximum number of images accepted per user message
pub const MAX_IMAGES_PER_MESSAGE: usize = 8;

/// Validate an image attachment set prior to dispatch.
pub fn validate_images(images: &[String]) -> Result<(), DomainError> {
    if images.len() > MAX_IMAGES_PER_MESSAGE {
        return Err(DomainError::TooManyAttachments {
            count: images.len(),
            max: MAX_IMAGES_PER_MESSAGE,
        });
    }

    for image in images {
        if !image.starts_with("data:image/") {
            return Err(DomainError::InvalidAttachment(
                "expected a data:image/... URL".to_string(),
            ));
        }
        if !image.contains(";base64,") {
            return Err(DomainError::InvalidAttachment(
                "expected base64-encoded image data".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set_is_valid() {
        assert!(validate_images(&[]).is_ok());
    }

    #[test]
    fn test_valid_data_url() {
        let images = vec!["data:image/png;base64,iVBORw0KGgo=".to_string()];
        assert!(validate_images(&images).is_ok());
    }

    #[test]
    fn test_rejects_non_image_url() {
        let images = vec!["https://example.com/cat.png".to_string()];
        assert!(matches!(
            validate_images(&images),
            Err(DomainError::InvalidAttachment(_))
        ));
    }

    #[test]
    fn test_rejects_missing_base64_marker() {
        let images = vec!["data:image/png,rawbytes".to_string()];
        assert!(matches!(
            validate_images(&images),
            Err(DomainError::InvalidAttachment(_))
        ));
    }

    #[test]
    fn test_rejects_too_many() {
        let images =
            vec!["data:image/png;base64,AAAA".to_string(); MAX_IMAGES_PER_MESSAGE + 1];
        assert!(matches!(
            validate_images(&images),
            Err(DomainError::TooManyAttachments { .. })
        ));
    }
}
