//! Content sniffing and thumbnail rendering on top of the `image` crate.

use std::io::Cursor;

use image::{DynamicImage, GenericImageView, ImageFormat};
use portal_core::{AttachmentMimeType, ImageError, ImageInspector};

#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateInspector;

fn image_format(mime_type: AttachmentMimeType) -> ImageFormat {
    match mime_type {
        AttachmentMimeType::Jpeg => ImageFormat::Jpeg,
        AttachmentMimeType::Png => ImageFormat::Png,
    }
}

impl ImageInspector for ImageCrateInspector {
    fn sniff(&self, bytes: &[u8]) -> Option<String> {
        image::guess_format(bytes)
            .ok()
            .map(|format| format.to_mime_type().to_string())
    }

    fn thumbnail(
        &self,
        bytes: &[u8],
        mime_type: AttachmentMimeType,
        max_edge: u32,
    ) -> Result<Vec<u8>, ImageError> {
        let image = image::load_from_memory_with_format(bytes, image_format(mime_type))
            .map_err(|e| ImageError::Decode(e.to_string()))?;

        let (width, height) = image.dimensions();
        // `thumbnail` also enlarges, so small images keep their size.
        let image = if width > max_edge || height > max_edge {
            image.thumbnail(max_edge, max_edge)
        } else {
            image
        };

        let mut encoded = Vec::new();
        DynamicImage::ImageRgb8(image.to_rgb8())
            .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Jpeg)
            .map_err(|e| ImageError::Encode(e.to_string()))?;

        tracing::debug!(width, height, size = encoded.len(), "Rendered thumbnail");
        Ok(encoded)
    }
}
