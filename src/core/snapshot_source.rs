use crate::errors::AppError;
use crate::shinobi::models::MonitorMetadata;
use async_trait::async_trait;
use image::ImageFormat;

// --- Decoded frame handed from a poller to its tile ---

#[derive(Debug, Clone)]
pub struct SnapshotFrame {
    pub rgba: Vec<u8>, // RGBA8, row-major
    pub width: u32,
    pub height: u32,
}

impl SnapshotFrame {
    pub fn decode_jpeg(bytes: &[u8]) -> Result<Self, AppError> {
        let img = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)
            .map_err(|e| AppError::Decode(format!("snapshot is not a valid JPEG: {}", e)))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(SnapshotFrame {
            rgba: rgba.into_raw(),
            width,
            height,
        })
    }
}

// --- The SnapshotSource Trait ---

/// Where a monitor tile gets its metadata and JPEG bytes from.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch_metadata(&self, server: &str, monitor_path: &str) -> Result<MonitorMetadata, AppError>;

    async fn fetch_snapshot(&self, server: &str, snapshot_path: &str) -> Result<Vec<u8>, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn decodes_jpeg_to_rgba() {
        let img = image::RgbImage::from_pixel(6, 4, image::Rgb([200, 10, 10]));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg).unwrap();

        let frame = SnapshotFrame::decode_jpeg(&buf).unwrap();
        assert_eq!((frame.width, frame.height), (6, 4));
        assert_eq!(frame.rgba.len(), 6 * 4 * 4);
    }

    #[test]
    fn rejects_non_jpeg_bytes() {
        assert!(matches!(
            SnapshotFrame::decode_jpeg(b"<html>login</html>"),
            Err(AppError::Decode(_))
        ));
    }
}
