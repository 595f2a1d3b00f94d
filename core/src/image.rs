//! Image loading to tightly packed RGBA8.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from [`load_image`].
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("failed to read image {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Decoded image, 4 bytes per pixel in R, G, B, A order, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RgbaImage {
    pub const BYTES_PER_PIXEL: u32 = 4;

    pub fn bytes_per_row(&self) -> u32 {
        self.width * Self::BYTES_PER_PIXEL
    }

    /// Total byte size of the pixel data.
    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }
}

/// Load a BMP or PNG file and convert it to RGBA8.
pub fn load_image(path: &Path) -> Result<RgbaImage, ImageError> {
    let data = std::fs::read(path).map_err(|source| ImageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let img = image::load_from_memory(&data).map_err(|source| ImageError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    log::debug!("Loaded image {:?}: {}x{}", path, width, height);

    Ok(RgbaImage {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_png_to_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two.png");
        let source = image::RgbImage::from_raw(2, 1, vec![255, 0, 0, 0, 0, 255]).unwrap();
        source.save(&path).unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!((loaded.width, loaded.height), (2, 1));
        assert_eq!(loaded.pixels, vec![255, 0, 0, 255, 0, 0, 255, 255]);
        assert_eq!(loaded.bytes_per_row(), 8);
    }

    #[test]
    fn test_missing_file() {
        let err = load_image(Path::new("does/not/exist.bmp")).unwrap_err();
        assert!(matches!(err, ImageError::Io { .. }));
    }

    #[test]
    fn test_garbage_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.bmp");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(matches!(load_image(&path), Err(ImageError::Decode { .. })));
    }
}
