//! Decoded images waiting to be uploaded by the renderer.

use pointform::{RenderError, TextureHandle, TextureLoader};
use std::path::{Path, PathBuf};

/// RGBA8 pixels of one image.
#[derive(Debug)]
pub struct DecodedTexture {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Decodes images from disk and hands out handles. Loading the same path
/// twice returns the same handle.
#[derive(Debug, Default)]
pub struct TextureStore {
    textures: Vec<DecodedTexture>,
}

impl TextureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&DecodedTexture> {
        self.textures.get(handle.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

impl TextureLoader for TextureStore {
    fn load_texture(&mut self, path: &Path) -> Result<TextureHandle, RenderError> {
        if let Some(i) = self.textures.iter().position(|t| t.path == path) {
            return Ok(TextureHandle(i as u32));
        }

        let img = image::open(path).map_err(|e| RenderError::AssetLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        log::info!("loaded texture {} ({width}x{height})", path.display());

        let handle = TextureHandle(self.textures.len() as u32);
        self.textures.push(DecodedTexture {
            path: path.to_path_buf(),
            width,
            height,
            rgba: rgba.into_raw(),
        });
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_asset_error() {
        let mut store = TextureStore::new();
        let err = store
            .load_texture(Path::new("does/not/exist.jpg"))
            .unwrap_err();
        assert!(matches!(err, RenderError::AssetLoad { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn decodes_png_once() {
        let path = std::env::temp_dir().join(format!("pointform-tex-{}.png", std::process::id()));
        image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let mut store = TextureStore::new();
        let a = store.load_texture(&path).unwrap();
        let b = store.load_texture(&path).unwrap();
        assert_eq!(a, b);

        let tex = store.get(a).unwrap();
        assert_eq!((tex.width, tex.height), (3, 2));
        assert_eq!(&tex.rgba[..4], &[10, 20, 30, 255]);
        let _ = std::fs::remove_file(path);
    }
}
