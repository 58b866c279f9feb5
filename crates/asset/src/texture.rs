//! Texture decoding into CPU-side pixel buffers, plus the mip pyramid.

use std::path::Path;

use image::{DynamicImage, ImageBuffer, imageops::FilterType};

use crate::error::{AssetError, Result};

/// Channel layout of decoded 8-bit texture data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    R8,
    Rgb8,
    Rgba8,
}

impl TextureFormat {
    pub fn from_channels(channels: u8) -> Option<Self> {
        match channels {
            1 => Some(Self::R8),
            3 => Some(Self::Rgb8),
            4 => Some(Self::Rgba8),
            _ => None,
        }
    }

    #[inline]
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            Self::R8 => 1,
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }
}

/// One level of a mip pyramid.
#[derive(Clone, Debug, PartialEq)]
pub struct MipLevel {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Texture data in CPU-friendly format before GPU upload.
#[derive(Clone, Debug)]
pub struct TextureData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

impl TextureData {
    pub fn new(width: u32, height: u32, format: TextureFormat, data: Vec<u8>) -> Self {
        debug_assert_eq!(
            data.len(),
            (width * height * format.bytes_per_pixel()) as usize,
            "Data size doesn't match {format:?}"
        );
        Self {
            data,
            width,
            height,
            format,
        }
    }

    /// Decode an image file. The channel layout follows the decoded component count;
    /// two-channel (grey + alpha) images are rejected.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading texture from {:?}", path);

        let img = image::open(path).map_err(|source| match source {
            image::ImageError::IoError(e) => AssetError::io(path, e),
            source => AssetError::Decode {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let channels = img.color().channel_count();
        let format =
            TextureFormat::from_channels(channels).ok_or_else(|| AssetError::UnsupportedChannels {
                path: path.to_path_buf(),
                channels,
            })?;

        let (width, height) = (img.width(), img.height());
        let data = match format {
            TextureFormat::R8 => img.into_luma8().into_raw(),
            TextureFormat::Rgb8 => img.into_rgb8().into_raw(),
            TextureFormat::Rgba8 => img.into_rgba8().into_raw(),
        };

        log::info!(
            "Loaded texture {}x{} {:?} with {} bytes",
            width,
            height,
            format,
            data.len()
        );

        Ok(Self::new(width, height, format, data))
    }

    /// Placeholder used when a texture file is missing (checkerboard pattern).
    pub fn checkerboard(size: u32) -> Self {
        let mut data = Vec::with_capacity((size * size * 4) as usize);

        for y in 0..size {
            for x in 0..size {
                let checker = ((x / 8) + (y / 8)) % 2;
                if checker == 0 {
                    data.extend_from_slice(&[255, 255, 255, 255]);
                } else {
                    data.extend_from_slice(&[128, 128, 128, 255]);
                }
            }
        }

        Self::new(size, size, TextureFormat::Rgba8, data)
    }

    /// Number of levels down to 1x1.
    pub fn mip_level_count(&self) -> u32 {
        32 - self.width.max(self.height).max(1).leading_zeros()
    }

    /// Full mip pyramid, level 0 first. Each level halves both sides (min 1)
    /// and is filtered from the previous one.
    pub fn mip_chain(&self) -> Vec<MipLevel> {
        let mut levels = vec![MipLevel {
            width: self.width,
            height: self.height,
            data: self.data.clone(),
        }];

        let Some(mut current) = self.to_dynamic() else {
            log::warn!("Texture data does not match its size; skipping mipmaps");
            return levels;
        };

        let (mut w, mut h) = (self.width, self.height);
        while w > 1 || h > 1 {
            w = (w / 2).max(1);
            h = (h / 2).max(1);
            current = current.resize_exact(w, h, FilterType::Triangle);
            levels.push(MipLevel {
                width: w,
                height: h,
                data: current.as_bytes().to_vec(),
            });
        }
        levels
    }

    /// Pixels widened to RGBA8. Single-channel data lands in red, as GL samples it.
    pub fn rgba8_pixels(format: TextureFormat, data: &[u8]) -> Vec<u8> {
        match format {
            TextureFormat::Rgba8 => data.to_vec(),
            TextureFormat::Rgb8 => data
                .chunks_exact(3)
                .flat_map(|p| [p[0], p[1], p[2], 255])
                .collect(),
            TextureFormat::R8 => data.iter().flat_map(|&r| [r, 0, 0, 255]).collect(),
        }
    }

    /// Check if the texture data is valid.
    pub fn is_valid(&self) -> bool {
        let expected_size = (self.width * self.height * self.format.bytes_per_pixel()) as usize;
        self.data.len() == expected_size && self.width > 0 && self.height > 0
    }

    fn to_dynamic(&self) -> Option<DynamicImage> {
        let (w, h, data) = (self.width, self.height, self.data.clone());
        Some(match self.format {
            TextureFormat::R8 => DynamicImage::ImageLuma8(ImageBuffer::from_raw(w, h, data)?),
            TextureFormat::Rgb8 => DynamicImage::ImageRgb8(ImageBuffer::from_raw(w, h, data)?),
            TextureFormat::Rgba8 => DynamicImage::ImageRgba8(ImageBuffer::from_raw(w, h, data)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("asset-tex-{}-{}", tag, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn mip_chain_of_4x2_has_three_levels() {
        let tex = TextureData::new(4, 2, TextureFormat::Rgba8, vec![200; 4 * 2 * 4]);
        let chain = tex.mip_chain();
        let sizes: Vec<_> = chain.iter().map(|l| (l.width, l.height)).collect();
        assert_eq!(sizes, vec![(4, 2), (2, 1), (1, 1)]);
        assert_eq!(tex.mip_level_count(), 3);
        assert_eq!(chain[2].data.len(), 4);
        // constant image stays constant under filtering
        assert!(chain[1].data.iter().all(|&b| b == 200));
    }

    #[test]
    fn mip_chain_keeps_channel_layout() {
        let tex = TextureData::new(8, 8, TextureFormat::R8, vec![7; 64]);
        let chain = tex.mip_chain();
        assert_eq!(chain.len(), 4);
        assert_eq!(chain[1].data.len(), 16);
    }

    #[test]
    fn channel_counts_map_to_formats() {
        assert_eq!(TextureFormat::from_channels(1), Some(TextureFormat::R8));
        assert_eq!(TextureFormat::from_channels(2), None);
        assert_eq!(TextureFormat::from_channels(3), Some(TextureFormat::Rgb8));
        assert_eq!(TextureFormat::from_channels(4), Some(TextureFormat::Rgba8));
    }

    #[test]
    fn load_rgb_png_keeps_three_channels() {
        let dir = temp_dir("rgb");
        let path = dir.join("rgb.png");
        image::RgbImage::from_pixel(3, 2, image::Rgb([1, 2, 3]))
            .save(&path)
            .unwrap();

        let tex = TextureData::load(&path).unwrap();
        assert_eq!(tex.format, TextureFormat::Rgb8);
        assert_eq!((tex.width, tex.height), (3, 2));
        assert!(tex.is_valid());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_grey_alpha_png_is_rejected() {
        let dir = temp_dir("la");
        let path = dir.join("la.png");
        image::GrayAlphaImage::from_pixel(2, 2, image::LumaA([9, 255]))
            .save(&path)
            .unwrap();

        let err = TextureData::load(&path).err();
        assert!(matches!(
            err,
            Some(AssetError::UnsupportedChannels { channels: 2, .. })
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_garbage_is_decode_error() {
        let dir = temp_dir("bad");
        let path = dir.join("bad.png");
        std::fs::write(&path, b"not a png at all").unwrap();
        assert!(matches!(
            TextureData::load(&path),
            Err(AssetError::Decode { .. })
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn rgba_widening() {
        let px = TextureData::rgba8_pixels(TextureFormat::Rgb8, &[1, 2, 3, 4, 5, 6]);
        assert_eq!(px, vec![1, 2, 3, 255, 4, 5, 6, 255]);
        let px = TextureData::rgba8_pixels(TextureFormat::R8, &[9]);
        assert_eq!(px, vec![9, 0, 0, 255]);
    }

    #[test]
    fn checkerboard_is_valid() {
        let tex = TextureData::checkerboard(16);
        assert!(tex.is_valid());
        assert_eq!(&tex.data[..4], &[255, 255, 255, 255]);
    }
}
