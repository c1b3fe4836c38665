use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

use image::{ImageFormat, RgbaImage};
use log::error;

use crate::error::PixelveilError;
use crate::result::Result;

use super::LOSSY_EXTENSIONS;

pub const CHANNELS_PER_PIXEL: usize = 4;

/// RGBA carrier with 8 bits per channel.
///
/// `pixels.len() == width * height * 4` holds for every instance, embedding
/// produces a new carrier and leaves the original untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarrierImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl CarrierImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = buffer_len(width, height)?;
        if pixels.len() != expected {
            error!(
                "Pixel buffer of {} bytes does not match {width}x{height}",
                pixels.len()
            );
            return Err(PixelveilError::InvalidDimensions { width, height });
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// a carrier where every pixel has the same color
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self> {
        let len = buffer_len(width, height)?;
        let pixels = rgba.iter().copied().cycle().take(len).collect();

        Self::new(width, height, pixels)
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        ensure_png_target(path)?;

        let img = image::open(path).map_err(|e| {
            error!("Error decoding image {path:?}: {e}");
            PixelveilError::ImageDecodeFailure
        })?;

        Ok(img.to_rgba8().into())
    }

    pub fn from_png_bytes(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory_with_format(bytes, ImageFormat::Png).map_err(|e| {
            error!("Error decoding png data: {e}");
            PixelveilError::ImageDecodeFailure
        })?;

        Ok(img.to_rgba8().into())
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        ensure_png_target(path)?;

        let file = File::create(path).map_err(|e| {
            error!("Error creating file {path:?}: {e}");
            PixelveilError::IoError(e)
        })?;
        let mut writer = BufWriter::new(file);
        self.write_png(&mut writer)?;
        writer.flush()?;

        Ok(())
    }

    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.write_png(&mut buffer)?;

        Ok(buffer.into_inner())
    }

    fn write_png<W: Write + std::io::Seek>(&self, writer: &mut W) -> Result<()> {
        self.to_rgba()?
            .write_to(writer, ImageFormat::Png)
            .map_err(|e| {
                error!("Error saving image: {e}");
                PixelveilError::ImageEncodingError
            })
    }

    pub fn to_rgba(&self) -> Result<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.pixels.clone()).ok_or(
            PixelveilError::InvalidDimensions {
                width: self.width,
                height: self.height,
            },
        )
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// raw RGBA bytes, row by row
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * CHANNELS_PER_PIXEL;
        let mut rgba = [0u8; 4];
        rgba.copy_from_slice(&self.pixels[offset..offset + CHANNELS_PER_PIXEL]);

        Some(rgba)
    }
}

impl From<RgbaImage> for CarrierImage {
    fn from(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }
}

impl TryFrom<CarrierImage> for RgbaImage {
    type Error = PixelveilError;

    fn try_from(carrier: CarrierImage) -> Result<Self> {
        let (width, height) = carrier.dimensions();
        RgbaImage::from_raw(width, height, carrier.pixels)
            .ok_or(PixelveilError::InvalidDimensions { width, height })
    }
}

fn buffer_len(width: u32, height: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(CHANNELS_PER_PIXEL))
        .ok_or(PixelveilError::InvalidDimensions { width, height })
}

fn ensure_png_target(path: &Path) -> Result<()> {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return Err(PixelveilError::UnsupportedMedia);
    };
    let ext = ext.to_lowercase();
    if LOSSY_EXTENSIONS.contains(&ext.as_str()) {
        error!("Lossy media {path:?} would destroy the hidden payload");
        return Err(PixelveilError::UnsupportedMedia);
    }
    if ext != "png" {
        return Err(PixelveilError::UnsupportedMedia);
    }

    Ok(())
}
