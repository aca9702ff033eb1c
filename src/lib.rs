// Copyright (c) 2026 framewatch contributors
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT
// See the LICENSE file at the repository root.
use std::path::PathBuf;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// 2D Point in pixel coordinates
pub type Point2i = Vector2<i32>;

/// Minimum width and height of a capture region, in pixels.
pub const MIN_REGION_EXTENT: i32 = 10;

/// Rectangular screen area being sampled, in screen coordinates.
///
/// Always satisfies `right - left >= MIN_REGION_EXTENT` and
/// `bottom - top >= MIN_REGION_EXTENT`; construct it through [`Region::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "[i32; 4]", into = "[i32; 4]")]
pub struct Region {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

impl Region {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Result<Self> {
        let width = i64::from(right) - i64::from(left);
        let height = i64::from(bottom) - i64::from(top);
        if width < i64::from(MIN_REGION_EXTENT) || height < i64::from(MIN_REGION_EXTENT) {
            return Err(Error::InvalidRegion { width, height });
        }
        Ok(Region {
            left,
            top,
            right,
            bottom,
        })
    }

    /// Centers a `width` x `height` area on a screen of the given size.
    pub fn centered(width: u32, height: u32, screen_width: u32, screen_height: u32) -> Result<Self> {
        let left = (i64::from(screen_width) - i64::from(width)) / 2;
        let top = (i64::from(screen_height) - i64::from(height)) / 2;
        let clamp = |v: i64| v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        Region::new(
            clamp(left),
            clamp(top),
            clamp(left + i64::from(width)),
            clamp(top + i64::from(height)),
        )
    }

    pub fn left(&self) -> i32 {
        self.left
    }

    pub fn top(&self) -> i32 {
        self.top
    }

    pub fn right(&self) -> i32 {
        self.right
    }

    pub fn bottom(&self) -> i32 {
        self.bottom
    }

    pub fn width(&self) -> u32 {
        (i64::from(self.right) - i64::from(self.left)) as u32
    }

    pub fn height(&self) -> u32 {
        (i64::from(self.bottom) - i64::from(self.top)) as u32
    }
}

impl TryFrom<[i32; 4]> for Region {
    type Error = Error;

    fn try_from(v: [i32; 4]) -> Result<Self> {
        Region::new(v[0], v[1], v[2], v[3])
    }
}

impl From<Region> for [i32; 4] {
    fn from(r: Region) -> Self {
        [r.left, r.top, r.right, r.bottom]
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}) to ({}, {})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

/// Owned 8-bit RGB image, row-major, 3 bytes per pixel.
///
/// Every frame handed to the detectors is in red-green-blue order. Sources
/// delivering another layout convert through [`Frame::from_bgr`] or
/// [`Frame::from_rgba`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Frame {
    pub const CHANNELS: usize = 3;

    /// Wraps an RGB buffer. Fails if `data` does not hold exactly `width * height` pixels.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * Self::CHANNELS;
        if data.len() != expected {
            return Err(Error::InvalidBuffer {
                expected,
                actual: data.len(),
            });
        }
        Ok(Frame {
            data,
            width,
            height,
        })
    }

    /// A frame where every pixel has the same color.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * Self::CHANNELS)
            .collect();
        Frame {
            data,
            width,
            height,
        }
    }

    /// Builds a frame from a blue-green-red buffer, swapping to RGB.
    pub fn from_bgr(width: u32, height: u32, mut data: Vec<u8>) -> Result<Self> {
        for px in data.chunks_exact_mut(Self::CHANNELS) {
            px.swap(0, 2);
        }
        Frame::new(width, height, data)
    }

    /// Builds a frame from an RGBA buffer, dropping alpha.
    pub fn from_rgba(width: u32, height: u32, data: &[u8]) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(Error::InvalidBuffer {
                expected,
                actual: data.len(),
            });
        }
        let rgb = data
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();
        Frame::new(width, height, rgb)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns the RGB triple at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * Self::CHANNELS;
        Some([self.data[i], self.data[i + 1], self.data[i + 2]])
    }

    /// Writes `rgb` at `(x, y)`. Out-of-bounds writes are ignored.
    pub fn put_pixel(&mut self, x: i32, y: i32, rgb: [u8; 3]) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * Self::CHANNELS;
        self.data[i..i + Self::CHANNELS].copy_from_slice(&rgb);
    }

    /// Copies out the `width` x `height` window starting at `(x, y)`.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Result<Frame> {
        if x.saturating_add(width) > self.width || y.saturating_add(height) > self.height {
            return Err(Error::CaptureFailure(format!(
                "crop {}x{}+{}+{} exceeds {}x{} image",
                width, height, x, y, self.width, self.height
            )));
        }
        let row = self.width as usize * Self::CHANNELS;
        let mut data = Vec::with_capacity(width as usize * height as usize * Self::CHANNELS);
        for r in y as usize..(y + height) as usize {
            let start = r * row + x as usize * Self::CHANNELS;
            data.extend_from_slice(&self.data[start..start + width as usize * Self::CHANNELS]);
        }
        Frame::new(width, height, data)
    }

    /// Converts into an `image` crate buffer for encoding.
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.data.clone())
    }
}

impl From<image::RgbImage> for Frame {
    fn from(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Frame {
            data: img.into_raw(),
            width,
            height,
        }
    }
}

/// Borrowed single-channel 8-bit image, used for grayscale, mask and
/// difference buffers without copying.
///
/// # Fields
/// * `data` - A slice representing a 1D contiguous array of 8-bit pixels.
/// * `width` - The logical width of the frame in pixels.
/// * `height` - The logical height of the frame in pixels.
pub struct ImageBuffer<'a> {
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
}

/// Errors raised while configuring, capturing, detecting or exporting.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("region must be at least {min}x{min} pixels, got {width}x{height}", min = MIN_REGION_EXTENT)]
    InvalidRegion { width: i64, height: i64 },

    #[error("no capture region selected")]
    NoRegionSelected,

    #[error("need {needed} samples, window holds {available}")]
    InsufficientHistory { needed: usize, available: usize },

    #[error("image buffer holds {actual} bytes, expected {expected}")]
    InvalidBuffer { expected: usize, actual: usize },

    #[error("capture failed: {0}")]
    CaptureFailure(String),

    #[error("capture already running")]
    AlreadyRunning,

    #[error("failed to write {}: {source}", path.display())]
    ExportIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {}: {source}", path.display())]
    ImageEncode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

pub mod analyzer;
pub mod config;
pub mod core;
pub mod cv;
pub mod report;
pub mod source;

pub use crate::analyzer::Analyzer;
pub use crate::config::Settings;
pub use crate::core::incident::{DetectorKind, Incident, IncidentLog};
