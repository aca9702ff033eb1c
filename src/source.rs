// Copyright (c) 2026 framewatch contributors
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT
// See the LICENSE file at the repository root.
// src/source.rs

//! Frame sources. Every source hands back RGB frames of exactly the
//! requested region size.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{Error, Frame, Region, Result};

/// Synchronous producer of one frame for a region.
pub trait FrameSource: Send {
    fn capture(&mut self, region: &Region) -> Result<Frame>;
}

impl<F> FrameSource for F
where
    F: FnMut(&Region) -> Result<Frame> + Send,
{
    fn capture(&mut self, region: &Region) -> Result<Frame> {
        self(region)
    }
}

/// Cuts `region` out of a full-screen frame whose top-left corner sits at
/// `origin` in screen coordinates.
pub fn crop_region(screen: &Frame, origin: (i32, i32), region: &Region) -> Result<Frame> {
    let x = i64::from(region.left()) - i64::from(origin.0);
    let y = i64::from(region.top()) - i64::from(origin.1);
    if x < 0 || y < 0 {
        return Err(Error::CaptureFailure(format!(
            "region {} starts outside the captured area",
            region
        )));
    }
    screen.crop(x as u32, y as u32, region.width(), region.height())
}

/// Replays a directory of PNG files in name order, looping at the end.
/// The images stand in for the screen: regions are cropped from them.
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    next: usize,
}

impl ImageSequenceSource {
    pub fn open(dir: &Path) -> Result<Self> {
        let entries = fs::read_dir(dir)
            .map_err(|e| Error::CaptureFailure(format!("{}: {}", dir.display(), e)))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| Error::CaptureFailure(format!("{}: {}", dir.display(), e)))?
                .path();
            let is_png = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("png"));
            if is_png {
                paths.push(path);
            }
        }

        Self::from_paths(paths)
    }

    pub fn from_paths(mut paths: Vec<PathBuf>) -> Result<Self> {
        if paths.is_empty() {
            return Err(Error::CaptureFailure("no images to replay".into()));
        }
        paths.sort();
        Ok(ImageSequenceSource { paths, next: 0 })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Size of the first image, which stands in for the screen size.
    pub fn frame_size(&self) -> Result<(u32, u32)> {
        let path = &self.paths[0];
        image::image_dimensions(path)
            .map_err(|e| Error::CaptureFailure(format!("{}: {}", path.display(), e)))
    }
}

impl FrameSource for ImageSequenceSource {
    fn capture(&mut self, region: &Region) -> Result<Frame> {
        let path = &self.paths[self.next];
        self.next = (self.next + 1) % self.paths.len();

        debug!(path = %path.display(), "replaying frame");
        let image = image::open(path)
            .map_err(|e| Error::CaptureFailure(format!("{}: {}", path.display(), e)))?
            .to_rgb8();
        crop_region(&Frame::from(image), (0, 0), region)
    }
}

#[cfg(feature = "screen")]
pub use screen::ScreenSource;

#[cfg(feature = "screen")]
mod screen {
    use xcap::Monitor;

    use super::{crop_region, FrameSource};
    use crate::{Error, Frame, Region, Result};

    fn capture_err(e: impl std::fmt::Display) -> Error {
        Error::CaptureFailure(e.to_string())
    }

    /// Live capture of one monitor.
    pub struct ScreenSource {
        monitor: Monitor,
    }

    impl ScreenSource {
        /// The primary monitor, or the first one listed.
        pub fn primary() -> Result<Self> {
            let monitors = Monitor::all().map_err(capture_err)?;
            let index = monitors
                .iter()
                .position(|m| m.is_primary().unwrap_or(false))
                .unwrap_or(0);
            let monitor = monitors
                .into_iter()
                .nth(index)
                .ok_or_else(|| Error::CaptureFailure("no monitors found".into()))?;
            Ok(ScreenSource { monitor })
        }

        /// Monitor size in pixels.
        pub fn size(&self) -> Result<(u32, u32)> {
            Ok((
                self.monitor.width().map_err(capture_err)?,
                self.monitor.height().map_err(capture_err)?,
            ))
        }
    }

    impl FrameSource for ScreenSource {
        fn capture(&mut self, region: &Region) -> Result<Frame> {
            let origin = (
                self.monitor.x().map_err(capture_err)?,
                self.monitor.y().map_err(capture_err)?,
            );
            let image = self.monitor.capture_image().map_err(capture_err)?;
            let screen = Frame::from_rgba(image.width(), image.height(), image.as_raw())?;
            crop_region(&screen, origin, region)
        }
    }
}
