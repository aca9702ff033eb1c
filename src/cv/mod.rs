// Copyright (c) 2026 framewatch contributors
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT
// See the LICENSE file at the repository root.
// src/cv/mod.rs

use crate::{Frame, ImageBuffer};

/// Common trait for the per-pixel image operations the detectors are built on.
/// Detectors are generic over it so a vectorized backend can replace
/// [`scalar::ScalarCV`] without touching detection logic.
pub trait ComputerVision {
    /// Converts an RGB frame to 8-bit luminance.
    ///
    /// # Arguments
    /// * `src` - The source RGB `Frame`.
    /// * `dst` - The destination buffer, one byte per pixel. Must be pre-allocated.
    fn grayscale(src: &Frame, dst: &mut [u8]);

    /// Per-pixel absolute difference of two equally sized single-channel buffers.
    ///
    /// # Arguments
    /// * `a` - First source slice.
    /// * `b` - Second source slice.
    /// * `dst` - Destination slice receiving `|a - b|`.
    fn abs_diff(a: &[u8], b: &[u8], dst: &mut [u8]);

    /// Binary threshold: values strictly above `threshold` become 255, the rest 0.
    ///
    /// # Arguments
    /// * `src` - The source slice of single-channel pixels.
    /// * `dst` - The destination slice where binary pixels will be written.
    /// * `threshold` - The cutoff (0-255).
    fn threshold(src: &[u8], dst: &mut [u8], threshold: u8);

    /// Converts an RGB frame to interleaved 8-bit HSV.
    /// Hue is scaled to `[0, 180)`, saturation and value to `[0, 255]`.
    ///
    /// # Arguments
    /// * `src` - The source RGB `Frame`.
    /// * `dst` - Destination buffer of `3 * width * height` bytes.
    fn rgb_to_hsv(src: &Frame, dst: &mut [u8]);

    /// Marks pixels of a 3-channel buffer whose every channel lies within the
    /// inclusive bounds `lower..=upper` with 255, the rest with 0.
    ///
    /// # Arguments
    /// * `src` - Interleaved 3-channel source.
    /// * `dst` - Single-channel mask, one byte per pixel.
    /// * `lower` - Inclusive per-channel lower bound.
    /// * `upper` - Inclusive per-channel upper bound.
    fn in_range(src: &[u8], dst: &mut [u8], lower: [u8; 3], upper: [u8; 3]);

    /// Counts non-zero pixels of a single-channel image.
    fn count_non_zero(src: &ImageBuffer) -> usize;
}

pub mod contours;
pub mod draw;
pub mod geometry;
pub mod scalar;
