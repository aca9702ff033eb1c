// Copyright (c) 2026 framewatch contributors
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT
// See the LICENSE file at the repository root.
// src/cv/scalar.rs
#![allow(clippy::needless_range_loop)]

use crate::cv::ComputerVision;
use crate::{Frame, ImageBuffer};

/// Scalar (non-SIMD) implementation of Computer Vision operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarCV;

impl ComputerVision for ScalarCV {
    fn grayscale(src: &Frame, dst: &mut [u8]) {
        let src_data = src.data();
        let mut i = 0;
        let mut j = 0;
        let len = src_data.len();

        while i < len {
            let r = src_data[i] as f32;
            let g = src_data[i + 1] as f32;
            let b = src_data[i + 2] as f32;

            // Weighted average: 0.299R + 0.587G + 0.114B
            dst[j] = ((r * 0.299 + g * 0.587 + b * 0.114 + 0.5) as u32 & 0xff) as u8;
            j += 1;
            i += Frame::CHANNELS;
        }
    }

    fn abs_diff(a: &[u8], b: &[u8], dst: &mut [u8]) {
        for i in 0..dst.len() {
            dst[i] = a[i].abs_diff(b[i]);
        }
    }

    fn threshold(src: &[u8], dst: &mut [u8], threshold: u8) {
        let len = src.len();
        let mut tab = [0u8; 256];

        // Build lookup table
        for i in 0..256 {
            tab[i] = if (i as u8) <= threshold { 0 } else { 255 };
        }

        for i in 0..len {
            dst[i] = tab[src[i] as usize];
        }
    }

    fn rgb_to_hsv(src: &Frame, dst: &mut [u8]) {
        let src_data = src.data();
        let mut i = 0;
        let len = src_data.len();

        while i < len {
            let r = src_data[i] as i32;
            let g = src_data[i + 1] as i32;
            let b = src_data[i + 2] as i32;

            let v = r.max(g).max(b);
            let diff = v - r.min(g).min(b);

            let s = if v == 0 {
                0
            } else {
                ((255 * diff) as f32 / v as f32).round() as i32
            };

            let h = if diff == 0 {
                0
            } else {
                // Degrees / 2 so the full circle fits in one byte.
                let sector = if v == r {
                    (g - b) as f32 / diff as f32
                } else if v == g {
                    2.0 + (b - r) as f32 / diff as f32
                } else {
                    4.0 + (r - g) as f32 / diff as f32
                };
                let mut h = (sector * 30.0).round() as i32;
                if h < 0 {
                    h += 180;
                }
                if h >= 180 {
                    h -= 180;
                }
                h
            };

            dst[i] = h as u8;
            dst[i + 1] = s as u8;
            dst[i + 2] = v as u8;
            i += Frame::CHANNELS;
        }
    }

    fn in_range(src: &[u8], dst: &mut [u8], lower: [u8; 3], upper: [u8; 3]) {
        for (j, px) in src.chunks_exact(3).enumerate() {
            let inside = (0..3).all(|c| px[c] >= lower[c] && px[c] <= upper[c]);
            dst[j] = if inside { 255 } else { 0 };
        }
    }

    fn count_non_zero(src: &ImageBuffer) -> usize {
        src.data.iter().filter(|&&p| p != 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hsv_of(rgb: [u8; 3]) -> [u8; 3] {
        let frame = Frame::filled(1, 1, rgb);
        let mut dst = [0u8; 3];
        ScalarCV::rgb_to_hsv(&frame, &mut dst);
        dst
    }

    #[test]
    fn test_grayscale_logic() {
        let mut data = Vec::new();
        for i in 0..64 {
            if i % 2 == 0 {
                data.extend_from_slice(&[100, 150, 200]);
            } else {
                data.extend_from_slice(&[50, 50, 50]);
            }
        }
        let src = Frame::new(8, 8, data).unwrap();
        let mut dst = [0u8; 64];

        ScalarCV::grayscale(&src, &mut dst);

        // Pixel 0: 100 * 0.299 + 150 * 0.587 + 200 * 0.114 + 0.5 = 141.25 -> 141
        // Pixel 1: 50 * 0.299 + 50 * 0.587 + 50 * 0.114 + 0.5 = 50.5 -> 50
        for i in 0..64 {
            if i % 2 == 0 {
                assert_eq!(dst[i], 141);
            } else {
                assert_eq!(dst[i], 50);
            }
        }
    }

    #[test]
    fn test_threshold_bounds() {
        let mut gray = [0u8; 64];
        let mut dst = [0u8; 64];
        for i in 0..64 {
            gray[i] = if i % 2 == 0 { 31 } else { 30 };
        }

        ScalarCV::threshold(&gray, &mut dst, 30);

        for i in 0..64 {
            if i % 2 == 0 {
                assert_eq!(dst[i], 255);
            } else {
                // 30 <= 30 -> 0
                assert_eq!(dst[i], 0);
            }
        }
    }

    #[test]
    fn test_abs_diff_is_symmetric() {
        let a = [0u8, 200, 30, 255];
        let b = [10u8, 100, 30, 0];
        let mut ab = [0u8; 4];
        let mut ba = [0u8; 4];
        ScalarCV::abs_diff(&a, &b, &mut ab);
        ScalarCV::abs_diff(&b, &a, &mut ba);
        assert_eq!(ab, [10, 100, 0, 255]);
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(hsv_of([255, 0, 0]), [0, 255, 255]);
        assert_eq!(hsv_of([0, 255, 0]), [60, 255, 255]);
        assert_eq!(hsv_of([0, 0, 255]), [120, 255, 255]);
        assert_eq!(hsv_of([0, 0, 0]), [0, 0, 0]);
        assert_eq!(hsv_of([128, 128, 128]), [0, 0, 128]);
    }

    #[test]
    fn test_hsv_magenta_wraps() {
        // Hue 300 degrees -> 150 on the 8-bit scale.
        assert_eq!(hsv_of([255, 0, 255]), [150, 255, 255]);
        // Slightly blue of red wraps to the top of the range.
        let [h, _, _] = hsv_of([255, 0, 10]);
        assert_eq!(h, 179);
    }

    #[test]
    fn test_in_range_inclusive() {
        let src = [35u8, 100, 100, 85, 255, 255, 34, 200, 200, 60, 99, 200];
        let mut dst = [0u8; 4];
        ScalarCV::in_range(&src, &mut dst, [35, 100, 100], [85, 255, 255]);
        assert_eq!(dst, [255, 255, 0, 0]);
    }

    #[test]
    fn test_count_non_zero() {
        let data = [0u8, 1, 0, 255, 7, 0];
        let img = ImageBuffer {
            data: &data,
            width: 3,
            height: 2,
        };
        assert_eq!(ScalarCV::count_non_zero(&img), 3);
    }
}
