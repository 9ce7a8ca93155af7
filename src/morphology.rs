//! Binary morphology with the full 3x3 structuring element.
//!
//! Operates on binary buffers (every pixel 0 or 255) and upholds that
//! invariant on output. Edge neighborhoods clamp to the nearest in-bounds
//! pixel, matching the median filter's border convention.

use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

/// Morphological cleanup selector for the pipeline's optional post step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MorphOp {
    Erode,
    Dilate,
    /// Erode then dilate: removes small bright speckle, keeps larger
    /// bright regions.
    Open,
    /// Dilate then erode: fills small dark gaps inside bright regions.
    Close,
}

pub fn apply(binary: &GrayImage, op: MorphOp) -> GrayImage {
    match op {
        MorphOp::Erode => erode(binary),
        MorphOp::Dilate => dilate(binary),
        MorphOp::Open => dilate(&erode(binary)),
        MorphOp::Close => erode(&dilate(binary)),
    }
}

/// Output is white only where all 9 clamped neighbors are white.
pub fn erode(binary: &GrayImage) -> GrayImage {
    neighborhood_pass(binary, |neighbors| {
        neighbors.iter().all(|&v| v == 255)
    })
}

/// Output is white where any of the 9 clamped neighbors is white.
pub fn dilate(binary: &GrayImage) -> GrayImage {
    neighborhood_pass(binary, |neighbors| {
        neighbors.iter().any(|&v| v == 255)
    })
}

fn neighborhood_pass(binary: &GrayImage, white: impl Fn(&[u8; 9]) -> bool) -> GrayImage {
    let (w, h) = binary.dimensions();
    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let mut neighbors = [0u8; 9];
            let mut i = 0;
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let sx = (x as i64 + dx).clamp(0, w as i64 - 1) as u32;
                    let sy = (y as i64 + dy).clamp(0, h as i64 - 1) as u32;
                    neighbors[i] = binary.get_pixel(sx, sy).0[0];
                    i += 1;
                }
            }
            let bit = if white(&neighbors) { 255 } else { 0 };
            out.put_pixel(x, y, Luma([bit]));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_bright_pixel() -> GrayImage {
        let mut img = GrayImage::from_pixel(7, 7, Luma([0]));
        img.put_pixel(3, 3, Luma([255]));
        img
    }

    #[test]
    fn erode_removes_isolated_pixel() {
        let out = erode(&single_bright_pixel());
        assert!(out.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn dilate_grows_isolated_pixel_to_full_neighborhood() {
        let out = dilate(&single_bright_pixel());
        for y in 0..7u32 {
            for x in 0..7u32 {
                let expected = (2..=4).contains(&x) && (2..=4).contains(&y);
                assert_eq!(out.get_pixel(x, y).0[0] == 255, expected, "({x},{y})");
            }
        }
    }

    #[test]
    fn open_removes_speckle_but_keeps_solid_block() {
        let mut img = GrayImage::from_pixel(9, 9, Luma([0]));
        img.put_pixel(7, 1, Luma([255])); // speckle
        for y in 3..6 {
            for x in 3..6 {
                img.put_pixel(x, y, Luma([255])); // solid 3x3 block
            }
        }
        let out = apply(&img, MorphOp::Open);
        assert_eq!(out.get_pixel(7, 1).0[0], 0, "speckle removed");
        for y in 3..6u32 {
            for x in 3..6u32 {
                assert_eq!(out.get_pixel(x, y).0[0], 255, "block kept at ({x},{y})");
            }
        }
    }

    #[test]
    fn close_fills_isolated_dark_hole() {
        let mut img = GrayImage::from_pixel(7, 7, Luma([255]));
        img.put_pixel(3, 3, Luma([0]));
        let out = apply(&img, MorphOp::Close);
        assert!(out.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn output_stays_strictly_binary() {
        let img = single_bright_pixel();
        for op in [MorphOp::Erode, MorphOp::Dilate, MorphOp::Open, MorphOp::Close] {
            let out = apply(&img, op);
            assert!(out.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        }
    }
}
