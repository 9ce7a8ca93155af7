//! Tile-histogram contrast enhancement (a simplified CLAHE).
//!
//! The buffer is split into a tile grid; each tile gets a clipped,
//! redistributed histogram whose scaled CDF becomes the tile's remap table.
//! Output pixels bilinearly blend the four nearest tile-center remaps, which
//! keeps the boost locally adaptive without hard seams at tile boundaries.

use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

/// Tuning for [`equalize`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContrastParams {
    pub tile_grid_x: u32,
    pub tile_grid_y: u32,
    /// Histogram bins are clipped at `clip_limit * tile_pixels / 256`;
    /// the excess is spread uniformly across all bins. Limits noise
    /// over-amplification in flat regions.
    pub clip_limit: f32,
}

impl Default for ContrastParams {
    fn default() -> Self {
        Self {
            tile_grid_x: 8,
            tile_grid_y: 8,
            clip_limit: 3.0,
        }
    }
}

/// Per-tile remap table: the clipped histogram's CDF scaled to 0-255.
fn tile_lut(hist: &mut [u64; 256], pixel_count: u64, clip_limit: f32) -> [u8; 256] {
    let mut lut = [0u8; 256];
    if pixel_count == 0 {
        return lut;
    }

    // clip and collect the excess
    let cap = ((clip_limit as f64 * pixel_count as f64 / 256.0) as u64).max(1);
    let mut excess = 0u64;
    for bin in hist.iter_mut() {
        if *bin > cap {
            excess += *bin - cap;
            *bin = cap;
        }
    }

    // redistribute uniformly; the remainder tops up the lowest bins so the
    // total stays exactly pixel_count
    let bonus = excess / 256;
    let leftover = (excess % 256) as usize;
    for (i, bin) in hist.iter_mut().enumerate() {
        *bin += bonus + u64::from(i < leftover);
    }

    let mut cdf = 0u64;
    for (v, bin) in hist.iter().enumerate() {
        cdf += *bin;
        lut[v] = ((cdf as f64 * 255.0 / pixel_count as f64) + 0.5).floor().min(255.0) as u8;
    }
    lut
}

/// Locally equalize contrast over a tile grid with bilinear CDF blending.
pub fn equalize(gray: &GrayImage, params: &ContrastParams) -> GrayImage {
    let (w, h) = gray.dimensions();
    if w == 0 || h == 0 {
        return gray.clone();
    }

    let tiles_x = params.tile_grid_x.clamp(1, w) as usize;
    let tiles_y = params.tile_grid_y.clamp(1, h) as usize;
    let (wu, hu) = (w as usize, h as usize);

    // build one remap table per tile; evenly distributed bounds keep every
    // tile nonempty even when the grid doesn't divide the buffer
    let mut luts = vec![[0u8; 256]; tiles_x * tiles_y];
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx * wu / tiles_x;
            let y0 = ty * hu / tiles_y;
            let x1 = (tx + 1) * wu / tiles_x;
            let y1 = (ty + 1) * hu / tiles_y;

            let mut hist = [0u64; 256];
            let mut count = 0u64;
            for y in y0..y1 {
                for x in x0..x1 {
                    hist[gray.get_pixel(x as u32, y as u32).0[0] as usize] += 1;
                    count += 1;
                }
            }
            luts[ty * tiles_x + tx] = tile_lut(&mut hist, count, params.clip_limit);
        }
    }

    // blend the four nearest tile-center remaps per pixel; the fractional
    // grid coordinate uses the same even partition as the tables above
    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        let fy = (y as f32 + 0.5) * tiles_y as f32 / h as f32 - 0.5;
        let ty0 = fy.floor();
        let wy = fy - ty0;
        let ty0i = (ty0 as i64).clamp(0, tiles_y as i64 - 1) as usize;
        let ty1i = (ty0 as i64 + 1).clamp(0, tiles_y as i64 - 1) as usize;

        for x in 0..w {
            let fx = (x as f32 + 0.5) * tiles_x as f32 / w as f32 - 0.5;
            let tx0 = fx.floor();
            let wx = fx - tx0;
            let tx0i = (tx0 as i64).clamp(0, tiles_x as i64 - 1) as usize;
            let tx1i = (tx0 as i64 + 1).clamp(0, tiles_x as i64 - 1) as usize;

            let v = gray.get_pixel(x, y).0[0] as usize;
            let v00 = luts[ty0i * tiles_x + tx0i][v] as f32;
            let v10 = luts[ty0i * tiles_x + tx1i][v] as f32;
            let v01 = luts[ty1i * tiles_x + tx0i][v] as f32;
            let v11 = luts[ty1i * tiles_x + tx1i][v] as f32;

            let top = v00 * (1.0 - wx) + v10 * wx;
            let bottom = v01 * (1.0 - wx) + v11 * wx;
            let blended = top * (1.0 - wy) + bottom * wy;
            out.put_pixel(x, y, Luma([(blended + 0.5).floor().min(255.0) as u8]));
        }
    }
    out
}
