//! Summed-area table over a grayscale buffer.
//!
//! Built in a single pass (row running sum plus the row above), the table
//! answers windowed sum/mean/stddev queries in O(1) via the four-corner
//! inclusion-exclusion formula. This is what makes the local-threshold
//! binarizers linear in the pixel count regardless of window size.

use image::GrayImage;

/// Summed-area table. `value(x, y)` is the sum of all grayscale values in
/// the inclusive rectangle (0,0)-(x,y); strictly non-decreasing along both
/// axes for non-negative input.
pub struct IntegralImage {
    width: usize,
    height: usize,
    sums: Vec<u64>,
    /// Parallel table of squared values, present only when stddev queries
    /// are needed (Sauvola).
    squares: Option<Vec<u64>>,
}

impl IntegralImage {
    /// Build the plain sum table.
    pub fn new(gray: &GrayImage) -> Self {
        Self::build(gray, false)
    }

    /// Build sum and squared-sum tables (enables [`Self::box_stats`]).
    pub fn with_squares(gray: &GrayImage) -> Self {
        Self::build(gray, true)
    }

    fn build(gray: &GrayImage, with_squares: bool) -> Self {
        let width = gray.width() as usize;
        let height = gray.height() as usize;
        let raw = gray.as_raw();
        let mut sums = vec![0u64; width * height];
        let mut squares = if with_squares {
            Some(vec![0u64; width * height])
        } else {
            None
        };

        for y in 0..height {
            let mut row_sum = 0u64;
            let mut row_sq = 0u64;
            for x in 0..width {
                let idx = y * width + x;
                let v = raw[idx] as u64;
                row_sum += v;
                let above = if y > 0 { sums[idx - width] } else { 0 };
                sums[idx] = row_sum + above;
                if let Some(sq) = squares.as_mut() {
                    row_sq += v * v;
                    let above_sq = if y > 0 { sq[idx - width] } else { 0 };
                    sq[idx] = row_sq + above_sq;
                }
            }
        }

        Self {
            width,
            height,
            sums,
            squares,
        }
    }

    pub fn width(&self) -> u32 {
        self.width as u32
    }

    pub fn height(&self) -> u32 {
        self.height as u32
    }

    /// Raw table value at (x, y).
    pub fn value(&self, x: u32, y: u32) -> u64 {
        self.sums[y as usize * self.width + x as usize]
    }

    #[inline]
    fn corner(table: &[u64], width: usize, x: i64, y: i64) -> u64 {
        // boundary terms vanish outside the top/left edges
        if x < 0 || y < 0 {
            return 0;
        }
        table[y as usize * width + x as usize]
    }

    #[inline]
    fn box_query(&self, table: &[u64], x0: u32, y0: u32, x1: u32, y1: u32) -> u64 {
        let (x0, y0, x1, y1) = (x0 as i64, y0 as i64, x1 as i64, y1 as i64);
        let w = self.width;
        Self::corner(table, w, x1, y1) + Self::corner(table, w, x0 - 1, y0 - 1)
            - Self::corner(table, w, x0 - 1, y1)
            - Self::corner(table, w, x1, y0 - 1)
    }

    /// Sum over the inclusive rectangle (x0,y0)-(x1,y1).
    pub fn box_sum(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> u64 {
        self.box_query(&self.sums, x0, y0, x1, y1)
    }

    /// Mean over a square window of `radius` centered on (x, y), clamped to
    /// the buffer bounds — the window shrinks near borders.
    pub fn window_mean(&self, x: u32, y: u32, radius: u32) -> f64 {
        let (x0, y0, x1, y1, count) = self.clamped_window(x, y, radius);
        self.box_sum(x0, y0, x1, y1) as f64 / count
    }

    /// Mean and standard deviation over the clamped window centered on
    /// (x, y). Requires [`Self::with_squares`]; plain tables report zero
    /// deviation.
    pub fn window_stats(&self, x: u32, y: u32, radius: u32) -> (f64, f64) {
        let (x0, y0, x1, y1, count) = self.clamped_window(x, y, radius);
        let mean = self.box_sum(x0, y0, x1, y1) as f64 / count;
        let std = match &self.squares {
            Some(sq) => {
                let mean_sq = self.box_query(sq, x0, y0, x1, y1) as f64 / count;
                (mean_sq - mean * mean).max(0.0).sqrt()
            }
            None => 0.0,
        };
        (mean, std)
    }

    fn clamped_window(&self, x: u32, y: u32, radius: u32) -> (u32, u32, u32, u32, f64) {
        let x0 = x.saturating_sub(radius);
        let y0 = y.saturating_sub(radius);
        let x1 = (x + radius).min(self.width as u32 - 1);
        let y1 = (y + radius).min(self.height as u32 - 1);
        let count = ((x1 - x0 + 1) as u64 * (y1 - y0 + 1) as u64) as f64;
        (x0, y0, x1, y1, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_from(values: &[u8], w: u32, h: u32) -> GrayImage {
        GrayImage::from_raw(w, h, values.to_vec()).unwrap()
    }

    #[test]
    fn two_by_two_running_sums() {
        let integral = IntegralImage::new(&gray_from(&[1, 2, 3, 4], 2, 2));
        assert_eq!(integral.value(0, 0), 1);
        assert_eq!(integral.value(1, 0), 3);
        assert_eq!(integral.value(0, 1), 4);
        assert_eq!(integral.value(1, 1), 10);
    }

    #[test]
    fn box_sum_matches_direct_summation() {
        let values: Vec<u8> = (0..36).map(|v| (v * 7 % 251) as u8).collect();
        let gray = gray_from(&values, 6, 6);
        let integral = IntegralImage::new(&gray);

        let direct: u64 = (1..=4)
            .flat_map(|y| (2..=5).map(move |x| (x, y)))
            .map(|(x, y)| gray.get_pixel(x, y).0[0] as u64)
            .sum();
        assert_eq!(integral.box_sum(2, 1, 5, 4), direct);
    }

    #[test]
    fn window_shrinks_at_corners() {
        let gray = GrayImage::from_pixel(4, 4, image::Luma([10]));
        let integral = IntegralImage::new(&gray);
        // corner window covers 2x2 pixels only, mean is still exact
        assert_eq!(integral.window_mean(0, 0, 1), 10.0);
        assert_eq!(integral.window_mean(3, 3, 1), 10.0);
    }

    #[test]
    fn stats_on_uniform_buffer_have_zero_deviation() {
        let gray = GrayImage::from_pixel(8, 8, image::Luma([42]));
        let integral = IntegralImage::with_squares(&gray);
        let (mean, std) = integral.window_stats(4, 4, 2);
        assert_eq!(mean, 42.0);
        assert_eq!(std, 0.0);
    }

    #[test]
    fn stats_capture_local_spread() {
        // alternating 0/200 columns: mean 100, stddev 100
        let values: Vec<u8> = (0..16)
            .map(|i| if i % 2 == 0 { 0 } else { 200 })
            .collect();
        let gray = gray_from(&values, 4, 4);
        let integral = IntegralImage::with_squares(&gray);
        // window at (1,1) covers columns 0..=2: one 200 per row of three
        let (mean, std) = integral.window_stats(1, 1, 1);
        assert!((mean - 200.0 / 3.0).abs() < 1e-9);
        assert!(std > 90.0 && std < 100.0);
    }
}
