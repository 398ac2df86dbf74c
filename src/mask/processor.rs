//! Depth-to-mask conversion
//!
//! Turns a dense floating-point depth frame into a compact 8-bit foreground
//! mask at a fixed reduced resolution. A low percentile of the depth
//! distribution defines the foreground plane (the minimum would let outlier
//! spikes define it), and the surviving foreground depths are contrast
//! stretched per frame so the encoding stays informative at any range.

use crate::capture::DepthFrame;

/// Identifier written into session metadata for this mask encoding.
pub const DEPTH_MASK_ENCODING: &str = "grayscale8_relative_depth";

/// Converts depth frames into fixed-resolution foreground masks.
///
/// Output bytes are `0` for background and `1..=255` for foreground, where
/// larger values encode nearer depth relative to the frame's own foreground
/// range.
#[derive(Debug, Clone)]
pub struct DepthMaskProcessor {
    /// Mask width in pixels
    pub width: usize,

    /// Mask height in pixels
    pub height: usize,

    /// Percentile rank (0..1) picking the foreground reference depth
    pub percentile: f32,

    /// Margin in meters behind the reference depth still counted as foreground
    pub delta_meters: f32,
}

impl Default for DepthMaskProcessor {
    fn default() -> Self {
        Self::new(160, 120, 0.15, 0.3)
    }
}

impl DepthMaskProcessor {
    pub fn new(width: usize, height: usize, percentile: f32, delta_meters: f32) -> Self {
        Self { width, height, percentile, delta_meters }
    }

    pub fn encoding_name(&self) -> &'static str {
        DEPTH_MASK_ENCODING
    }

    /// Build a mask of length `width * height` from a depth frame.
    ///
    /// Returns `None` when the frame carries no usable depth at all; the
    /// caller skips the frame. An empty foreground after classification
    /// still yields a mask (all zeros).
    pub fn make_mask(&self, depth: &DepthFrame) -> Option<Vec<u8>> {
        let src_width = depth.width;
        let src_height = depth.height;
        if src_width == 0 || src_height == 0 {
            return None;
        }

        let mut downsampled = vec![f32::INFINITY; self.width * self.height];
        let mut valid_depths = Vec::with_capacity(self.width * self.height);

        for y in 0..self.height {
            let src_y = (y * src_height / self.height).min(src_height - 1);
            for x in 0..self.width {
                let src_x = (x * src_width / self.width).min(src_width - 1);
                let d = depth.sample(src_x, src_y);
                downsampled[y * self.width + x] = d;
                if d.is_finite() && d > 0.0 {
                    valid_depths.push(d);
                }
            }
        }

        if valid_depths.is_empty() {
            return None;
        }

        valid_depths.sort_by(f32::total_cmp);
        let rank = (((valid_depths.len() - 1) as f32) * self.percentile) as usize;
        let d_min = valid_depths[rank.min(valid_depths.len() - 1)];
        let threshold = d_min + self.delta_meters;

        let mut foreground = vec![0u8; self.width * self.height];
        for (i, &d) in downsampled.iter().enumerate() {
            if d.is_finite() && d > 0.0 && d < threshold {
                foreground[i] = 1;
            }
        }

        // Closing to keep thin limbs connected.
        let foreground = self.erode(&self.dilate(&foreground));

        let mut fg_min = f32::INFINITY;
        let mut fg_max = 0.0f32;
        for (i, &d) in downsampled.iter().enumerate() {
            if foreground[i] != 1 || !d.is_finite() || d <= 0.0 {
                continue;
            }
            fg_min = fg_min.min(d);
            fg_max = fg_max.max(d);
        }

        // Stretch foreground depth to 1..=255 each frame so values are not
        // effectively binary.
        let range = (fg_max - fg_min).max(1e-4);
        let mut mask = vec![0u8; self.width * self.height];
        for (i, &d) in downsampled.iter().enumerate() {
            if foreground[i] != 1 || !d.is_finite() || d <= 0.0 {
                continue;
            }
            let normalized = (d - fg_min) / range;
            let clamped = normalized.clamp(0.0, 1.0);
            let gray = ((1.0 - clamped) * 254.0).round() as i32 + 1;
            mask[i] = gray.clamp(1, 255) as u8;
        }

        Some(mask)
    }

    /// 3x3 dilation, zero-padded borders.
    fn dilate(&self, input: &[u8]) -> Vec<u8> {
        let mut output = vec![0u8; input.len()];
        for y in 0..self.height {
            for x in 0..self.width {
                let mut value = 0u8;
                'kernel: for ky in -1isize..=1 {
                    let yy = y as isize + ky;
                    if yy < 0 || yy >= self.height as isize {
                        continue;
                    }
                    for kx in -1isize..=1 {
                        let xx = x as isize + kx;
                        if xx < 0 || xx >= self.width as isize {
                            continue;
                        }
                        if input[yy as usize * self.width + xx as usize] == 1 {
                            value = 1;
                            break 'kernel;
                        }
                    }
                }
                output[y * self.width + x] = value;
            }
        }
        output
    }

    /// 3x3 erosion, zero-padded borders.
    fn erode(&self, input: &[u8]) -> Vec<u8> {
        let mut output = vec![0u8; input.len()];
        for y in 0..self.height {
            for x in 0..self.width {
                let mut value = 1u8;
                'kernel: for ky in -1isize..=1 {
                    let yy = y as isize + ky;
                    if yy < 0 || yy >= self.height as isize {
                        value = 0;
                        break;
                    }
                    for kx in -1isize..=1 {
                        let xx = x as isize + kx;
                        if xx < 0 || xx >= self.width as isize {
                            value = 0;
                            break 'kernel;
                        }
                        if input[yy as usize * self.width + xx as usize] == 0 {
                            value = 0;
                            break 'kernel;
                        }
                    }
                }
                output[y * self.width + x] = value;
            }
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_frame(width: usize, height: usize, depth: f32) -> DepthFrame {
        DepthFrame::new(width, height, vec![depth; width * height])
    }

    #[test]
    fn test_mask_length_and_range() {
        let processor = DepthMaskProcessor::default();
        let frame = DepthFrame::new(
            4,
            3,
            vec![0.8, 1.2, 2.0, 4.0, 0.9, 1.1, 3.5, 4.2, 1.0, 1.3, 5.0, f32::NAN],
        );
        let mask = processor.make_mask(&frame).unwrap();
        assert_eq!(mask.len(), processor.width * processor.height);
    }

    #[test]
    fn test_identical_input_yields_identical_mask() {
        let processor = DepthMaskProcessor::default();
        let frame = DepthFrame::new(2, 2, vec![1.0, 1.0, 5.0, 5.0]);
        let first = processor.make_mask(&frame).unwrap();
        let second = processor.make_mask(&frame).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_valid_depth_yields_no_mask() {
        let processor = DepthMaskProcessor::default();
        let frame = DepthFrame::new(2, 2, vec![f32::NAN, 0.0, -1.0, f32::INFINITY]);
        assert!(processor.make_mask(&frame).is_none());
    }

    #[test]
    fn test_near_pixels_foreground_far_pixels_background() {
        // Near top row at 1.0 m, far bottom row at 5.0 m; with percentile
        // 0.15 and delta 0.3 m only the near row classifies as foreground.
        let processor = DepthMaskProcessor::default();
        let frame = DepthFrame::new(2, 2, vec![1.0, 1.0, 5.0, 5.0]);
        let mask = processor.make_mask(&frame).unwrap();

        let top = mask[processor.width * (processor.height / 4) + processor.width / 2];
        let bottom = mask[processor.width * (processor.height * 3 / 4) + processor.width / 2];
        assert!(top > 0, "near pixel should be foreground");
        assert_eq!(bottom, 0, "far pixel should be background");
    }

    #[test]
    fn test_uniform_depth_maps_to_full_intensity() {
        // A flat scene is all foreground with zero depth range; the stretch
        // degenerates to the nearest-value encoding. The zero-padded erosion
        // always clears the outermost pixel ring.
        let width = 8;
        let height = 8;
        let processor = DepthMaskProcessor::new(width, height, 0.15, 0.3);
        let mask = processor.make_mask(&uniform_frame(width, height, 1.5)).unwrap();

        for y in 0..height {
            for x in 0..width {
                let border = y == 0 || y == height - 1 || x == 0 || x == width - 1;
                let expected = if border { 0 } else { 255 };
                assert_eq!(mask[y * width + x], expected, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_closing_fills_single_pixel_hole() {
        // 5x5 near block with a far hole in the middle: the closing pass
        // fills the hole, and the filled pixel encodes its own (far) depth.
        let width = 8;
        let height = 8;
        let mut samples = vec![10.0f32; width * height];
        for y in 1..6 {
            for x in 1..6 {
                samples[y * width + x] = 1.0;
            }
        }
        samples[3 * width + 3] = 5.0;

        let processor = DepthMaskProcessor::new(width, height, 0.15, 0.3);
        let mask = processor.make_mask(&DepthFrame::new(width, height, samples)).unwrap();

        assert_eq!(mask[3 * width + 3], 1, "filled hole encodes the farthest depth");
        assert_eq!(mask[2 * width + 2], 255, "near block encodes the nearest depth");
        assert_eq!(mask[0], 0, "background stays empty");
    }
}
