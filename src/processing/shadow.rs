//! Soft drop shadows for caption labels.
//!
//! The default path is a separable box blur over the alpha channel: one
//! horizontal and one vertical pass, each keeping a running sum over a ring
//! buffer of the last `radius` samples. Cost is O(W·H) whatever the radius.
//! The `High` quality path convolves with a full `radius × radius` kernel
//! and is kept for comparison only.

use image::{Rgba, RgbaImage};
use serde::Deserialize;

use crate::config::ShadowConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlurQuality {
    #[default]
    Fast,
    High,
}

#[derive(Debug, Clone)]
pub struct ShadowBlur {
    radius: u32,
    opacity: f32,
    color: [u8; 3],
    quality: BlurQuality,
}

impl Default for ShadowBlur {
    fn default() -> Self {
        Self::new(11, 1.0, [0, 0, 0])
    }
}

impl From<&ShadowConfig> for ShadowBlur {
    fn from(cfg: &ShadowConfig) -> Self {
        Self::new(cfg.radius, cfg.opacity, cfg.color).with_quality(cfg.quality)
    }
}

impl ShadowBlur {
    pub fn new(radius: u32, opacity: f32, color: [u8; 3]) -> Self {
        Self {
            radius,
            opacity: opacity.clamp(0.0, 1.0),
            color,
            quality: BlurQuality::Fast,
        }
    }

    pub fn with_quality(mut self, quality: BlurQuality) -> Self {
        self.quality = quality;
        self
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn color(&self) -> [u8; 3] {
        self.color
    }

    pub fn set_radius(&mut self, radius: u32) {
        self.radius = radius;
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn set_color(&mut self, color: [u8; 3]) {
        self.color = color;
    }

    /// Build a tinted, blurred alpha mask of `image`.
    ///
    /// The fast path returns an image `radius` pixels larger than the source
    /// in each dimension; the high-quality path pads by `radius` on every
    /// side.
    pub fn create_shadow(&self, image: &RgbaImage) -> RgbaImage {
        if self.radius == 0 {
            return self.tinted_mask(image);
        }
        match self.quality {
            BlurQuality::Fast => self.create_shadow_fast(image),
            BlurQuality::High => self.create_shadow_convolved(image),
        }
    }

    fn rgb(&self) -> u32 {
        let [r, g, b] = self.color;
        (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
    }

    fn tinted_mask(&self, image: &RgbaImage) -> RgbaImage {
        let [r, g, b] = self.color;
        let mut out = RgbaImage::new(image.width(), image.height());
        for (dst, src) in out.pixels_mut().zip(image.pixels()) {
            let a = (f32::from(src[3]) * self.opacity) as u8;
            *dst = Rgba([r, g, b, a]);
        }
        out
    }

    fn create_shadow_fast(&self, image: &RgbaImage) -> RgbaImage {
        let size = self.radius as usize;
        let src_w = image.width() as usize;
        let src_h = image.height() as usize;
        let dst_w = src_w + size;
        let dst_h = src_h + size;
        let left = (size - 1) >> 1;
        let right = size - left;
        let y_stop = dst_h - right;
        let last_pixel_offset = right * dst_w;
        let rgb = self.rgb();

        let h_divider = 1.0 / size as f32;
        let v_divider = self.opacity / size as f32;

        let mut dst = vec![0u32; dst_w * dst_h];
        let mut history = vec![0u32; size];

        // Horizontal pass: alpha only, rows offset by `left`.
        let alpha = image.as_raw();
        for src_y in 0..src_h {
            history.fill(0);
            let mut sum = 0u32;
            let mut idx = 0usize;
            let mut offset = (left + src_y) * dst_w;
            let row = &alpha[src_y * src_w * 4..(src_y + 1) * src_w * 4];

            for px in row.chunks_exact(4) {
                dst[offset] = ((sum as f32 * h_divider) as u32) << 24;
                offset += 1;
                sum -= history[idx];
                let a = u32::from(px[3]);
                history[idx] = a;
                sum += a;
                idx += 1;
                if idx >= size {
                    idx -= size;
                }
            }
            for _ in 0..size {
                dst[offset] = ((sum as f32 * h_divider) as u32) << 24;
                offset += 1;
                sum -= history[idx];
                idx += 1;
                if idx >= size {
                    idx -= size;
                }
            }
        }

        // Vertical pass: combine with colour and opacity.
        for x in 0..dst_w {
            let mut sum = 0u32;
            history[..left].fill(0);
            let mut idx = left;
            let mut offset = x;
            for _ in 0..right {
                let a = dst[offset] >> 24;
                history[idx] = a;
                idx += 1;
                sum += a;
                offset += dst_w;
            }

            offset = x;
            idx = 0;
            for _ in 0..y_stop {
                dst[offset] = (((sum as f32 * v_divider) as u32) << 24) | rgb;
                sum -= history[idx];
                let a = dst[offset + last_pixel_offset] >> 24;
                history[idx] = a;
                sum += a;
                idx += 1;
                if idx >= size {
                    idx -= size;
                }
                offset += dst_w;
            }
            for _ in y_stop..dst_h {
                dst[offset] = (((sum as f32 * v_divider) as u32) << 24) | rgb;
                sum -= history[idx];
                idx += 1;
                if idx >= size {
                    idx -= size;
                }
                offset += dst_w;
            }
        }

        unpack_argb(dst_w as u32, dst_h as u32, &dst)
    }

    fn create_shadow_convolved(&self, image: &RgbaImage) -> RgbaImage {
        let size = self.radius as i64;
        let pad = self.radius;
        let width = image.width() + pad * 2;
        let height = image.height() + pad * 2;

        let mut mask = vec![0f32; (width * height) as usize];
        for (x, y, px) in image.enumerate_pixels() {
            let idx = ((y + pad) * width + x + pad) as usize;
            mask[idx] = f32::from(px[3]) * self.opacity;
        }

        let weight = 1.0 / (size * size) as f32;
        let origin = (size - 1) / 2;
        let mut out = vec![0u32; mask.len()];
        let rgb = self.rgb();
        for y in 0..height as i64 {
            for x in 0..width as i64 {
                let mut acc = 0.0f32;
                for ky in 0..size {
                    let sy = y - origin + ky;
                    if sy < 0 || sy >= height as i64 {
                        continue;
                    }
                    for kx in 0..size {
                        let sx = x - origin + kx;
                        if sx < 0 || sx >= width as i64 {
                            continue;
                        }
                        acc += mask[(sy * width as i64 + sx) as usize];
                    }
                }
                let a = (acc * weight).clamp(0.0, 255.0) as u32;
                out[(y * width as i64 + x) as usize] = (a << 24) | rgb;
            }
        }
        unpack_argb(width, height, &out)
    }
}

fn unpack_argb(width: u32, height: u32, argb: &[u32]) -> RgbaImage {
    let mut out = RgbaImage::new(width, height);
    for (pixel, &packed) in out.pixels_mut().zip(argb) {
        *pixel = Rgba([
            (packed >> 16) as u8,
            (packed >> 8) as u8,
            packed as u8,
            (packed >> 24) as u8,
        ]);
    }
    out
}
