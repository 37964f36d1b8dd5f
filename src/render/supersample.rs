//! Accumulation-buffer antialiasing: the scene is drawn once per jitter
//! offset through a frustum shifted by a fraction of a pixel, and each pass
//! is added to the accumulation target with weight `1 / samples`.

use glam::{Mat4, Vec4};
use tracing::debug;

use super::{FAR_PLANE, FIELD_OF_VIEW_Y_DEGREES, NEAR_PLANE, RenderBackend, jitter, projection};

/// Off-centre perspective frustum with a `[0, 1]` depth range.
pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let width = right - left;
    let height = top - bottom;
    let depth = far - near;
    Mat4::from_cols(
        Vec4::new(2.0 * near / width, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 2.0 * near / height, 0.0, 0.0),
        Vec4::new(
            (right + left) / width,
            (top + bottom) / height,
            -far / depth,
            -1.0,
        ),
        Vec4::new(0.0, 0.0, -far * near / depth, 0.0),
    )
}

/// `frustum` shifted by `(pixdx, pixdy)` pixels of a `viewport`-sized target.
#[allow(clippy::too_many_arguments)]
pub fn jittered_frustum(
    left: f32,
    right: f32,
    bottom: f32,
    top: f32,
    near: f32,
    far: f32,
    pixdx: f32,
    pixdy: f32,
    viewport: (u32, u32),
) -> Mat4 {
    let dx = -(pixdx * (right - left) / viewport.0.max(1) as f32);
    let dy = -(pixdy * (top - bottom) / viewport.1.max(1) as f32);
    frustum(left + dx, right + dx, bottom + dy, top + dy, near, far)
}

/// Symmetric perspective with a subpixel shift.
pub fn perspective_jittered(
    fovy_degrees: f32,
    aspect: f32,
    near: f32,
    far: f32,
    pixdx: f32,
    pixdy: f32,
    viewport: (u32, u32),
) -> Mat4 {
    let half = fovy_degrees.to_radians() / 2.0;
    let top = near * half.tan();
    let right = top * aspect;
    jittered_frustum(-right, right, -top, top, near, far, pixdx, pixdy, viewport)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Supersampler {
    samples: Option<usize>,
}

impl Supersampler {
    /// `requested` of 0 or 1 disables supersampling; other counts snap to
    /// the nearest supported pattern.
    pub fn new(requested: usize) -> Self {
        let samples = jitter::nearest_supported(requested);
        if let Some(actual) = samples.filter(|actual| *actual != requested) {
            debug!(requested, actual, "substituting supported jitter pattern");
        }
        Self { samples }
    }

    pub fn disabled() -> Self {
        Self { samples: None }
    }

    /// Number of scene passes per frame.
    pub fn passes(&self) -> usize {
        self.samples.unwrap_or(1)
    }

    pub fn is_enabled(&self) -> bool {
        self.samples.is_some()
    }

    /// Draw `scene` once, or once per jitter offset into the accumulation
    /// target.
    pub fn render<F>(&self, backend: &mut dyn RenderBackend, mut scene: F)
    where
        F: FnMut(&mut dyn RenderBackend),
    {
        let viewport = backend.viewport();
        let Some(count) = self.samples else {
            backend.clear();
            backend.set_projection(projection(viewport));
            scene(backend);
            return;
        };

        let offsets = jitter::samples(count);
        let weight = 1.0 / offsets.len() as f32;
        let aspect = super::aspect_ratio(viewport);
        for &(dx, dy) in offsets {
            backend.clear();
            backend.set_projection(perspective_jittered(
                FIELD_OF_VIEW_Y_DEGREES,
                aspect,
                NEAR_PLANE,
                FAR_PLANE,
                dx as f32,
                dy as f32,
                viewport,
            ));
            scene(backend);
            backend.accumulate(weight);
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::render::recording::{Call, RecordingBackend};

    fn assert_mat_close(a: Mat4, b: Mat4) {
        for (x, y) in a.to_cols_array().iter().zip(b.to_cols_array()) {
            assert!((x - y).abs() < 1e-5, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn unjittered_frustum_matches_perspective() {
        let aspect = 16.0 / 9.0;
        let ours = perspective_jittered(45.0, aspect, 1.0, 400.0, 0.0, 0.0, (1920, 1080));
        let reference = Mat4::perspective_rh(45f32.to_radians(), aspect, 1.0, 400.0);
        assert_mat_close(ours, reference);
    }

    #[test]
    fn one_pixel_jitter_moves_image_by_one_pixel() {
        let viewport = (800, 600);
        let aspect = 800.0 / 600.0;
        let base = perspective_jittered(45.0, aspect, 1.0, 400.0, 0.0, 0.0, viewport);
        let shifted = perspective_jittered(45.0, aspect, 1.0, 400.0, 1.0, 0.5, viewport);
        let point = Vec3::new(3.0, -2.0, -50.0);
        let a = base.project_point3(point);
        let b = shifted.project_point3(point);
        assert!(((b.x - a.x) - 2.0 / 800.0).abs() < 1e-5);
        assert!(((b.y - a.y) - 1.0 / 600.0).abs() < 1e-5);
        assert!((b.z - a.z).abs() < 1e-6);
    }

    #[test]
    fn disabled_draws_once_without_accumulating() {
        let mut backend = RecordingBackend::new((640, 480));
        let mut passes = 0;
        Supersampler::new(1).render(&mut backend, |_| passes += 1);
        assert_eq!(passes, 1);
        assert!(
            !backend
                .calls()
                .iter()
                .any(|call| matches!(call, Call::Accumulate(_)))
        );
    }

    #[test]
    fn each_pass_is_weighted_equally() {
        let mut backend = RecordingBackend::new((640, 480));
        let sampler = Supersampler::new(5);
        assert_eq!(sampler.passes(), 4);
        let mut passes = 0;
        sampler.render(&mut backend, |_| passes += 1);
        assert_eq!(passes, 4);

        let weights: Vec<f32> = backend
            .calls()
            .iter()
            .filter_map(|call| match call {
                Call::Accumulate(w) => Some(*w),
                _ => None,
            })
            .collect();
        assert_eq!(weights, vec![0.25; 4]);

        let projections: Vec<Mat4> = backend
            .calls()
            .iter()
            .filter_map(|call| match call {
                Call::SetProjection(m) => Some(*m),
                _ => None,
            })
            .collect();
        assert_eq!(projections.len(), 4);
        assert!(projections.windows(2).all(|w| w[0] != w[1]));
    }
}
