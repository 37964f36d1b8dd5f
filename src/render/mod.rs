pub mod depth;
pub mod jitter;
pub mod lifecycle;
pub mod recording;
pub mod renderable;
pub mod supersample;
pub mod wgpu_backend;

use anyhow::Result;
use glam::{Mat4, Vec2, Vec3};
use image::RgbaImage;

pub const FIELD_OF_VIEW_Y_DEGREES: f32 = 45.0;
pub const NEAR_PLANE: f32 = 1.0;
pub const FAR_PLANE: f32 = 400.0;

/// Opaque handle to a texture living on the render thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

/// One textured quad in camera space. The quad spans `[-w/2, w/2] ×
/// [-h/2, h/2]` in its local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadDraw {
    pub texture: TextureId,
    pub model_view: Mat4,
    pub size: Vec2,
    pub opacity: f32,
    /// Draw the mirrored copy below the quad instead of the quad itself.
    pub reflection: bool,
}

/// Screen-space image anchored by its top-left corner, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayDraw {
    pub texture: TextureId,
    pub origin: Vec2,
    pub size: Vec2,
    pub opacity: f32,
}

/// Everything that touches the GPU goes through this trait.
///
/// Implementations are owned by the render thread; the type system keeps
/// them there because nothing else ever receives a `&mut` to one.
pub trait RenderBackend {
    /// Width and height of the drawable surface in pixels.
    fn viewport(&self) -> (u32, u32);

    fn create_texture(&mut self, image: &RgbaImage) -> Result<TextureId>;

    fn destroy_texture(&mut self, texture: TextureId);

    /// Start a new frame. Discards any commands recorded since the last
    /// `end_frame`.
    fn begin_frame(&mut self);

    fn set_projection(&mut self, projection: Mat4);

    /// Clear the scene target to transparent.
    fn clear(&mut self);

    fn draw_quad(&mut self, quad: &QuadDraw);

    /// Add the current scene target into the accumulation target, scaled by
    /// `weight`. Once called in a frame, the accumulation target is what gets
    /// presented.
    fn accumulate(&mut self, weight: f32);

    fn draw_overlay(&mut self, overlay: &OverlayDraw);

    fn end_frame(&mut self) -> Result<()>;
}

/// Fixed camera looking at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 100.0),
        }
    }
}

impl Camera {
    pub fn new(eye: [f32; 3]) -> Self {
        Self {
            eye: Vec3::from_array(eye),
        }
    }

    /// Look at the origin with +Y up, then lift the scene by one unit.
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, Vec3::ZERO, Vec3::Y)
            * Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0))
    }
}

pub fn aspect_ratio(viewport: (u32, u32)) -> f32 {
    let (width, height) = viewport;
    width.max(1) as f32 / height.max(1) as f32
}

pub fn projection(viewport: (u32, u32)) -> Mat4 {
    Mat4::perspective_rh(
        FIELD_OF_VIEW_Y_DEGREES.to_radians(),
        aspect_ratio(viewport),
        NEAR_PLANE,
        FAR_PLANE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_places_origin_in_front_of_camera() {
        let view = Camera::default().view();
        let origin = view.transform_point3(Vec3::ZERO);
        assert!((origin.z + 100.0).abs() < 1e-4);
        assert!((origin.y + 1.0).abs() < 1e-4);
        assert!(origin.x.abs() < 1e-4);
    }

    #[test]
    fn inverse_view_recovers_eye() {
        let camera = Camera::new([10.0, 5.0, 80.0]);
        let inverse = camera.view().inverse();
        let eye = inverse.w_axis.truncate();
        // The extra translation shifts the recovered eye up by one unit.
        assert!((eye - Vec3::new(10.0, 6.0, 80.0)).length() < 1e-3);
    }

    #[test]
    fn aspect_ratio_survives_zero_height() {
        assert_eq!(aspect_ratio((800, 0)), 800.0);
    }
}
