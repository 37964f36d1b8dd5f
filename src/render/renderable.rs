use std::sync::Arc;

use anyhow::{Context, Result};
use glam::{IVec3, Mat4, Vec2, Vec3};
use image::RgbaImage;
use tracing::debug;

use super::{QuadDraw, RenderBackend, TextureId};

/// Opacity of a reflection at the edge where it touches its quad. It fades
/// to zero at the far edge.
pub const REFLECTION_OPACITY: f32 = 0.35;

/// Position, rotation in whole degrees, and scale of a drawable item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: IVec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: IVec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Scale first, then translate, then rotate about X, Y and Z. Scaling the
    /// translation is intentional: the carousel poses are authored that way.
    pub fn matrix(&self) -> Mat4 {
        let rotation = self.rotation.as_vec3();
        Mat4::from_scale(self.scale)
            * Mat4::from_translation(self.position)
            * Mat4::from_rotation_x(rotation.x.to_radians())
            * Mat4::from_rotation_y(rotation.y.to_radians())
            * Mat4::from_rotation_z(rotation.z.to_radians())
    }
}

/// A textured rectangle centred on its local origin.
#[derive(Debug, Clone)]
pub struct Quad {
    name: String,
    transform: Transform,
    width: f32,
    height: f32,
    image: Arc<RgbaImage>,
    texture: Option<TextureId>,
}

impl Quad {
    pub fn new(name: impl Into<String>, image: Arc<RgbaImage>, width: f32, height: f32) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            width,
            height,
            image,
            texture: None,
        }
    }
}

/// Drawable items. A billboard wraps any other variant and always faces the
/// camera: its position and scale are the wrapped item's, its authored
/// rotation is ignored.
#[derive(Debug, Clone)]
pub enum Renderable {
    Quad(Quad),
    Reflected(Quad),
    Billboard(Box<Renderable>),
}

impl Renderable {
    pub fn quad(quad: Quad) -> Self {
        Self::Quad(quad)
    }

    pub fn reflected(quad: Quad) -> Self {
        Self::Reflected(quad)
    }

    pub fn billboard(item: Renderable) -> Self {
        Self::Billboard(Box::new(item))
    }

    fn base(&self) -> &Quad {
        match self {
            Self::Quad(quad) | Self::Reflected(quad) => quad,
            Self::Billboard(item) => item.base(),
        }
    }

    fn base_mut(&mut self) -> &mut Quad {
        match self {
            Self::Quad(quad) | Self::Reflected(quad) => quad,
            Self::Billboard(item) => item.base_mut(),
        }
    }

    pub fn name(&self) -> &str {
        &self.base().name
    }

    pub fn width(&self) -> f32 {
        self.base().width
    }

    pub fn height(&self) -> f32 {
        self.base().height
    }

    pub fn transform(&self) -> Transform {
        Transform {
            position: self.position(),
            rotation: self.rotation(),
            scale: self.scale(),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.base().transform.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.base_mut().transform.position = position;
    }

    pub fn rotation(&self) -> IVec3 {
        match self {
            Self::Billboard(_) => IVec3::ZERO,
            _ => self.base().transform.rotation,
        }
    }

    pub fn set_rotation(&mut self, rotation: IVec3) {
        match self {
            Self::Billboard(_) => {}
            _ => self.base_mut().transform.rotation = rotation,
        }
    }

    pub fn scale(&self) -> Vec3 {
        self.base().transform.scale
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.base_mut().transform.scale = scale;
    }

    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.set_scale(Vec3::splat(scale));
    }

    pub fn texture(&self) -> Option<TextureId> {
        self.base().texture
    }

    pub fn is_initialized(&self) -> bool {
        self.texture().is_some()
    }

    /// Upload the image. Calling it twice is a no-op.
    pub fn init(&mut self, backend: &mut dyn RenderBackend) -> Result<()> {
        let quad = self.base_mut();
        if quad.texture.is_some() {
            return Ok(());
        }
        let texture = backend
            .create_texture(&quad.image)
            .with_context(|| format!("failed to upload texture for {:?}", quad.name))?;
        debug!(name = %quad.name, texture = texture.0, "renderable initialised");
        quad.texture = Some(texture);
        Ok(())
    }

    pub fn dispose(&mut self, backend: &mut dyn RenderBackend) {
        let quad = self.base_mut();
        if let Some(texture) = quad.texture.take() {
            debug!(name = %quad.name, texture = texture.0, "renderable disposed");
            backend.destroy_texture(texture);
        }
    }

    /// World transform of the item for the given view.
    pub fn model_matrix(&self, view: Mat4) -> Mat4 {
        match self {
            Self::Quad(quad) | Self::Reflected(quad) => quad.transform.matrix(),
            Self::Billboard(item) => billboard_matrix(view, item.position(), item.scale()),
        }
    }

    /// World-space centre, used for depth ordering.
    pub fn world_position(&self, view: Mat4) -> Vec3 {
        self.model_matrix(view).transform_point3(Vec3::ZERO)
    }

    /// Draw through `backend`. Items without a texture are skipped.
    pub fn render(&self, view: Mat4, backend: &mut dyn RenderBackend) {
        let model_view = view * self.model_matrix(view);
        self.draw_with(model_view, backend);
    }

    fn draw_with(&self, model_view: Mat4, backend: &mut dyn RenderBackend) {
        match self {
            Self::Quad(quad) => {
                if let Some(texture) = quad.texture {
                    backend.draw_quad(&quad_draw(quad, texture, model_view, false));
                }
            }
            Self::Reflected(quad) => {
                if let Some(texture) = quad.texture {
                    backend.draw_quad(&quad_draw(quad, texture, model_view, true));
                    backend.draw_quad(&quad_draw(quad, texture, model_view, false));
                }
            }
            Self::Billboard(item) => item.draw_with(model_view, backend),
        }
    }
}

fn quad_draw(quad: &Quad, texture: TextureId, model_view: Mat4, reflection: bool) -> QuadDraw {
    QuadDraw {
        texture,
        model_view,
        size: Vec2::new(quad.width, quad.height),
        opacity: if reflection { REFLECTION_OPACITY } else { 1.0 },
        reflection,
    }
}

/// Rotation that turns local +Z toward the camera, placed at `position`.
///
/// The camera position and up vector come from the inverse of `view`; the
/// basis is `right = up_cam × look`, `up = look × right`.
pub fn billboard_matrix(view: Mat4, position: Vec3, scale: Vec3) -> Mat4 {
    let inverse = view.inverse();
    let camera = inverse.w_axis.truncate();
    let camera_up = inverse.y_axis.truncate();

    let look = (camera - position).try_normalize().unwrap_or(Vec3::Z);
    let right = camera_up.cross(look).try_normalize().unwrap_or(Vec3::X);
    let up = look.cross(right);

    Mat4::from_cols(
        right.extend(0.0),
        up.extend(0.0),
        look.extend(0.0),
        position.extend(1.0),
    ) * Mat4::from_scale(scale)
}
