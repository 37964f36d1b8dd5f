//! Picture captions: the name in white over a soft drop shadow.

use std::fs;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont, point};
use anyhow::{Context, Result, anyhow};
use fontdb::{Database, Family, Query, Source, Weight};
use image::{Rgba, RgbaImage, imageops};
use tracing::debug;

use super::shadow::ShadowBlur;

/// Where the shadow sits relative to the centred text.
const SHADOW_OFFSET: (i64, i64) = (-1, 2);

/// Produces caption images for picture names.
pub trait CaptionSource: Send {
    /// Pixel size of the text, used to place the caption above the bottom edge.
    fn font_size(&self) -> f32;

    fn render(&self, text: &str) -> Option<RgbaImage>;
}

pub struct LabelRenderer {
    font: FontArc,
    scale: PxScale,
    shadow: ShadowBlur,
}

impl std::fmt::Debug for LabelRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelRenderer")
            .field("scale", &self.scale)
            .field("shadow", &self.shadow)
            .finish_non_exhaustive()
    }
}

impl LabelRenderer {
    pub fn new(font: FontArc, size: f32, shadow: ShadowBlur) -> Self {
        Self {
            font,
            scale: PxScale::from(size),
            shadow,
        }
    }

    /// Use the first bold sans-serif face found on the system.
    pub fn from_system_fonts(size: f32, shadow: ShadowBlur) -> Result<Self> {
        Ok(Self::new(load_font()?, size, shadow))
    }

    pub fn font_size(&self) -> f32 {
        self.scale.y
    }

    pub fn shadow(&self) -> &ShadowBlur {
        &self.shadow
    }

    /// Rasterise `text` with its shadow. Blank text yields `None`.
    pub fn render(&self, text: &str) -> Option<RgbaImage> {
        let text = self.rasterize(text)?;
        Some(compose_with_shadow(&text, &self.shadow))
    }

    fn rasterize(&self, text: &str) -> Option<RgbaImage> {
        let scaled = self.font.as_scaled(self.scale);
        let mut width = 0.0f32;
        let mut previous = None;
        for ch in text.chars().filter(|ch| !ch.is_control()) {
            let glyph = scaled.glyph_id(ch);
            if let Some(prev) = previous {
                width += scaled.kern(prev, glyph);
            }
            width += scaled.h_advance(glyph);
            previous = Some(glyph);
        }
        let height = scaled.ascent() - scaled.descent() + scaled.line_gap();
        let (width, height) = (width.ceil() as u32, height.ceil() as u32);
        if width == 0 || height == 0 {
            return None;
        }

        let mut image = RgbaImage::new(width, height);
        let baseline = scaled.ascent();
        let mut cursor = 0.0f32;
        let mut previous = None;
        for ch in text.chars().filter(|ch| !ch.is_control()) {
            let glyph = scaled.glyph_id(ch);
            if let Some(prev) = previous {
                cursor += scaled.kern(prev, glyph);
            }
            let mut positioned = scaled.scaled_glyph(ch);
            positioned.position = point(cursor, baseline);
            if let Some(outline) = self.font.outline_glyph(positioned) {
                let bounds = outline.px_bounds();
                outline.draw(|x, y, coverage| {
                    let px = bounds.min.x as i64 + i64::from(x);
                    let py = bounds.min.y as i64 + i64::from(y);
                    if px < 0 || py < 0 || px >= i64::from(width) || py >= i64::from(height) {
                        return;
                    }
                    let pixel = image.get_pixel_mut(px as u32, py as u32);
                    let alpha = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
                    *pixel = Rgba([255, 255, 255, pixel[3].max(alpha)]);
                });
            }
            cursor += scaled.h_advance(glyph);
            previous = Some(glyph);
        }
        debug!(text, width, height, "caption rasterised");
        Some(image)
    }
}

impl CaptionSource for LabelRenderer {
    fn font_size(&self) -> f32 {
        LabelRenderer::font_size(self)
    }

    fn render(&self, text: &str) -> Option<RgbaImage> {
        LabelRenderer::render(self, text)
    }
}

/// Centre `text` on its blurred shadow, the shadow nudged by
/// `SHADOW_OFFSET`. The result is the size of the shadow.
pub fn compose_with_shadow(text: &RgbaImage, shadow: &ShadowBlur) -> RgbaImage {
    let blurred = shadow.create_shadow(text);
    let mut composite = RgbaImage::new(blurred.width(), blurred.height());
    imageops::overlay(&mut composite, &blurred, SHADOW_OFFSET.0, SHADOW_OFFSET.1);
    let x = (i64::from(blurred.width()) - i64::from(text.width())) / 2;
    let y = (i64::from(blurred.height()) - i64::from(text.height())) / 2;
    imageops::overlay(&mut composite, text, x, y);
    composite
}

fn load_font() -> Result<FontArc> {
    let mut db = Database::new();
    db.load_system_fonts();

    let preferred_families = [
        Family::Name("Inter"),
        Family::Name("Noto Sans"),
        Family::Name("DejaVu Sans"),
        Family::SansSerif,
    ];

    for family in preferred_families {
        if let Some(id) = db.query(&Query {
            families: &[family],
            weight: Weight::BOLD,
            ..Default::default()
        }) {
            match load_face(&db, id) {
                Ok(font) => return Ok(font),
                Err(err) => debug!("skipping preferred font face: {err:#}"),
            }
        }
    }

    for face in db.faces() {
        match load_face(&db, face.id) {
            Ok(font) => return Ok(font),
            Err(err) => debug!("skipping font face: {err:#}"),
        }
    }

    Err(anyhow!("no usable system font for captions"))
}

fn load_face(db: &Database, id: fontdb::ID) -> Result<FontArc> {
    let face = db.face(id).context("missing font face in database")?;
    let data = match &face.source {
        Source::Binary(data) => data.as_ref().as_ref().to_vec(),
        Source::File(path) => {
            fs::read(path).with_context(|| format!("failed to read font at {}", path.display()))?
        }
        Source::SharedFile(_, data) => data.as_ref().as_ref().to_vec(),
    };
    FontArc::try_from_vec(data).context("failed to decode font face")
}
