//! Headless backend that records every call with the thread it came from.
//! Drives `--dry-run` and the tests.

use std::collections::BTreeSet;
use std::thread::{self, ThreadId};

use anyhow::Result;
use glam::Mat4;
use image::RgbaImage;

use super::{OverlayDraw, QuadDraw, RenderBackend, TextureId};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateTexture {
        texture: TextureId,
        width: u32,
        height: u32,
    },
    DestroyTexture(TextureId),
    BeginFrame,
    SetProjection(Mat4),
    Clear,
    DrawQuad(QuadDraw),
    Accumulate(f32),
    DrawOverlay(OverlayDraw),
    EndFrame,
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub call: Call,
    pub thread: ThreadId,
}

#[derive(Debug)]
pub struct RecordingBackend {
    viewport: (u32, u32),
    next_texture: u64,
    live: BTreeSet<TextureId>,
    frames: usize,
    log: Vec<RecordedCall>,
}

impl RecordingBackend {
    pub fn new(viewport: (u32, u32)) -> Self {
        Self {
            viewport,
            next_texture: 1,
            live: BTreeSet::new(),
            frames: 0,
            log: Vec::new(),
        }
    }

    pub fn set_viewport(&mut self, viewport: (u32, u32)) {
        self.viewport = viewport;
    }

    fn record(&mut self, call: Call) {
        self.log.push(RecordedCall {
            call,
            thread: thread::current().id(),
        });
    }

    pub fn log(&self) -> &[RecordedCall] {
        &self.log
    }

    pub fn calls(&self) -> Vec<&Call> {
        self.log.iter().map(|entry| &entry.call).collect()
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    pub fn created(&self) -> Vec<TextureId> {
        self.log
            .iter()
            .filter_map(|entry| match entry.call {
                Call::CreateTexture { texture, .. } => Some(texture),
                _ => None,
            })
            .collect()
    }

    pub fn destroyed(&self) -> Vec<TextureId> {
        self.log
            .iter()
            .filter_map(|entry| match entry.call {
                Call::DestroyTexture(texture) => Some(texture),
                _ => None,
            })
            .collect()
    }

    pub fn draws(&self) -> Vec<QuadDraw> {
        self.log
            .iter()
            .filter_map(|entry| match entry.call {
                Call::DrawQuad(draw) => Some(draw),
                _ => None,
            })
            .collect()
    }

    pub fn overlays(&self) -> Vec<OverlayDraw> {
        self.log
            .iter()
            .filter_map(|entry| match entry.call {
                Call::DrawOverlay(draw) => Some(draw),
                _ => None,
            })
            .collect()
    }

    /// Threads that created or destroyed textures.
    pub fn resource_threads(&self) -> BTreeSet<String> {
        self.log
            .iter()
            .filter(|entry| {
                matches!(
                    entry.call,
                    Call::CreateTexture { .. } | Call::DestroyTexture(_)
                )
            })
            .map(|entry| format!("{:?}", entry.thread))
            .collect()
    }

    pub fn live_textures(&self) -> usize {
        self.live.len()
    }

    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl RenderBackend for RecordingBackend {
    fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    fn create_texture(&mut self, image: &RgbaImage) -> Result<TextureId> {
        let texture = TextureId(self.next_texture);
        self.next_texture += 1;
        self.live.insert(texture);
        self.record(Call::CreateTexture {
            texture,
            width: image.width(),
            height: image.height(),
        });
        Ok(texture)
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        self.live.remove(&texture);
        self.record(Call::DestroyTexture(texture));
    }

    fn begin_frame(&mut self) {
        self.record(Call::BeginFrame);
    }

    fn set_projection(&mut self, projection: Mat4) {
        self.record(Call::SetProjection(projection));
    }

    fn clear(&mut self) {
        self.record(Call::Clear);
    }

    fn draw_quad(&mut self, quad: &QuadDraw) {
        self.record(Call::DrawQuad(*quad));
    }

    fn accumulate(&mut self, weight: f32) {
        self.record(Call::Accumulate(weight));
    }

    fn draw_overlay(&mut self, overlay: &OverlayDraw) {
        self.record(Call::DrawOverlay(*overlay));
    }

    fn end_frame(&mut self) -> Result<()> {
        self.frames += 1;
        self.record(Call::EndFrame);
        Ok(())
    }
}
