//! GPU backend on top of wgpu.
//!
//! Calls between `begin_frame` and `end_frame` are recorded and turned into
//! render passes at `end_frame`: one scene pass per `clear`, one additive
//! pass per `accumulate`, and a final pass that lays the result over the
//! floor gradient and draws overlays on the surface.

use std::collections::HashMap;
use std::num::NonZeroU64;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};
use image::RgbaImage;
use tracing::{debug, info, warn};
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::{OverlayDraw, QuadDraw, RenderBackend, TextureId};

const SCENE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
const INITIAL_UNIFORM_SLOTS: usize = 64;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
struct QuadUniform {
    mvp: [[f32; 4]; 4],
    size: [f32; 2],
    opacity: f32,
    reflection: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Op {
    Clear,
    Projection(Mat4),
    Quad(QuadDraw),
    Accumulate(f32),
    Overlay(OverlayDraw),
}

/// A textured draw and the uniform slot it reads.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Draw {
    texture: TextureId,
    slot: usize,
}

#[derive(Debug, Default, PartialEq)]
struct ScenePass {
    draws: Vec<Draw>,
    accumulate: Option<f32>,
}

/// Recorded ops resolved into passes plus the uniform contents they need.
#[derive(Debug, Default, PartialEq)]
struct FramePlan {
    scene: Vec<ScenePass>,
    overlays: Vec<Draw>,
    uniforms: Vec<QuadUniform>,
}

impl FramePlan {
    fn accumulated(&self) -> bool {
        self.scene.iter().any(|pass| pass.accumulate.is_some())
    }
}

fn plan_frame(ops: &[Op], viewport: (u32, u32)) -> FramePlan {
    let mut plan = FramePlan::default();
    let mut projection = Mat4::IDENTITY;
    let mut current = ScenePass::default();
    let mut dirty = false;

    for op in ops {
        match *op {
            Op::Clear => {
                if dirty {
                    plan.scene.push(std::mem::take(&mut current));
                }
                dirty = true;
            }
            Op::Projection(matrix) => projection = matrix,
            Op::Quad(quad) => {
                current.draws.push(Draw {
                    texture: quad.texture,
                    slot: plan.uniforms.len(),
                });
                plan.uniforms.push(QuadUniform {
                    mvp: (projection * quad.model_view).to_cols_array_2d(),
                    size: quad.size.to_array(),
                    opacity: quad.opacity,
                    reflection: if quad.reflection { 1.0 } else { 0.0 },
                });
                dirty = true;
            }
            Op::Accumulate(weight) => {
                current.accumulate = Some(weight);
                plan.scene.push(std::mem::take(&mut current));
                dirty = false;
            }
            Op::Overlay(overlay) => {
                plan.overlays.push(Draw {
                    texture: overlay.texture,
                    slot: plan.uniforms.len(),
                });
                plan.uniforms.push(QuadUniform {
                    mvp: overlay_matrix(viewport, overlay.origin, overlay.size).to_cols_array_2d(),
                    size: overlay.size.to_array(),
                    opacity: overlay.opacity,
                    reflection: 0.0,
                });
            }
        }
    }
    if dirty || plan.scene.is_empty() {
        plan.scene.push(current);
    }
    plan
}

/// Pixel rectangle with a top-left `origin` to clip space. Local +Y maps to
/// the top of the rectangle, matching carousel quads.
fn overlay_matrix(viewport: (u32, u32), origin: Vec2, size: Vec2) -> Mat4 {
    let (width, height) = (viewport.0.max(1) as f32, viewport.1.max(1) as f32);
    let centre = origin + size / 2.0;
    Mat4::orthographic_rh(0.0, width, height, 0.0, -1.0, 1.0)
        * Mat4::from_translation(centre.extend(0.0))
        * Mat4::from_scale(Vec3::new(1.0, -1.0, 1.0))
}

fn uniform_stride(alignment: u32) -> u64 {
    let size = std::mem::size_of::<QuadUniform>() as u64;
    let alignment = u64::from(alignment.max(1));
    size.div_ceil(alignment) * alignment
}

struct GpuTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

struct Target {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
}

struct Uniforms {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: u64,
    slots: usize,
}

struct Pipelines {
    scene_quad: wgpu::RenderPipeline,
    overlay_quad: wgpu::RenderPipeline,
    accumulate: wgpu::RenderPipeline,
    present: wgpu::RenderPipeline,
    background: wgpu::RenderPipeline,
}

pub struct WgpuBackend {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    pipelines: Pipelines,
    uniforms: Uniforms,
    scene: Target,
    accumulation: Target,
    textures: HashMap<TextureId, GpuTexture>,
    next_texture: u64,
    ops: Vec<Op>,
}

impl std::fmt::Debug for WgpuBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WgpuBackend")
            .field("size", &(self.config.width, self.config.height))
            .field("format", &self.config.format)
            .field("textures", &self.textures.len())
            .finish_non_exhaustive()
    }
}

impl WgpuBackend {
    pub fn new(window: Arc<Window>) -> Result<Self> {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("failed to acquire GPU adapter")?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|fmt| fmt.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow!("surface reports no supported formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let limits = adapter.limits();
        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("carousel-device"),
            required_features: wgpu::Features::empty(),
            required_limits: limits,
            memory_hints: wgpu::MemoryHints::default(),
            trace: wgpu::Trace::default(),
        }))
        .context("failed to acquire GPU device")?;

        let size = window.inner_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        info!(
            width = config.width,
            height = config.height,
            format = ?config.format,
            "carousel surface configured",
        );

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("carousel-uniform-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<QuadUniform>() as u64),
                },
                count: None,
            }],
        });
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("carousel-texture-bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("carousel-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let pipelines = create_pipelines(&device, &uniform_layout, &texture_layout, format);
        let stride = uniform_stride(device.limits().min_uniform_buffer_offset_alignment);
        let uniforms = create_uniforms(&device, &uniform_layout, stride, INITIAL_UNIFORM_SLOTS);
        let scene = create_target(&device, &texture_layout, &sampler, &config, "carousel-scene");
        let accumulation =
            create_target(&device, &texture_layout, &sampler, &config, "carousel-accumulation");

        Ok(Self {
            surface,
            device,
            queue,
            config,
            uniform_layout,
            texture_layout,
            sampler,
            pipelines,
            uniforms,
            scene,
            accumulation,
            textures: HashMap::new(),
            next_texture: 1,
            ops: Vec::new(),
        })
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.scene = create_target(
            &self.device,
            &self.texture_layout,
            &self.sampler,
            &self.config,
            "carousel-scene",
        );
        self.accumulation = create_target(
            &self.device,
            &self.texture_layout,
            &self.sampler,
            &self.config,
            "carousel-accumulation",
        );
        debug!(
            width = self.config.width,
            height = self.config.height,
            "carousel surface resized",
        );
    }

    fn reconfigure(&mut self) {
        let size = PhysicalSize::new(self.config.width, self.config.height);
        self.resize(size);
    }

    fn ensure_uniform_slots(&mut self, needed: usize) {
        if needed <= self.uniforms.slots {
            return;
        }
        let slots = needed.next_power_of_two();
        debug!(slots, "growing quad uniform buffer");
        self.uniforms = create_uniforms(&self.device, &self.uniform_layout, self.uniforms.stride, slots);
    }

    fn upload_uniforms(&self, uniforms: &[QuadUniform]) {
        if uniforms.is_empty() {
            return;
        }
        let stride = self.uniforms.stride as usize;
        let mut staging = vec![0u8; stride * uniforms.len()];
        for (chunk, uniform) in staging.chunks_exact_mut(stride).zip(uniforms) {
            let bytes = bytemuck::bytes_of(uniform);
            chunk[..bytes.len()].copy_from_slice(bytes);
        }
        self.queue.write_buffer(&self.uniforms.buffer, 0, &staging);
    }

    fn draw_textured(&self, pass: &mut wgpu::RenderPass<'_>, draws: &[Draw]) {
        for draw in draws {
            let Some(texture) = self.textures.get(&draw.texture) else {
                continue;
            };
            let offset = (draw.slot as u64 * self.uniforms.stride) as wgpu::DynamicOffset;
            pass.set_bind_group(0, &self.uniforms.bind_group, &[offset]);
            pass.set_bind_group(1, &texture.bind_group, &[]);
            pass.draw(0..4, 0..1);
        }
    }

    fn encode(&self, encoder: &mut wgpu::CommandEncoder, plan: &FramePlan, output: &wgpu::TextureView) {
        let mut accumulation_cleared = false;
        for scene in &plan.scene {
            {
                let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("carousel-scene-pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &self.scene.view,
                        resolve_target: None,
                        depth_slice: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                });
                pass.set_pipeline(&self.pipelines.scene_quad);
                self.draw_textured(&mut pass, &scene.draws);
            }

            let Some(weight) = scene.accumulate else {
                continue;
            };
            let load = if accumulation_cleared {
                wgpu::LoadOp::Load
            } else {
                wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT)
            };
            accumulation_cleared = true;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("carousel-accumulate-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.accumulation.view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            let weight = f64::from(weight);
            pass.set_pipeline(&self.pipelines.accumulate);
            pass.set_blend_constant(wgpu::Color {
                r: weight,
                g: weight,
                b: weight,
                a: weight,
            });
            pass.set_bind_group(0, &self.scene.bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        let source = if plan.accumulated() {
            &self.accumulation
        } else {
            &self.scene
        };
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("carousel-present-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: output,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipelines.background);
        pass.draw(0..3, 0..1);
        pass.set_pipeline(&self.pipelines.present);
        pass.set_bind_group(0, &source.bind_group, &[]);
        pass.draw(0..3, 0..1);
        pass.set_pipeline(&self.pipelines.overlay_quad);
        self.draw_textured(&mut pass, &plan.overlays);
    }
}

impl RenderBackend for WgpuBackend {
    fn viewport(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn create_texture(&mut self, image: &RgbaImage) -> Result<TextureId> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            bail!("cannot upload an empty {width}x{height} image");
        }
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("carousel-picture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = texture_bind_group(&self.device, &self.texture_layout, &view, &self.sampler);

        let id = TextureId(self.next_texture);
        self.next_texture += 1;
        self.textures.insert(
            id,
            GpuTexture {
                texture,
                bind_group,
            },
        );
        Ok(id)
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        if let Some(gpu) = self.textures.remove(&texture) {
            gpu.texture.destroy();
        }
    }

    fn begin_frame(&mut self) {
        self.ops.clear();
    }

    fn set_projection(&mut self, projection: Mat4) {
        self.ops.push(Op::Projection(projection));
    }

    fn clear(&mut self) {
        self.ops.push(Op::Clear);
    }

    fn draw_quad(&mut self, quad: &QuadDraw) {
        self.ops.push(Op::Quad(*quad));
    }

    fn accumulate(&mut self, weight: f32) {
        self.ops.push(Op::Accumulate(weight));
    }

    fn draw_overlay(&mut self, overlay: &OverlayDraw) {
        self.ops.push(Op::Overlay(*overlay));
    }

    fn end_frame(&mut self) -> Result<()> {
        let ops = std::mem::take(&mut self.ops);
        let plan = plan_frame(&ops, self.viewport());
        self.ensure_uniform_slots(plan.uniforms.len());
        self.upload_uniforms(&plan.uniforms);

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Outdated) | Err(SurfaceError::Lost) => {
                info!("carousel surface lost; reconfiguring");
                self.reconfigure();
                return Ok(());
            }
            Err(SurfaceError::OutOfMemory) => {
                return Err(anyhow!("carousel surface out of memory"));
            }
            Err(SurfaceError::Timeout) => {
                warn!("carousel surface acquisition timed out");
                return Ok(());
            }
            Err(SurfaceError::Other) => {
                warn!("carousel surface reported an unknown error; retrying");
                self.reconfigure();
                return Ok(());
            }
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("carousel-encoder"),
            });
        self.encode(&mut encoder, &plan, &view);
        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("carousel-texture-bind-group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

fn create_target(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    config: &wgpu::SurfaceConfiguration,
    label: &'static str,
) -> Target {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: SCENE_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = texture_bind_group(device, layout, &view, sampler);
    Target {
        _texture: texture,
        view,
        bind_group,
    }
}

fn create_uniforms(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    stride: u64,
    slots: usize,
) -> Uniforms {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("carousel-quad-uniforms"),
        size: stride * slots as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("carousel-quad-uniform-bind-group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: NonZeroU64::new(std::mem::size_of::<QuadUniform>() as u64),
            }),
        }],
    });
    Uniforms {
        buffer,
        bind_group,
        stride,
        slots,
    }
}

fn create_pipelines(
    device: &wgpu::Device,
    uniform_layout: &wgpu::BindGroupLayout,
    texture_layout: &wgpu::BindGroupLayout,
    surface_format: wgpu::TextureFormat,
) -> Pipelines {
    let quad_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("carousel-quad-shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/quad.wgsl").into()),
    });
    let composite_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("carousel-composite-shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/composite.wgsl").into()),
    });

    let quad_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("carousel-quad-pipeline-layout"),
        bind_group_layouts: &[uniform_layout, texture_layout],
        push_constant_ranges: &[],
    });
    let composite_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("carousel-composite-pipeline-layout"),
        bind_group_layouts: &[texture_layout],
        push_constant_ranges: &[],
    });
    let background_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("carousel-background-pipeline-layout"),
        bind_group_layouts: &[],
        push_constant_ranges: &[],
    });

    let additive = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::Constant,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    };

    Pipelines {
        scene_quad: pipeline(
            device,
            "carousel-scene-quad-pipeline",
            &quad_layout,
            &quad_shader,
            "fs_main",
            SCENE_FORMAT,
            Some(wgpu::BlendState::ALPHA_BLENDING),
            wgpu::PrimitiveTopology::TriangleStrip,
        ),
        overlay_quad: pipeline(
            device,
            "carousel-overlay-pipeline",
            &quad_layout,
            &quad_shader,
            "fs_main",
            surface_format,
            Some(wgpu::BlendState::ALPHA_BLENDING),
            wgpu::PrimitiveTopology::TriangleStrip,
        ),
        accumulate: pipeline(
            device,
            "carousel-accumulate-pipeline",
            &composite_layout,
            &composite_shader,
            "fs_blit",
            SCENE_FORMAT,
            Some(wgpu::BlendState {
                color: additive,
                alpha: additive,
            }),
            wgpu::PrimitiveTopology::TriangleList,
        ),
        present: pipeline(
            device,
            "carousel-present-pipeline",
            &composite_layout,
            &composite_shader,
            "fs_blit",
            surface_format,
            Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
            wgpu::PrimitiveTopology::TriangleList,
        ),
        background: pipeline(
            device,
            "carousel-background-pipeline",
            &background_layout,
            &composite_shader,
            "fs_background",
            surface_format,
            None,
            wgpu::PrimitiveTopology::TriangleList,
        ),
    }
}

#[allow(clippy::too_many_arguments)]
fn pipeline(
    device: &wgpu::Device,
    label: &'static str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    fragment: &'static str,
    format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    topology: wgpu::PrimitiveTopology,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fragment),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
