use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Result, ensure};
use nabu_engine::context::Context;
use nabu_engine::coords::Rect;
use nabu_engine::record::Recording;
use nabu_engine::text::GlyphCache;

use crate::batch::{self, BatchKind, FramePlan};
use crate::vertex::{SolidVertex, TextVertex, ViewportUniform, viewport_ubo_min_binding_size};

/// Frame clear color (opaque black, matching the software rasterizer).
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

/// [`Context`] implementation over host-provided wgpu objects.
///
/// The host creates the instance/adapter/device/queue and the window surface
/// (platform bootstrap); this type owns everything downstream: surface
/// configuration, pipelines built from embedded WGSL, streamed vertex
/// buffers, the glyph-atlas texture, and the per-frame encoder.
///
/// Render state is cached at two levels: the viewport uniform and atlas
/// texture persist across frames and are only rewritten when their source
/// changes; scissor and pipeline bindings are tracked inside each render
/// pass and only re-issued at batch boundaries.
pub struct WgpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    format: wgpu::TextureFormat,
    config: Option<wgpu::SurfaceConfiguration>,

    // pipelines
    tri_pipeline: Option<wgpu::RenderPipeline>,
    line_pipeline: Option<wgpu::RenderPipeline>,
    text_pipeline: Option<wgpu::RenderPipeline>,
    solid_bgl: Option<wgpu::BindGroupLayout>,
    text_bgl: Option<wgpu::BindGroupLayout>,

    // bindings
    viewport_ubo: Option<wgpu::Buffer>,
    solid_bind_group: Option<wgpu::BindGroup>,
    text_bind_group: Option<wgpu::BindGroup>,
    sampler: Option<wgpu::Sampler>,
    written_viewport: Option<[f32; 2]>,

    // glyph atlas
    glyph_cache: Option<Rc<RefCell<GlyphCache>>>,
    atlas_texture: Option<wgpu::Texture>,
    atlas_view: Option<wgpu::TextureView>,
    atlas_size: (u32, u32),

    // streamed vertex data
    tri_stream: StreamBuffer,
    line_stream: StreamBuffer,
    text_stream: StreamBuffer,

    frame: Option<Frame>,
}

struct Frame {
    surface_texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: Option<wgpu::CommandEncoder>,
    cleared: bool,
}

/// How to proceed after a surface acquisition error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum SurfaceErrorAction {
    Reconfigured,
    SkipFrame,
    Fatal,
}

impl WgpuContext {
    /// Wraps host-provided wgpu objects. Call sites go through
    /// [`Surface::new_gpu`](nabu_engine::surface::Surface::new_gpu), which
    /// drives [`Context::init`].
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface: wgpu::Surface<'static>,
        format: wgpu::TextureFormat,
    ) -> Self {
        Self {
            device,
            queue,
            surface,
            format,
            config: None,
            tri_pipeline: None,
            line_pipeline: None,
            text_pipeline: None,
            solid_bgl: None,
            text_bgl: None,
            viewport_ubo: None,
            solid_bind_group: None,
            text_bind_group: None,
            sampler: None,
            written_viewport: None,
            glyph_cache: None,
            atlas_texture: None,
            atlas_view: None,
            atlas_size: (0, 0),
            tri_stream: StreamBuffer::new("nabu tri vertices"),
            line_stream: StreamBuffer::new("nabu line vertices"),
            text_stream: StreamBuffer::new("nabu text vertices"),
            frame: None,
        }
    }

    // ── setup ─────────────────────────────────────────────────────────────

    fn ensure_pipelines(&mut self) {
        if self.tri_pipeline.is_some() {
            return;
        }

        let solid_shader = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("nabu solid shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/solid.wgsl").into()),
            });
        let text_shader = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("nabu text shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/text.wgsl").into()),
            });

        let solid_bgl = self
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("nabu solid bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: Some(viewport_ubo_min_binding_size()),
                    },
                    count: None,
                }],
            });

        let text_bgl = self
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("nabu text bgl"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: Some(viewport_ubo_min_binding_size()),
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let solid_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("nabu solid pipeline layout"),
                bind_group_layouts: &[&solid_bgl],
                immediate_size: 0,
            });
        let text_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("nabu text pipeline layout"),
                bind_group_layouts: &[&text_bgl],
                immediate_size: 0,
            });

        self.tri_pipeline = Some(self.create_pipeline(
            "nabu tri pipeline",
            &solid_layout,
            &solid_shader,
            SolidVertex::layout(),
            wgpu::PrimitiveTopology::TriangleList,
        ));
        self.line_pipeline = Some(self.create_pipeline(
            "nabu line pipeline",
            &solid_layout,
            &solid_shader,
            SolidVertex::layout(),
            wgpu::PrimitiveTopology::LineList,
        ));
        self.text_pipeline = Some(self.create_pipeline(
            "nabu text pipeline",
            &text_layout,
            &text_shader,
            TextVertex::layout(),
            wgpu::PrimitiveTopology::TriangleList,
        ));

        self.solid_bgl = Some(solid_bgl);
        self.text_bgl = Some(text_bgl);
    }

    fn create_pipeline(
        &self,
        label: &str,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        vertex_layout: wgpu::VertexBufferLayout<'_>,
        topology: wgpu::PrimitiveTopology,
    ) -> wgpu::RenderPipeline {
        self.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[vertex_layout],
                },
                fragment: Some(wgpu::FragmentState {
                    module: shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.format,
                        blend: Some(straight_alpha_blend()),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
    }

    fn ensure_static_bindings(&mut self) {
        if self.viewport_ubo.is_some() {
            return;
        }

        self.viewport_ubo = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("nabu viewport ubo"),
            size: std::mem::size_of::<ViewportUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));

        // Glyph quads snap to the pixel grid; nearest sampling keeps edges
        // crisp.
        self.sampler = Some(self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("nabu atlas sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        }));

        let (Some(bgl), Some(ubo)) = (self.solid_bgl.as_ref(), self.viewport_ubo.as_ref()) else {
            return;
        };
        self.solid_bind_group = Some(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("nabu solid bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        }));
    }

    fn ensure_text_bind_group(&mut self) {
        if self.text_bind_group.is_some() {
            return;
        }
        let (Some(bgl), Some(ubo), Some(view), Some(sampler)) = (
            self.text_bgl.as_ref(),
            self.viewport_ubo.as_ref(),
            self.atlas_view.as_ref(),
            self.sampler.as_ref(),
        ) else {
            return;
        };

        self.text_bind_group = Some(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("nabu text bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        }));
    }

    // ── per-frame state ───────────────────────────────────────────────────

    fn write_viewport_uniform(&mut self) {
        let Some(config) = &self.config else { return };
        let Some(ubo) = self.viewport_ubo.as_ref() else { return };

        let viewport = [config.width.max(1) as f32, config.height.max(1) as f32];
        if self.written_viewport == Some(viewport) {
            return;
        }

        self.queue.write_buffer(
            ubo,
            0,
            bytemuck::bytes_of(&ViewportUniform {
                viewport,
                _pad: [0.0; 2],
            }),
        );
        self.written_viewport = Some(viewport);
    }

    /// Re-uploads the glyph atlas when the cache grew or rasterized new
    /// glyphs since the last upload.
    fn upload_atlas(&mut self) {
        let Some(cache) = self.glyph_cache.clone() else { return };

        let (size, dirty) = {
            let cache = cache.borrow();
            let atlas = cache.atlas();
            ((atlas.width(), atlas.height()), atlas.dirty())
        };

        let needs_texture = self.atlas_texture.is_none() || self.atlas_size != size;
        if !needs_texture && !dirty {
            return;
        }

        if needs_texture {
            let texture = self.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("nabu glyph atlas"),
                size: wgpu::Extent3d {
                    width: size.0,
                    height: size.1,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::R8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            self.atlas_view = Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));
            self.atlas_texture = Some(texture);
            self.atlas_size = size;
            // The old bind group references the old texture.
            self.text_bind_group = None;
        }

        {
            let cache = cache.borrow();
            let Some(texture) = self.atlas_texture.as_ref() else { return };
            self.queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                cache.atlas().data(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(size.0),
                    rows_per_image: Some(size.1),
                },
                wgpu::Extent3d {
                    width: size.0,
                    height: size.1,
                    depth_or_array_layers: 1,
                },
            );
        }
        cache.borrow_mut().mark_clean();

        self.ensure_text_bind_group();
    }

    fn handle_surface_error(&mut self, err: wgpu::SurfaceError) -> SurfaceErrorAction {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                if let Some(config) = &self.config {
                    if config.width > 0 && config.height > 0 {
                        self.surface.configure(&self.device, config);
                    }
                }
                SurfaceErrorAction::Reconfigured
            }
            wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
            wgpu::SurfaceError::Timeout => SurfaceErrorAction::SkipFrame,
            wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
        }
    }

    fn acquire_frame(&mut self) -> Option<wgpu::SurfaceTexture> {
        match self.surface.get_current_texture() {
            Ok(texture) => Some(texture),
            Err(err) => match self.handle_surface_error(err) {
                SurfaceErrorAction::Reconfigured => match self.surface.get_current_texture() {
                    Ok(texture) => Some(texture),
                    Err(err) => {
                        log::warn!("surface acquisition failed after reconfigure: {err}");
                        None
                    }
                },
                SurfaceErrorAction::SkipFrame => {
                    log::warn!("skipping frame: surface not ready");
                    None
                }
                SurfaceErrorAction::Fatal => {
                    log::error!("surface out of memory; frames will be dropped");
                    None
                }
            },
        }
    }

    /// Converts a logical clip rect to scissor arguments clamped to the
    /// drawable. `None` means the clip has zero visible area.
    fn scissor_for(&self, clip: Option<Rect>) -> Option<(u32, u32, u32, u32)> {
        let Some(config) = &self.config else { return None };
        let vw = config.width;
        let vh = config.height;

        let (x, y, w, h) = match clip {
            None => (0, 0, vw, vh),
            Some(r) => {
                let r = r.normalized();
                let x = (r.x.max(0.0) as u32).min(vw);
                let y = (r.y.max(0.0) as u32).min(vh);
                let x2 = (r.right().max(0.0) as u32).min(vw);
                let y2 = (r.bottom().max(0.0) as u32).min(vh);
                (x, y, x2.saturating_sub(x), y2.saturating_sub(y))
            }
        };

        if w == 0 || h == 0 { None } else { Some((x, y, w, h)) }
    }

    fn encode_plan(&mut self, plan: &FramePlan) {
        let tri_offset = self
            .tri_stream
            .upload(&self.device, &self.queue, bytemuck::cast_slice(&plan.triangles));
        let line_offset = self
            .line_stream
            .upload(&self.device, &self.queue, bytemuck::cast_slice(&plan.lines));
        let text_offset = self
            .text_stream
            .upload(&self.device, &self.queue, bytemuck::cast_slice(&plan.text));

        let full_scissor = self.scissor_for(None);
        let scissors: Vec<Option<(u32, u32, u32, u32)>> =
            plan.batches.iter().map(|b| self.scissor_for(b.clip)).collect();

        let Some(frame) = &mut self.frame else { return };
        let Some(encoder) = frame.encoder.as_mut() else { return };

        let load = if frame.cleared {
            wgpu::LoadOp::Load
        } else {
            wgpu::LoadOp::Clear(CLEAR_COLOR)
        };
        frame.cleared = true;

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("nabu submit pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        // Pass-local state cache: pipeline and scissor are only re-issued
        // when a batch actually changes them.
        let mut bound_kind: Option<BatchKind> = None;
        let mut bound_scissor = full_scissor;

        for (batch, scissor) in plan.batches.iter().zip(&scissors) {
            let Some(&(sx, sy, sw, sh)) = scissor.as_ref() else {
                // Zero-area clip: nothing of this batch can be visible.
                continue;
            };

            if bound_kind != Some(batch.kind) {
                let (pipeline, bind_group, stream, offset) = match batch.kind {
                    BatchKind::Triangles => (
                        self.tri_pipeline.as_ref(),
                        self.solid_bind_group.as_ref(),
                        &self.tri_stream,
                        tri_offset,
                    ),
                    BatchKind::Lines => (
                        self.line_pipeline.as_ref(),
                        self.solid_bind_group.as_ref(),
                        &self.line_stream,
                        line_offset,
                    ),
                    BatchKind::Text => (
                        self.text_pipeline.as_ref(),
                        self.text_bind_group.as_ref(),
                        &self.text_stream,
                        text_offset,
                    ),
                };
                let (Some(pipeline), Some(bind_group), Some(buffer)) =
                    (pipeline, bind_group, stream.buffer())
                else {
                    continue;
                };

                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(0, bind_group, &[]);
                rpass.set_vertex_buffer(0, buffer.slice(offset..));
                bound_kind = Some(batch.kind);
            }

            if bound_scissor != Some((sx, sy, sw, sh)) {
                rpass.set_scissor_rect(sx, sy, sw, sh);
                bound_scissor = Some((sx, sy, sw, sh));
            }

            rpass.draw(batch.start..batch.end, 0..1);
        }
    }
}

impl Context for WgpuContext {
    fn init(&mut self, width: i32, height: i32) -> Result<()> {
        ensure!(width > 0 && height > 0, "gpu context needs a positive drawable size");

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: self.format,
            width: width as u32,
            height: height as u32,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        self.surface.configure(&self.device, &config);
        self.config = Some(config);

        self.ensure_pipelines();
        self.ensure_static_bindings();
        Ok(())
    }

    fn begin_frame(&mut self) {
        self.frame = None;
        if self.config.is_none() {
            log::warn!("begin_frame before init; frame dropped");
            return;
        }

        self.tri_stream.begin_frame();
        self.line_stream.begin_frame();
        self.text_stream.begin_frame();

        let Some(surface_texture) = self.acquire_frame() else { return };
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("nabu frame encoder"),
            });

        self.frame = Some(Frame {
            surface_texture,
            view,
            encoder: Some(encoder),
            cleared: false,
        });
    }

    fn resize(&mut self, width: i32, height: i32) {
        let Some(config) = &mut self.config else { return };
        if width <= 0 || height <= 0 {
            return;
        }
        config.width = width as u32;
        config.height = height as u32;
        self.surface.configure(&self.device, config);
        self.written_viewport = None;
    }

    fn submit(&mut self, recording: &Recording) {
        if self.frame.is_none() {
            log::warn!("submit without an active frame; recording dropped");
            return;
        }

        // Plan first: planning rasterizes any missing glyphs, which can dirty
        // or grow the atlas that gets uploaded next.
        let plan = batch::plan(recording, self.glyph_cache.as_ref());
        self.upload_atlas();
        self.write_viewport_uniform();
        if plan.is_empty() && self.frame.as_ref().is_some_and(|f| f.cleared) {
            return;
        }
        self.encode_plan(&plan);
    }

    fn flush(&mut self) {
        let Some(frame) = &mut self.frame else { return };
        if let Some(encoder) = frame.encoder.take() {
            self.queue.submit(std::iter::once(encoder.finish()));
        }
    }

    fn present(&mut self) {
        let Some(mut frame) = self.frame.take() else { return };
        if let Some(encoder) = frame.encoder.take() {
            self.queue.submit(std::iter::once(encoder.finish()));
        }
        drop(frame.view);
        frame.surface_texture.present();
    }

    fn set_glyph_cache(&mut self, cache: Rc<RefCell<GlyphCache>>) {
        self.glyph_cache = Some(cache);
        // Force texture recreation against the new cache's atlas.
        self.atlas_texture = None;
        self.atlas_view = None;
        self.atlas_size = (0, 0);
        self.text_bind_group = None;
    }
}

fn straight_alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

/// Append-only vertex buffer reused across frames.
///
/// Each submit appends at the frame cursor so multiple submits per frame
/// never overwrite each other's data; the cursor rewinds at `begin_frame`.
/// Growth allocates a fresh buffer (earlier passes keep the old one alive
/// through the encoder).
struct StreamBuffer {
    label: &'static str,
    buffer: Option<wgpu::Buffer>,
    capacity: u64,
    cursor: u64,
}

impl StreamBuffer {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            buffer: None,
            capacity: 0,
            cursor: 0,
        }
    }

    fn begin_frame(&mut self) {
        self.cursor = 0;
    }

    /// Uploads `data` at the cursor, returning its byte offset.
    fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[u8]) -> u64 {
        if data.is_empty() {
            return self.cursor;
        }

        let needed = self.cursor + data.len() as u64;
        if self.buffer.is_none() || needed > self.capacity {
            let capacity = needed.next_power_of_two().max(4096);
            self.buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(self.label),
                size: capacity,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.capacity = capacity;
            self.cursor = 0;
        }

        let offset = self.cursor;
        if let Some(buffer) = self.buffer.as_ref() {
            queue.write_buffer(buffer, offset, data);
        }
        self.cursor = offset + data.len() as u64;
        offset
    }

    fn buffer(&self) -> Option<&wgpu::Buffer> {
        self.buffer.as_ref()
    }
}
