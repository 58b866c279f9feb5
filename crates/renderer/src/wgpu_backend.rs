//! wgpu implementation of [`Gpu`].
//!
//! Draw calls are recorded with a snapshot of their uniforms and bound
//! textures, then replayed in a single render pass by [`WgpuBackend::end_frame`].
//! Uniform snapshots go into one dynamic-offset arena buffer per frame.

use std::collections::HashMap;
use std::num::NonZeroU64;
use std::sync::Arc;

use asset::{TextureData, TextureFormat as CpuFormat};
use wgpu::{
    BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, BindingResource, BindingType, BlendState, Buffer, BufferBinding,
    BufferBindingType, BufferDescriptor, BufferUsages, ColorTargetState, ColorWrites,
    CommandEncoderDescriptor, CompareFunction, DepthBiasState, DepthStencilState, Device,
    DeviceDescriptor, Extent3d, Features, FilterMode, FragmentState, Instance, InstanceDescriptor,
    Limits, LoadOp, Operations, PipelineLayout, PipelineLayoutDescriptor, PowerPreference,
    PresentMode, PrimitiveState, Queue, RenderPassColorAttachment, RenderPassDescriptor,
    RenderPipeline, RenderPipelineDescriptor, Sampler, SamplerBindingType, SamplerDescriptor,
    ShaderModule, ShaderModuleDescriptor, ShaderSource, ShaderStages, StoreOp, Surface,
    SurfaceConfiguration, SurfaceError, TextureDescriptor, TextureDimension, TextureFormat,
    TextureSampleType, TextureUsages, TextureView, TextureViewDescriptor, TextureViewDimension,
    VertexState, util::DeviceExt,
};
use winit::{dpi::PhysicalSize, window::Window};

use crate::error::{RenderError, ShaderError};
use crate::gpu::{
    Gpu, MAX_TEXTURE_UNITS, PolygonMode, ProgramId, TextureId, UniformInfo, UniformLocation,
    VertexArrayId,
};
use crate::mesh::Vertex;
use crate::reflect::{self, ProgramLayout, SAMPLER_BINDING};
use crate::uniform::UniformValue;

const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;
const UNITS: usize = MAX_TEXTURE_UNITS as usize;
/// Texture key for "nothing bound": samples the 1x1 white texture.
const UNBOUND: u32 = u32::MAX;
const INITIAL_ARENA_SIZE: u64 = 64 * 1024;

struct GpuProgram {
    layout: ProgramLayout,
    vertex: ShaderModule,
    fragment: ShaderModule,
    uniform_bgl: BindGroupLayout,
    pipeline_layout: PipelineLayout,
    /// Current bytes of each uniform block, parallel to `layout.blocks`.
    blocks: Vec<Vec<u8>>,
    /// Group 0 over the arena buffer; dropped when the arena is reallocated.
    bind_group: Option<BindGroup>,
}

struct GpuVertexArray {
    vertices: Buffer,
    indices: Option<Buffer>,
}

struct DrawCommand {
    program: ProgramId,
    mode: PolygonMode,
    vao: VertexArrayId,
    count: u32,
    indexed: bool,
    offsets: Vec<u32>,
    textures: [u32; UNITS],
}

struct UniformArena {
    buffer: Buffer,
    capacity: u64,
    staging: Vec<u8>,
    alignment: usize,
}

impl UniformArena {
    /// Append `bytes` at the next aligned offset and return that offset.
    fn push(&mut self, bytes: &[u8]) -> u32 {
        let offset = self.staging.len().next_multiple_of(self.alignment);
        self.staging.resize(offset, 0);
        self.staging.extend_from_slice(bytes);
        offset as u32
    }
}

pub struct WgpuBackend {
    // Surface
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,

    // Device/queue
    device: Device,
    queue: Queue,
    line_mode_supported: bool,

    // Depth
    depth_view: TextureView,

    // Textures
    texture_bgl: BindGroupLayout,
    sampler: Sampler,
    fallback: TextureView,
    textures: Vec<TextureView>,
    texture_bind_groups: HashMap<[u32; UNITS], BindGroup>,

    // Programs & geometry
    programs: Vec<GpuProgram>,
    pipelines: HashMap<(ProgramId, PolygonMode), RenderPipeline>,
    vertex_arrays: Vec<GpuVertexArray>,

    // Bound state
    current_program: Option<ProgramId>,
    polygon_mode: PolygonMode,
    bound: [Option<TextureId>; UNITS],

    // Frame
    arena: UniformArena,
    draws: Vec<DrawCommand>,
    clear_color: wgpu::Color,

    // Size cache
    width: u32,
    height: u32,
}

impl WgpuBackend {
    /// Create the device and surface for `window`, restricted to `backends`.
    pub async fn new(window: Arc<Window>, backends: wgpu::Backends) -> Result<Self, RenderError> {
        let PhysicalSize { width, height } = window.inner_size();
        let width = width.max(1);
        let height = height.max(1);

        // Instance & surface
        let instance = Instance::new(&InstanceDescriptor {
            backends,
            ..Default::default()
        });
        let surface: Surface<'static> = instance
            .create_surface(window.clone())
            .map_err(|e| RenderError::Init(format!("create_surface failed: {e}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| RenderError::Init(format!("no suitable GPU adapter: {e}")))?;
        let info = adapter.get_info();
        log::info!("Adapter: {} ({:?})", info.name, info.backend);

        let line_mode_supported = adapter.features().contains(Features::POLYGON_MODE_LINE);
        let required_features = if line_mode_supported {
            Features::POLYGON_MODE_LINE
        } else {
            Features::empty()
        };

        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("Phong3D Device"),
                required_features,
                required_limits: Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                trace: Default::default(),
            })
            .await
            .map_err(|e| RenderError::Init(format!("request_device failed: {e}")))?;
        device.on_uncaptured_error(Box::new(|e| log::error!("wgpu: {e}")));

        // Surface format (prefer sRGB)
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| RenderError::Init("surface reports no formats".into()))?;

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let depth_view = create_depth_view(&device, &surface_config);
        let texture_bgl = create_texture_bgl(&device);
        let sampler = device.create_sampler(&SamplerDescriptor {
            label: Some("Material Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            mipmap_filter: FilterMode::Linear,
            ..Default::default()
        });
        let fallback = upload_texture(
            &device,
            &queue,
            &TextureData::new(1, 1, CpuFormat::Rgba8, vec![255; 4]),
        );

        let alignment = device.limits().min_uniform_buffer_offset_alignment as usize;
        let arena = UniformArena {
            buffer: create_arena_buffer(&device, INITIAL_ARENA_SIZE),
            capacity: INITIAL_ARENA_SIZE,
            staging: Vec::new(),
            alignment,
        };

        log::info!(
            "Surface {:?} {}x{}, polygon line mode {}",
            surface_format,
            width,
            height,
            if line_mode_supported { "available" } else { "unavailable" }
        );

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            line_mode_supported,
            depth_view,
            texture_bgl,
            sampler,
            fallback,
            textures: Vec::new(),
            texture_bind_groups: HashMap::new(),
            programs: Vec::new(),
            pipelines: HashMap::new(),
            vertex_arrays: Vec::new(),
            current_program: None,
            polygon_mode: PolygonMode::Fill,
            bound: [None; UNITS],
            arena,
            draws: Vec::new(),
            clear_color: wgpu::Color::BLACK,
            width,
            height,
        })
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn set_clear_color(&mut self, r: f64, g: f64, b: f64) {
        self.clear_color = wgpu::Color { r, g, b, a: 1.0 };
    }

    /// Resize: reconfigure surface & recreate depth view.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.surface_config.width = self.width;
        self.surface_config.height = self.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = create_depth_view(&self.device, &self.surface_config);
    }

    pub fn is_surface_lost(err: &RenderError) -> bool {
        matches!(
            err,
            RenderError::Surface(SurfaceError::Lost | SurfaceError::Outdated)
        )
    }

    pub fn recreate_surface(&mut self) {
        self.resize(self.width, self.height);
    }

    /// Drop anything recorded for a frame that never reached the screen.
    pub fn begin_frame(&mut self) {
        self.draws.clear();
        self.arena.staging.clear();
    }

    /// Upload this frame's uniforms, replay the recorded draws and present.
    pub fn end_frame(&mut self) -> Result<(), RenderError> {
        self.upload_uniforms();

        let frame = self.surface.get_current_texture()?;
        let view = frame.texture.create_view(&Default::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("MainEncoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("MainPass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(self.clear_color),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            for cmd in &self.draws {
                let (Some(pipeline), Some(program), Some(textures), Some(vao)) = (
                    self.pipelines.get(&(cmd.program, cmd.mode)),
                    self.programs.get(cmd.program.0 as usize),
                    self.texture_bind_groups.get(&cmd.textures),
                    self.vertex_arrays.get(cmd.vao.0 as usize),
                ) else {
                    continue;
                };
                let Some(uniforms) = program.bind_group.as_ref() else {
                    continue;
                };

                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(0, uniforms, &cmd.offsets);
                rpass.set_bind_group(1, textures, &[]);
                rpass.set_vertex_buffer(0, vao.vertices.slice(..));
                match (&vao.indices, cmd.indexed) {
                    (Some(ib), true) => {
                        rpass.set_index_buffer(ib.slice(..), wgpu::IndexFormat::Uint32);
                        rpass.draw_indexed(0..cmd.count, 0, 0..1);
                    }
                    _ => rpass.draw(0..cmd.count, 0..1),
                }
            }
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        self.begin_frame();
        Ok(())
    }

    fn upload_uniforms(&mut self) {
        let needed = self.arena.staging.len() as u64;
        if needed > self.arena.capacity {
            let capacity = needed.next_power_of_two();
            self.arena.buffer = create_arena_buffer(&self.device, capacity);
            self.arena.capacity = capacity;
            for program in &mut self.programs {
                program.bind_group = None;
            }
            log::debug!("Uniform arena grown to {} bytes", capacity);
        }
        if needed > 0 {
            self.queue
                .write_buffer(&self.arena.buffer, 0, &self.arena.staging);
        }

        let device = &self.device;
        let buffer = &self.arena.buffer;
        for program in self.programs.iter_mut().filter(|p| p.bind_group.is_none()) {
            let entries: Vec<BindGroupEntry> = program
                .layout
                .blocks
                .iter()
                .map(|block| BindGroupEntry {
                    binding: block.binding,
                    resource: BindingResource::Buffer(BufferBinding {
                        buffer,
                        offset: 0,
                        size: NonZeroU64::new(block.size as u64),
                    }),
                })
                .collect();
            program.bind_group = Some(device.create_bind_group(&BindGroupDescriptor {
                label: Some("Uniform BG"),
                layout: &program.uniform_bgl,
                entries: &entries,
            }));
        }
    }

    fn ensure_pipeline(&mut self, program: ProgramId, mode: PolygonMode) -> bool {
        if self.pipelines.contains_key(&(program, mode)) {
            return true;
        }
        let Some(p) = self.programs.get(program.0 as usize) else {
            return false;
        };

        let pipeline = self.device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("Program Pipeline"),
            layout: Some(&p.pipeline_layout),
            vertex: VertexState {
                module: &p.vertex,
                entry_point: Some(&p.layout.vertex_entry),
                buffers: &[Vertex::LAYOUT],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module: &p.fragment,
                entry_point: Some(&p.layout.fragment_entry),
                targets: &[Some(ColorTargetState {
                    format: self.surface_config.format,
                    blend: Some(BlendState::REPLACE),
                    write_mask: ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: PrimitiveState {
                polygon_mode: match mode {
                    PolygonMode::Fill => wgpu::PolygonMode::Fill,
                    PolygonMode::Line => wgpu::PolygonMode::Line,
                },
                ..Default::default()
            },
            depth_stencil: Some(DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });
        log::debug!("Created pipeline for {:?} ({:?})", program, mode);
        self.pipelines.insert((program, mode), pipeline);
        true
    }

    fn ensure_texture_bind_group(&mut self, key: [u32; UNITS]) {
        if self.texture_bind_groups.contains_key(&key) {
            return;
        }

        let views: Vec<&TextureView> = key
            .iter()
            .map(|&id| self.textures.get(id as usize).unwrap_or(&self.fallback))
            .collect();
        let mut entries: Vec<BindGroupEntry> = views
            .iter()
            .enumerate()
            .map(|(unit, view)| BindGroupEntry {
                binding: unit as u32,
                resource: BindingResource::TextureView(view),
            })
            .collect();
        entries.push(BindGroupEntry {
            binding: SAMPLER_BINDING,
            resource: BindingResource::Sampler(&self.sampler),
        });

        let bind_group = self.device.create_bind_group(&BindGroupDescriptor {
            label: Some("Texture Units BG"),
            layout: &self.texture_bgl,
            entries: &entries,
        });
        self.texture_bind_groups.insert(key, bind_group);
    }

    fn record_draw(&mut self, vao: VertexArrayId, count: u32, indexed: bool) {
        let Some(program) = self.current_program else {
            log::warn!("Draw issued with no program in use; skipped");
            return;
        };

        let mode = if self.polygon_mode == PolygonMode::Line && !self.line_mode_supported {
            PolygonMode::Fill
        } else {
            self.polygon_mode
        };
        if !self.ensure_pipeline(program, mode) {
            return;
        }

        let textures = self.bound.map(|t| t.map_or(UNBOUND, |t| t.0));
        self.ensure_texture_bind_group(textures);

        let Some(p) = self.programs.get(program.0 as usize) else {
            return;
        };
        let offsets = p.blocks.iter().map(|b| self.arena.push(b)).collect();

        self.draws.push(DrawCommand {
            program,
            mode,
            vao,
            count,
            indexed,
            offsets,
            textures,
        });
    }
}

impl Gpu for WgpuBackend {
    fn create_program(&mut self, vertex: &str, fragment: &str) -> Result<ProgramId, ShaderError> {
        let layout = reflect::link(vertex, fragment)?;

        let module = |label, src: &str| {
            self.device.create_shader_module(ShaderModuleDescriptor {
                label: Some(label),
                source: ShaderSource::Wgsl(src.into()),
            })
        };
        let vertex_module = module("Vertex Stage", vertex);
        let fragment_module = module("Fragment Stage", fragment);

        let entries: Vec<BindGroupLayoutEntry> = layout
            .blocks
            .iter()
            .map(|block| BindGroupLayoutEntry {
                binding: block.binding,
                visibility: ShaderStages::VERTEX | ShaderStages::FRAGMENT,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(block.size as u64),
                },
                count: None,
            })
            .collect();
        let uniform_bgl = self
            .device
            .create_bind_group_layout(&BindGroupLayoutDescriptor {
                label: Some("Uniform BGL"),
                entries: &entries,
            });
        let pipeline_layout = self
            .device
            .create_pipeline_layout(&PipelineLayoutDescriptor {
                label: Some("Program PipelineLayout"),
                bind_group_layouts: &[&uniform_bgl, &self.texture_bgl],
                push_constant_ranges: &[],
            });

        let blocks = layout
            .blocks
            .iter()
            .map(|b| vec![0u8; b.size as usize])
            .collect();
        let id = ProgramId(self.programs.len() as u32);
        self.programs.push(GpuProgram {
            layout,
            vertex: vertex_module,
            fragment: fragment_module,
            uniform_bgl,
            pipeline_layout,
            blocks,
            bind_group: None,
        });
        Ok(id)
    }

    fn active_uniforms(&self, program: ProgramId) -> Vec<UniformInfo> {
        self.programs
            .get(program.0 as usize)
            .map(|p| p.layout.uniform_infos())
            .unwrap_or_default()
    }

    fn use_program(&mut self, program: ProgramId) {
        self.current_program = Some(program);
    }

    fn set_uniform(&mut self, program: ProgramId, location: UniformLocation, value: UniformValue) {
        let Some(p) = self.programs.get_mut(program.0 as usize) else {
            return;
        };
        let Some(slot) = p.layout.uniforms.get(location.0 as usize) else {
            return;
        };
        if slot.kind != value.kind() {
            log::warn!("Uniform '{}' is {:?}, got {:?}", slot.name, slot.kind, value.kind());
            return;
        }
        let Some(block) = p.layout.blocks.iter().position(|b| b.binding == slot.binding) else {
            return;
        };
        let start = slot.offset as usize;
        if let Some(dst) = p.blocks[block].get_mut(start..start + slot.kind.size()) {
            value.write_to(dst);
        }
    }

    fn create_texture(&mut self, data: &TextureData) -> TextureId {
        let view = upload_texture(&self.device, &self.queue, data);
        let id = TextureId(self.textures.len() as u32);
        self.textures.push(view);
        id
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureId) {
        match self.bound.get_mut(unit as usize) {
            Some(slot) => *slot = Some(texture),
            None => log::warn!("Texture unit {} out of range; ignored", unit),
        }
    }

    fn create_vertex_array(&mut self, vertices: &[Vertex], indices: &[u32]) -> VertexArrayId {
        let vertex_buf = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh VB"),
                contents: bytemuck::cast_slice(vertices),
                usage: BufferUsages::VERTEX,
            });
        let index_buf = (!indices.is_empty()).then(|| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Mesh IB"),
                    contents: bytemuck::cast_slice(indices),
                    usage: BufferUsages::INDEX,
                })
        });

        let id = VertexArrayId(self.vertex_arrays.len() as u32);
        self.vertex_arrays.push(GpuVertexArray {
            vertices: vertex_buf,
            indices: index_buf,
        });
        id
    }

    fn draw_arrays(&mut self, vao: VertexArrayId, count: u32) {
        self.record_draw(vao, count, false);
    }

    fn draw_elements(&mut self, vao: VertexArrayId, count: u32) {
        self.record_draw(vao, count, true);
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) {
        if mode == PolygonMode::Line && !self.line_mode_supported {
            log::warn!("Adapter has no line polygon mode; staying with fill");
        }
        self.polygon_mode = mode;
    }
}

/// Create a depth texture view matching the surface config.
fn create_depth_view(device: &Device, sc: &SurfaceConfiguration) -> TextureView {
    let tex = device.create_texture(&TextureDescriptor {
        label: Some("DepthTex"),
        size: Extent3d {
            width: sc.width.max(1),
            height: sc.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&TextureViewDescriptor::default())
}

fn create_arena_buffer(device: &Device, size: u64) -> Buffer {
    device.create_buffer(&BufferDescriptor {
        label: Some("Uniform Arena"),
        size,
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Group 1: one 2D texture per unit, then the shared sampler.
fn create_texture_bgl(device: &Device) -> BindGroupLayout {
    let mut entries: Vec<BindGroupLayoutEntry> = (0..MAX_TEXTURE_UNITS)
        .map(|unit| BindGroupLayoutEntry {
            binding: unit,
            visibility: ShaderStages::FRAGMENT,
            ty: BindingType::Texture {
                sample_type: TextureSampleType::Float { filterable: true },
                view_dimension: TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        })
        .collect();
    entries.push(BindGroupLayoutEntry {
        binding: SAMPLER_BINDING,
        visibility: ShaderStages::FRAGMENT,
        ty: BindingType::Sampler(SamplerBindingType::Filtering),
        count: None,
    });
    device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("Texture Units BGL"),
        entries: &entries,
    })
}

/// Upload every mip level. Single-channel data stays single-channel; RGB is widened to RGBA.
fn upload_texture(device: &Device, queue: &Queue, data: &TextureData) -> TextureView {
    let (format, bytes_per_pixel) = match data.format {
        CpuFormat::R8 => (TextureFormat::R8Unorm, 1),
        CpuFormat::Rgb8 | CpuFormat::Rgba8 => (TextureFormat::Rgba8UnormSrgb, 4),
    };
    let levels = data.mip_chain();

    let texture = device.create_texture(&TextureDescriptor {
        label: Some("Material Texture"),
        size: Extent3d {
            width: data.width.max(1),
            height: data.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: levels.len() as u32,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format,
        usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
        view_formats: &[],
    });

    for (mip, level) in levels.iter().enumerate() {
        let pixels = match data.format {
            CpuFormat::R8 => level.data.clone(),
            other => TextureData::rgba8_pixels(other, &level.data),
        };
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: mip as u32,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_pixel * level.width),
                rows_per_image: Some(level.height),
            },
            Extent3d {
                width: level.width,
                height: level.height,
                depth_or_array_layers: 1,
            },
        );
    }

    log::debug!(
        "Uploaded texture {}x{} {:?} ({} mip levels)",
        data.width,
        data.height,
        data.format,
        levels.len()
    );
    texture.create_view(&TextureViewDescriptor::default())
}
