//! [`DrawBackend`] implementation on top of wgpu.
//!
//! During a frame the backend interleaves the renderer's vertex arrays into a
//! single [`BatchVertex`] buffer and records one op per state switch and draw.
//! `end_frame` uploads the vertex, index and per-draw uniform data, after which
//! [`WgpuBackend::encode`] replays the ops into a render pass:
//!
//! ```ignore
//! let mut renderer = Renderer::new(
//!     WgpuBackend::new(&device, &queue, WgpuBackendDescriptor::default()),
//!     RendererDescriptor::default(),
//! );
//!
//! // Submit geometry, then:
//! renderer.render();
//! renderer.backend().encode(&mut pass);
//! ```
//!
//! Pipeline-affecting facets (blend, depth, write mask, polygon offset, draw
//! mode) select a cached `wgpu::RenderPipeline`. Alpha test and fog are
//! evaluated in the shader from a dynamic-offset uniform, and textures are
//! bound per draw from the textures registered with
//! [`WgpuBackend::register_texture`].

use std::num::NonZeroU64;
use std::ops::Range;

use ahash::HashMap;
use bytemuck::{Pod, Zeroable};
use rugl_core::math::Mat4;
use rugl_core::profiling::profile_function;
use static_assertions::const_assert_eq;
use wgpu::util::DeviceExt;

use crate::backend::{DrawBackend, VertexBatch};
use crate::state::{DepthTest, DrawMode, PolygonOffset, WriteMask};
use crate::{BlendMode, Color, Facets, State, TextureId};

/// Interleaved vertex as stored in the GPU vertex buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BatchVertex {
    pub position: [f32; 3],
    pub tex_coord: [f32; 2],
    /// Packed RGBA, red in the lowest byte.
    pub colour: u32,
}

const_assert_eq!(std::mem::size_of::<BatchVertex>(), 24);

impl BatchVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2, 2 => Unorm8x4];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<BatchVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Interleave the renderer's planar arrays.
pub fn interleave(batch: &VertexBatch<'_>, out: &mut Vec<BatchVertex>) {
    out.clear();
    out.reserve(batch.vertex_count());
    out.extend(
        batch
            .vertices
            .chunks_exact(3)
            .zip(batch.tex_coords.chunks_exact(2))
            .zip(batch.colours)
            .map(|((p, t), &colour)| BatchVertex {
                position: [p[0], p[1], p[2]],
                tex_coord: [t[0], t[1]],
                colour,
            }),
    );
}

/// Per-draw shader parameters.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
struct DrawUniform {
    fog_colour: [f32; 4],
    fog_start: f32,
    fog_end: f32,
    fog_enabled: u32,
    alpha_function: u32,
    alpha_reference: f32,
    _pad: [f32; 3],
}

const_assert_eq!(std::mem::size_of::<DrawUniform>(), 48);

impl DrawUniform {
    fn from_state(state: &State) -> Self {
        let mut uniform = Self::zeroed();
        if let Some(fog) = state.fog {
            uniform.fog_colour = Color::from_packed(fog.colour).to_array();
            uniform.fog_start = fog.start;
            uniform.fog_end = fog.end;
            uniform.fog_enabled = 1;
        }
        if let Some(test) = state.alpha_test {
            uniform.alpha_function = test.function.shader_code();
            uniform.alpha_reference = test.reference;
        }
        uniform
    }
}

/// The state facets baked into a pipeline object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PipelineKey {
    blend: BlendMode,
    depth: DepthTest,
    write_mask: WriteMask,
    polygon_offset: Option<PolygonOffset>,
    draw_mode: DrawMode,
}

impl From<&State> for PipelineKey {
    fn from(state: &State) -> Self {
        Self {
            blend: state.blend,
            depth: state.depth,
            write_mask: state.write_mask,
            polygon_offset: state.polygon_offset,
            draw_mode: state.draw_mode,
        }
    }
}

#[derive(Debug, Clone)]
enum DrawOp {
    Pipeline(PipelineKey),
    Texture(Option<TextureId>),
    Uniform(u32),
    Draw(Range<u32>),
}

/// Configuration for creating a [`WgpuBackend`].
#[derive(Debug, Clone)]
pub struct WgpuBackendDescriptor {
    pub name: String,
    /// Format of the colour attachment the backend draws into.
    pub color_format: wgpu::TextureFormat,
    /// Format of the depth attachment, if the pass has one. Without one,
    /// depth tests and polygon offsets are ignored.
    pub depth_format: Option<wgpu::TextureFormat>,
    /// Filter used by the default sampler.
    pub filter_mode: wgpu::FilterMode,
}

impl Default for WgpuBackendDescriptor {
    fn default() -> Self {
        Self {
            name: "WgpuBackend".to_string(),
            color_format: wgpu::TextureFormat::Bgra8UnormSrgb,
            depth_format: None,
            filter_mode: wgpu::FilterMode::Linear,
        }
    }
}

impl WgpuBackendDescriptor {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_color_format(mut self, format: wgpu::TextureFormat) -> Self {
        self.color_format = format;
        self
    }

    pub fn with_depth_format(mut self, format: wgpu::TextureFormat) -> Self {
        self.depth_format = Some(format);
        self
    }

    pub fn with_filter_mode(mut self, filter_mode: wgpu::FilterMode) -> Self {
        self.filter_mode = filter_mode;
        self
    }
}

/// A GPU buffer that grows to fit its contents.
struct GrowableBuffer {
    label: &'static str,
    usage: wgpu::BufferUsages,
    buffer: Option<wgpu::Buffer>,
}

impl GrowableBuffer {
    fn new(label: &'static str, usage: wgpu::BufferUsages) -> Self {
        Self {
            label,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            buffer: None,
        }
    }

    /// Upload `data`, reallocating if it does not fit. Returns `true` when the
    /// buffer was reallocated.
    fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[u8]) -> bool {
        let needed = data.len() as u64;
        let mut reallocated = false;
        if self.buffer.as_ref().is_none_or(|b| b.size() < needed) {
            let size = needed.next_power_of_two().max(256);
            tracing::debug!("Allocating {} ({} bytes)", self.label, size);
            self.buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(self.label),
                size,
                usage: self.usage,
                mapped_at_creation: false,
            }));
            reallocated = true;
        }
        if let Some(buffer) = &self.buffer
            && !data.is_empty()
        {
            queue.write_buffer(buffer, 0, data);
        }
        reallocated
    }
}

/// Draws renderer batches with wgpu.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    descriptor: WgpuBackendDescriptor,

    shader: wgpu::ShaderModule,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,

    uniform_layout: wgpu::BindGroupLayout,
    projection_buffer: wgpu::Buffer,
    uniform_buffer: GrowableBuffer,
    uniform_bind_group: Option<wgpu::BindGroup>,
    uniform_stride: u32,

    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    default_texture: wgpu::BindGroup,
    textures: HashMap<TextureId, wgpu::BindGroup>,

    vertex_buffer: GrowableBuffer,
    index_buffer: GrowableBuffer,

    // Current frame.
    staging_vertices: Vec<BatchVertex>,
    staging_indices: Vec<u32>,
    staging_uniforms: Vec<u8>,
    ops: Vec<DrawOp>,
    ready: bool,
}

impl WgpuBackend {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, descriptor: WgpuBackendDescriptor) -> Self {
        profile_function!();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Batch Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/batch.wgsl").into()),
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Batch Uniform Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: NonZeroU64::new(std::mem::size_of::<DrawUniform>() as u64),
                    },
                    count: None,
                },
            ],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Batch Texture Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
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

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Batch Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let projection_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Batch Projection Buffer"),
            contents: bytemuck::cast_slice(&Mat4::IDENTITY.to_cols_array()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Batch Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: descriptor.filter_mode,
            min_filter: descriptor.filter_mode,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let white = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Batch White Texture"),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &white,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &[255, 255, 255, 255],
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4),
                rows_per_image: Some(1),
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        let white_view = white.create_view(&wgpu::TextureViewDescriptor::default());
        let default_texture = texture_bind_group(device, &texture_layout, &white_view, &sampler);

        let alignment = device.limits().min_uniform_buffer_offset_alignment;
        let uniform_stride =
            (std::mem::size_of::<DrawUniform>() as u32).div_ceil(alignment) * alignment;

        tracing::debug!(
            "{}: created (colour {:?}, depth {:?})",
            descriptor.name,
            descriptor.color_format,
            descriptor.depth_format
        );

        Self {
            device: device.clone(),
            queue: queue.clone(),
            descriptor,
            shader,
            pipeline_layout,
            pipelines: HashMap::default(),
            uniform_layout,
            projection_buffer,
            uniform_buffer: GrowableBuffer::new("Batch Draw Uniform Buffer", wgpu::BufferUsages::UNIFORM),
            uniform_bind_group: None,
            uniform_stride,
            texture_layout,
            sampler,
            default_texture,
            textures: HashMap::default(),
            vertex_buffer: GrowableBuffer::new("Batch Vertex Buffer", wgpu::BufferUsages::VERTEX),
            index_buffer: GrowableBuffer::new("Batch Index Buffer", wgpu::BufferUsages::INDEX),
            staging_vertices: Vec::new(),
            staging_indices: Vec::new(),
            staging_uniforms: Vec::new(),
            ops: Vec::new(),
            ready: false,
        }
    }

    pub fn descriptor(&self) -> &WgpuBackendDescriptor {
        &self.descriptor
    }

    /// Set the matrix applied to every vertex after the model-view transform.
    pub fn set_projection(&self, projection: Mat4) {
        self.queue.write_buffer(
            &self.projection_buffer,
            0,
            bytemuck::cast_slice(&projection.to_cols_array()),
        );
    }

    /// Make `view` available to states that name `id`, sampled with the
    /// backend's default sampler.
    pub fn register_texture(&mut self, id: TextureId, view: &wgpu::TextureView) {
        let bind_group = texture_bind_group(&self.device, &self.texture_layout, view, &self.sampler);
        self.textures.insert(id, bind_group);
    }

    pub fn register_texture_with_sampler(
        &mut self,
        id: TextureId,
        view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) {
        let bind_group = texture_bind_group(&self.device, &self.texture_layout, view, sampler);
        self.textures.insert(id, bind_group);
    }

    pub fn remove_texture(&mut self, id: TextureId) -> bool {
        self.textures.remove(&id).is_some()
    }

    /// Number of pipelines created so far.
    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    /// Replay the last completed frame into `pass`.
    pub fn encode(&self, pass: &mut wgpu::RenderPass<'_>) {
        profile_function!();

        if !self.ready || self.ops.is_empty() {
            return;
        }
        let (Some(vertices), Some(indices), Some(uniforms)) = (
            &self.vertex_buffer.buffer,
            &self.index_buffer.buffer,
            &self.uniform_bind_group,
        ) else {
            return;
        };

        pass.push_debug_group("WgpuBackend::encode");
        pass.set_vertex_buffer(0, vertices.slice(..));
        pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);

        let mut pipeline_bound = false;
        for op in &self.ops {
            match op {
                DrawOp::Pipeline(key) => match self.pipelines.get(key) {
                    Some(pipeline) => {
                        pass.set_pipeline(pipeline);
                        pipeline_bound = true;
                    }
                    None => pipeline_bound = false,
                },
                DrawOp::Texture(id) => {
                    let bind_group = id
                        .and_then(|id| self.textures.get(&id))
                        .unwrap_or(&self.default_texture);
                    pass.set_bind_group(1, bind_group, &[]);
                }
                DrawOp::Uniform(offset) => pass.set_bind_group(0, uniforms, &[*offset]),
                DrawOp::Draw(range) => {
                    if pipeline_bound {
                        pass.draw_indexed(range.clone(), 0, 0..1);
                    }
                }
            }
        }
        pass.pop_debug_group();
    }

    fn ensure_pipeline(&mut self, key: PipelineKey) {
        if self.pipelines.contains_key(&key) {
            return;
        }
        profile_function!();

        let polygon_mode = match key.draw_mode {
            DrawMode::Wireframe
                if self
                    .device
                    .features()
                    .contains(wgpu::Features::POLYGON_MODE_LINE) =>
            {
                wgpu::PolygonMode::Line
            }
            DrawMode::Wireframe => {
                tracing::warn!(
                    "{}: wireframe requested but POLYGON_MODE_LINE is unavailable, filling instead",
                    self.descriptor.name
                );
                wgpu::PolygonMode::Fill
            }
            DrawMode::Fill => wgpu::PolygonMode::Fill,
        };

        let depth_stencil = self
            .descriptor
            .depth_format
            .map(|format| wgpu::DepthStencilState {
                format,
                depth_write_enabled: key.depth.write && key.write_mask.contains(WriteMask::DEPTH),
                depth_compare: key.depth.function.to_wgpu(),
                stencil: wgpu::StencilState::default(),
                bias: key
                    .polygon_offset
                    .map(PolygonOffset::to_depth_bias)
                    .unwrap_or_default(),
            });

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Batch Pipeline"),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &self.shader,
                    entry_point: Some("vs_main"),
                    buffers: &[BatchVertex::layout()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &self.shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.descriptor.color_format,
                        blend: key.blend.to_blend_state(),
                        write_mask: key.write_mask.to_color_writes(),
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode,
                    ..Default::default()
                },
                depth_stencil,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        tracing::debug!(
            "{}: created pipeline {} for {:?}",
            self.descriptor.name,
            self.pipelines.len(),
            key
        );
        self.pipelines.insert(key, pipeline);
    }
}

impl DrawBackend for WgpuBackend {
    fn begin_frame(&mut self, batch: &VertexBatch<'_>) {
        profile_function!();
        interleave(batch, &mut self.staging_vertices);
        self.staging_indices.clear();
        self.staging_uniforms.clear();
        self.ops.clear();
        self.ready = false;
    }

    fn apply_state(&mut self, state: &State, changes: Facets) {
        if changes.intersects(Facets::PIPELINE) {
            let key = PipelineKey::from(state);
            self.ensure_pipeline(key);
            self.ops.push(DrawOp::Pipeline(key));
        }
        if changes.contains(Facets::TEXTURE) {
            if let Some(id) = state.texture
                && !self.textures.contains_key(&id)
            {
                tracing::debug!(
                    "{}: texture {:?} is not registered, drawing untextured",
                    self.descriptor.name,
                    id
                );
            }
            self.ops.push(DrawOp::Texture(state.texture));
        }
        if changes.intersects(Facets::ALPHA_TEST | Facets::FOG) {
            let offset = self.staging_uniforms.len() as u32;
            self.staging_uniforms
                .extend_from_slice(bytemuck::bytes_of(&DrawUniform::from_state(state)));
            self.staging_uniforms
                .resize(offset as usize + self.uniform_stride as usize, 0);
            self.ops.push(DrawOp::Uniform(offset));
        }
    }

    fn draw_triangles(&mut self, indices: &[u32]) {
        let start = self.staging_indices.len() as u32;
        self.staging_indices.extend_from_slice(indices);
        self.ops
            .push(DrawOp::Draw(start..self.staging_indices.len() as u32));
    }

    fn end_frame(&mut self) {
        profile_function!();

        if self.ops.is_empty() {
            self.ready = true;
            return;
        }

        self.vertex_buffer.write(
            &self.device,
            &self.queue,
            bytemuck::cast_slice(&self.staging_vertices),
        );
        self.index_buffer.write(
            &self.device,
            &self.queue,
            bytemuck::cast_slice(&self.staging_indices),
        );
        let reallocated = self
            .uniform_buffer
            .write(&self.device, &self.queue, &self.staging_uniforms);

        if (reallocated || self.uniform_bind_group.is_none())
            && let Some(buffer) = &self.uniform_buffer.buffer
        {
            self.uniform_bind_group = Some(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Batch Uniform Bind Group"),
                layout: &self.uniform_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: self.projection_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                            buffer,
                            offset: 0,
                            size: NonZeroU64::new(std::mem::size_of::<DrawUniform>() as u64),
                        }),
                    },
                ],
            }));
        }

        tracing::trace!(
            "{}: uploaded {} vertices, {} indices, {} ops",
            self.descriptor.name,
            self.staging_vertices.len(),
            self.staging_indices.len(),
            self.ops.len()
        );
        self.ready = true;
    }
}

fn texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Batch Texture Bind Group"),
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
