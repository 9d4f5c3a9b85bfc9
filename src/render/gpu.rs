//! Deformable-mesh garment renderer on `wgpu`.
//!
//! The grid topology is uploaded once at initialization. Each frame only the warped vertex
//! positions (and, when the flip state toggles, texture coordinates) are written before a single
//! indexed draw into an offscreen target that is read back as a premultiplied overlay layer.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::assets::garment::GarmentImage;
use crate::foundation::core::Canvas;
use crate::foundation::error::{DrapeError, DrapeResult};
use crate::geometry::corners::MeshCorners;
use crate::geometry::tuning::FitTuning;
use crate::mesh::grid::{DeformableMesh, MeshResolution};
use crate::mesh::warp::generate_warped_positions;
use crate::render::backend::{BackendKind, FrameRGBA, OverlayBackend, OverlayRequest};

const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

const MESH_SHADER: &str = r#"
struct Uniforms {
  resolution: vec2<f32>,
  alpha: f32,
  _pad: f32,
};

@group(0) @binding(0) var t_garment: texture_2d<f32>;
@group(0) @binding(1) var s_garment: sampler;
@group(0) @binding(2) var<uniform> u: Uniforms;

struct VsOut {
  @builtin(position) pos: vec4<f32>,
  @location(0) uv: vec2<f32>,
};

@vertex
fn vs(@location(0) pos_px: vec2<f32>, @location(1) uv: vec2<f32>) -> VsOut {
  let ndc = pos_px / u.resolution * 2.0 - vec2<f32>(1.0, 1.0);
  var o: VsOut;
  o.pos = vec4<f32>(ndc.x, -ndc.y, 0.0, 1.0);
  o.uv = uv;
  return o;
}

@fragment
fn fs(in: VsOut) -> @location(0) vec4<f32> {
  let c = textureSample(t_garment, s_garment, in.uv);
  return vec4<f32>(c.rgb, c.a * u.alpha);
}
"#;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct MeshUniforms {
    resolution: [f32; 2],
    alpha: f32,
    _pad: f32,
}

struct GpuState {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    uniforms: wgpu::Buffer,
    positions: wgpu::Buffer,
    tex_coords: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

struct GarmentTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

struct RenderTarget {
    width: u32,
    height: u32,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    readback: wgpu::Buffer,
    bytes_per_row: u32,
}

/// Garment renderer that warps a textured grid onto the body quad.
pub struct GpuMeshRenderer {
    mesh: DeformableMesh,
    state: Option<GpuState>,
    garment: Option<GarmentTexture>,
    target: Option<RenderTarget>,
}

impl std::fmt::Debug for GpuMeshRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuMeshRenderer")
            .field("resolution", &self.mesh.resolution())
            .field("initialized", &self.state.is_some())
            .field("garment", &self.garment.as_ref().map(|g| (g.width, g.height)))
            .finish()
    }
}

impl GpuMeshRenderer {
    /// Uninitialized renderer; no device is touched until [`OverlayBackend::initialize`].
    pub fn new(resolution: MeshResolution) -> DrapeResult<Self> {
        Ok(Self {
            mesh: DeformableMesh::new(resolution)?,
            state: None,
            garment: None,
            target: None,
        })
    }

    /// Grid topology and current texture coordinates.
    pub fn mesh(&self) -> &DeformableMesh {
        &self.mesh
    }

    /// Upload `garment` as the sole live texture.
    ///
    /// The previous texture is destroyed only after the new one is created successfully.
    #[tracing::instrument(
        skip(self, garment),
        fields(width = garment.width, height = garment.height)
    )]
    pub fn load_texture(&mut self, garment: &GarmentImage) -> DrapeResult<()> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| DrapeError::gpu("gpu mesh renderer not initialized"))?;
        let max = state.device.limits().max_texture_dimension_2d;
        if garment.width > max || garment.height > max {
            return Err(DrapeError::gpu(format!(
                "garment {}x{} exceeds max texture size {max}",
                garment.width, garment.height
            )));
        }

        state.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let size = wgpu::Extent3d {
            width: garment.width,
            height: garment.height,
            depth_or_array_layers: 1,
        };
        let texture = state.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("drape_garment"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        state.queue.write_texture(
            texture.as_image_copy(),
            &garment.rgba8,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * garment.width),
                rows_per_image: Some(garment.height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = state.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("drape_garment_bg"),
            layout: &state.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&state.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: state.uniforms.as_entire_binding(),
                },
            ],
        });
        if let Some(err) = pollster::block_on(state.device.pop_error_scope()) {
            texture.destroy();
            return Err(DrapeError::gpu(format!(
                "garment texture upload failed: {err}"
            )));
        }

        if let Some(old) = self.garment.replace(GarmentTexture {
            texture,
            bind_group,
            width: garment.width,
            height: garment.height,
        }) {
            old.texture.destroy();
        }
        tracing::debug!("gpu garment texture swapped");
        Ok(())
    }

    /// Draw the warped garment for one frame.
    ///
    /// `alpha` scales the garment's own alpha; `flip_v` inverts the texture's V axis.
    #[tracing::instrument(skip(self, corners, tuning))]
    pub fn render(
        &mut self,
        canvas: Canvas,
        corners: &MeshCorners,
        alpha: f32,
        flip_v: bool,
        tuning: &FitTuning,
    ) -> DrapeResult<FrameRGBA> {
        if self.state.is_none() {
            return Err(DrapeError::gpu("gpu mesh renderer not initialized"));
        }
        if self.garment.is_none() {
            return Err(DrapeError::render("no garment texture loaded"));
        }
        self.ensure_target(canvas)?;

        let (Some(state), Some(garment), Some(target)) =
            (self.state.as_ref(), self.garment.as_ref(), self.target.as_ref())
        else {
            return Err(DrapeError::gpu("gpu mesh renderer not initialized"));
        };

        if self.mesh.set_flip(flip_v) {
            state.queue.write_buffer(
                &state.tex_coords,
                0,
                bytemuck::cast_slice(self.mesh.tex_coords()),
            );
        }

        let positions = generate_warped_positions(self.mesh.resolution(), corners, tuning);
        state
            .queue
            .write_buffer(&state.positions, 0, bytemuck::cast_slice(&positions));
        let uniforms = MeshUniforms {
            resolution: [canvas.width as f32, canvas.height as f32],
            alpha: alpha.clamp(0.0, 1.0),
            _pad: 0.0,
        };
        state
            .queue
            .write_buffer(&state.uniforms, 0, bytemuck::bytes_of(&uniforms));

        state.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let mut encoder = state
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("drape_mesh_encoder"),
            });
        {
            let mut rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("drape_mesh_rp"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rp.set_viewport(0.0, 0.0, canvas.width as f32, canvas.height as f32, 0.0, 1.0);
            rp.set_pipeline(&state.pipeline);
            rp.set_bind_group(0, &garment.bind_group, &[]);
            rp.set_vertex_buffer(0, state.positions.slice(..));
            rp.set_vertex_buffer(1, state.tex_coords.slice(..));
            rp.set_index_buffer(state.indices.slice(..), wgpu::IndexFormat::Uint32);
            rp.draw_indexed(0..state.index_count, 0, 0..1);
        }
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &target.readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(target.bytes_per_row),
                    rows_per_image: Some(target.height),
                },
            },
            wgpu::Extent3d {
                width: target.width,
                height: target.height,
                depth_or_array_layers: 1,
            },
        );
        state.queue.submit(Some(encoder.finish()));
        if let Some(err) = pollster::block_on(state.device.pop_error_scope()) {
            return Err(DrapeError::render(format!("gpu mesh draw failed: {err}")));
        }

        read_target(state, target)
    }

    fn ensure_target(&mut self, canvas: Canvas) -> DrapeResult<()> {
        if self
            .target
            .as_ref()
            .is_some_and(|t| t.width == canvas.width && t.height == canvas.height)
        {
            return Ok(());
        }
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| DrapeError::gpu("gpu mesh renderer not initialized"))?;

        let bytes_per_row = align_to(
            canvas
                .width
                .checked_mul(4)
                .ok_or_else(|| DrapeError::gpu("render target width overflow"))?,
            wgpu::COPY_BYTES_PER_ROW_ALIGNMENT,
        );
        let buffer_size = u64::from(bytes_per_row)
            .checked_mul(u64::from(canvas.height))
            .ok_or_else(|| DrapeError::gpu("readback buffer size overflow"))?;

        state.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let texture = state.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("drape_overlay_target"),
            size: wgpu::Extent3d {
                width: canvas.width,
                height: canvas.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let readback = state.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("drape_readback"),
            size: buffer_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        if let Some(err) = pollster::block_on(state.device.pop_error_scope()) {
            return Err(DrapeError::gpu(format!(
                "render target allocation failed: {err}"
            )));
        }

        if let Some(old) = self.target.replace(RenderTarget {
            width: canvas.width,
            height: canvas.height,
            texture,
            view,
            readback,
            bytes_per_row,
        }) {
            old.texture.destroy();
            old.readback.destroy();
        }
        Ok(())
    }

    fn release(&mut self) {
        if let Some(g) = self.garment.take() {
            g.texture.destroy();
        }
        if let Some(t) = self.target.take() {
            t.texture.destroy();
            t.readback.destroy();
        }
        if let Some(s) = self.state.take() {
            s.positions.destroy();
            s.tex_coords.destroy();
            s.indices.destroy();
            s.uniforms.destroy();
        }
    }
}

impl OverlayBackend for GpuMeshRenderer {
    fn kind(&self) -> BackendKind {
        BackendKind::Gpu
    }

    #[tracing::instrument(skip(self))]
    fn initialize(&mut self) -> DrapeResult<()> {
        if self.state.is_some() {
            return Ok(());
        }
        let state = create_state(&self.mesh)?;
        self.state = Some(state);
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    fn load_garment(&mut self, garment: &GarmentImage) -> DrapeResult<()> {
        self.load_texture(garment)
    }

    fn has_garment(&self) -> bool {
        self.garment.is_some()
    }

    fn render_overlay(&mut self, request: &OverlayRequest<'_>) -> DrapeResult<FrameRGBA> {
        self.render(
            request.canvas,
            request.corners,
            request.tuning.gpu_opacity,
            request.orientation.texture_flip(),
            request.tuning,
        )
    }

    fn dispose(&mut self) {
        self.release();
    }
}

impl Drop for GpuMeshRenderer {
    fn drop(&mut self) {
        self.release();
    }
}

fn create_state(mesh: &DeformableMesh) -> DrapeResult<GpuState> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
    .map_err(|e| match e {
        wgpu::RequestAdapterError::NotFound { .. } => DrapeError::gpu("no gpu adapter available"),
        other => DrapeError::gpu(format!("wgpu request_adapter failed: {other:?}")),
    })?;

    let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
        label: Some("drape_device"),
        required_features: wgpu::Features::empty(),
        required_limits: wgpu::Limits::default(),
        experimental_features: wgpu::ExperimentalFeatures::default(),
        memory_hints: wgpu::MemoryHints::Performance,
        trace: wgpu::Trace::Off,
    }))
    .map_err(|e| DrapeError::gpu(format!("wgpu request_device failed: {e:?}")))?;

    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("drape_garment_sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    });

    let uniforms = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("drape_mesh_uniforms"),
        contents: bytemuck::bytes_of(&MeshUniforms {
            resolution: [1.0, 1.0],
            alpha: 1.0,
            _pad: 0.0,
        }),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("drape_mesh_bgl"),
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
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<MeshUniforms>() as u64
                    ),
                },
                count: None,
            },
        ],
    });

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("drape_mesh_shader"),
        source: wgpu::ShaderSource::Wgsl(MESH_SHADER.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("drape_mesh_pl"),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });

    let position_attrs = wgpu::vertex_attr_array![0 => Float32x2];
    let uv_attrs = wgpu::vertex_attr_array![1 => Float32x2];
    let vertex_layouts = [
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &position_attrs,
        },
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &uv_attrs,
        },
    ];

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("drape_mesh_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            buffers: &vertex_layouts,
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: TARGET_FORMAT,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    let vertex_bytes =
        (mesh.resolution().vertex_count() * std::mem::size_of::<[f32; 2]>()) as u64;
    let positions = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("drape_mesh_positions"),
        size: vertex_bytes,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let tex_coords = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("drape_mesh_tex_coords"),
        contents: bytemuck::cast_slice(mesh.tex_coords()),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    });
    let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("drape_mesh_indices"),
        contents: bytemuck::cast_slice(mesh.indices()),
        usage: wgpu::BufferUsages::INDEX,
    });
    let index_count = u32::try_from(mesh.indices().len())
        .map_err(|_| DrapeError::gpu("mesh index count exceeds u32"))?;

    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        return Err(DrapeError::gpu(format!("gpu pipeline setup failed: {err}")));
    }

    Ok(GpuState {
        device,
        queue,
        pipeline,
        bind_group_layout,
        sampler,
        uniforms,
        positions,
        tex_coords,
        indices,
        index_count,
    })
}

fn read_target(state: &GpuState, target: &RenderTarget) -> DrapeResult<FrameRGBA> {
    let buffer_slice = target.readback.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    buffer_slice.map_async(wgpu::MapMode::Read, move |res| {
        let _ = tx.send(res);
    });
    state
        .device
        .poll(wgpu::PollType::wait_indefinitely())
        .map_err(|e| DrapeError::render(format!("wgpu poll failed: {e:?}")))?;
    rx.recv()
        .map_err(|_| DrapeError::render("readback channel closed"))?
        .map_err(|e| DrapeError::render(format!("readback map failed: {e:?}")))?;

    let mapped = buffer_slice.get_mapped_range();
    let row_bytes = target.width as usize * 4;
    let padded_row_bytes = target.bytes_per_row as usize;
    let mut out = Vec::with_capacity(row_bytes * target.height as usize);
    for row in 0..target.height as usize {
        let start = row * padded_row_bytes;
        out.extend_from_slice(&mapped[start..start + row_bytes]);
    }
    drop(mapped);
    target.readback.unmap();

    Ok(FrameRGBA {
        width: target.width,
        height: target.height,
        data: out,
        premultiplied: true,
    })
}

fn align_to(value: u32, alignment: u32) -> u32 {
    let mask = alignment - 1;
    (value + mask) & !mask
}

#[cfg(test)]
#[path = "../../tests/unit/render/gpu.rs"]
mod tests;
