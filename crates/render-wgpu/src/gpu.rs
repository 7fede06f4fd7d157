use crate::lighting::Globals;
use crate::mesh::{GpuMesh, Vertex};
use crate::shaders;
use duckview_render::{RenderError, Renderer, Viewport};
use duckview_scene::{Background, Color, GradientTexture, NodeId, PerspectiveCamera, Scene};
use glam::Mat4;
use std::collections::{HashMap, HashSet};
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const MSAA_SAMPLES: u32 = 4;

/// A frame that has been drawn but not yet presented. Overlays can render
/// into [`view`](Self::view) before [`present`](Self::present).
pub struct RenderedFrame {
    surface_texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

impl RenderedFrame {
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn present(self) {
        self.surface_texture.present();
    }
}

struct ShadowMap {
    size: u32,
    view: wgpu::TextureView,
}

impl ShadowMap {
    fn new(device: &wgpu::Device, size: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("shadow_map"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        Self {
            size,
            view: texture.create_view(&Default::default()),
        }
    }
}

struct GradientPass {
    top: Color,
    bottom: Color,
    bind_group: wgpu::BindGroup,
}

/// wgpu scene renderer: shadow pass from the key light, then a
/// multisampled main pass with the gradient backdrop and lit meshes.
pub struct WgpuRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    viewport: Viewport,
    surface_dirty: bool,
    sample_count: u32,

    mesh_pipeline: wgpu::RenderPipeline,
    shadow_pipeline: wgpu::RenderPipeline,
    background_pipeline: wgpu::RenderPipeline,

    globals_layout: wgpu::BindGroupLayout,
    mesh_layout: wgpu::BindGroupLayout,
    background_layout: wgpu::BindGroupLayout,

    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    shadow_globals_bind_group: wgpu::BindGroup,
    shadow_sampler: wgpu::Sampler,
    shadow: ShadowMap,

    material_sampler: wgpu::Sampler,
    background_sampler: wgpu::Sampler,
    white_texture: wgpu::TextureView,
    gradient: Option<GradientPass>,
    meshes: HashMap<NodeId, GpuMesh>,

    depth_view: wgpu::TextureView,
    msaa_view: Option<wgpu::TextureView>,
}

impl WgpuRenderer {
    /// Take ownership of a surface and its device. The surface is
    /// (re)configured to `viewport`'s physical size.
    pub fn new(
        surface: wgpu::Surface<'static>,
        device: wgpu::Device,
        queue: wgpu::Queue,
        mut config: wgpu::SurfaceConfiguration,
        viewport: Viewport,
        antialias: bool,
    ) -> Self {
        let sample_count = if antialias { MSAA_SAMPLES } else { 1 };
        let (width, height) = viewport.physical_size();
        config.width = width;
        config.height = height;
        surface.configure(&device, &config);

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals_buffer"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bind_group_layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });

        // The shadow pass only reads the light matrix; it cannot bind the
        // shadow map it is writing.
        let shadow_globals_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("shadow_globals_bind_group_layout"),
                entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
            });

        let mesh_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("mesh_bind_group_layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
                texture_entry(1),
                sampler_entry(2),
            ],
        });

        let background_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("background_bind_group_layout"),
                entries: &[texture_entry(0), sampler_entry(1)],
            });

        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadow_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });
        let material_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("material_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let background_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("background_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let white_texture = device
            .create_texture_with_data(
                &queue,
                &srgb_texture_descriptor("white_texture", 1, 1),
                wgpu::util::TextureDataOrder::LayerMajor,
                &[255, 255, 255, 255],
            )
            .create_view(&Default::default());

        let shadow = ShadowMap::new(&device, 1);
        let globals_bind_group = create_globals_bind_group(
            &device,
            &globals_layout,
            &globals_buffer,
            &shadow.view,
            &shadow_sampler,
        );
        let shadow_globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shadow_globals_bind_group"),
            layout: &shadow_globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        // Mesh pipeline
        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::MESH_SHADER.into()),
        });
        let mesh_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mesh_pipeline_layout"),
            bind_group_layouts: &[&globals_layout, &mesh_layout],
            push_constant_ranges: &[],
        });
        let mesh_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mesh_pipeline"),
            layout: Some(&mesh_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &mesh_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::LAYOUT],
            },
            fragment: Some(wgpu::FragmentState {
                module: &mesh_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: sample_count,
                ..Default::default()
            },
            multiview: None,
            cache: None,
        });

        // Shadow pipeline (depth only)
        let shadow_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shadow_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SHADOW_SHADER.into()),
        });
        let shadow_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("shadow_pipeline_layout"),
                bind_group_layouts: &[&shadow_globals_layout, &mesh_layout],
                push_constant_ranges: &[],
            });
        let shadow_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shadow_pipeline"),
            layout: Some(&shadow_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shadow_shader,
                entry_point: Some("vs_shadow"),
                compilation_options: Default::default(),
                buffers: &[Vertex::LAYOUT],
            },
            fragment: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: Default::default(),
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        // Background pipeline
        let background_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("background_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::BACKGROUND_SHADER.into()),
        });
        let background_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("background_pipeline_layout"),
                bind_group_layouts: &[&background_layout],
                push_constant_ranges: &[],
            });
        let background_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("background_pipeline"),
            layout: Some(&background_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &background_shader,
                entry_point: Some("vs_background"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &background_shader,
                entry_point: Some("fs_background"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: Default::default(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: sample_count,
                ..Default::default()
            },
            multiview: None,
            cache: None,
        });

        let depth_view = create_depth_view(&device, &config, sample_count);
        let msaa_view = create_msaa_view(&device, &config, sample_count);

        tracing::info!(
            width,
            height,
            format = ?config.format,
            samples = sample_count,
            "wgpu renderer ready"
        );

        Self {
            surface,
            device,
            queue,
            config,
            viewport,
            surface_dirty: false,
            sample_count,
            mesh_pipeline,
            shadow_pipeline,
            background_pipeline,
            globals_layout,
            mesh_layout,
            background_layout,
            globals_buffer,
            globals_bind_group,
            shadow_globals_bind_group,
            shadow_sampler,
            shadow,
            material_sampler,
            background_sampler,
            white_texture,
            gradient: None,
            meshes: HashMap::new(),
            depth_view,
            msaa_view,
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Current surface size in device pixels.
    pub fn surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Number of meshes currently resident on the GPU.
    pub fn resident_meshes(&self) -> usize {
        self.meshes.len()
    }

    fn reconfigure(&mut self) {
        let (width, height) = self.viewport.physical_size();
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, &self.config, self.sample_count);
        self.msaa_view = create_msaa_view(&self.device, &self.config, self.sample_count);
        self.surface_dirty = false;
        tracing::debug!(
            width,
            height,
            pixel_ratio = self.viewport.pixel_ratio,
            "surface reconfigured"
        );
    }

    fn sync_shadow_map(&mut self, scene: &Scene) {
        let limit = self.device.limits().max_texture_dimension_2d;
        let wanted = scene
            .shadow_caster()
            .and_then(|light| light.shadow)
            .map_or(1, |shadow| shadow.map_size.clamp(1, limit));
        if wanted == self.shadow.size {
            return;
        }
        self.shadow = ShadowMap::new(&self.device, wanted);
        self.globals_bind_group = create_globals_bind_group(
            &self.device,
            &self.globals_layout,
            &self.globals_buffer,
            &self.shadow.view,
            &self.shadow_sampler,
        );
        tracing::debug!(size = wanted, "shadow map allocated");
    }

    /// Upload the gradient texture when it changes. Returns the clear color
    /// for the main pass.
    fn sync_background(&mut self, scene: &Scene) -> wgpu::Color {
        match &scene.background {
            Some(Background::Gradient(gradient)) => {
                let stale = self
                    .gradient
                    .as_ref()
                    .is_none_or(|g| g.top != gradient.top || g.bottom != gradient.bottom);
                if stale {
                    self.gradient = Some(self.upload_gradient(gradient));
                }
                clear_color(gradient.bottom)
            }
            Some(Background::Color(color)) => {
                self.gradient = None;
                clear_color(*color)
            }
            None => {
                self.gradient = None;
                wgpu::Color::BLACK
            }
        }
    }

    fn upload_gradient(&self, gradient: &GradientTexture) -> GradientPass {
        let texture = self.device.create_texture_with_data(
            &self.queue,
            &srgb_texture_descriptor("gradient_texture", gradient.width(), gradient.height()),
            wgpu::util::TextureDataOrder::LayerMajor,
            gradient.as_bytes(),
        );
        let view = texture.create_view(&Default::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gradient_bind_group"),
            layout: &self.background_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.background_sampler),
                },
            ],
        });
        tracing::debug!(top = %gradient.top, bottom = %gradient.bottom, "gradient uploaded");
        GradientPass {
            top: gradient.top,
            bottom: gradient.bottom,
            bind_group,
        }
    }

    /// Upload meshes seen for the first time, refresh world transforms, and
    /// evict meshes no longer in the scene. Returns the draw list.
    fn sync_meshes(&mut self, scene: &Scene) -> Vec<NodeId> {
        let mut draws = Vec::new();
        for root in scene.models() {
            root.visit_meshes(Mat4::IDENTITY, &mut |node, mesh, world| {
                if mesh.geometry.indices.is_empty() || mesh.geometry.positions.is_empty() {
                    return;
                }
                let gpu = self.meshes.entry(node.id).or_insert_with(|| {
                    tracing::debug!(
                        node = %node.id.short(),
                        vertices = mesh.geometry.vertex_count(),
                        triangles = mesh.geometry.triangle_count(),
                        "uploading mesh"
                    );
                    GpuMesh::upload(
                        &self.device,
                        &self.queue,
                        &self.mesh_layout,
                        &self.white_texture,
                        &self.material_sampler,
                        mesh,
                    )
                });
                gpu.write_transform(&self.queue, world);
                draws.push(node.id);
            });
        }

        if draws.len() != self.meshes.len() {
            let live: HashSet<NodeId> = draws.iter().copied().collect();
            let before = self.meshes.len();
            self.meshes.retain(|id, _| live.contains(id));
            tracing::debug!(evicted = before - self.meshes.len(), "released meshes");
        }
        draws
    }
}

impl Renderer for WgpuRenderer {
    type Output = Result<RenderedFrame, RenderError>;

    fn set_size(&mut self, width: u32, height: u32) {
        if (self.viewport.width, self.viewport.height) != (width, height) {
            self.viewport.width = width;
            self.viewport.height = height;
            self.surface_dirty = true;
        }
    }

    fn set_pixel_ratio(&mut self, ratio: f64) {
        if self.viewport.pixel_ratio != ratio {
            self.viewport.pixel_ratio = ratio;
            self.surface_dirty = true;
        }
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Self::Output {
        if self.surface_dirty {
            self.reconfigure();
        }

        let surface_texture = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Err(RenderError::SurfaceLost);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(RenderError::Device("out of memory".into()));
            }
            Err(e) => return Err(RenderError::Surface(e.to_string())),
        };
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let globals = Globals::collect(scene, camera);
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
        self.sync_shadow_map(scene);
        let clear = self.sync_background(scene);
        let draws = self.sync_meshes(scene);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        if globals.shadows_enabled() {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shadow_pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            pass.set_pipeline(&self.shadow_pipeline);
            pass.set_bind_group(0, &self.shadow_globals_bind_group, &[]);
            for id in &draws {
                if let Some(mesh) = self.meshes.get(id) {
                    mesh.draw(&mut pass);
                }
            }
        }

        {
            let (target, resolve_target, store) = match &self.msaa_view {
                Some(msaa) => (msaa, Some(&view), wgpu::StoreOp::Discard),
                None => (&view, None, wgpu::StoreOp::Store),
            };
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if let Some(gradient) = &self.gradient {
                pass.set_pipeline(&self.background_pipeline);
                pass.set_bind_group(0, &gradient.bind_group, &[]);
                pass.draw(0..3, 0..1);
            }

            pass.set_pipeline(&self.mesh_pipeline);
            pass.set_bind_group(0, &self.globals_bind_group, &[]);
            for id in &draws {
                if let Some(mesh) = self.meshes.get(id) {
                    mesh.draw(&mut pass);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));

        Ok(RenderedFrame {
            surface_texture,
            view,
        })
    }
}

fn clear_color(color: Color) -> wgpu::Color {
    let [r, g, b] = color.to_linear();
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: 1.0,
    }
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn srgb_texture_descriptor(label: &str, width: u32, height: u32) -> wgpu::TextureDescriptor<'_> {
    wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    }
}

fn create_globals_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    shadow_view: &wgpu::TextureView,
    shadow_sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("globals_bind_group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(shadow_view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(shadow_sampler),
            },
        ],
    })
}

fn create_depth_view(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    sample_count: u32,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}

fn create_msaa_view(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    sample_count: u32,
) -> Option<wgpu::TextureView> {
    if sample_count == 1 {
        return None;
    }
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("msaa_color_texture"),
        size: wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format: config.format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    Some(texture.create_view(&Default::default()))
}
