use bytemuck::{Pod, Zeroable};
use duckview_scene::{Geometry, Mesh};
use glam::Mat4;
use image::RgbaImage;
use image::imageops::FilterType;
use std::borrow::Cow;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x3,
            2 => Float32x2,
        ],
    };
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct MeshUniforms {
    model: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    base_color: [f32; 4],
}

impl MeshUniforms {
    pub fn new(world: Mat4, base_color: [f32; 4]) -> Self {
        Self {
            model: world.to_cols_array_2d(),
            normal_matrix: world.inverse().transpose().to_cols_array_2d(),
            base_color,
        }
    }
}

/// Interleave a geometry's attributes. Missing normals point up, missing
/// texture coordinates are zero.
pub(crate) fn interleave(geometry: &Geometry) -> Vec<Vertex> {
    geometry
        .positions
        .iter()
        .enumerate()
        .map(|(i, p)| Vertex {
            position: p.to_array(),
            normal: geometry
                .normals
                .get(i)
                .map_or([0.0, 1.0, 0.0], |n| n.to_array()),
            uv: geometry.uvs.get(i).map_or([0.0, 0.0], |uv| uv.to_array()),
        })
        .collect()
}

/// Downscale `image` so neither side exceeds `max_dim`, keeping the aspect
/// ratio. Images already within the limit are borrowed untouched.
pub(crate) fn fit_texture(image: &RgbaImage, max_dim: u32) -> Cow<'_, RgbaImage> {
    let (width, height) = image.dimensions();
    let max_dim = max_dim.max(1);
    if width <= max_dim && height <= max_dim {
        return Cow::Borrowed(image);
    }
    let scale = max_dim as f64 / width.max(height) as f64;
    let fit = |side: u32| ((side as f64 * scale).round() as u32).clamp(1, max_dim);
    let (new_width, new_height) = (fit(width), fit(height));
    tracing::warn!(
        width,
        height,
        new_width,
        new_height,
        "base color texture exceeds the device limit, downscaling"
    );
    Cow::Owned(image::imageops::resize(
        image,
        new_width,
        new_height,
        FilterType::Triangle,
    ))
}

/// Buffers and bindings for one uploaded mesh.
pub(crate) struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    base_color: [f32; 4],
    // keeps the material texture alive for the bind group
    _texture: Option<wgpu::Texture>,
}

impl GpuMesh {
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        fallback: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
        mesh: &Mesh,
    ) -> Self {
        let vertices = interleave(&mesh.geometry);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_vertex_buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_index_buffer"),
            contents: bytemuck::cast_slice(&mesh.geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let base_color = mesh.material.base_color;
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_uniform_buffer"),
            contents: bytemuck::bytes_of(&MeshUniforms::new(Mat4::IDENTITY, base_color)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let max_dim = device.limits().max_texture_dimension_2d;
        let texture = mesh.material.base_color_texture.as_ref().map(|image| {
            let image = fit_texture(image, max_dim);
            let (width, height) = image.dimensions();
            device.create_texture_with_data(
                queue,
                &wgpu::TextureDescriptor {
                    label: Some("base_color_texture"),
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
                },
                wgpu::util::TextureDataOrder::LayerMajor,
                image.as_raw(),
            )
        });
        let texture_view = texture
            .as_ref()
            .map(|t| t.create_view(&Default::default()));

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("mesh_bind_group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(
                        texture_view.as_ref().unwrap_or(fallback),
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.geometry.indices.len() as u32,
            uniform_buffer,
            bind_group,
            base_color,
            _texture: texture,
        }
    }

    pub fn write_transform(&self, queue: &wgpu::Queue, world: Mat4) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&MeshUniforms::new(world, self.base_color)),
        );
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(1, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}
