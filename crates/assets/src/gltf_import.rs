use crate::error::AssetError;
use crate::loader::Model;
use duckview_scene::{Geometry, Material, Mesh, Node, Transform};
use glam::{Quat, Vec2, Vec3};
use gltf::image::Format;
use image::RgbaImage;
use std::path::Path;

struct ImportContext<'a> {
    buffers: &'a [gltf::buffer::Data],
    images: &'a [gltf::image::Data],
}

/// Import a `.glb` or `.gltf` file and recenter every mesh.
///
/// Uses the default scene, or the first scene when none is marked default.
/// A mesh with several primitives becomes one child node per primitive.
pub fn load_model(path: impl AsRef<Path>) -> Result<Model, AssetError> {
    let path = path.as_ref();
    let _span = tracing::info_span!("load_model", path = %path.display()).entered();

    let (document, buffers, images) = gltf::import(path)?;
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| AssetError::NoScene(path.to_path_buf()))?;

    let ctx = ImportContext {
        buffers: &buffers,
        images: &images,
    };

    let mut root = Node::named(scene.name().unwrap_or("scene"));
    for node in scene.nodes() {
        root.add_child(convert_node(&node, &ctx));
    }

    if root.mesh_count() == 0 {
        return Err(AssetError::EmptyModel(path.to_path_buf()));
    }

    let centered = root.center_meshes();
    tracing::info!(meshes = centered, "model imported");

    Ok(Model {
        source: path.to_path_buf(),
        root,
    })
}

fn convert_node(node: &gltf::Node<'_>, ctx: &ImportContext<'_>) -> Node {
    let (translation, rotation, scale) = node.transform().decomposed();
    let mut out = Node {
        name: node.name().map(str::to_owned),
        transform: Transform {
            position: Vec3::from(translation),
            rotation: Quat::from_array(rotation),
            scale: Vec3::from(scale),
        },
        ..Node::new()
    };

    if let Some(mesh) = node.mesh() {
        let mut primitives: Vec<Mesh> = mesh
            .primitives()
            .filter_map(|p| convert_primitive(&p, ctx))
            .collect();
        if primitives.len() == 1 {
            out.mesh = primitives.pop();
        } else {
            let base = mesh.name().unwrap_or("primitive");
            for (i, m) in primitives.into_iter().enumerate() {
                out.add_child(Node::named(format!("{base}_{i}")).with_mesh(m));
            }
        }
    }

    for child in node.children() {
        out.add_child(convert_node(&child, ctx));
    }
    out
}

fn convert_primitive(primitive: &gltf::Primitive<'_>, ctx: &ImportContext<'_>) -> Option<Mesh> {
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        tracing::warn!(mode = ?primitive.mode(), "skipping non-triangle primitive");
        return None;
    }

    let reader =
        primitive.reader(|buffer| ctx.buffers.get(buffer.index()).map(|d| d.0.as_slice()));

    let Some(positions) = reader.read_positions() else {
        tracing::warn!("skipping primitive without POSITION");
        return None;
    };
    let positions: Vec<Vec3> = positions.map(Vec3::from).collect();

    let indices = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => Geometry::sequential_indices(positions.len()),
    };

    let material = primitive.material();
    let mut geometry = Geometry::new(positions, indices);
    if let Some(uvs) = reader.read_tex_coords(base_color_uv_set(&material)) {
        geometry.uvs = uvs.into_f32().map(Vec2::from).collect();
    }
    match reader.read_normals() {
        Some(normals) => geometry.normals = normals.map(Vec3::from).collect(),
        None => geometry.compute_vertex_normals(),
    }

    Some(Mesh {
        geometry,
        material: convert_material(&material, ctx),
    })
}

/// Texture coordinate set the base color texture samples, 0 without one.
fn base_color_uv_set(material: &gltf::Material<'_>) -> u32 {
    material
        .pbr_metallic_roughness()
        .base_color_texture()
        .map_or(0, |info| info.tex_coord())
}

fn convert_material(material: &gltf::Material<'_>, ctx: &ImportContext<'_>) -> Material {
    let pbr = material.pbr_metallic_roughness();
    let base_color_texture = pbr.base_color_texture().and_then(|info| {
        let index = info.texture().source().index();
        ctx.images.get(index).and_then(to_rgba)
    });
    Material {
        name: material.name().map(str::to_owned),
        base_color: pbr.base_color_factor(),
        base_color_texture,
    }
}

fn to_rgba(data: &gltf::image::Data) -> Option<RgbaImage> {
    let pixels: Vec<u8> = match data.format {
        Format::R8G8B8A8 => data.pixels.clone(),
        Format::R8G8B8 => data
            .pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        Format::R8G8 => data
            .pixels
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        Format::R8 => data.pixels.iter().flat_map(|&l| [l, l, l, 255]).collect(),
        other => {
            tracing::warn!(format = ?other, "unsupported texture format, using base color only");
            return None;
        }
    };
    RgbaImage::from_raw(data.width, data.height, pixels)
}
