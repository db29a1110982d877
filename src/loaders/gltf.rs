use anyhow::{Context, Result};
use glam::{Mat3, Mat4, Vec3};
use std::sync::Arc;

use crate::scene::{compute_normals, Material, Mesh, SceneNode, TextureData, Vertex};

/// Parses a GLB (or self-contained glTF) buffer into a single scene node.
///
/// Node hierarchies are flattened: every mesh primitive becomes one `Mesh`
/// with its node's global transform baked into the vertices, so the
/// returned node starts out with an identity transform.
pub fn parse_gltf(bytes: &[u8], name: &str) -> Result<SceneNode> {
    let (document, buffers, images) =
        gltf::import_slice(bytes).context("Failed to parse glTF data")?;

    log::debug!(
        "glTF '{}': {} scenes, {} nodes, {} meshes, {} materials, {} images",
        name,
        document.scenes().count(),
        document.nodes().count(),
        document.meshes().count(),
        document.materials().count(),
        images.len()
    );

    let textures: Vec<Arc<TextureData>> = images.iter().map(|image| Arc::new(convert_image(image))).collect();

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .context("glTF file contains no scenes")?;

    let mut meshes = Vec::new();
    for node in scene.nodes() {
        process_node(&node, &buffers, &textures, &Mat4::IDENTITY, &mut meshes)?;
    }

    if meshes.is_empty() {
        log::warn!("No geometry found in glTF '{}'", name);
    }

    let node = SceneNode::new(name, meshes);
    log::debug!("glTF '{}': {} triangles extracted", name, node.triangle_count());
    Ok(node)
}

/// Recursively processes glTF nodes
fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    textures: &[Arc<TextureData>],
    parent_transform: &Mat4,
    meshes: &mut Vec<Mesh>,
) -> Result<()> {
    let local_transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global_transform = *parent_transform * local_transform;

    if let Some(mesh) = node.mesh() {
        process_mesh(&mesh, buffers, textures, &global_transform, meshes)?;
    }

    for child in node.children() {
        process_node(&child, buffers, textures, &global_transform, meshes)?;
    }

    Ok(())
}

fn process_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    textures: &[Arc<TextureData>],
    transform: &Mat4,
    meshes: &mut Vec<Mesh>,
) -> Result<()> {
    let normal_matrix = Mat3::from_mat4(*transform).inverse().transpose();

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::debug!("Skipping {:?} primitive in mesh {:?}", primitive.mode(), mesh.name());
            continue;
        }

        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));

        let positions: Vec<Vec3> = reader
            .read_positions()
            .context("Mesh primitive has no positions")?
            .map(|pos| transform.transform_point3(Vec3::from_array(pos)))
            .collect();

        if positions.is_empty() {
            continue;
        }

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };

        let normals: Vec<Vec3> = match reader.read_normals() {
            Some(normals) => normals
                .map(|n| (normal_matrix * Vec3::from_array(n)).try_normalize().unwrap_or(Vec3::Y))
                .collect(),
            None => compute_normals(&positions, &indices),
        };

        let uvs: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
            Some(uvs) => uvs.into_f32().collect(),
            None => vec![[0.0, 0.0]; positions.len()],
        };

        let vertices = positions
            .iter()
            .enumerate()
            .map(|(i, p)| {
                Vertex::new(
                    p.to_array(),
                    normals.get(i).copied().unwrap_or(Vec3::Y).to_array(),
                    uvs.get(i).copied().unwrap_or([0.0, 0.0]),
                )
            })
            .collect();

        meshes.push(Mesh {
            name: mesh.name().map(str::to_string),
            vertices,
            indices,
            material: convert_material(&primitive.material(), textures),
        });
    }

    Ok(())
}

fn convert_material(material: &gltf::Material, textures: &[Arc<TextureData>]) -> Material {
    let pbr = material.pbr_metallic_roughness();
    let texture = pbr
        .base_color_texture()
        .and_then(|info| textures.get(info.texture().source().index()))
        .cloned();

    Material {
        base_color: pbr.base_color_factor(),
        roughness: pbr.roughness_factor(),
        metalness: pbr.metallic_factor(),
        texture,
    }
}

/// Expands any 8-bit glTF image into RGBA8
fn convert_image(image: &gltf::image::Data) -> TextureData {
    let data = match image.format {
        gltf::image::Format::R8G8B8A8 => image.pixels.clone(),
        gltf::image::Format::R8G8B8 => image
            .pixels
            .chunks_exact(3)
            .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], 255])
            .collect(),
        gltf::image::Format::R8G8 => image
            .pixels
            .chunks_exact(2)
            .flat_map(|rg| [rg[0], rg[1], 0, 255])
            .collect(),
        gltf::image::Format::R8 => image.pixels.iter().flat_map(|&l| [l, l, l, 255]).collect(),
        other => {
            log::warn!("Unsupported texture format {:?}, using white", other);
            vec![255; (image.width * image.height * 4) as usize]
        }
    };

    TextureData {
        width: image.width,
        height: image.height,
        data,
    }
}
