//! Model import through `tobj` into an owned [`SceneGraph`].

use std::fs;
use std::path::Path;

use crate::error::{AssetError, Result};
use crate::mesh::{MeshData, MeshVertex};
use crate::scene::{Material, SceneGraph, TextureRef};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// Replace every texture coordinate `v` with `1 - v`.
    pub flip_uvs: bool,
}

/// Parse a model file (triangulated, single index buffer per mesh).
///
/// Texture paths in materials are resolved against the model's directory.
/// A missing or broken material library is not fatal: the model loads
/// untextured. A file that yields no meshes is a parse error.
pub fn load_scene(path: impl AsRef<Path>, options: ImportOptions) -> Result<SceneGraph> {
    let path = path.as_ref();
    fs::metadata(path).map_err(|e| AssetError::io(path, e))?;

    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|e| AssetError::parse(path, e.to_string()))?;

    let materials = materials.unwrap_or_else(|e| {
        log::warn!("No usable material library for {:?} ({}); loading untextured", path, e);
        Vec::new()
    });

    let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let root_name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut graph = SceneGraph::new(root_name);
    graph.materials = materials.iter().map(|m| convert_material(m, &base)).collect();

    for model in &models {
        let mesh = convert_mesh(model, options, graph.materials.len());
        if !mesh.is_valid() {
            log::debug!("Skipping empty mesh '{}' in {:?}", model.name, path);
            continue;
        }
        let node = graph.add_node(SceneGraph::ROOT, model.name.clone());
        graph.add_mesh(node, mesh);
    }

    if graph.meshes.is_empty() {
        return Err(AssetError::parse(path, "file contains no meshes"));
    }

    log::info!(
        "Imported {:?}: {} meshes, {} materials",
        path,
        graph.meshes.len(),
        graph.materials.len()
    );
    Ok(graph)
}

fn convert_mesh(model: &tobj::Model, options: ImportOptions, material_count: usize) -> MeshData {
    let m = &model.mesh;
    let count = m.positions.len() / 3;
    let has_normals = m.normals.len() == m.positions.len();
    let has_uvs = m.texcoords.len() / 2 == count;

    let vertices = (0..count)
        .map(|i| {
            let position = [m.positions[3 * i], m.positions[3 * i + 1], m.positions[3 * i + 2]];
            let normal = if has_normals {
                [m.normals[3 * i], m.normals[3 * i + 1], m.normals[3 * i + 2]]
            } else {
                [0.0; 3]
            };
            let uv = if has_uvs {
                let v = m.texcoords[2 * i + 1];
                [m.texcoords[2 * i], if options.flip_uvs { 1.0 - v } else { v }]
            } else {
                [0.0, 0.0]
            };
            MeshVertex::new(position, normal, uv)
        })
        .collect();

    let mut data = MeshData {
        name: model.name.clone(),
        vertices,
        indices: m.indices.clone(),
        material: m.material_id.filter(|&id| id < material_count),
    };
    if !has_normals {
        data.compute_normals();
    }
    data
}

fn convert_material(mtl: &tobj::Material, base: &Path) -> Material {
    let resolve = |raw: &String| TextureRef {
        raw: raw.clone(),
        path: base.join(raw),
    };

    Material {
        name: mtl.name.clone(),
        diffuse: mtl.diffuse_texture.iter().map(resolve).collect(),
        specular: mtl.specular_texture.iter().map(resolve).collect(),
        emission: mtl.unknown_param.get("map_Ke").into_iter().map(resolve).collect(),
        shininess: mtl.shininess,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const QUAD_OBJ: &str = "\
mtllib quad.mtl
o Quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
usemtl box
f 1/1/1 2/2/1 3/3/1 4/4/1
o Tri
v 0 0 1
v 1 0 1
v 0 1 1
f 5 6 7
";

    const QUAD_MTL: &str = "\
newmtl box
Ns 32
map_Kd diffuse.png
map_Ks specular.png
map_Ke glow.png
";

    fn fixture(tag: &str, obj: &str, mtl: Option<&str>) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("asset-import-{}-{}", tag, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("quad.obj"), obj).unwrap();
        if let Some(mtl) = mtl {
            fs::write(dir.join("quad.mtl"), mtl).unwrap();
        }
        dir
    }

    #[test]
    fn quad_is_triangulated_with_materials_resolved() {
        let dir = fixture("quad", QUAD_OBJ, Some(QUAD_MTL));
        let scene = load_scene(dir.join("quad.obj"), ImportOptions::default()).unwrap();

        assert_eq!(scene.meshes.len(), 2);
        let quad = &scene.meshes[0];
        assert_eq!(quad.indices.len(), 6);
        assert_eq!(quad.vertices.len(), 4);
        assert_eq!(quad.vertices[2].uv, [1.0, 1.0]);

        let mat = scene.material_of(0).unwrap();
        assert_eq!(mat.diffuse[0].raw, "diffuse.png");
        assert_eq!(mat.diffuse[0].path, dir.join("diffuse.png"));
        assert_eq!(mat.specular[0].raw, "specular.png");
        assert_eq!(mat.emission[0].raw, "glow.png");
        assert_eq!(mat.shininess, Some(32.0));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_channels_get_defaults() {
        let dir = fixture("defaults", QUAD_OBJ, Some(QUAD_MTL));
        let scene = load_scene(dir.join("quad.obj"), ImportOptions::default()).unwrap();

        let tri = &scene.meshes[1];
        for v in &tri.vertices {
            assert_eq!(v.uv, [0.0, 0.0]);
            assert!((v.normal[2] - 1.0).abs() < 1e-6);
        }
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn flip_uvs_mirrors_v() {
        let dir = fixture("flip", QUAD_OBJ, Some(QUAD_MTL));
        let scene = load_scene(dir.join("quad.obj"), ImportOptions { flip_uvs: true }).unwrap();
        let uvs: Vec<_> = scene.meshes[0].vertices.iter().map(|v| v.uv).collect();
        assert!(uvs.contains(&[0.0, 1.0]));
        assert!(uvs.contains(&[1.0, 0.0]));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_material_library_loads_untextured() {
        let dir = fixture("nomtl", QUAD_OBJ, None);
        let scene = load_scene(dir.join("quad.obj"), ImportOptions::default()).unwrap();
        assert!(scene.materials.is_empty());
        assert!(scene.meshes.iter().all(|m| m.material.is_none()));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn file_without_meshes_is_parse_error() {
        let dir = fixture("empty", "# nothing here\n", None);
        let err = load_scene(dir.join("quad.obj"), ImportOptions::default()).err();
        assert!(matches!(err, Some(AssetError::Parse { .. })));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_scene("no/such/model.obj", ImportOptions::default()).err();
        assert!(matches!(err, Some(AssetError::Io { .. })));
    }

    #[test]
    fn nodes_are_visited_in_file_order() {
        let dir = fixture("order", QUAD_OBJ, Some(QUAD_MTL));
        let scene = load_scene(dir.join("quad.obj"), ImportOptions::default()).unwrap();
        let names: Vec<_> = scene
            .mesh_order()
            .into_iter()
            .map(|i| scene.meshes[i].name.clone())
            .collect();
        assert_eq!(names, ["Quad", "Tri"]);
        let _ = fs::remove_dir_all(&dir);
    }
}
