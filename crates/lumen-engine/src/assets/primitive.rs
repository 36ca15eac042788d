//! Decoding one glTF primitive into CPU-side vertex/index data.

use gltf::mesh::Mode;

use crate::math::{Aabb, Float3};
use crate::scene::{Topology, Vertex};

use super::accessor::{self, IndexData};
use super::document::SourceDocument;
use super::{LoadError, NormalPolicy};

/// A primitive ready for upload.
pub(crate) struct CpuPrimitive {
    pub vertices: Vec<Vertex>,
    pub indices: Option<IndexData>,
    pub topology: Topology,
    pub bounds: Aabb,
    /// Image index of the base-color texture, if any.
    pub base_color_image: Option<usize>,
    pub generated_normals: bool,
}

pub(crate) fn map_topology(mode: Mode) -> Result<Topology, LoadError> {
    match mode {
        Mode::Points => Ok(Topology::PointList),
        Mode::Lines => Ok(Topology::LineList),
        Mode::LineStrip => Ok(Topology::LineStrip),
        Mode::Triangles => Ok(Topology::TriangleList),
        Mode::TriangleStrip => Ok(Topology::TriangleStrip),
        Mode::LineLoop | Mode::TriangleFan => {
            Err(LoadError::unsupported(format!("primitive mode {mode:?}")))
        }
    }
}

pub(crate) fn decode(
    source: &SourceDocument,
    primitive: &gltf::Primitive<'_>,
    normal_policy: NormalPolicy,
) -> Result<CpuPrimitive, LoadError> {
    let topology = map_topology(primitive.mode())?;

    let positions = primitive
        .get(&gltf::Semantic::Positions)
        .ok_or_else(|| LoadError::malformed("no POSITION attribute"))?;
    let positions = accessor::read_vec3(source, &positions)?;
    if positions.is_empty() {
        return Err(LoadError::malformed("POSITION accessor is empty"));
    }
    let vertex_count = positions.len();

    let indices = primitive
        .indices()
        .map(|a| accessor::read_indices(source, &a, vertex_count))
        .transpose()?;
    if indices.as_ref().is_some_and(|i| i.len() == 0) {
        return Err(LoadError::malformed("index accessor is empty"));
    }
    let draw_count = indices.as_ref().map_or(vertex_count, IndexData::len);
    check_topology_count(topology, draw_count)?;

    let texture_info = primitive
        .material()
        .pbr_metallic_roughness()
        .base_color_texture();
    let tex_set = texture_info.as_ref().map_or(0, |t| t.tex_coord());
    let base_color_image = texture_info.map(|t| t.texture().source().index());

    let tex_coords = primitive
        .get(&gltf::Semantic::TexCoords(tex_set))
        .map(|a| accessor::read_tex_coords(source, &a))
        .transpose()?;
    check_count("TEXCOORD", tex_coords.as_ref().map(Vec::len), vertex_count)?;

    let normals = primitive
        .get(&gltf::Semantic::Normals)
        .map(|a| accessor::read_vec3(source, &a))
        .transpose()?;
    check_count("NORMAL", normals.as_ref().map(Vec::len), vertex_count)?;

    let generated_normals = normals.is_none();
    let normals = match normals {
        Some(n) => n,
        None => match normal_policy {
            NormalPolicy::Generate => {
                generate_normals(&positions, indices.as_ref(), topology)
            }
            NormalPolicy::Zero => vec![[0.0; 3]; vertex_count],
        },
    };

    let bounds = Aabb::from_points(positions.iter().copied().map(Float3::from));

    let vertices = positions
        .iter()
        .enumerate()
        .map(|(i, &position)| Vertex {
            position,
            normal: normals[i],
            tex_coord: tex_coords.as_ref().map_or([0.0; 2], |t| t[i]),
        })
        .collect();

    Ok(CpuPrimitive {
        vertices,
        indices,
        topology,
        bounds,
        base_color_image,
        generated_normals,
    })
}

fn check_topology_count(topology: Topology, count: usize) -> Result<(), LoadError> {
    let valid = match topology {
        Topology::PointList => count >= 1,
        Topology::LineList => count % 2 == 0,
        Topology::LineStrip => count >= 2,
        Topology::TriangleList => count % 3 == 0,
        Topology::TriangleStrip => count >= 3,
    };
    if valid {
        Ok(())
    } else {
        Err(LoadError::malformed(format!(
            "{count} elements do not form a whole {topology:?}"
        )))
    }
}

fn check_count(what: &str, count: Option<usize>, vertex_count: usize) -> Result<(), LoadError> {
    match count {
        Some(n) if n != vertex_count => Err(LoadError::malformed(format!(
            "{what} has {n} elements but POSITION has {vertex_count}"
        ))),
        _ => Ok(()),
    }
}

/// Area-weighted vertex normals, assuming counter-clockwise front faces.
///
/// Points, lines and vertices touched only by degenerate triangles get zero.
pub(crate) fn generate_normals(
    positions: &[[f32; 3]],
    indices: Option<&IndexData>,
    topology: Topology,
) -> Vec<[f32; 3]> {
    let mut acc = vec![Float3::ZERO; positions.len()];

    if topology.is_triangles() {
        let order: Vec<usize> = match indices {
            Some(idx) => idx.iter().map(|i| i as usize).collect(),
            None => (0..positions.len()).collect(),
        };

        let mut add = |a: usize, b: usize, c: usize| {
            let (pa, pb, pc) = (
                Float3::from(positions[a]),
                Float3::from(positions[b]),
                Float3::from(positions[c]),
            );
            let n = (pb - pa).cross(pc - pa);
            acc[a] += n;
            acc[b] += n;
            acc[c] += n;
        };

        match topology {
            Topology::TriangleList => {
                for tri in order.chunks_exact(3) {
                    add(tri[0], tri[1], tri[2]);
                }
            }
            Topology::TriangleStrip => {
                for k in 0..order.len().saturating_sub(2) {
                    // Odd triangles in a strip have reversed winding.
                    if k % 2 == 0 {
                        add(order[k], order[k + 1], order[k + 2]);
                    } else {
                        add(order[k + 1], order[k], order[k + 2]);
                    }
                }
            }
            _ => {}
        }
    }

    acc.into_iter()
        .map(|n| n.normalize_or_zero().to_array())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRI: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];

    #[test]
    fn fans_and_loops_are_unsupported() {
        assert!(matches!(map_topology(Mode::TriangleFan), Err(LoadError::UnsupportedFeature(_))));
        assert!(matches!(map_topology(Mode::LineLoop), Err(LoadError::UnsupportedFeature(_))));
        assert_eq!(map_topology(Mode::Triangles).unwrap(), Topology::TriangleList);
        assert_eq!(map_topology(Mode::TriangleStrip).unwrap(), Topology::TriangleStrip);
        assert_eq!(map_topology(Mode::Points).unwrap(), Topology::PointList);
    }

    #[test]
    fn ccw_triangle_faces_positive_z() {
        let n = generate_normals(&TRI, None, Topology::TriangleList);
        for v in n {
            assert_eq!(v, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn indexed_winding_is_respected() {
        let idx = IndexData::U16(vec![0, 2, 1]);
        let n = generate_normals(&TRI, Some(&idx), Topology::TriangleList);
        assert_eq!(n[0], [0.0, 0.0, -1.0]);
    }

    #[test]
    fn strip_keeps_consistent_facing() {
        let quad = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]];
        let n = generate_normals(&quad, None, Topology::TriangleStrip);
        for v in n {
            assert_eq!(v, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn lines_and_degenerates_get_zero() {
        let n = generate_normals(&TRI, None, Topology::LineList);
        assert!(n.iter().all(|v| *v == [0.0; 3]));

        let flat = [[0.0; 3], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
        let n = generate_normals(&flat, None, Topology::TriangleList);
        assert!(n.iter().all(|v| *v == [0.0; 3]));
    }

    #[test]
    fn generation_is_deterministic() {
        let a = generate_normals(&TRI, None, Topology::TriangleList);
        let b = generate_normals(&TRI, None, Topology::TriangleList);
        assert_eq!(a, b);
    }

    #[test]
    fn element_counts_must_fit_the_topology() {
        assert!(check_topology_count(Topology::TriangleList, 6).is_ok());
        assert!(check_topology_count(Topology::TriangleList, 4).is_err());
        assert!(check_topology_count(Topology::LineList, 3).is_err());
        assert!(check_topology_count(Topology::LineList, 2).is_ok());
        assert!(check_topology_count(Topology::TriangleStrip, 2).is_err());
        assert!(check_topology_count(Topology::TriangleStrip, 4).is_ok());
        assert!(check_topology_count(Topology::LineStrip, 1).is_err());
        assert!(check_topology_count(Topology::PointList, 1).is_ok());
    }
}
