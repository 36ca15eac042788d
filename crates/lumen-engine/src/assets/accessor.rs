//! Validated, typed reads of accessor data.
//!
//! Every read checks the accessor against its buffer view before touching a
//! byte, so a lying document produces a [`LoadError`] instead of a panic.

use gltf::accessor::{DataType, Dimensions};

use super::LoadError;
use super::document::SourceDocument;

/// Index data as it will be uploaded. `u8` sources are widened to `u16`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum IndexData {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl IndexData {
    pub fn len(&self) -> usize {
        match self {
            IndexData::U16(v) => v.len(),
            IndexData::U32(v) => v.len(),
        }
    }

    pub fn get(&self, i: usize) -> Option<u32> {
        match self {
            IndexData::U16(v) => v.get(i).map(|&x| u32::from(x)),
            IndexData::U32(v) => v.get(i).copied(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len()).filter_map(|i| self.get(i))
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            IndexData::U16(v) => bytemuck::cast_slice(v),
            IndexData::U32(v) => bytemuck::cast_slice(v),
        }
    }
}

/// The strided element slices of an accessor.
struct Elements<'a> {
    bytes: &'a [u8],
    start: usize,
    stride: usize,
    size: usize,
    count: usize,
}

impl<'a> Elements<'a> {
    fn get(&self, i: usize) -> &'a [u8] {
        let at = self.start + i * self.stride;
        &self.bytes[at..at + self.size]
    }

    fn iter(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        (0..self.count).map(move |i| self.get(i))
    }
}

fn describe(accessor: &gltf::Accessor<'_>) -> String {
    format!(
        "accessor {} ({:?} {:?})",
        accessor.index(),
        accessor.data_type(),
        accessor.dimensions()
    )
}

/// Checks layout consistency and returns the element slices.
fn elements<'a>(
    source: &'a SourceDocument,
    accessor: &gltf::Accessor<'_>,
) -> Result<Elements<'a>, LoadError> {
    if accessor.sparse().is_some() {
        return Err(LoadError::unsupported(format!(
            "sparse {}",
            describe(accessor)
        )));
    }
    let view = accessor.view().ok_or_else(|| {
        LoadError::unsupported(format!("{} has no buffer view", describe(accessor)))
    })?;
    let bytes = source.view_bytes(&view)?;

    let size = accessor.size();
    let stride = view.stride().unwrap_or(size);
    if stride < size {
        return Err(LoadError::malformed(format!(
            "{} has stride {stride} smaller than its element size {size}",
            describe(accessor)
        )));
    }

    let count = accessor.count();
    let start = accessor.offset();
    if count > 0 {
        let end = (count - 1)
            .checked_mul(stride)
            .and_then(|n| n.checked_add(start))
            .and_then(|n| n.checked_add(size));
        match end {
            Some(end) if end <= bytes.len() => {}
            _ => {
                return Err(LoadError::malformed(format!(
                    "{} needs {count} elements of {size} bytes at offset {start} stride {stride}, \
                     but buffer view {} is {} bytes",
                    describe(accessor),
                    view.index(),
                    bytes.len()
                )));
            }
        }
    }

    Ok(Elements {
        bytes,
        start,
        stride,
        size,
        count,
    })
}

fn f32_at(b: &[u8], i: usize) -> f32 {
    f32::from_le_bytes([b[i * 4], b[i * 4 + 1], b[i * 4 + 2], b[i * 4 + 3]])
}

fn u16_at(b: &[u8], i: usize) -> u16 {
    u16::from_le_bytes([b[i * 2], b[i * 2 + 1]])
}

/// `VEC3` of `f32` (positions, normals).
pub(crate) fn read_vec3(
    source: &SourceDocument,
    accessor: &gltf::Accessor<'_>,
) -> Result<Vec<[f32; 3]>, LoadError> {
    if accessor.dimensions() != Dimensions::Vec3 || accessor.data_type() != DataType::F32 {
        return Err(LoadError::unsupported(format!(
            "{} where float VEC3 is required",
            describe(accessor)
        )));
    }
    let el = elements(source, accessor)?;
    Ok(el
        .iter()
        .map(|b| [f32_at(b, 0), f32_at(b, 1), f32_at(b, 2)])
        .collect())
}

/// `VEC2` texture coordinates: `f32`, or normalized `u8`/`u16`.
pub(crate) fn read_tex_coords(
    source: &SourceDocument,
    accessor: &gltf::Accessor<'_>,
) -> Result<Vec<[f32; 2]>, LoadError> {
    if accessor.dimensions() != Dimensions::Vec2 {
        return Err(LoadError::unsupported(format!(
            "{} where VEC2 texture coordinates are required",
            describe(accessor)
        )));
    }

    let normalized = accessor.normalized();
    match accessor.data_type() {
        DataType::F32 => {
            let el = elements(source, accessor)?;
            Ok(el.iter().map(|b| [f32_at(b, 0), f32_at(b, 1)]).collect())
        }
        DataType::U8 if normalized => {
            let el = elements(source, accessor)?;
            Ok(el
                .iter()
                .map(|b| [f32::from(b[0]) / 255.0, f32::from(b[1]) / 255.0])
                .collect())
        }
        DataType::U16 if normalized => {
            let el = elements(source, accessor)?;
            Ok(el
                .iter()
                .map(|b| {
                    [
                        f32::from(u16_at(b, 0)) / 65535.0,
                        f32::from(u16_at(b, 1)) / 65535.0,
                    ]
                })
                .collect())
        }
        _ => Err(LoadError::unsupported(format!(
            "{} (normalized: {normalized}) for texture coordinates",
            describe(accessor)
        ))),
    }
}

/// Scalar `u8`/`u16`/`u32` indices, each checked against `vertex_count`.
pub(crate) fn read_indices(
    source: &SourceDocument,
    accessor: &gltf::Accessor<'_>,
    vertex_count: usize,
) -> Result<IndexData, LoadError> {
    if accessor.dimensions() != Dimensions::Scalar {
        return Err(LoadError::unsupported(format!(
            "{} for indices",
            describe(accessor)
        )));
    }

    let data = match accessor.data_type() {
        DataType::U8 => {
            let el = elements(source, accessor)?;
            IndexData::U16(el.iter().map(|b| u16::from(b[0])).collect())
        }
        DataType::U16 => {
            let el = elements(source, accessor)?;
            IndexData::U16(el.iter().map(|b| u16_at(b, 0)).collect())
        }
        DataType::U32 => {
            let el = elements(source, accessor)?;
            IndexData::U32(
                el.iter()
                    .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                    .collect(),
            )
        }
        _ => {
            return Err(LoadError::unsupported(format!(
                "{} for indices",
                describe(accessor)
            )));
        }
    };

    if let Some((at, bad)) = data
        .iter()
        .enumerate()
        .find(|&(_, i)| i as usize >= vertex_count)
    {
        return Err(LoadError::malformed(format!(
            "index {bad} at position {at} of accessor {} is out of range for {vertex_count} vertices",
            accessor.index()
        )));
    }

    Ok(data)
}
