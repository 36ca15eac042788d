//! Programmatic glTF fixtures written to unique temp directories.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{Value, json};

const FLOAT: u32 = 5126;
const UNSIGNED_BYTE: u32 = 5121;
const UNSIGNED_SHORT: u32 = 5123;
const UNSIGNED_INT: u32 = 5125;

/// A directory under the system temp dir, removed on drop.
pub(super) struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new(tag: &str) -> Self {
        static NEXT: AtomicUsize = AtomicUsize::new(0);
        let n = NEXT.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "lumen-assets-{tag}-{}-{n}",
            std::process::id()
        ));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let p = self.path.join(name);
        std::fs::write(&p, bytes).unwrap();
        p
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

/// Accumulates a single binary blob plus the JSON that describes it.
#[derive(Default)]
pub(super) struct ModelBuilder {
    bin: Vec<u8>,
    views: Vec<Value>,
    accessors: Vec<Value>,
    meshes: Vec<Vec<Value>>,
    nodes: Vec<Value>,
    images: Vec<Value>,
    materials: Vec<Value>,
    extensions_required: Vec<String>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&mut self, bytes: &[u8], stride: Option<usize>) -> usize {
        while self.bin.len() % 4 != 0 {
            self.bin.push(0);
        }
        let mut v = json!({
            "buffer": 0,
            "byteOffset": self.bin.len(),
            "byteLength": bytes.len(),
        });
        if let Some(s) = stride {
            v["byteStride"] = json!(s);
        }
        self.bin.extend_from_slice(bytes);
        self.views.push(v);
        self.views.len() - 1
    }

    pub fn accessor(&mut self, view: usize, component: u32, count: usize, ty: &str) -> usize {
        self.accessors.push(json!({
            "bufferView": view,
            "componentType": component,
            "count": count,
            "type": ty,
        }));
        self.accessors.len() - 1
    }

    /// Patches an accessor field after the fact (offsets, bogus counts, ...).
    pub fn patch_accessor(&mut self, accessor: usize, key: &str, value: Value) {
        self.accessors[accessor][key] = value;
    }

    pub fn positions(&mut self, p: &[[f32; 3]]) -> usize {
        let view = self.view(bytemuck::cast_slice(p), None);
        let a = self.accessor(view, FLOAT, p.len(), "VEC3");
        let (mut lo, mut hi) = ([f32::MAX; 3], [f32::MIN; 3]);
        for v in p {
            for k in 0..3 {
                lo[k] = lo[k].min(v[k]);
                hi[k] = hi[k].max(v[k]);
            }
        }
        self.accessors[a]["min"] = json!(lo);
        self.accessors[a]["max"] = json!(hi);
        a
    }

    pub fn normals(&mut self, n: &[[f32; 3]]) -> usize {
        let view = self.view(bytemuck::cast_slice(n), None);
        self.accessor(view, FLOAT, n.len(), "VEC3")
    }

    pub fn tex_coords(&mut self, uv: &[[f32; 2]]) -> usize {
        let view = self.view(bytemuck::cast_slice(uv), None);
        self.accessor(view, FLOAT, uv.len(), "VEC2")
    }

    pub fn indices_u8(&mut self, i: &[u8]) -> usize {
        let view = self.view(i, None);
        self.accessor(view, UNSIGNED_BYTE, i.len(), "SCALAR")
    }

    pub fn indices_u16(&mut self, i: &[u16]) -> usize {
        let view = self.view(bytemuck::cast_slice(i), None);
        self.accessor(view, UNSIGNED_SHORT, i.len(), "SCALAR")
    }

    pub fn indices_u32(&mut self, i: &[u32]) -> usize {
        let view = self.view(bytemuck::cast_slice(i), None);
        self.accessor(view, UNSIGNED_INT, i.len(), "SCALAR")
    }

    pub fn mesh(&mut self) -> usize {
        self.meshes.push(Vec::new());
        self.meshes.len() - 1
    }

    /// Adds a primitive; `attributes` maps glTF semantic names to accessors.
    pub fn primitive(
        &mut self,
        mesh: usize,
        attributes: &[(&str, usize)],
        indices: Option<usize>,
        mode: u32,
        material: Option<usize>,
    ) {
        let attrs: serde_json::Map<String, Value> = attributes
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect();
        let mut p = json!({ "attributes": attrs, "mode": mode });
        if let Some(i) = indices {
            p["indices"] = json!(i);
        }
        if let Some(m) = material {
            p["material"] = json!(m);
        }
        self.meshes[mesh].push(p);
    }

    /// An image stored in the blob, wrapped in a texture and material.
    pub fn embedded_png_material(&mut self, png: &[u8]) -> usize {
        let view = self.view(png, None);
        self.images.push(json!({ "bufferView": view, "mimeType": "image/png" }));
        self.texture_material()
    }

    /// An image referenced by URI (relative path or `data:`).
    pub fn uri_image_material(&mut self, uri: &str) -> usize {
        self.images.push(json!({ "uri": uri }));
        self.texture_material()
    }

    fn texture_material(&mut self) -> usize {
        let image = self.images.len() - 1;
        self.materials.push(json!({
            "pbrMetallicRoughness": {
                "baseColorTexture": { "index": image }
            }
        }));
        self.materials.len() - 1
    }

    pub fn node(&mut self, mesh: usize, translation: [f32; 3]) -> usize {
        self.nodes.push(json!({ "mesh": mesh, "translation": translation }));
        self.nodes.len() - 1
    }

    pub fn require_extension(&mut self, name: &str) {
        self.extensions_required.push(name.to_string());
    }

    fn json(&self, buffer: Value) -> Value {
        let textures: Vec<Value> = (0..self.images.len())
            .map(|i| json!({ "source": i }))
            .collect();
        let meshes: Vec<Value> = self
            .meshes
            .iter()
            .map(|p| json!({ "primitives": p }))
            .collect();

        let mut root = json!({
            "asset": { "version": "2.0" },
            "buffers": [buffer],
            "bufferViews": self.views,
            "accessors": self.accessors,
            "meshes": meshes,
        });
        if !self.nodes.is_empty() {
            let roots: Vec<usize> = (0..self.nodes.len()).collect();
            root["nodes"] = json!(self.nodes);
            root["scenes"] = json!([{ "nodes": roots }]);
            root["scene"] = json!(0);
        }
        if !self.images.is_empty() {
            root["images"] = json!(self.images);
            root["textures"] = json!(textures);
            root["materials"] = json!(self.materials);
        }
        if !self.extensions_required.is_empty() {
            root["extensionsUsed"] = json!(self.extensions_required);
            root["extensionsRequired"] = json!(self.extensions_required);
        }
        root
    }

    /// Writes `<name>.gltf` plus an external `<name>.bin`.
    pub fn write_gltf(&self, dir: &TempDir, name: &str) -> PathBuf {
        let bin_name = format!("{name}.bin");
        dir.write(&bin_name, &self.bin);
        let doc = self.json(json!({ "uri": bin_name, "byteLength": self.bin.len() }));
        dir.write(&format!("{name}.gltf"), doc.to_string().as_bytes())
    }

    /// Writes a single `.gltf` with the buffer inlined as a `data:` URI.
    pub fn write_embedded(&self, dir: &TempDir, name: &str) -> PathBuf {
        let uri = format!(
            "data:application/octet-stream;base64,{}",
            base64_encode(&self.bin)
        );
        let doc = self.json(json!({ "uri": uri, "byteLength": self.bin.len() }));
        dir.write(&format!("{name}.gltf"), doc.to_string().as_bytes())
    }

    /// Writes a binary `.glb` container.
    pub fn write_glb(&self, dir: &TempDir, name: &str) -> PathBuf {
        let mut bin = self.bin.clone();
        while bin.len() % 4 != 0 {
            bin.push(0);
        }
        let mut json = self
            .json(json!({ "byteLength": bin.len() }))
            .to_string()
            .into_bytes();
        while json.len() % 4 != 0 {
            json.push(b' ');
        }

        let total = 12 + 8 + json.len() + 8 + bin.len();
        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(b"glTF");
        out.extend_from_slice(&2u32.to_le_bytes());
        out.extend_from_slice(&(total as u32).to_le_bytes());
        out.extend_from_slice(&(json.len() as u32).to_le_bytes());
        out.extend_from_slice(b"JSON");
        out.extend_from_slice(&json);
        out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        out.extend_from_slice(b"BIN\0");
        out.extend_from_slice(&bin);

        dir.write(&format!("{name}.glb"), &out)
    }
}

pub(super) const TRIANGLES: u32 = 4;
pub(super) const TRIANGLE_STRIP: u32 = 5;
pub(super) const TRIANGLE_FAN: u32 = 6;
pub(super) const LINES: u32 = 1;

pub(super) const TRI_POSITIONS: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];

/// One indexed triangle: 3 vertices, 3 `u16` indices, no normals, no texture.
pub(super) fn triangle() -> ModelBuilder {
    let mut b = ModelBuilder::new();
    let pos = b.positions(&TRI_POSITIONS);
    let idx = b.indices_u16(&[0, 1, 2]);
    let mesh = b.mesh();
    b.primitive(mesh, &[("POSITION", pos)], Some(idx), TRIANGLES, None);
    b
}

/// One mesh with `n` indexed triangles as separate primitives.
pub(super) fn triangles(n: usize) -> ModelBuilder {
    let mut b = ModelBuilder::new();
    let mesh = b.mesh();
    for _ in 0..n {
        let pos = b.positions(&TRI_POSITIONS);
        let idx = b.indices_u16(&[0, 1, 2]);
        b.primitive(mesh, &[("POSITION", pos)], Some(idx), TRIANGLES, None);
    }
    b
}

pub(super) fn png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn base64_encode(bytes: &[u8]) -> String {
    const TABLE: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    let mut out = String::new();
    for chunk in bytes.chunks(3) {
        let b = [chunk[0], *chunk.get(1).unwrap_or(&0), *chunk.get(2).unwrap_or(&0)];
        let n = (u32::from(b[0]) << 16) | (u32::from(b[1]) << 8) | u32::from(b[2]);
        out.push(TABLE[(n >> 18) as usize & 63] as char);
        out.push(TABLE[(n >> 12) as usize & 63] as char);
        out.push(if chunk.len() > 1 { TABLE[(n >> 6) as usize & 63] as char } else { '=' });
        out.push(if chunk.len() > 2 { TABLE[n as usize & 63] as char } else { '=' });
    }
    out
}
