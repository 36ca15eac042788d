//! Reading a `.gltf`/`.glb` file into a parsed document plus resolved buffers.

use std::path::{Path, PathBuf};

use super::LoadError;

/// Required extensions this loader knows how to honor.
const SUPPORTED_REQUIRED_EXTENSIONS: &[&str] = &[];

/// A parsed document with every buffer's bytes in memory.
pub(crate) struct SourceDocument {
    pub document: gltf::Document,
    pub buffers: Vec<Vec<u8>>,
    /// Directory relative URIs resolve against.
    pub base_dir: PathBuf,
}

impl SourceDocument {
    pub fn read(path: &Path) -> Result<Self, LoadError> {
        let bytes = std::fs::read(path).map_err(|e| LoadError::io(path, e))?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::from_bytes(&bytes, base_dir)
    }

    pub fn from_bytes(bytes: &[u8], base_dir: PathBuf) -> Result<Self, LoadError> {
        let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes)?;

        for ext in document.extensions_required() {
            if !SUPPORTED_REQUIRED_EXTENSIONS.contains(&ext) {
                return Err(LoadError::unsupported(format!("required extension '{ext}'")));
            }
        }

        validate_sections(&document)?;
        let buffers = resolve_buffers(&document, blob, &base_dir)?;

        Ok(Self {
            document,
            buffers,
            base_dir,
        })
    }

    /// Bytes of a buffer view, bounds-checked against its buffer.
    pub fn view_bytes(&self, view: &gltf::buffer::View<'_>) -> Result<&[u8], LoadError> {
        let buffer = self.buffers.get(view.buffer().index()).ok_or_else(|| {
            LoadError::malformed(format!(
                "buffer view {} references missing buffer {}",
                view.index(),
                view.buffer().index()
            ))
        })?;

        let start = view.offset();
        let end = start.checked_add(view.length()).unwrap_or(usize::MAX);
        buffer.get(start..end).ok_or_else(|| {
            LoadError::malformed(format!(
                "buffer view {} spans {start}..{end} but buffer {} has {} bytes",
                view.index(),
                view.buffer().index(),
                buffer.len()
            ))
        })
    }
}

fn validate_sections(document: &gltf::Document) -> Result<(), LoadError> {
    if document.buffers().len() == 0 {
        return Err(LoadError::malformed("document has no buffers"));
    }
    if document.views().len() == 0 {
        return Err(LoadError::malformed("document has no buffer views"));
    }
    if document.accessors().len() == 0 {
        return Err(LoadError::malformed("document has no accessors"));
    }
    if document.meshes().len() == 0 {
        return Err(LoadError::malformed("document has no meshes"));
    }
    for mesh in document.meshes() {
        if mesh.primitives().len() == 0 {
            return Err(LoadError::malformed(format!(
                "mesh {} has no primitives",
                mesh.index()
            )));
        }
    }
    Ok(())
}

/// Loads every buffer: the GLB blob, `data:` URIs, or files next to the model.
fn resolve_buffers(
    document: &gltf::Document,
    mut blob: Option<Vec<u8>>,
    base_dir: &Path,
) -> Result<Vec<Vec<u8>>, LoadError> {
    let mut buffers = Vec::with_capacity(document.buffers().len());

    for buffer in document.buffers() {
        let data = match buffer.source() {
            gltf::buffer::Source::Bin => blob.take().ok_or_else(|| {
                LoadError::malformed(format!(
                    "buffer {} refers to the GLB binary chunk, which is missing",
                    buffer.index()
                ))
            })?,
            gltf::buffer::Source::Uri(uri) => read_uri(uri, base_dir)?,
        };

        if data.len() < buffer.length() {
            return Err(LoadError::malformed(format!(
                "buffer {} declares {} bytes but only {} are present",
                buffer.index(),
                buffer.length(),
                data.len()
            )));
        }
        buffers.push(data);
    }

    Ok(buffers)
}

/// Resolves a buffer or image URI to bytes.
pub(crate) fn read_uri(uri: &str, base_dir: &Path) -> Result<Vec<u8>, LoadError> {
    if uri.starts_with("data:") {
        return parse_data_uri(uri)
            .ok_or_else(|| LoadError::malformed("data URI is not valid base64"));
    }
    if uri.contains("://") {
        return Err(LoadError::unsupported(format!("URI scheme in '{uri}'")));
    }

    let path = base_dir.join(percent_decode(uri));
    std::fs::read(&path).map_err(|e| LoadError::io(path, e))
}

/// Decodes `data:[<mime>];base64,<payload>`.
fn parse_data_uri(uri: &str) -> Option<Vec<u8>> {
    let rest = uri.strip_prefix("data:")?;
    let (_, payload) = rest.split_once(";base64,")?;
    base64_decode(payload)
}

fn base64_decode(input: &str) -> Option<Vec<u8>> {
    fn sextet(c: u8) -> Option<u8> {
        match c {
            b'A'..=b'Z' => Some(c - b'A'),
            b'a'..=b'z' => Some(c - b'a' + 26),
            b'0'..=b'9' => Some(c - b'0' + 52),
            b'+' => Some(62),
            b'/' => Some(63),
            _ => None,
        }
    }

    let input: Vec<u8> = input.bytes().filter(|b| !b.is_ascii_whitespace()).collect();

    // Padding may only close the final chunk, and then the chunk must be whole.
    let pad = input.iter().rev().take(2).take_while(|&&c| c == b'=').count();
    if pad > 0 && input.len() % 4 != 0 {
        return None;
    }
    let body = &input[..input.len() - pad];
    if body.contains(&b'=') {
        return None;
    }

    let mut out = Vec::with_capacity(body.len() / 4 * 3 + 2);
    for chunk in body.chunks(4) {
        if chunk.len() < 2 {
            return None;
        }
        let mut buf = [0u8; 4];
        for (i, &c) in chunk.iter().enumerate() {
            buf[i] = sextet(c)?;
        }

        out.push((buf[0] << 2) | (buf[1] >> 4));
        if chunk.len() > 2 {
            out.push((buf[1] << 4) | (buf[2] >> 2));
        }
        if chunk.len() > 3 {
            out.push((buf[2] << 6) | buf[3]);
        }
    }

    Some(out)
}

/// Minimal `%XX` decoding for relative file URIs.
fn percent_decode(uri: &str) -> String {
    let bytes = uri.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(b) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
