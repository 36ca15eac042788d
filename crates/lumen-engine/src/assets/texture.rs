use super::LoadError;
use super::document::{SourceDocument, read_uri};

/// Tightly packed RGBA8 pixels.
#[derive(Debug)]
pub(crate) struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba8: Vec<u8>,
}

/// Decodes each document image at most once per load.
pub(crate) struct ImageCache<'s> {
    source: &'s SourceDocument,
    decoded: Vec<Option<DecodedImage>>,
}

impl<'s> ImageCache<'s> {
    pub fn new(source: &'s SourceDocument) -> Self {
        let count = source.document.images().len();
        Self {
            source,
            decoded: (0..count).map(|_| None).collect(),
        }
    }

    pub fn get(&mut self, index: usize) -> Result<&DecodedImage, LoadError> {
        let slot = self
            .decoded
            .get_mut(index)
            .ok_or_else(|| LoadError::malformed(format!("image {index} does not exist")))?;

        if slot.is_none() {
            let image = self
                .source
                .document
                .images()
                .nth(index)
                .ok_or_else(|| LoadError::malformed(format!("image {index} does not exist")))?;
            *slot = Some(decode(self.source, &image)?);
        }

        slot.as_ref()
            .ok_or_else(|| LoadError::malformed(format!("image {index} failed to decode")))
    }
}

fn decode(source: &SourceDocument, image: &gltf::Image<'_>) -> Result<DecodedImage, LoadError> {
    let bytes = match image.source() {
        gltf::image::Source::View { view, .. } => source.view_bytes(&view)?.to_vec(),
        gltf::image::Source::Uri { uri, .. } => read_uri(uri, &source.base_dir)?,
    };
    decode_bytes(&bytes).map_err(|e| match e {
        LoadError::MalformedDocument(msg) => {
            LoadError::malformed(format!("image {}: {msg}", image.index()))
        }
        LoadError::UnsupportedFeature(msg) => {
            LoadError::unsupported(format!("image {}: {msg}", image.index()))
        }
        other => other,
    })
}

pub(crate) fn decode_bytes(bytes: &[u8]) -> Result<DecodedImage, LoadError> {
    let img = image::load_from_memory(bytes).map_err(|e| match e {
        image::ImageError::Unsupported(u) => LoadError::unsupported(u.to_string()),
        other => LoadError::malformed(other.to_string()),
    })?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    log::trace!("decoded {width}x{height} image");

    Ok(DecodedImage {
        width,
        height,
        rgba8: rgba.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_2x1() -> Vec<u8> {
        let img = image::RgbaImage::from_raw(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255]).unwrap();
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decodes_png_to_rgba8() {
        let img = decode_bytes(&png_2x1()).unwrap();
        assert_eq!((img.width, img.height), (2, 1));
        assert_eq!(img.rgba8, vec![255, 0, 0, 255, 0, 0, 255, 255]);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(decode_bytes(b"definitely not an image").is_err());
    }
}
