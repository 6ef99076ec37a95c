//! Input image resolution and output encoding.
//!
//! Edits accept a base64 data URI, an HTTP(S) URL, or a local file path and
//! always emit PNG. Everything decodes to an owned RGB raster before the
//! pipeline touches it; decode failures are fatal for the edit that hit them.

use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::RgbImage;
use tracing::debug;

use crate::error::PancartaError;

/// Where an input image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// `data:<mime>;base64,<payload>`
    DataUri(String),
    /// `http://` or `https://`
    Url(String),
    /// Local file path.
    Path(PathBuf),
    /// Already-loaded encoded bytes.
    Bytes(Vec<u8>),
}

impl ImageSource {
    /// Classify a caller-supplied string.
    pub fn parse(input: &str) -> ImageSource {
        if input.starts_with("data:") {
            ImageSource::DataUri(input.to_string())
        } else if input.starts_with("http://") || input.starts_with("https://") {
            ImageSource::Url(input.to_string())
        } else {
            ImageSource::Path(PathBuf::from(input))
        }
    }

    /// Short description for logs and per-image batch reports.
    pub fn describe(&self) -> String {
        match self {
            ImageSource::DataUri(_) => "data URI".to_string(),
            ImageSource::Url(url) => url.clone(),
            ImageSource::Path(path) => path.display().to_string(),
            ImageSource::Bytes(bytes) => format!("{} bytes", bytes.len()),
        }
    }
}

/// Load and decode an image source into an RGB raster.
pub async fn load_image(
    source: &ImageSource,
    client: &reqwest::Client,
) -> Result<RgbImage, PancartaError> {
    let bytes = match source {
        ImageSource::DataUri(uri) => decode_data_uri(uri)?,
        ImageSource::Url(url) => fetch_bytes(url, client).await?,
        ImageSource::Path(path) => std::fs::read(path)
            .map_err(|e| PancartaError::Decode(format!("Failed to read {}: {}", path.display(), e)))?,
        ImageSource::Bytes(bytes) => bytes.clone(),
    };

    let image = image::load_from_memory(&bytes)
        .map_err(|e| PancartaError::Decode(format!("Failed to decode image: {}", e)))?;
    debug!(width = image.width(), height = image.height(), "decoded input image");
    Ok(image.to_rgb8())
}

/// Extract the payload bytes of a base64 data URI.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, PancartaError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| PancartaError::Decode("not a data URI".to_string()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| PancartaError::Decode("data URI has no payload".to_string()))?;
    if !meta.ends_with(";base64") {
        return Err(PancartaError::Decode(
            "only base64 data URIs are supported".to_string(),
        ));
    }
    BASE64
        .decode(payload.trim())
        .map_err(|e| PancartaError::Decode(format!("invalid base64 payload: {}", e)))
}

/// Download image bytes from a URL.
async fn fetch_bytes(url: &str, client: &reqwest::Client) -> Result<Vec<u8>, PancartaError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| PancartaError::Fetch(format!("Failed to download {}: {}", url, e)))?;
    if !response.status().is_success() {
        return Err(PancartaError::Fetch(format!(
            "Failed to download {}: HTTP {}",
            url,
            response.status()
        )));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| PancartaError::Fetch(format!("Failed to read image data: {}", e)))?;
    Ok(bytes.to_vec())
}

/// Encode an RGB raster as PNG bytes.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, PancartaError> {
    use image::ImageEncoder;

    let mut png_bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e: image::ImageError| PancartaError::Encode(e.to_string()))?;

    Ok(png_bytes)
}

/// Wrap PNG bytes in a data URI, the form the surrounding UI consumes.
pub fn png_data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", BASE64.encode(png))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_source_parse() {
        assert!(matches!(
            ImageSource::parse("data:image/png;base64,AAAA"),
            ImageSource::DataUri(_)
        ));
        assert!(matches!(
            ImageSource::parse("https://example.com/banner.png"),
            ImageSource::Url(_)
        ));
        assert!(matches!(
            ImageSource::parse("banners/summer.png"),
            ImageSource::Path(_)
        ));
    }

    #[test]
    fn test_png_round_trip_preserves_dimensions() {
        let image = RgbImage::from_pixel(123, 45, image::Rgb([9, 8, 7]));
        let png = encode_png(&image).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (123, 45));
        assert_eq!(decoded.get_pixel(0, 0), image.get_pixel(0, 0));
    }

    #[test]
    fn test_data_uri_round_trip() {
        let image = RgbImage::from_pixel(8, 8, image::Rgb([200, 100, 0]));
        let png = encode_png(&image).unwrap();
        let uri = png_data_uri(&png);
        assert!(uri.starts_with("data:image/png;base64,"));
        assert_eq!(decode_data_uri(&uri).unwrap(), png);
    }

    #[test]
    fn test_bad_data_uris_rejected() {
        assert!(decode_data_uri("nope").is_err());
        assert!(decode_data_uri("data:image/png;base64").is_err());
        assert!(decode_data_uri("data:image/png,plain").is_err());
        assert!(decode_data_uri("data:image/png;base64,!!!").is_err());
    }

    #[tokio::test]
    async fn test_undecodable_bytes_are_a_decode_error() {
        let client = reqwest::Client::new();
        let source = ImageSource::Bytes(vec![0u8; 16]);
        let err = load_image(&source, &client).await.unwrap_err();
        assert!(matches!(err, PancartaError::Decode(_)));
    }
}
