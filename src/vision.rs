use std::error::Error;
use std::fs;
use std::io::{self, Cursor};
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ImageOutputFormat;

/// Reads the whole file at `path` and returns it as standard Base64.
pub fn encode_image(path: impl AsRef<Path>) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(STANDARD.encode(bytes))
}

/// Normalizes arbitrary image bytes to PNG and returns Base64 payload.
pub fn encode_image_as_png(bytes: &[u8]) -> Result<String, Box<dyn Error>> {
    let image = image::load_from_memory(bytes)?;
    let mut buffer = Vec::new();
    image.write_to(&mut Cursor::new(&mut buffer), ImageOutputFormat::Png)?;
    Ok(STANDARD.encode(&buffer))
}

/// Builds a `data:` URL for the image at `path`, suitable for an
/// `image_url` message part.
pub fn image_data_url(path: impl AsRef<Path>) -> io::Result<String> {
    let path = path.as_ref();
    let encoded = encode_image(path)?;
    Ok(format!("data:{};base64,{encoded}", mime_for(path)))
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "image/png",
    }
}
