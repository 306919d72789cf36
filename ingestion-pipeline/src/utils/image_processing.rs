use std::io::Cursor;

use common::error::AppError;
use image::{ImageFormat, ImageReader};

/// Width and height of the encoded image in `bytes`, read from its header
/// without decoding pixel data.
pub fn read_dimensions(bytes: &[u8]) -> Result<(u32, u32), AppError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AppError::Decode(format!("Failed to sniff image format: {e}")))?;

    if reader.format().is_none() {
        return Err(AppError::Decode("Unrecognized image format".to_string()));
    }

    Ok(reader.into_dimensions()?)
}

/// Decode `bytes` in whatever format they are and encode the result as PNG.
pub fn reencode_as_png(bytes: &[u8]) -> Result<Vec<u8>, AppError> {
    let image = image::load_from_memory(bytes)?;

    let mut png = Cursor::new(Vec::new());
    image.write_to(&mut png, ImageFormat::Png)?;
    Ok(png.into_inner())
}
