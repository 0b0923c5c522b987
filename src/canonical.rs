//! Image canonicalisation (§4.1): centred square crop, luminance, circular mask.

use image::{imageops, DynamicImage};

use crate::error::LoomError;

/// Checks the raw source image shape against `spec.md` §4.1's advisory
/// limits. These are independent of [`crate::params::validate`]: they
/// describe the *source photo*, not the target canonicalised buffer.
pub fn check_source_shape(width: u32, height: u32) -> Result<(), LoomError> {
    let min_edge = width.min(height);
    let max_edge = width.max(height);
    if min_edge < 100 {
        return Err(LoomError::InputTooSmall { min_edge });
    }
    if max_edge > 4000 {
        return Err(LoomError::InputTooLarge { max_edge });
    }
    let ratio = f64::from(width) / f64::from(height);
    if !(1.0 / 3.0..=3.0).contains(&ratio) {
        return Err(LoomError::InputAspectExtreme { ratio });
    }
    Ok(())
}

/// Produces the canonicalised luminance buffer `I` and its parallel 0/1
/// circular-mask buffer, both of length `img_size * img_size`.
///
/// `image` is consumed (not borrowed) because [`image::imageops::crop`]
/// needs a mutable view of the source to avoid an extra full-image copy,
/// mirroring the teacher's own `preprocess(mut img: DynamicImage, ..)`.
pub fn canonicalise(
    mut image: DynamicImage,
    img_size: u32,
) -> Result<(Vec<u8>, Vec<u8>), LoomError> {
    let (width, height) = image.dimensions();
    check_source_shape(width, height)?;

    let min_edge = width.min(height);
    let left = (width - min_edge) / 2;
    let top = (height - min_edge) / 2;
    let cropped = imageops::crop(&mut image, left, top, min_edge, min_edge).to_image();
    let resized = imageops::resize(&cropped, img_size, img_size, imageops::FilterType::Triangle);

    let len = (img_size as usize) * (img_size as usize);
    let mut luminance = vec![0u8; len];
    for (idx, pixel) in resized.pixels().enumerate() {
        let [r, g, b, _a] = pixel.0;
        let y = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
        luminance[idx] = y.floor().clamp(0.0, 255.0) as u8;
    }

    let mut mask = vec![0u8; len];
    let centre = f64::from(img_size) / 2.0;
    let radius_sq = centre * centre;
    for y in 0..img_size {
        for x in 0..img_size {
            let idx = (y * img_size + x) as usize;
            let dx = f64::from(x) - centre;
            let dy = f64::from(y) - centre;
            if dx * dx + dy * dy <= radius_sq {
                mask[idx] = 1;
            } else {
                luminance[idx] = 0;
            }
        }
    }

    log::debug!(
        "canonicalised {width}x{height} source into {img_size}x{img_size} luminance buffer"
    );

    Ok((luminance, mask))
}
