use std::collections::{BTreeSet, HashSet};

use image::RgbaImage;

use super::{BrushPalette, DecodeError};

/// Decode PNG/JPEG bytes into an 8-bit RGBA raster.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, DecodeError> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// Names of the brush colors painted anywhere on the image.
///
/// Only pixels with a non-zero alpha count. Colors outside the palette, such as
/// anti-aliased stroke edges, are dropped.
pub fn extract_colors(image: &RgbaImage) -> BTreeSet<&'static str> {
    let painted: HashSet<[u8; 3]> = image
        .pixels()
        .filter(|p| p.0[3] > 0)
        .map(|p| [p.0[0], p.0[1], p.0[2]])
        .collect();

    painted
        .into_iter()
        .filter_map(|[r, g, b]| BrushPalette::name_for(&format!("#{:02x}{:02x}{:02x}", r, g, b)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn transparent_image_has_no_colors() {
        let image = RgbaImage::from_pixel(8, 8, Rgba([0x00, 0x57, 0xe7, 0]));
        assert!(extract_colors(&image).is_empty());
    }

    #[test]
    fn partially_opaque_pixels_count() {
        let mut image = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0]));
        image.put_pixel(1, 1, Rgba([0xf4, 0x43, 0x36, 1]));
        image.put_pixel(2, 2, Rgba([0x0, 0x57, 0xe7, 255]));

        let colors: Vec<_> = extract_colors(&image).into_iter().collect();
        assert_eq!(colors, vec!["blue", "red"]);
    }

    #[test]
    fn off_palette_colors_are_dropped() {
        let mut image = RgbaImage::from_pixel(4, 4, Rgba([0x12, 0x34, 0x56, 255]));
        image.put_pixel(0, 0, Rgba([0x80, 0xab, 0xf3, 128]));
        image.put_pixel(3, 3, Rgba([0xff, 0xff, 0xff, 255]));

        let colors = extract_colors(&image);
        assert_eq!(colors.into_iter().collect::<Vec<_>>(), vec!["white"]);
    }

    #[test]
    fn extracted_names_belong_to_palette() {
        let mut image = RgbaImage::new(10, 1);
        for (x, color) in BrushPalette::entries().iter().enumerate() {
            let rgb = u32::from_str_radix(&color.hex[1..], 16).unwrap();
            let [_, r, g, b] = rgb.to_be_bytes();
            image.put_pixel(x as u32, 0, Rgba([r, g, b, 255]));
        }

        let colors = extract_colors(&image);
        let names: BTreeSet<_> = BrushPalette::entries().iter().map(|c| c.name).collect();
        assert_eq!(colors, names);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let result = decode_image(b"definitely not a png");
        assert!(matches!(result, Err(DecodeError::Image(_))));
    }
}
