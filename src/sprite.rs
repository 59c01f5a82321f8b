use image::{ImageError, RgbaImage};
use std::path::Path;

/// Channel floor above which a pixel counts as background white.
const WHITE_CUTOFF: u8 = 240;

/// The optional body bitmap. Loaded once at startup; the game runs fine
/// without it.
pub struct Sprite {
    img: RgbaImage,
}

impl Sprite {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let mut img = image::open(path)?.to_rgba8();
        knock_out_background(&mut img);
        Ok(Sprite { img })
    }

    /// Nearest-neighbour sample at normalized (u, v) in [0, 1).
    /// Transparent pixels come back as None.
    pub fn sample(&self, u: f64, v: f64) -> Option<[u8; 3]> {
        let x = ((u * self.img.width() as f64) as u32).min(self.img.width() - 1);
        let y = ((v * self.img.height() as f64) as u32).min(self.img.height() - 1);
        let p = self.img.get_pixel(x, y).0;
        if p[3] < 128 {
            return None;
        }
        Some([p[0], p[1], p[2]])
    }
}

/// The original art sits on a plain white sheet; treat near-white as
/// transparent so only the drawing itself gets blitted.
fn knock_out_background(img: &mut RgbaImage) {
    for p in img.pixels_mut() {
        let [r, g, b, _] = p.0;
        if r > WHITE_CUTOFF && g > WHITE_CUTOFF && b > WHITE_CUTOFF {
            p.0[3] = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn near_white_becomes_transparent_others_survive() {
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(0, 0, image::Rgba([255, 255, 255, 255]));
        img.put_pixel(1, 0, image::Rgba([241, 241, 241, 255]));
        img.put_pixel(0, 1, image::Rgba([240, 241, 241, 255])); // one channel at the cutoff
        img.put_pixel(1, 1, image::Rgba([200, 30, 30, 255]));
        knock_out_background(&mut img);

        assert_eq!(img.get_pixel(0, 0).0[3], 0);
        assert_eq!(img.get_pixel(1, 0).0[3], 0);
        assert_eq!(img.get_pixel(0, 1).0[3], 255, "all channels must exceed the cutoff");
        assert_eq!(img.get_pixel(1, 1).0[3], 255);
    }

    #[test]
    fn sampling_skips_transparent_pixels() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgba([255, 255, 255, 255]));
        img.put_pixel(1, 0, image::Rgba([10, 20, 30, 255]));
        knock_out_background(&mut img);
        let sp = Sprite { img };

        assert_eq!(sp.sample(0.0, 0.0), None);
        assert_eq!(sp.sample(0.9, 0.0), Some([10, 20, 30]));
    }
}
