// src/qr.rs
use image::{ImageBuffer, Luma};
use qrcode::{EcLevel, QrCode};

// Pixels per module and quiet-zone width in modules.
const MODULE_PX: usize = 10;
const BORDER: usize = 4;

#[derive(Debug, Clone)]
pub struct QrRenderer;

impl QrRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render a payload into grayscale PNG bytes
    pub fn render_png(&self, payload: &str) -> anyhow::Result<Vec<u8>> {
        let code = QrCode::with_error_correction_level(payload, EcLevel::M)?;

        let width = code.width();
        let img_size = (width + 2 * BORDER) * MODULE_PX;

        let mut img: ImageBuffer<Luma<u8>, Vec<u8>> =
            ImageBuffer::new(img_size as u32, img_size as u32);

        // White background
        for pixel in img.pixels_mut() {
            *pixel = Luma([255]);
        }

        // Draw the dark modules
        for y in 0..width {
            for x in 0..width {
                if code[(x, y)] == qrcode::Color::Dark {
                    for dy in 0..MODULE_PX {
                        for dx in 0..MODULE_PX {
                            let px = (BORDER + x) * MODULE_PX + dx;
                            let py = (BORDER + y) * MODULE_PX + dy;
                            if px < img_size && py < img_size {
                                img.put_pixel(px as u32, py as u32, Luma([0]));
                            }
                        }
                    }
                }
            }
        }

        // Encode as PNG
        let mut png_bytes = Vec::new();
        {
            use image::codecs::png::PngEncoder;
            use image::ImageEncoder;

            let encoder = PngEncoder::new(&mut png_bytes);
            encoder.write_image(
                img.as_raw(),
                img_size as u32,
                img_size as u32,
                image::ColorType::L8,
            )?;
        }

        Ok(png_bytes)
    }
}
