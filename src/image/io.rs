//! Loading images and rendering flow overlays via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::flow::FlowField;
use crate::image::{ImageView, OwnedImage};
use crate::util::{FlowError, FlowResult};
use image::{GrayImage, Rgb, RgbImage};
use std::path::Path;

const VECTOR_COLOR: Rgb<u8> = Rgb([255, 40, 40]);
const ORIGIN_COLOR: Rgb<u8> = Rgb([255, 220, 0]);

/// Creates a borrowed view from a grayscale image buffer.
pub fn view_from_gray_image(img: &GrayImage) -> FlowResult<ImageView<'_, u8>> {
    ImageView::from_slice(img.as_raw(), img.width() as usize, img.height() as usize)
}

/// Creates an owned `f32` image from a grayscale image buffer.
pub fn owned_from_gray_image(img: &GrayImage) -> FlowResult<OwnedImage> {
    OwnedImage::from_view(view_from_gray_image(img)?)
}

/// Loads an image from disk and converts it to a grayscale `f32` image.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> FlowResult<OwnedImage> {
    let img = image::open(path).map_err(|err| FlowError::ImageIo {
        reason: err.to_string(),
    })?;
    owned_from_gray_image(&img.to_luma8())
}

/// Draws the flow field on top of `background` (normally image 1).
///
/// The background is stretched to the full 8-bit range. Every `step`-th pixel
/// along both axes with a non-zero vector gets a segment from the pixel to
/// `pixel + scale * (vx, vy)`.
pub fn render_flow_overlay(
    background: ImageView<'_, f32>,
    field: &FlowField,
    step: usize,
    scale: f32,
) -> FlowResult<RgbImage> {
    let (width, height) = background.shape();
    if (width, height) != (field.width(), field.height()) {
        return Err(FlowError::DimensionMismatch {
            width1: width,
            height1: height,
            width2: field.width(),
            height2: field.height(),
        });
    }
    if step == 0 || !scale.is_finite() {
        return Err(FlowError::InvalidConfig(
            "overlay step must be > 0 and scale finite",
        ));
    }

    let (lo, hi) = background
        .rows()
        .flatten()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = (hi - lo).max(f32::EPSILON);

    let mut out = RgbImage::new(width as u32, height as u32);
    for (y, row) in background.rows().enumerate() {
        for (x, &v) in row.iter().enumerate() {
            let g = (255.0 * (v - lo) / range).round().clamp(0.0, 255.0) as u8;
            out.put_pixel(x as u32, y as u32, Rgb([g, g, g]));
        }
    }

    for y in (0..height).step_by(step) {
        for x in (0..width).step_by(step) {
            let Some((vx, vy, _)) = field.at(x, y) else {
                continue;
            };
            if vx == 0.0 && vy == 0.0 {
                continue;
            }
            let (x0, y0) = (x as f32, y as f32);
            draw_segment(&mut out, x0, y0, x0 + scale * vx, y0 + scale * vy);
            out.put_pixel(x as u32, y as u32, ORIGIN_COLOR);
        }
    }
    Ok(out)
}

fn draw_segment(img: &mut RgbImage, x0: f32, y0: f32, x1: f32, y1: f32) {
    let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0) as usize;
    let (w, h) = (img.width() as f32, img.height() as f32);
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let x = (x0 + t * (x1 - x0)).round();
        let y = (y0 + t * (y1 - y0)).round();
        if x >= 0.0 && y >= 0.0 && x < w && y < h {
            img.put_pixel(x as u32, y as u32, VECTOR_COLOR);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        load_gray_image, owned_from_gray_image, render_flow_overlay, ORIGIN_COLOR, VECTOR_COLOR,
    };
    use crate::flow::FlowField;
    use crate::image::OwnedImage;
    use crate::util::FlowError;
    use image::{GrayImage, Rgb};

    fn ramp(width: usize, height: usize) -> OwnedImage {
        let data = (0..width * height).map(|v| v as f32).collect();
        OwnedImage::new(data, width, height).unwrap()
    }

    fn field_with(
        width: usize,
        height: usize,
        vectors: &[(usize, usize, f32, f32)],
    ) -> FlowField {
        let mut vx = OwnedImage::zeros(width, height).unwrap();
        let mut vy = OwnedImage::zeros(width, height).unwrap();
        for &(x, y, dx, dy) in vectors {
            vx.data_mut()[y * width + x] = dx;
            vy.data_mut()[y * width + x] = dy;
        }
        FlowField {
            vx,
            vy,
            reliability: OwnedImage::zeros(width, height).unwrap(),
        }
    }

    #[test]
    fn background_is_stretched_to_full_range() {
        let background = ramp(5, 5);
        let field = field_with(5, 5, &[]);
        let overlay = render_flow_overlay(background.view(), &field, 1, 1.0).unwrap();
        assert_eq!(overlay.dimensions(), (5, 5));
        assert_eq!(*overlay.get_pixel(0, 0), Rgb([0, 0, 0]));
        assert_eq!(*overlay.get_pixel(4, 4), Rgb([255, 255, 255]));
        let mid = overlay.get_pixel(2, 2);
        assert_eq!(mid[0], mid[1]);
        assert_eq!(mid[1], mid[2]);
    }

    #[test]
    fn vector_draws_origin_and_segment() {
        let background = ramp(6, 5);
        let field = field_with(6, 5, &[(1, 1, 3.0, 0.0)]);
        let overlay = render_flow_overlay(background.view(), &field, 1, 1.0).unwrap();
        assert_eq!(*overlay.get_pixel(1, 1), ORIGIN_COLOR);
        assert_eq!(*overlay.get_pixel(3, 1), VECTOR_COLOR);
        assert_eq!(*overlay.get_pixel(4, 1), VECTOR_COLOR);
        // Zero vectors elsewhere leave the gray background untouched.
        let untouched = overlay.get_pixel(2, 3);
        assert_eq!(untouched[0], untouched[2]);
    }

    #[test]
    fn scale_stretches_the_segment() {
        let background = ramp(8, 4);
        let field = field_with(8, 4, &[(0, 2, 2.0, 0.0)]);
        let overlay = render_flow_overlay(background.view(), &field, 1, 3.0).unwrap();
        assert_eq!(*overlay.get_pixel(6, 2), VECTOR_COLOR);
    }

    #[test]
    fn step_skips_unsampled_pixels() {
        let background = ramp(6, 6);
        let field = field_with(6, 6, &[(1, 1, 2.0, 2.0)]);
        let overlay = render_flow_overlay(background.view(), &field, 2, 1.0).unwrap();
        assert_ne!(*overlay.get_pixel(1, 1), ORIGIN_COLOR);
        assert_ne!(*overlay.get_pixel(3, 3), VECTOR_COLOR);
    }

    #[test]
    fn segments_leaving_the_image_are_clipped() {
        let background = ramp(4, 4);
        let field = field_with(4, 4, &[(3, 3, 100.0, -250.0), (0, 0, -5.0, -5.0)]);
        let overlay = render_flow_overlay(background.view(), &field, 1, 1.0).unwrap();
        assert_eq!(*overlay.get_pixel(3, 3), ORIGIN_COLOR);
        assert_eq!(*overlay.get_pixel(0, 0), ORIGIN_COLOR);
    }

    #[test]
    fn rejects_field_of_other_shape() {
        let background = ramp(4, 3);
        let err = render_flow_overlay(background.view(), &field_with(3, 4, &[]), 1, 1.0)
            .unwrap_err();
        assert_eq!(
            err,
            FlowError::DimensionMismatch {
                width1: 4,
                height1: 3,
                width2: 3,
                height2: 4,
            }
        );
    }

    #[test]
    fn rejects_zero_step_and_non_finite_scale() {
        let background = ramp(4, 4);
        let field = field_with(4, 4, &[]);
        for (step, scale) in [(0, 1.0), (1, f32::NAN), (1, f32::INFINITY)] {
            assert!(matches!(
                render_flow_overlay(background.view(), &field, step, scale),
                Err(FlowError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn gray_image_converts_to_f32_grid() {
        let gray = GrayImage::from_raw(2, 2, vec![0, 10, 200, 255]).unwrap();
        let owned = owned_from_gray_image(&gray).unwrap();
        assert_eq!(owned.shape(), (2, 2));
        assert_eq!(owned.data(), &[0.0, 10.0, 200.0, 255.0]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_gray_image("does/not/exist.png").unwrap_err();
        assert!(matches!(err, FlowError::ImageIo { .. }));
    }
}
