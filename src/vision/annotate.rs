//! Annotated inspection artifact
//!
//! Draws recognized regions onto the captured frame and writes the
//! result as an image for operator review. Best-effort output: a failure
//! here never fails the analysis that produced the hits.

use anyhow::Result;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::path::Path;

use super::RecognitionHit;
use crate::capture::frame::Frame;

const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Render the frame with a box around each hit and save it to `path`.
/// The output format follows the path's extension.
pub fn write_annotated(frame: &Frame, hits: &[RecognitionHit], path: &Path) -> Result<()> {
    let mut canvas = to_rgb_image(frame);
    for hit in hits {
        let (x, y, w, h) = hit.bounds();
        if w == 0 || h == 0 {
            continue;
        }
        let rect = Rect::at(x as i32, y as i32).of_size(w, h);
        draw_hollow_rect_mut(&mut canvas, rect, BOX_COLOR);
    }
    canvas.save(path)?;
    Ok(())
}

fn to_rgb_image(frame: &Frame) -> RgbImage {
    let channels = frame.channels as usize;
    let mut img = RgbImage::new(frame.width, frame.height);
    for (i, px) in img.pixels_mut().enumerate() {
        let base = i * channels;
        let sample = |offset: usize| frame.data.get(base + offset).copied().unwrap_or(0);
        *px = if channels == 1 {
            let v = sample(0);
            Rgb([v, v, v])
        } else {
            // BGR(A) source order.
            Rgb([sample(2), sample(1), sample(0)])
        };
    }
    img
}
