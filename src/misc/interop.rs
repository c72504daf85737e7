// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Interoperability conversions between the image and tensor types.

use image::{imageops, imageops::FilterType, RgbImage};
use std::path::Path;

use crate::core::error::{Error, Result};
use crate::core::tensor::{Shape, Tensor};
use crate::misc::type_aliases::Float;

/// Number of channels of an RGB image.
pub const RGB_CHANNELS: usize = 3;

/// Read RGB frames from image files.
pub fn read_frames<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<RgbImage>> {
    paths
        .iter()
        .map(|p| -> Result<RgbImage> { Ok(image::open(p)?.to_rgb()) })
        .collect()
}

/// Build a `[1, n - 1, height, width, 6]` tensor of stacked frame pairs
/// from `n` consecutive frames.
///
/// Time step `t` holds frame `t` in channels `0..3` and frame `t + 1` in channels `3..6`.
/// Frames are resized to `height x width` if needed,
/// and intensities are mapped from `[0, 255]` to `[0, 1]`.
pub fn stack_frames(frames: &[RgbImage], height: usize, width: usize) -> Result<Tensor> {
    if frames.len() < 2 {
        return Err(Error::NotEnoughFrames(frames.len()));
    }
    let floats: Vec<Vec<Float>> = frames
        .iter()
        .map(|f| rgb_floats(f, height, width))
        .collect();
    let shape = Shape::new(1, frames.len() - 1, height, width, 2 * RGB_CHANNELS);
    let mut data = Vec::with_capacity(shape.len());
    for pair in floats.windows(2) {
        let previous = pair[0].chunks(RGB_CHANNELS);
        let next = pair[1].chunks(RGB_CHANNELS);
        for (p, n) in previous.zip(next) {
            data.extend_from_slice(p);
            data.extend_from_slice(n);
        }
    }
    Tensor::from_vec(shape, data)
}

/// Row-major `[height, width, 3]` floats in `[0, 1]`,
/// resizing the image first if its size differs.
#[allow(clippy::cast_possible_truncation)]
fn rgb_floats(img: &RgbImage, height: usize, width: usize) -> Vec<Float> {
    let (w, h) = img.dimensions();
    let raw = if (w as usize, h as usize) == (width, height) {
        img.clone().into_raw()
    } else {
        imageops::resize(img, width as u32, height as u32, FilterType::Triangle).into_raw()
    };
    raw.into_iter().map(|v| Float::from(v) / 255.0).collect()
}

// TESTS #############################################################

#[cfg(test)]
mod tests {

    use super::*;

    /// Uniform image with the given color.
    fn uniform(width: u32, height: u32, rgb: [u8; 3]) -> RgbImage {
        let raw: Vec<u8> = (0..width * height).flat_map(|_| rgb.to_vec()).collect();
        RgbImage::from_raw(width, height, raw).unwrap()
    }

    #[test]
    fn pairs_are_stacked_on_channels() {
        let frames = vec![
            uniform(4, 2, [0, 0, 0]),
            uniform(4, 2, [255, 255, 255]),
            uniform(4, 2, [0, 255, 0]),
        ];
        let tensor = stack_frames(&frames, 2, 4).unwrap();
        assert_eq!(Shape::new(1, 2, 2, 4, 6), tensor.shape());
        let first: Vec<Float> = (0..6).map(|c| tensor.get([0, 0, 1, 3, c]).unwrap()).collect();
        assert_eq!(vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0], first);
        let second: Vec<Float> = (0..6).map(|c| tensor.get([0, 1, 0, 0, c]).unwrap()).collect();
        assert_eq!(vec![1.0, 1.0, 1.0, 0.0, 1.0, 0.0], second);
    }

    #[test]
    fn pixel_order_is_row_major() {
        // 2x1 image: left pixel red, right pixel blue.
        let left_right = RgbImage::from_raw(2, 1, vec![255, 0, 0, 0, 0, 255]).unwrap();
        let tensor = stack_frames(&[left_right.clone(), left_right], 1, 2).unwrap();
        assert_eq!(Some(1.0), tensor.get([0, 0, 0, 0, 0]));
        assert_eq!(Some(0.0), tensor.get([0, 0, 0, 0, 2]));
        assert_eq!(Some(1.0), tensor.get([0, 0, 0, 1, 2]));
        assert_eq!(Some(1.0), tensor.get([0, 0, 0, 1, 5]));
    }

    #[test]
    fn frames_are_resized() {
        let frames = vec![uniform(8, 6, [51, 51, 51]), uniform(4, 3, [51, 51, 51])];
        let tensor = stack_frames(&frames, 3, 4).unwrap();
        assert_eq!(Shape::new(1, 1, 3, 4, 6), tensor.shape());
        for &v in tensor.as_slice() {
            approx::assert_relative_eq!(0.2, v, epsilon = 1e-2);
        }
    }

    #[test]
    fn single_frame_is_rejected() {
        match stack_frames(&[uniform(2, 2, [0, 0, 0])], 2, 2) {
            Err(Error::NotEnoughFrames(1)) => (),
            other => panic!("unexpected {:?}", other),
        }
    }
}
