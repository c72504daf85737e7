// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! 2D convolution layer with "same" padding.
//!
//! The convolution is computed frame by frame as a single matrix product:
//! input patches are laid out as the columns of a matrix (im2col),
//! and the kernels as the rows of the weight matrix.
//! Thanks to nalgebra column major storage, the product directly
//! has the `[height, width, channels]` row-major layout of the output frame.

use rand::Rng;

use crate::core::error::{Error, Result};
use crate::core::layer::{self, LayerSpec};
use crate::core::tensor::{Shape, Tensor};
use crate::math::{activation::Activation, init, padding};
use crate::misc::type_aliases::{DMat, DVec, Float};

/// A convolution layer followed by its activation.
#[derive(Clone, Debug)]
pub struct Conv2d {
    name: String,
    spec: LayerSpec,
    in_channels: usize,
    /// `spec.channels x (k * k * in_channels)`.
    /// Column `(ky * k + kx) * in_channels + c` is the weight of input channel `c`
    /// at kernel position `(ky, kx)`.
    weights: DMat,
    bias: DVec,
    activation: Activation,
}

impl Conv2d {
    /// Create a layer with He initialized kernels and constant biases.
    pub fn new<R: Rng>(
        name: &str,
        spec: LayerSpec,
        in_channels: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Result<Self> {
        layer::validate(&[spec])?;
        let weights = init::he_normal(
            spec.channels,
            patch_len(spec.kernel_size, in_channels),
            spec.kernel_size,
            rng,
        );
        Self::from_parts(
            name,
            spec,
            in_channels,
            weights,
            init::bias(spec.channels),
            activation,
        )
    }

    /// Create a layer with given parameters.
    /// See the `weights` field layout in the struct definition.
    pub fn from_parts(
        name: &str,
        spec: LayerSpec,
        in_channels: usize,
        weights: DMat,
        bias: DVec,
        activation: Activation,
    ) -> Result<Self> {
        layer::validate(&[spec])?;
        let expected = [spec.channels, patch_len(spec.kernel_size, in_channels)];
        if weights.shape() != (expected[0], expected[1]) {
            let (r, c) = weights.shape();
            return Err(Error::shape_mismatch("conv weights", &expected, &[r, c]));
        }
        if bias.len() != spec.channels {
            return Err(Error::shape_mismatch(
                "conv bias",
                &[spec.channels],
                &[bias.len()],
            ));
        }
        Ok(Conv2d {
            name: name.to_string(),
            spec,
            in_channels,
            weights,
            bias,
            activation,
        })
    }

    /// Name of the layer, used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kernel size, stride and output channels.
    pub fn spec(&self) -> LayerSpec {
        self.spec
    }

    /// Number of channels expected in the input.
    pub fn in_channels(&self) -> usize {
        self.in_channels
    }

    /// Kernel weights, one row per output channel.
    pub fn weights(&self) -> &DMat {
        &self.weights
    }

    /// One bias per output channel.
    pub fn bias(&self) -> &DVec {
        &self.bias
    }

    /// Activation applied after the convolution.
    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Shape of the output for a given input shape.
    pub fn output_shape(&self, input: Shape) -> Shape {
        Shape {
            height: padding::same_output_size(input.height, self.spec.stride),
            width: padding::same_output_size(input.width, self.spec.stride),
            channels: self.spec.channels,
            ..input
        }
    }

    /// Apply the layer to every frame of the input.
    pub fn forward(&self, input: &Tensor) -> Result<Tensor> {
        let in_shape = input.shape();
        if in_shape.channels != self.in_channels {
            return Err(Error::shape_mismatch(
                "conv input channels",
                &[self.in_channels],
                &[in_shape.channels],
            ));
        }
        let out_shape = self.output_shape(in_shape);
        let mut data = Vec::with_capacity(out_shape.len());
        for frame_idx in 0..in_shape.nb_frames() {
            self.forward_frame(input.frame(frame_idx), in_shape, &mut data);
        }
        Tensor::from_vec(out_shape, data)
    }

    /// Convolve one `[height, width, in_channels]` frame and append the result to `out`.
    fn forward_frame(&self, frame: &[Float], shape: Shape, out: &mut Vec<Float>) {
        let patches = im2col(frame, shape.height, shape.width, self.in_channels, self.spec);
        let mut result = &self.weights * patches;
        for pixel in result.as_mut_slice().chunks_mut(self.spec.channels) {
            for (value, b) in pixel.iter_mut().zip(self.bias.iter()) {
                *value += *b;
            }
        }
        self.activation.apply_slice(result.as_mut_slice());
        out.extend_from_slice(result.as_slice());
    }
}

/// Number of values in one input patch.
fn patch_len(kernel_size: usize, in_channels: usize) -> usize {
    kernel_size * kernel_size * in_channels
}

/// Lay out the zero padded input patches of a frame as matrix columns.
/// Column `oy * out_width + ox` holds the patch of output pixel `(oy, ox)`.
#[allow(clippy::cast_possible_wrap)]
#[allow(clippy::cast_sign_loss)]
fn im2col(frame: &[Float], height: usize, width: usize, channels: usize, spec: LayerSpec) -> DMat {
    let k = spec.kernel_size;
    let s = spec.stride;
    let out_h = padding::same_output_size(height, s);
    let out_w = padding::same_output_size(width, s);
    let (pad_top, _) = padding::same_padding(height, k, s);
    let (pad_left, _) = padding::same_padding(width, k, s);
    let nb_rows = patch_len(k, channels);
    let mut buffer = Vec::with_capacity(nb_rows * out_h * out_w);
    let zeros = vec![0.0; channels];
    for oy in 0..out_h {
        for ox in 0..out_w {
            for ky in 0..k {
                let y = (oy * s + ky) as isize - pad_top as isize;
                for kx in 0..k {
                    let x = (ox * s + kx) as isize - pad_left as isize;
                    if y < 0 || x < 0 || y as usize >= height || x as usize >= width {
                        buffer.extend_from_slice(&zeros);
                    } else {
                        let start = (y as usize * width + x as usize) * channels;
                        buffer.extend_from_slice(&frame[start..start + channels]);
                    }
                }
            }
        }
    }
    DMat::from_vec(nb_rows, out_h * out_w, buffer)
}

// TESTS #############################################################
