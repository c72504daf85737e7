// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Rank 5 tensor of `[batch, sequence, height, width, channels]` floats.
//!
//! Data is stored row-major, channels being the fastest varying axis.
//! A "frame" is one `[height, width, channels]` slab, at a given batch and sequence index.

use crate::core::error::{Error, Result};
use crate::misc::type_aliases::Float;

/// Shape of a `Tensor`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Shape {
    /// Number of sequences in the batch.
    pub batch: usize,
    /// Number of time steps per sequence.
    pub sequence: usize,
    /// Height of each frame.
    pub height: usize,
    /// Width of each frame.
    pub width: usize,
    /// Number of channels of each pixel.
    pub channels: usize,
}

impl Shape {
    /// Create a shape from its five dimensions.
    pub fn new(batch: usize, sequence: usize, height: usize, width: usize, channels: usize) -> Self {
        Shape {
            batch,
            sequence,
            height,
            width,
            channels,
        }
    }

    /// Number of frames, i.e. `batch * sequence`.
    pub fn nb_frames(&self) -> usize {
        self.batch * self.sequence
    }

    /// Number of values in one frame.
    pub fn frame_len(&self) -> usize {
        self.height * self.width * self.channels
    }

    /// Total number of values.
    pub fn len(&self) -> usize {
        self.nb_frames() * self.frame_len()
    }

    /// True if any dimension is 0.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The five dimensions, in order.
    pub fn dims(&self) -> [usize; 5] {
        [
            self.batch,
            self.sequence,
            self.height,
            self.width,
            self.channels,
        ]
    }
}

/// Dense rank 5 tensor.
#[derive(Clone, PartialEq, Debug)]
pub struct Tensor {
    shape: Shape,
    data: Vec<Float>,
}

impl Tensor {
    /// Tensor filled with zeros.
    pub fn zeros(shape: Shape) -> Self {
        Tensor {
            shape,
            data: vec![0.0; shape.len()],
        }
    }

    /// Wrap a row-major buffer.
    /// Fails if the buffer length does not match the shape.
    pub fn from_vec(shape: Shape, data: Vec<Float>) -> Result<Self> {
        if data.len() != shape.len() {
            return Err(Error::shape_mismatch(
                "tensor data length",
                &[shape.len()],
                &[data.len()],
            ));
        }
        Ok(Tensor { shape, data })
    }

    /// Build a tensor with a function of the index `[b, s, y, x, c]`.
    pub fn from_fn<F>(shape: Shape, mut f: F) -> Self
    where
        F: FnMut([usize; 5]) -> Float,
    {
        let mut data = Vec::with_capacity(shape.len());
        for b in 0..shape.batch {
            for s in 0..shape.sequence {
                for y in 0..shape.height {
                    for x in 0..shape.width {
                        for c in 0..shape.channels {
                            data.push(f([b, s, y, x, c]));
                        }
                    }
                }
            }
        }
        Tensor { shape, data }
    }

    /// Shape of the tensor.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Raw row-major data.
    pub fn as_slice(&self) -> &[Float] {
        &self.data
    }

    /// Consume the tensor and return its raw data.
    pub fn into_vec(self) -> Vec<Float> {
        self.data
    }

    fn offset(&self, [b, s, y, x, c]: [usize; 5]) -> usize {
        let sh = &self.shape;
        (((b * sh.sequence + s) * sh.height + y) * sh.width + x) * sh.channels + c
    }

    /// Value at index `[b, s, y, x, c]`, `None` if out of bounds.
    pub fn get(&self, index: [usize; 5]) -> Option<Float> {
        let in_bounds = index
            .iter()
            .zip(self.shape.dims().iter())
            .all(|(i, d)| i < d);
        if in_bounds {
            Some(self.data[self.offset(index)])
        } else {
            None
        }
    }

    /// Frame at position `frame = b * sequence + s`, as a row-major `[h, w, c]` slice.
    pub fn frame(&self, frame: usize) -> &[Float] {
        let len = self.shape.frame_len();
        &self.data[frame * len..(frame + 1) * len]
    }

    /// Iterator over all frames, batch major.
    pub fn frames(&self) -> impl Iterator<Item = &[Float]> {
        // chunks panics on 0, and an empty frame has nothing to iterate over anyway.
        let len = self.shape.frame_len().max(1);
        self.data.chunks(len)
    }

    /// Concatenate tensors along the batch axis.
    /// All tensors must share the same `[sequence, height, width, channels]`.
    pub fn concat_batch(tensors: &[Tensor]) -> Result<Tensor> {
        let first = match tensors.first() {
            Some(t) => t.shape,
            None => {
                return Err(Error::shape_mismatch(
                    "batch concatenation",
                    &[1],
                    &[0],
                ))
            }
        };
        let mut data = Vec::with_capacity(first.len() * tensors.len());
        let mut batch = 0;
        for t in tensors {
            let sh = t.shape;
            if (sh.sequence, sh.height, sh.width, sh.channels)
                != (first.sequence, first.height, first.width, first.channels)
            {
                return Err(Error::shape_mismatch(
                    "batch concatenation",
                    &first.dims()[1..],
                    &sh.dims()[1..],
                ));
            }
            batch += sh.batch;
            data.extend_from_slice(&t.data);
        }
        let shape = Shape { batch, ..first };
        Ok(Tensor { shape, data })
    }

    /// `(mean, min, max)` of all values. `None` for an empty tensor.
    pub fn stats(&self) -> Option<(Float, Float, Float)> {
        if self.data.is_empty() {
            return None;
        }
        let (sum, min, max) = self.data.iter().fold(
            (0.0_f64, std::f32::INFINITY, std::f32::NEG_INFINITY),
            |(sum, min, max), &x| (sum + f64::from(x), min.min(x), max.max(x)),
        );
        #[allow(clippy::cast_possible_truncation)]
        let mean = (sum / self.data.len() as f64) as Float;
        Some((mean, min, max))
    }
}

// TESTS #############################################################
