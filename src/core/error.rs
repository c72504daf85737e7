// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type shared by the whole crate.

use thiserror::Error;

/// Result type with the crate `Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong when building or running the network.
#[derive(Debug, Error)]
pub enum Error {
    /// The kernel sizes, strides and channel counts do not describe the same number of layers.
    #[error(
        "kernel, stride and channel specs must have same length \
         (got {kernels} kernels, {strides} strides, {channels} channels)"
    )]
    LayerSpecMismatch {
        /// Number of kernel sizes.
        kernels: usize,
        /// Number of strides.
        strides: usize,
        /// Number of channel counts.
        channels: usize,
    },

    /// A network needs at least one layer.
    #[error("the architecture does not contain any layer")]
    EmptyArchitecture,

    /// A layer has a zero kernel size, stride or channel count.
    #[error("layer {index} has a zero kernel size, stride or channel count")]
    InvalidLayer {
        /// Index of the faulty layer.
        index: usize,
    },

    /// A tensor does not have the shape it was declared with.
    #[error("shape mismatch for {what}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        /// Name of the checked tensor.
        what: &'static str,
        /// Declared shape.
        expected: Vec<usize>,
        /// Actual shape.
        found: Vec<usize>,
    },

    /// Stacking frame pairs requires at least two frames.
    #[error("at least two frames are needed to build a frame pair, got {0}")]
    NotEnoughFrames(usize),

    /// Error while decoding an image.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    /// Shortcut to build a `ShapeMismatch` error.
    pub fn shape_mismatch(what: &'static str, expected: &[usize], found: &[usize]) -> Self {
        Error::ShapeMismatch {
            what,
            expected: expected.to_vec(),
            found: found.to_vec(),
        }
    }
}
