// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Description of the convolution stack, layer by layer.

use itertools::izip;

use crate::core::error::{Error, Result};
use crate::math::padding;

/// Kernel sizes of the DeepVO convolution stack.
pub const DEEPVO_KERNEL_SIZES: [usize; 9] = [7, 5, 5, 3, 3, 3, 3, 3, 3];
/// Strides of the DeepVO convolution stack.
pub const DEEPVO_STRIDES: [usize; 9] = [2, 2, 2, 1, 2, 1, 2, 1, 2];
/// Output channels of the DeepVO convolution stack.
pub const DEEPVO_CHANNELS: [usize; 9] = [64, 128, 256, 256, 512, 512, 512, 512, 1024];

/// One convolution layer: square kernel, same stride on both axes.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct LayerSpec {
    /// Side of the square kernel.
    pub kernel_size: usize,
    /// Stride along both spatial axes.
    pub stride: usize,
    /// Number of output channels.
    pub channels: usize,
}

/// Zip the three parallel sequences into a list of layers.
///
/// Fails before anything is built if the sequences have different lengths,
/// if they are empty or if any value is 0.
pub fn from_sequences(
    kernel_sizes: &[usize],
    strides: &[usize],
    channels: &[usize],
) -> Result<Vec<LayerSpec>> {
    if kernel_sizes.len() != strides.len() || strides.len() != channels.len() {
        return Err(Error::LayerSpecMismatch {
            kernels: kernel_sizes.len(),
            strides: strides.len(),
            channels: channels.len(),
        });
    }
    let layers: Vec<LayerSpec> = izip!(kernel_sizes, strides, channels)
        .map(|(&kernel_size, &stride, &channels)| LayerSpec {
            kernel_size,
            stride,
            channels,
        })
        .collect();
    validate(&layers)?;
    Ok(layers)
}

/// Check that a list of layers is usable.
pub fn validate(layers: &[LayerSpec]) -> Result<()> {
    if layers.is_empty() {
        return Err(Error::EmptyArchitecture);
    }
    match layers
        .iter()
        .position(|l| l.kernel_size == 0 || l.stride == 0 || l.channels == 0)
    {
        Some(index) => Err(Error::InvalidLayer { index }),
        None => Ok(()),
    }
}

/// The nine layers of the DeepVO convolution stack.
pub fn deepvo() -> Vec<LayerSpec> {
    izip!(
        DEEPVO_KERNEL_SIZES.iter(),
        DEEPVO_STRIDES.iter(),
        DEEPVO_CHANNELS.iter()
    )
    .map(|(&kernel_size, &stride, &channels)| LayerSpec {
        kernel_size,
        stride,
        channels,
    })
    .collect()
}

/// Spatial size `(height, width)` of the features produced by the stack.
pub fn output_size(layers: &[LayerSpec], height: usize, width: usize) -> (usize, usize) {
    let strides: Vec<usize> = layers.iter().map(|l| l.stride).collect();
    padding::chain_output_size(height, width, &strides)
}

// TESTS #############################################################

#[cfg(test)]
mod tests {

    use super::*;
    use quickcheck_macros;

    #[test]
    fn deepvo_matches_sequences() {
        let layers = from_sequences(&DEEPVO_KERNEL_SIZES, &DEEPVO_STRIDES, &DEEPVO_CHANNELS);
        assert_eq!(deepvo(), layers.unwrap());
        assert_eq!((4, 4), output_size(&deepvo(), 256, 256));
        assert_eq!((1, 1), output_size(&deepvo(), 64, 64));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        match from_sequences(&[7, 5], &[2, 2, 2], &[64, 128]) {
            Err(Error::LayerSpecMismatch {
                kernels,
                strides,
                channels,
            }) => assert_eq!((2, 3, 2), (kernels, strides, channels)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn zero_values_are_rejected() {
        match from_sequences(&[3, 3], &[1, 0], &[8, 8]) {
            Err(Error::InvalidLayer { index }) => assert_eq!(1, index),
            other => panic!("unexpected {:?}", other),
        }
        match from_sequences(&[], &[], &[]) {
            Err(Error::EmptyArchitecture) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    // PROPERTY TESTS ################################################

    #[quickcheck_macros::quickcheck]
    fn lengths_decide_validity(kernels: Vec<u8>, strides: Vec<u8>, channels: Vec<u8>) -> bool {
        let positive = |v: Vec<u8>| -> Vec<usize> { v.iter().map(|&x| x as usize + 1).collect() };
        let (k, s, c) = (positive(kernels), positive(strides), positive(channels));
        let same_len = k.len() == s.len() && s.len() == c.len();
        match from_sequences(&k, &s, &c) {
            Ok(layers) => same_len && layers.len() == k.len(),
            Err(Error::LayerSpecMismatch { .. }) => !same_len,
            Err(Error::EmptyArchitecture) => same_len && k.is_empty(),
            Err(_) => false,
        }
    }
}
