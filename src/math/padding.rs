// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Arithmetic of the "same" padding mode of convolutions.
//!
//! With "same" padding, the output size only depends on the stride:
//! `out = ceil(in / stride)`.
//! The zero padding needed to reach that size is split in two,
//! with the extra pixel (if odd) going after the input.

/// Output size along one axis of a convolution with "same" padding.
pub fn same_output_size(input: usize, stride: usize) -> usize {
    (input + stride - 1) / stride
}

/// Padding `(before, after)` along one axis of a convolution with "same" padding.
pub fn same_padding(input: usize, kernel: usize, stride: usize) -> (usize, usize) {
    let output = same_output_size(input, stride);
    let needed = (output.saturating_sub(1) * stride + kernel).saturating_sub(input);
    let before = needed / 2;
    (before, needed - before)
}

/// Spatial size `(height, width)` after a sequence of strided convolutions.
pub fn chain_output_size(height: usize, width: usize, strides: &[usize]) -> (usize, usize) {
    strides.iter().fold((height, width), |(h, w), &s| {
        (same_output_size(h, s), same_output_size(w, s))
    })
}

// TESTS #############################################################
