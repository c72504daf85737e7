// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Convolutional feature extractor: a fixed pipeline of `Conv2d` layers.
//!
//! Every layer but the last is followed by a ReLU.
//! The last one is linear, so that features keep their sign
//! for the downstream pose regression.

use log::debug;
use rand::Rng;

use crate::core::conv::Conv2d;
use crate::core::error::{Error, Result};
use crate::core::layer::{self, LayerSpec};
use crate::core::tensor::{Shape, Tensor};
use crate::math::activation::Activation;

/// Stack of convolutions applied to every frame of a tensor.
#[derive(Clone, Debug)]
pub struct ConvFeatureExtractor {
    layers: Vec<Conv2d>,
}

impl ConvFeatureExtractor {
    /// Build the stack with randomly initialized parameters.
    ///
    /// Layers are named `conv0`, `conv1`, ...
    pub fn new<R: Rng>(specs: &[LayerSpec], in_channels: usize, rng: &mut R) -> Result<Self> {
        layer::validate(specs)?;
        let last = specs.len() - 1;
        let mut layers = Vec::with_capacity(specs.len());
        let mut channels = in_channels;
        for (index, &spec) in specs.iter().enumerate() {
            let activation = if index < last {
                Activation::Relu
            } else {
                Activation::Identity
            };
            let name = format!("conv{}", index);
            layers.push(Conv2d::new(&name, spec, channels, activation, rng)?);
            channels = spec.channels;
        }
        Ok(ConvFeatureExtractor { layers })
    }

    /// Build the stack from already constructed layers.
    /// The input channels of each layer must match the output channels of the previous one.
    pub fn from_layers(layers: Vec<Conv2d>) -> Result<Self> {
        if layers.is_empty() {
            return Err(Error::EmptyArchitecture);
        }
        for pair in layers.windows(2) {
            let (previous, next) = (&pair[0], &pair[1]);
            if previous.spec().channels != next.in_channels() {
                return Err(Error::shape_mismatch(
                    "chained layer channels",
                    &[previous.spec().channels],
                    &[next.in_channels()],
                ));
            }
        }
        Ok(ConvFeatureExtractor { layers })
    }

    /// The layers, in application order.
    pub fn layers(&self) -> &[Conv2d] {
        &self.layers
    }

    /// Number of channels expected in the input.
    pub fn in_channels(&self) -> usize {
        self.layers[0].in_channels()
    }

    /// Number of channels of the produced features.
    pub fn out_channels(&self) -> usize {
        self.layers[self.layers.len() - 1].spec().channels
    }

    /// Total number of weights and biases.
    pub fn nb_parameters(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.weights().len() + l.bias().len())
            .sum()
    }

    /// Shape of the features for a given input shape, without computing anything.
    pub fn output_shape(&self, input: Shape) -> Shape {
        self.layers
            .iter()
            .fold(input, |shape, layer| layer.output_shape(shape))
    }

    /// Apply every layer in sequence.
    pub fn forward(&self, input: &Tensor) -> Result<Tensor> {
        if input.shape().channels != self.in_channels() {
            return Err(Error::shape_mismatch(
                "extractor input channels",
                &[self.in_channels()],
                &[input.shape().channels],
            ));
        }
        let mut features = self.layers[0].forward(input)?;
        debug!("{}: {:?}", self.layers[0].name(), features.shape().dims());
        for layer in &self.layers[1..] {
            features = layer.forward(&features)?;
            debug!("{}: {:?}", layer.name(), features.shape().dims());
        }
        Ok(features)
    }
}

// TESTS #############################################################
