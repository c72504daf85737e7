// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Visual odometry model: construction from a `Config` and forward pass.
//!
//! The model takes batches of sequences of stacked frame pairs,
//! `[batch, sequence_length, height, width, 2 * channels]`,
//! with one 6-DoF pose delta label per sample.
//! The forward pass is eager: inputs are checked against the shapes
//! declared at construction, then directly run through the convolutions.

use log::{info, trace};
use rand::{rngs::StdRng, SeedableRng};

use crate::core::error::{Error, Result};
use crate::core::extractor::ConvFeatureExtractor;
use crate::core::layer::{self, LayerSpec};
use crate::core::recurrent::RecurrentState;
use crate::core::tensor::{Shape, Tensor};
use crate::misc::type_aliases::Vec6;

/// Configuration of the model, fixed at construction.
#[derive(Clone, Debug)]
pub struct Config {
    /// `(height, width, channels)` of a single image.
    pub image_shape: (usize, usize, usize),
    /// Size of the recurrent state.
    pub memory_size: usize,
    /// Number of stacked frame pairs per sequence.
    pub sequence_length: usize,
    /// Default batch size, see `VoModel::default_input_shape`.
    pub batch_size: usize,
    /// Convolution layers, in application order.
    pub layers: Vec<LayerSpec>,
    /// Seed of the parameters initialization.
    pub seed: u64,
}

/// Model with initialized parameters.
/// Can only be constructed by initialization from a `Config`.
#[derive(Debug)]
pub struct VoModel {
    config: Config,
    cnn: ConvFeatureExtractor,
}

impl Config {
    /// Configuration with the DeepVO convolution stack.
    pub fn deepvo(
        image_shape: (usize, usize, usize),
        memory_size: usize,
        sequence_length: usize,
        batch_size: usize,
    ) -> Self {
        Config {
            image_shape,
            memory_size,
            sequence_length,
            batch_size,
            layers: layer::deepvo(),
            seed: 0,
        }
    }

    /// Build the model and initialize its parameters.
    pub fn init(self) -> Result<VoModel> {
        layer::validate(&self.layers)?;
        let (_, _, channels) = self.image_shape;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let cnn = ConvFeatureExtractor::new(&self.layers, 2 * channels, &mut rng)?;
        info!(
            "cnn built with {} layers and {} parameters",
            cnn.layers().len(),
            cnn.nb_parameters()
        );
        Ok(VoModel { config: self, cnn })
    }
} // impl Config

impl VoModel {
    /// Configuration used to build the model.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The convolutional part of the model.
    pub fn cnn(&self) -> &ConvFeatureExtractor {
        &self.cnn
    }

    /// Expected input shape for a given batch size.
    pub fn input_shape(&self, batch_size: usize) -> Shape {
        let (h, w, c) = self.config.image_shape;
        Shape::new(batch_size, self.config.sequence_length, h, w, 2 * c)
    }

    /// Expected input shape for the configured batch size.
    pub fn default_input_shape(&self) -> Shape {
        self.input_shape(self.config.batch_size)
    }

    /// Shape of the convolution features for a given batch size.
    pub fn feature_shape(&self, batch_size: usize) -> Shape {
        self.cnn.output_shape(self.input_shape(batch_size))
    }

    /// Recurrent state full of zeros, `batch_size x memory_size`.
    pub fn zero_state(&self, batch_size: usize) -> RecurrentState {
        RecurrentState::zeros(batch_size, self.config.memory_size)
    }

    /// Run a batch through the convolutions and return the features.
    ///
    /// Batch size and sequence length are read from the input shape.
    /// Without `initial_state`, the zero state is used.
    /// Every input is checked against the shapes declared at construction:
    /// `[_, sequence_length, h, w, 2c]` for images,
    /// one label per sequence and `batch x memory_size` for the state.
    pub fn cnn_output(
        &self,
        input_batch: &Tensor,
        label_batch: &[Vec6],
        initial_state: Option<RecurrentState>,
    ) -> Result<Tensor> {
        let shape = input_batch.shape();
        let (batch_size, sequence_length) = (shape.batch, shape.sequence);
        let expected = self.input_shape(batch_size);
        if shape != expected {
            return Err(Error::shape_mismatch(
                "image pairs",
                &expected.dims(),
                &shape.dims(),
            ));
        }
        if label_batch.len() != batch_size {
            return Err(Error::shape_mismatch(
                "pose labels",
                &[batch_size, 6],
                &[label_batch.len(), 6],
            ));
        }
        let state = initial_state.unwrap_or_else(|| self.zero_state(batch_size));
        state.check_shape(batch_size, self.config.memory_size)?;
        trace!(
            "forward pass: batch {}, sequence {}, state {:?}",
            batch_size,
            sequence_length,
            state.shape()
        );
        self.cnn.forward(input_batch)
    }
}

// TESTS #############################################################

#[cfg(test)]
mod tests {

    use super::*;
    use crate::misc::type_aliases::{DMat, Float};

    fn small_config() -> Config {
        Config {
            image_shape: (8, 6, 3),
            memory_size: 16,
            sequence_length: 3,
            batch_size: 2,
            layers: layer::from_sequences(&[3, 3], &[2, 1], &[4, 5]).unwrap(),
            seed: 42,
        }
    }

    fn ramp(shape: Shape) -> Tensor {
        Tensor::from_fn(shape, |[b, s, y, x, c]| {
            ((b + s + y + x + c) % 7) as Float / 7.0
        })
    }

    #[test]
    fn end_to_end_deepvo_64() {
        let model = Config::deepvo((64, 64, 3), 1000, 4, 2).init().unwrap();
        let input = ramp(Shape::new(2, 4, 64, 64, 6));
        let labels = vec![Vec6::zeros(); 2];
        let features = model.cnn_output(&input, &labels, None).unwrap();
        assert_eq!(Shape::new(2, 4, 1, 1, 1024), features.shape());
        assert_eq!(model.feature_shape(2), features.shape());
        assert!(features.as_slice().iter().all(|x| x.is_finite()));
    }

    #[test]
    fn zero_state_shape() {
        let model = small_config().init().unwrap();
        let state = model.zero_state(5);
        assert_eq!((5, 16), state.shape());
        assert!(state.cell.iter().chain(state.hidden.iter()).all(|&x| x == 0.0));
    }

    #[test]
    fn explicit_state_gives_same_features() {
        let model = small_config().init().unwrap();
        let input = ramp(model.default_input_shape());
        assert_eq!(Shape::new(2, 3, 8, 6, 6), input.shape());
        let labels = vec![Vec6::zeros(); 2];
        let state = RecurrentState::new(DMat::from_element(2, 16, 0.5), DMat::zeros(2, 16));
        let with_state = model.cnn_output(&input, &labels, Some(state.unwrap()));
        let without = model.cnn_output(&input, &labels, None);
        assert_eq!(with_state.unwrap(), without.unwrap());
    }

    #[test]
    fn same_seed_same_model() {
        let a = small_config().init().unwrap();
        let b = small_config().init().unwrap();
        let c = Config {
            seed: 43,
            ..small_config()
        }
        .init()
        .unwrap();
        let input = ramp(a.input_shape(1));
        let labels = [Vec6::zeros()];
        let fa = a.cnn_output(&input, &labels, None).unwrap();
        assert_eq!(fa, b.cnn_output(&input, &labels, None).unwrap());
        assert_ne!(fa, c.cnn_output(&input, &labels, None).unwrap());
    }

    #[test]
    fn wrong_inputs_are_rejected() {
        let model = small_config().init().unwrap();
        let labels = vec![Vec6::zeros(); 2];

        // Wrong sequence length.
        let input = ramp(Shape::new(2, 4, 8, 6, 6));
        assert!(model.cnn_output(&input, &labels, None).is_err());

        // Single images instead of stacked pairs.
        let input = ramp(Shape::new(2, 3, 8, 6, 3));
        assert!(model.cnn_output(&input, &labels, None).is_err());

        // Label count differs from batch size.
        let input = ramp(model.input_shape(2));
        assert!(model.cnn_output(&input, &labels[..1], None).is_err());

        // State with the wrong batch size.
        let state = model.zero_state(3);
        match model.cnn_output(&input, &labels, Some(state)) {
            Err(Error::ShapeMismatch { what, .. }) => assert_eq!("cell state", what),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn invalid_architecture_fails_at_init() {
        let config = Config {
            layers: Vec::new(),
            ..small_config()
        };
        assert!(config.init().is_err());
    }
}
