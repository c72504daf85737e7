// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! State carried by the recurrent pose regressor across time steps.
//!
//! The regressor itself (two stacked LSTM cells consuming the flattened
//! per time step features) is not part of this crate yet.
//! Only its state is, since it is part of the forward pass inputs.

use crate::core::error::{Error, Result};
use crate::misc::type_aliases::DMat;

/// LSTM-style `(cell, hidden)` state, both `batch x memory_size`.
#[derive(Clone, PartialEq, Debug)]
pub struct RecurrentState {
    /// Cell state, also called "c".
    pub cell: DMat,
    /// Hidden state, also called "h".
    pub hidden: DMat,
}

impl RecurrentState {
    /// State full of zeros, used when starting a new sequence.
    pub fn zeros(batch_size: usize, memory_size: usize) -> Self {
        RecurrentState {
            cell: DMat::zeros(batch_size, memory_size),
            hidden: DMat::zeros(batch_size, memory_size),
        }
    }

    /// Build a state from its two parts, which must have the same shape.
    pub fn new(cell: DMat, hidden: DMat) -> Result<Self> {
        if cell.shape() != hidden.shape() {
            let (cr, cc) = cell.shape();
            let (hr, hc) = hidden.shape();
            return Err(Error::shape_mismatch(
                "recurrent hidden state",
                &[cr, cc],
                &[hr, hc],
            ));
        }
        Ok(RecurrentState { cell, hidden })
    }

    /// `(batch_size, memory_size)`.
    pub fn shape(&self) -> (usize, usize) {
        self.cell.shape()
    }

    /// Check that both parts are `batch_size x memory_size`.
    pub fn check_shape(&self, batch_size: usize, memory_size: usize) -> Result<()> {
        let expected = (batch_size, memory_size);
        for &(what, mat) in [("cell state", &self.cell), ("hidden state", &self.hidden)].iter() {
            if mat.shape() != expected {
                let (r, c) = mat.shape();
                return Err(Error::shape_mismatch(what, &[batch_size, memory_size], &[r, c]));
            }
        }
        Ok(())
    }
}

// TESTS #############################################################
