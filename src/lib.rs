// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Recurrent convolutional front end for visual odometry.
//!
//! Consecutive RGB frames are stacked two by two along the channel axis
//! and fed through a fixed stack of convolutions,
//! producing the per time step features a recurrent pose regressor would consume.

#![warn(missing_docs)]

pub mod core;
pub mod math;
pub mod misc;
