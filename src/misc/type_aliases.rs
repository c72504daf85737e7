// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Type aliases for common types used all over the code base.

use nalgebra as na;

/// At the moment, the library is focused on f32 computation.
pub type Float = f32;

/// A vector with six Float coordinates.
/// Used for 6-DoF pose deltas `(tx, ty, tz, rx, ry, rz)`.
pub type Vec6 = na::Vector6<Float>;

/// Dynamically sized matrix of Floats.
pub type DMat = na::DMatrix<Float>;

/// Dynamically sized column vector of Floats.
pub type DVec = na::DVector<Float>;
