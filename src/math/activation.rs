// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Element-wise activation functions applied after convolutions.

use num_traits::Zero;

/// Activation applied to the output of a layer.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Activation {
    /// Rectified linear unit: `max(0, x)`.
    Relu,
    /// No activation, the layer is linear.
    Identity,
}

impl Activation {
    /// Apply the activation to one value.
    pub fn apply<T: Zero + PartialOrd + Copy>(self, x: T) -> T {
        match self {
            Activation::Relu => relu(x),
            Activation::Identity => x,
        }
    }

    /// Apply the activation in place to every value of a slice.
    pub fn apply_slice<T: Zero + PartialOrd + Copy>(self, values: &mut [T]) {
        if let Activation::Relu = self {
            values.iter_mut().for_each(|x| *x = relu(*x));
        }
    }
}

/// Rectified linear unit.
pub fn relu<T: Zero + PartialOrd + Copy>(x: T) -> T {
    if x > T::zero() {
        x
    } else {
        T::zero()
    }
}

// TESTS #############################################################

#[cfg(test)]
mod tests {

    use super::*;
    use crate::misc::type_aliases::Float;
    use quickcheck_macros;

    #[test]
    fn relu_clips_negatives() {
        let mut values: Vec<Float> = vec![-2.0, -0.0, 0.5, 3.0];
        Activation::Relu.apply_slice(&mut values);
        assert_eq!(vec![0.0, 0.0, 0.5, 3.0], values);
    }

    #[test]
    fn identity_keeps_negatives() {
        let mut values: Vec<Float> = vec![-2.0, 0.5];
        Activation::Identity.apply_slice(&mut values);
        assert_eq!(vec![-2.0, 0.5], values);
    }

    // PROPERTY TESTS ################################################

    #[quickcheck_macros::quickcheck]
    fn relu_is_max_with_zero(x: Float) -> bool {
        x.is_nan() || Activation::Relu.apply(x) == x.max(0.0)
    }
}
