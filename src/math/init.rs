// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Initializers of the convolution parameters.
//!
//! Kernels are drawn according to He et al.
//! "Delving deep into rectifiers" (variance scaling for ReLU networks),
//! with the variance scaled by the kernel size.
//! Biases start at a small positive constant so that ReLU units are initially active.

use rand::distributions::{Distribution, Normal};
use rand::Rng;

use crate::misc::type_aliases::{DMat, DVec, Float};

/// Initial value of every bias.
pub const BIAS_INIT: Float = 0.01;

/// Standard deviation of the Gaussian used for kernels of size `kernel_size`.
pub fn he_std_dev(kernel_size: usize) -> f64 {
    (2.0 / kernel_size as f64).sqrt()
}

/// Matrix of independent samples of a zero-mean Gaussian
/// with standard deviation `sqrt(2 / kernel_size)`.
#[allow(clippy::cast_possible_truncation)]
pub fn he_normal<R: Rng>(nrows: usize, ncols: usize, kernel_size: usize, rng: &mut R) -> DMat {
    let normal = Normal::new(0.0, he_std_dev(kernel_size));
    DMat::from_fn(nrows, ncols, |_, _| normal.sample(&mut *rng) as Float)
}

/// Vector filled with `BIAS_INIT`.
pub fn bias(size: usize) -> DVec {
    DVec::from_element(size, BIAS_INIT)
}

// TESTS #############################################################

#[cfg(test)]
mod tests {

    use super::*;
    use approx;
    use rand::{rngs::StdRng, SeedableRng};

    /// Empirical (mean, standard deviation) of the matrix values.
    fn moments(mat: &DMat) -> (f64, f64) {
        let n = mat.len() as f64;
        let mean = mat.iter().map(|&x| f64::from(x)).sum::<f64>() / n;
        let var = mat
            .iter()
            .map(|&x| (f64::from(x) - mean).powi(2))
            .sum::<f64>()
            / n;
        (mean, var.sqrt())
    }

    #[test]
    fn std_dev_values() {
        approx::assert_relative_eq!(1.0, he_std_dev(2));
        approx::assert_relative_eq!((2.0_f64 / 7.0).sqrt(), he_std_dev(7));
    }

    #[test]
    fn sampled_std_dev_follows_kernel_size() {
        let mut rng = StdRng::seed_from_u64(7);
        for &k in [3, 5, 7].iter() {
            let weights = he_normal(64, 1000, k, &mut rng);
            let (mean, std_dev) = moments(&weights);
            assert!(mean.abs() < 0.02, "mean {} for k = {}", mean, k);
            assert!(
                (std_dev - he_std_dev(k)).abs() < 0.02 * he_std_dev(k),
                "std dev {} for k = {}",
                std_dev,
                k
            );
        }
    }

    #[test]
    fn seeded_init_is_reproducible() {
        let a = he_normal(4, 5, 3, &mut StdRng::seed_from_u64(1));
        let b = he_normal(4, 5, 3, &mut StdRng::seed_from_u64(1));
        assert_eq!(a, b);
    }

    #[test]
    fn bias_is_exact_constant() {
        assert!(bias(17).iter().all(|&b| b == 0.01));
    }
}
