//! Chebyshev rational approximation of the matrix exponential
//!
//! The 16th order approximation in partial fraction form, accurate to around
//! 1e-15 for matrices with eigenvalues on the negative real axis, which is
//! exactly the case for decay and transmutation.
//!
//! ```text
//! exp(At) n0 = a0 n0 + 2 Re( sum_i a_i (At - t_i I)^-1 n0 )
//! ```

// crate modules
use crate::error::{Error, Result};

// r2s modules
use r2s_utils::f;

// external crates
use nalgebra::{Complex, DMatrix, DVector};

/// Limit of the rational function at infinity
const ALPHA0: f64 = 2.124_853_710_495_223_748_8e-16;

/// Poles of the partial fraction expansion, one of each conjugate pair
const THETA: [(f64, f64); 8] = [
    (-1.084_391_707_869_698_802_6e1, 1.927_744_616_718_165_228_4e1),
    (-5.264_971_343_442_646_889_5, 1.622_022_147_316_792_730_5e1),
    (5.948_152_268_951_177_480_8, 3.587_457_362_018_322_282_9),
    (3.509_103_608_414_918_097_4, 8.436_198_985_884_375_082_6),
    (6.416_177_699_099_434_192_3, 1.194_122_393_370_138_687_4),
    (1.419_375_897_185_665_978_6, 1.092_536_348_449_672_258_5e1),
    (4.993_174_737_717_996_399_1, 5.996_881_713_603_942_226_0),
    (-1.413_928_462_488_886_211_4, 1.349_772_569_889_274_538_9e1),
];

/// Residues matching each pole in [THETA]
const ALPHA: [(f64, f64); 8] = [
    (-5.090_152_186_522_491_565_0e-7, -2.422_001_765_285_228_797_0e-5),
    (2.115_174_218_246_603_090_7e-4, 4.389_296_964_738_067_391_8e-3),
    (1.133_977_517_848_393_052_7e2, 1.019_472_170_421_585_645_0e2),
    (1.505_958_527_002_346_752_8e1, -5.751_405_277_642_181_997_9),
    (-6.450_087_802_553_964_659_5e1, -2.245_944_076_265_209_605_6e2),
    (-1.479_300_711_355_799_971_8, 1.768_658_832_378_293_790_6),
    (-6.251_839_246_320_791_889_2e1, -1.119_039_109_428_322_848_0e1),
    (4.102_313_683_541_002_127_3e-2, -1.574_346_617_345_546_819_1e-1),
];

/// Advance `n0` by `dt` seconds under `dn/dt = A n`
///
/// Column `i` of `a` holds the rates (1/s) at which nuclide `i` feeds every
/// other nuclide, with its total removal rate on the diagonal.
pub fn cram16(a: &DMatrix<f64>, n0: &DVector<f64>, dt: f64) -> Result<DVector<f64>> {
    let size = n0.len();
    if a.nrows() != size || a.ncols() != size {
        return Err(Error::NumericalInstability(f!(
            "{}x{} matrix for {} nuclides",
            a.nrows(),
            a.ncols(),
            size
        )));
    }

    let at = a.map(|v| Complex::new(v * dt, 0.0));
    let rhs = n0.map(|v| Complex::new(v, 0.0));
    let mut n = n0 * ALPHA0;

    for (theta, alpha) in THETA.iter().zip(ALPHA.iter()) {
        let theta = Complex::new(theta.0, theta.1);
        let alpha = Complex::new(alpha.0, alpha.1);

        let mut shifted = at.clone();
        for i in 0..size {
            shifted[(i, i)] -= theta;
        }

        let solution = shifted.lu().solve(&rhs).ok_or_else(|| {
            Error::NumericalInstability("singular system in matrix exponential".into())
        })?;

        n += solution.map(|c| 2.0 * (alpha * c).re);
    }

    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_decay() {
        let lambda = 2.0_f64.ln() / 100.0;
        let a = DMatrix::from_element(1, 1, -lambda);
        let n0 = DVector::from_element(1, 1.0e20);

        for (dt, expected) in [(100.0, 0.5e20), (300.0, 0.125e20)] {
            let n = cram16(&a, &n0, dt).unwrap();
            assert!((n[0] - expected).abs() / expected < 1e-12);
        }
    }

    #[test]
    fn parent_daughter() {
        // Bateman solution for a two member chain
        let (l1, l2) = (1.0e-3, 2.5e-4);
        let a = DMatrix::from_row_slice(2, 2, &[-l1, 0.0, l1, -l2]);
        let n0 = DVector::from_vec(vec![1.0, 0.0]);
        let t = 2000.0;

        let n = cram16(&a, &n0, t).unwrap();
        let parent = (-l1 * t).exp();
        let daughter = l1 / (l2 - l1) * ((-l1 * t).exp() - (-l2 * t).exp());

        assert!((n[0] - parent).abs() < 1e-13);
        assert!((n[1] - daughter).abs() < 1e-13);
    }

    #[test]
    fn zero_matrix_is_identity() {
        let a = DMatrix::zeros(3, 3);
        let n0 = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let n = cram16(&a, &n0, 1.0e6).unwrap();
        for i in 0..3 {
            assert!((n[i] - n0[i]).abs() < 1e-13 * n0[i]);
        }
    }

    #[test]
    fn shape_mismatch() {
        let a = DMatrix::zeros(2, 2);
        let n0 = DVector::from_vec(vec![1.0]);
        assert!(cram16(&a, &n0, 1.0).is_err());
    }
}
