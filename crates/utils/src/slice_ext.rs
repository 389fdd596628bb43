use crate::error::{Error, Result};

/// Extends functionality for slices of float arrays
pub trait SliceExt<T> {
    /// Find index bin containing 'value', where bins are low <= value < high
    ///
    /// The upper edge of the final bin is included so that every value in the
    /// closed range of the edges has a bin.
    ///
    /// ```rust
    /// # use r2s_utils::SliceExt;
    /// let edges = [0.0, 1.0, 2.0, 3.0];
    /// assert_eq!(edges.find_bin_exclusive(0.0), Ok(0));
    /// assert_eq!(edges.find_bin_exclusive(1.0), Ok(1));
    /// assert_eq!(edges.find_bin_exclusive(3.0), Ok(2));
    /// assert!(edges.find_bin_exclusive(3.5).is_err());
    /// ```
    fn find_bin_exclusive(&self, value: T) -> Result<usize>;

    /// Check that values are strictly increasing
    ///
    /// ```rust
    /// # use r2s_utils::SliceExt;
    /// assert!([0.0, 1.0, 5.0].is_ascending());
    /// assert!(![0.0, 1.0, 1.0].is_ascending());
    /// ```
    fn is_ascending(&self) -> bool;

    /// Running total of the values, starting from the first value
    ///
    /// ```rust
    /// # use r2s_utils::SliceExt;
    /// assert_eq!([1.0, 2.0, 3.0].cumulative_sum(), vec![1.0, 3.0, 6.0]);
    /// ```
    fn cumulative_sum(&self) -> Vec<T>;
}

impl SliceExt<f64> for [f64] {
    fn find_bin_exclusive(&self, value: f64) -> Result<usize> {
        // make sure there are bin edges to check against
        let n = self.len();
        if n < 2 {
            return Err(Error::BelowMinimumSliceLength {
                length: n,
                minimum_required: 2,
            });
        }

        if !self.is_ascending() {
            return Err(Error::UnorderedBinEdges);
        }

        let lower_bound = self[0];
        let upper_bound = self[n - 1];

        // is the value relevant?
        if value < lower_bound || value > upper_bound || value.is_nan() {
            return Err(Error::ValueOutsideOfBounds {
                value,
                lower_bound,
                upper_bound,
            });
        }

        // special case for being on the upper edge
        if value == upper_bound {
            return Ok(n - 2);
        }

        // edges are sorted, so the partition point is the first edge > value
        match self.partition_point(|edge| *edge <= value) {
            0 => Err(Error::UncapturedErrorCondition),
            idx => Ok(idx - 1),
        }
    }

    fn is_ascending(&self) -> bool {
        self.windows(2).all(|w| w[0] < w[1])
    }

    fn cumulative_sum(&self) -> Vec<f64> {
        self.iter()
            .scan(0.0, |total, v| {
                *total += v;
                Some(*total)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bins_on_edges() {
        let edges = [1.0, 10.0, 100.0];
        assert_eq!(edges.find_bin_exclusive(1.0), Ok(0));
        assert_eq!(edges.find_bin_exclusive(9.999), Ok(0));
        assert_eq!(edges.find_bin_exclusive(10.0), Ok(1));
        assert_eq!(edges.find_bin_exclusive(100.0), Ok(1));
    }

    #[test]
    fn bins_out_of_range() {
        let edges = [1.0, 10.0];
        assert!(matches!(
            edges.find_bin_exclusive(0.5),
            Err(Error::ValueOutsideOfBounds { .. })
        ));
        assert_eq!(
            [1.0].find_bin_exclusive(1.0),
            Err(Error::BelowMinimumSliceLength {
                length: 1,
                minimum_required: 2
            })
        );
        assert_eq!(
            [2.0, 1.0].find_bin_exclusive(1.5),
            Err(Error::UnorderedBinEdges)
        );
    }

    #[test]
    fn running_total() {
        let steps = [19440.0, 61680.0, 32940.0];
        assert_eq!(steps.cumulative_sum(), vec![19440.0, 81120.0, 114060.0]);
        assert!(Vec::<f64>::new().cumulative_sum().is_empty());
    }
}
