use crate::f;

/// Extends numbers with the formatting used in logs and reports
pub trait ValueExt {
    /// Scientific notation with a fixed mantissa precision and a signed,
    /// zero padded exponent
    ///
    /// The `{:e}` formatter drops the exponent sign and padding, which makes
    /// columns of tally results and source strengths hard to line up.
    ///
    /// ```rust
    /// # use r2s_utils::ValueExt;
    /// let dose = 2.5e-6;
    /// assert_eq!(dose.sci(5, 2), "2.50000e-06".to_string());
    /// assert_eq!((-1.0).sci(3, 2), "-1.000e+00".to_string());
    /// assert_eq!(1.2e10.sci(1, 3), "1.2e+010".to_string());
    /// ```
    fn sci(&self, precision: usize, exp_pad: usize) -> String;
}

impl<T: std::fmt::LowerExp> ValueExt for T {
    fn sci(&self, precision: usize, exp_pad: usize) -> String {
        let formatted = f!("{self:.precision$e}");
        let Some((mantissa, exponent)) = formatted.split_once('e') else {
            return formatted;
        };

        let (sign, digits) = match exponent.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exponent),
        };
        f!("{mantissa}e{sign}{digits:0>exp_pad$}")
    }
}
