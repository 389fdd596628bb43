//! Axis-aligned bounding boxes and the repair policy for bad extents

// crate modules
use crate::error::{Error, Result};

// r2s modules
use r2s_utils::f;

// external crates
use log::{debug, warn};
use nalgebra::Point3;
use rand::Rng;
use serde::{Deserialize, Serialize};

const AXES: [&str; 3] = ["x", "y", "z"];

/// Axis-aligned bounding box
///
/// An ordered pair of `lower` and `upper` corners (cm) where `upper >= lower`
/// on every axis.
///
/// Serialises as a nested array to match the bounding box artifacts:
///
/// ```text
/// [[xl, yl, zl], [xu, yu, zu]]
/// ```
///
/// Boxes straight from the transport engine may be infinite on some axes
/// (e.g. cells bounded only by planes) or have zero extent (e.g. a cell
/// defined on a plane). Both are handled in one place by
/// [BoundingBox::repaired()], so that every consumer applies the same policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[[f64; 3]; 2]", into = "[[f64; 3]; 2]")]
pub struct BoundingBox {
    /// Lower corner (cm)
    pub lower: [f64; 3],
    /// Upper corner (cm)
    pub upper: [f64; 3],
}

impl BoundingBox {
    /// Create a new box, checking the corners are ordered
    ///
    /// Infinite values are allowed here and dealt with by
    /// [BoundingBox::repaired()]. `NaN` or inverted axes are always an error.
    ///
    /// ```rust
    /// # use r2s_geometry::BoundingBox;
    /// let bbox = BoundingBox::new([0.0, 0.0, 0.0], [1.0, 2.0, 3.0]).unwrap();
    /// assert_eq!(bbox.volume(), 6.0);
    ///
    /// assert!(BoundingBox::new([1.0, 0.0, 0.0], [0.0, 1.0, 1.0]).is_err());
    /// ```
    pub fn new(lower: [f64; 3], upper: [f64; 3]) -> Result<Self> {
        let bbox = Self { lower, upper };
        bbox.check_ordering()?;
        Ok(bbox)
    }

    /// Cube centred on the origin with half-width `half`
    pub fn cube(half: f64) -> Self {
        Self {
            lower: [-half; 3],
            upper: [half; 3],
        }
    }

    /// Extent of the box along each axis
    pub fn extent(&self) -> [f64; 3] {
        [
            self.upper[0] - self.lower[0],
            self.upper[1] - self.lower[1],
            self.upper[2] - self.lower[2],
        ]
    }

    /// Volume of the box (cm3)
    pub fn volume(&self) -> f64 {
        self.extent().iter().product()
    }

    /// Centre of the box
    pub fn centre(&self) -> Point3<f64> {
        Point3::new(
            0.5 * (self.lower[0] + self.upper[0]),
            0.5 * (self.lower[1] + self.upper[1]),
            0.5 * (self.lower[2] + self.upper[2]),
        )
    }

    /// True if every bound is finite
    pub fn is_finite(&self) -> bool {
        self.lower.iter().chain(self.upper.iter()).all(|v| v.is_finite())
    }

    /// Check if a point is inside the box (inclusive of the faces)
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        (0..3).all(|i| self.lower[i] <= point[i] && point[i] <= self.upper[i])
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut result = *self;
        for i in 0..3 {
            result.lower[i] = result.lower[i].min(other.lower[i]);
            result.upper[i] = result.upper[i].max(other.upper[i]);
        }
        result
    }

    /// Apply the repair policy for infinite and degenerate axes
    ///
    /// The same policy is used everywhere a box is consumed:
    ///
    /// | Axis condition         | Fallback given            | No fallback          |
    /// | ---------------------- | ------------------------- | -------------------- |
    /// | NaN or upper < lower   | error                     | error                |
    /// | any bound infinite     | warn, use fallback axis   | error                |
    /// | zero extent            | inflate by +/-1           | inflate by +/-1      |
    ///
    /// ```rust
    /// # use r2s_geometry::BoundingBox;
    /// let domain = BoundingBox::cube(100.0);
    /// let bbox = BoundingBox::new([-1.0, -1.0, 2.0], [1.0, f64::INFINITY, 2.0]).unwrap();
    ///
    /// // Unrecoverable without a fallback domain
    /// assert!(bbox.repaired(None).is_err());
    ///
    /// // The infinite y axis is replaced, the flat z axis is inflated
    /// let fixed = bbox.repaired(Some(&domain)).unwrap();
    /// assert_eq!(fixed.lower, [-1.0, -100.0, 1.0]);
    /// assert_eq!(fixed.upper, [1.0, 100.0, 3.0]);
    /// ```
    pub fn repaired(&self, fallback: Option<&BoundingBox>) -> Result<BoundingBox> {
        self.check_ordering()?;
        let mut result = *self;

        for (i, axis) in AXES.iter().enumerate() {
            if !result.lower[i].is_finite() || !result.upper[i].is_finite() {
                let Some(domain) = fallback.filter(|d| d.lower[i].is_finite() && d.upper[i].is_finite())
                else {
                    return Err(Error::InvalidBoundingBox(f!(
                        "infinite {axis} axis [{}, {}] and no fallback domain",
                        result.lower[i],
                        result.upper[i]
                    )));
                };
                warn!(
                    "Infinite {axis} axis on bounding box, substituting fallback [{}, {}]",
                    domain.lower[i], domain.upper[i]
                );
                result.lower[i] = domain.lower[i];
                result.upper[i] = domain.upper[i];
            }

            if result.upper[i] == result.lower[i] {
                debug!("Degenerate {axis} axis on bounding box, inflating by +/-1");
                result.lower[i] -= 1.0;
                result.upper[i] += 1.0;
            }
        }

        Ok(result)
    }

    /// Sample a point uniformly within the box
    ///
    /// The box should have been through [BoundingBox::repaired()] first.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Point3<f64> {
        let extent = self.extent();
        Point3::new(
            self.lower[0] + extent[0] * rng.gen::<f64>(),
            self.lower[1] + extent[1] * rng.gen::<f64>(),
            self.lower[2] + extent[2] * rng.gen::<f64>(),
        )
    }

    fn check_ordering(&self) -> Result<()> {
        for (i, axis) in AXES.iter().enumerate() {
            let (l, u) = (self.lower[i], self.upper[i]);
            if l.is_nan() || u.is_nan() {
                return Err(Error::InvalidBoundingBox(f!("NaN bound on {axis} axis")));
            }
            if u < l {
                return Err(Error::InvalidBoundingBox(f!(
                    "upper bound {u} below lower bound {l} on {axis} axis"
                )));
            }
        }
        Ok(())
    }
}

impl From<[[f64; 3]; 2]> for BoundingBox {
    fn from(value: [[f64; 3]; 2]) -> Self {
        Self {
            lower: value[0],
            upper: value[1],
        }
    }
}

impl From<BoundingBox> for [[f64; 3]; 2] {
    fn from(value: BoundingBox) -> Self {
        [value.lower, value.upper]
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}, {}] -> [{}, {}, {}]",
            self.lower[0], self.lower[1], self.lower[2], self.upper[0], self.upper[1], self.upper[2]
        )
    }
}
