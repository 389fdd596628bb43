//! Point containment for cell regions

// crate modules
use crate::bbox::BoundingBox;

// external crates
use nalgebra::Point3;

/// A region of space that can answer point containment queries
///
/// This is the seam to the transport engine geometry. Anything the engine
/// can answer "is this point in cell X?" for can implement [Region], and the
/// analytic shapes in this module cover phantoms, foils, and tests.
///
/// A region may optionally know its own [BoundingBox]. Regions defined by
/// complements or half-spaces generally do not, and return `None`.
pub trait Region: std::fmt::Debug {
    /// True if the point lies inside the region
    fn contains(&self, point: &Point3<f64>) -> bool;

    /// Bounding box of the region, if known
    fn bounding_box(&self) -> Option<BoundingBox> {
        None
    }
}

/// Sphere of some `radius` about a `centre`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// Centre of the sphere (cm)
    pub centre: Point3<f64>,
    /// Radius of the sphere (cm)
    pub radius: f64,
}

impl Sphere {
    /// Sphere at the origin
    pub fn at_origin(radius: f64) -> Self {
        Self {
            centre: Point3::origin(),
            radius,
        }
    }

    /// Analytic volume (cm3)
    pub fn volume(&self) -> f64 {
        4.0 / 3.0 * std::f64::consts::PI * self.radius.powi(3)
    }
}

impl Region for Sphere {
    fn contains(&self, point: &Point3<f64>) -> bool {
        (point - self.centre).norm_squared() <= self.radius * self.radius
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        let c = self.centre;
        let r = self.radius;
        Some(BoundingBox {
            lower: [c.x - r, c.y - r, c.z - r],
            upper: [c.x + r, c.y + r, c.z + r],
        })
    }
}

/// Axis-aligned rectangular parallelepiped
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cuboid(pub BoundingBox);

impl Region for Cuboid {
    fn contains(&self, point: &Point3<f64>) -> bool {
        self.0.contains(point)
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        Some(self.0)
    }
}

/// Finite cylinder aligned with the z axis
///
/// Foils and detector discs are usually just thin z-cylinders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderZ {
    /// x coordinate of the axis (cm)
    pub x0: f64,
    /// y coordinate of the axis (cm)
    pub y0: f64,
    /// Radius (cm)
    pub radius: f64,
    /// Lower z plane (cm)
    pub z_min: f64,
    /// Upper z plane (cm)
    pub z_max: f64,
}

impl CylinderZ {
    /// Analytic volume (cm3)
    pub fn volume(&self) -> f64 {
        std::f64::consts::PI * self.radius.powi(2) * (self.z_max - self.z_min)
    }
}

impl Region for CylinderZ {
    fn contains(&self, point: &Point3<f64>) -> bool {
        let (dx, dy) = (point.x - self.x0, point.y - self.y0);
        dx * dx + dy * dy <= self.radius * self.radius
            && self.z_min <= point.z
            && point.z <= self.z_max
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        Some(BoundingBox {
            lower: [self.x0 - self.radius, self.y0 - self.radius, self.z_min],
            upper: [self.x0 + self.radius, self.y0 + self.radius, self.z_max],
        })
    }
}

/// Everything not inside the wrapped region
#[derive(Debug)]
pub struct Complement(pub Box<dyn Region>);

impl Region for Complement {
    fn contains(&self, point: &Point3<f64>) -> bool {
        !self.0.contains(point)
    }
}

/// Points inside every one of the regions
#[derive(Debug)]
pub struct Intersection(pub Vec<Box<dyn Region>>);

impl Region for Intersection {
    fn contains(&self, point: &Point3<f64>) -> bool {
        self.0.iter().all(|r| r.contains(point))
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        // any known box bounds the intersection, take the tightest overlap
        let mut boxes = self.0.iter().filter_map(|r| r.bounding_box());
        let mut result = boxes.next()?;
        for b in boxes {
            for i in 0..3 {
                result.lower[i] = result.lower[i].max(b.lower[i]);
                result.upper[i] = result.upper[i].min(b.upper[i]);
                // empty overlap collapses to a degenerate axis
                if result.upper[i] < result.lower[i] {
                    result.upper[i] = result.lower[i];
                }
            }
        }
        Some(result)
    }
}

/// Points inside any of the regions
#[derive(Debug)]
pub struct Union(pub Vec<Box<dyn Region>>);

impl Region for Union {
    fn contains(&self, point: &Point3<f64>) -> bool {
        self.0.iter().any(|r| r.contains(point))
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        // every member must be bounded for the union to be bounded
        let boxes = self
            .0
            .iter()
            .map(|r| r.bounding_box())
            .collect::<Option<Vec<BoundingBox>>>()?;
        let (first, rest) = boxes.split_first()?;
        Some(rest.iter().fold(*first, |acc, b| acc.union(b)))
    }
}
