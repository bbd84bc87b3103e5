//! Geometric points and the distance metric used throughout the crate.

use core::fmt;

use serde::{Deserialize, Serialize};

/// An immutable point in d-dimensional Euclidean space.
///
/// Points are the atoms of clustering: every cluster representative
/// (clustroid) is itself a `Point`, and both merge costs and nearest-cluster
/// lookups reduce to point-to-point distances. Dimensionality is fixed per
/// batch and validated at ingestion.
///
/// Serializes transparently as its coordinate array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Point {
    coords: Vec<f64>,
}

impl Point {
    /// Create a point from its coordinates.
    pub fn new(coords: Vec<f64>) -> Self {
        Self { coords }
    }

    /// Number of dimensions.
    pub fn dim(&self) -> usize {
        self.coords.len()
    }

    /// Coordinate slice.
    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    /// Euclidean distance to another point.
    ///
    /// Both points must have the same dimensionality; batch ingestion
    /// validates this, so a mismatch here is a programming error.
    pub fn distance(&self, other: &Point) -> f64 {
        debug_assert_eq!(self.coords.len(), other.coords.len());
        self.coords
            .iter()
            .zip(other.coords.iter())
            .map(|(a, b)| {
                let d = a - b;
                d * d
            })
            .sum::<f64>()
            .sqrt()
    }
}

impl From<Vec<f64>> for Point {
    fn from(coords: Vec<f64>) -> Self {
        Self::new(coords)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.coords.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Point::new(vec![0.0, 0.0]);
        let b = Point::new(vec![3.0, 4.0]);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
        assert!((b.distance(&a) - 5.0).abs() < 1e-12);
        assert_eq!(a.distance(&a), 0.0);
    }

    #[test]
    fn test_serde_transparent() {
        let p = Point::new(vec![1.0, -2.5]);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "[1.0,-2.5]");
        let back: Point = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_display() {
        let p = Point::new(vec![1.0, 2.0]);
        assert_eq!(p.to_string(), "(1, 2)");
    }
}
