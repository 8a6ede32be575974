//! Vertices of the marginal polytope and interior points inside it.

use serde::{Deserialize, Serialize};

/// A feasible complete outcome: one 0/1 entry per security.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vertex(Vec<u8>);

impl Vertex {
    /// Build a vertex from 0/1 entries. Any non-zero entry counts as 1.
    #[must_use]
    pub fn from_bits(bits: Vec<u8>) -> Self {
        Self(bits.into_iter().map(|b| u8::from(b != 0)).collect())
    }

    /// Build a vertex from a complete boolean assignment.
    #[must_use]
    pub fn from_assignment(values: &[bool]) -> Self {
        Self(values.iter().map(|&v| u8::from(v)).collect())
    }

    /// Round a relaxed point to the nearest binary vector (ties go to 1).
    #[must_use]
    pub fn round(point: &[f64]) -> Self {
        Self(point.iter().map(|&x| u8::from(x >= 0.5)).collect())
    }

    /// Number of coordinates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the vertex has no coordinates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw 0/1 entries.
    #[must_use]
    pub fn bits(&self) -> &[u8] {
        &self.0
    }

    /// Coordinate `i` as a float.
    #[must_use]
    pub fn coord(&self, i: usize) -> f64 {
        f64::from(self.0[i])
    }

    /// The vertex as a point in R^n.
    #[must_use]
    pub fn to_point(&self) -> Vec<f64> {
        self.0.iter().map(|&b| f64::from(b)).collect()
    }

    /// Inner product with a dense vector.
    #[must_use]
    pub fn dot(&self, other: &[f64]) -> f64 {
        self.0
            .iter()
            .zip(other.iter())
            .map(|(&b, &x)| f64::from(b) * x)
            .sum()
    }
}

/// Insertion-ordered set of distinct vertices.
///
/// Deduplication is a linear scan; groups rarely exceed a few dozen
/// securities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexSet {
    vertices: Vec<Vertex>,
}

impl VertexSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `vertex` unless an identical one is present. Returns true if added.
    pub fn insert(&mut self, vertex: Vertex) -> bool {
        if self.contains(&vertex) {
            return false;
        }
        self.vertices.push(vertex);
        true
    }

    /// Whether an identical vertex is present.
    #[must_use]
    pub fn contains(&self, vertex: &Vertex) -> bool {
        self.vertices.iter().any(|v| v == vertex)
    }

    /// Number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Vertex> {
        self.vertices.iter()
    }

    /// Coordinate-wise mean of all vertices, `None` when empty.
    #[must_use]
    pub fn centroid(&self) -> Option<Vec<f64>> {
        let first = self.vertices.first()?;
        let mut sum = vec![0.0; first.len()];
        for vertex in &self.vertices {
            for (acc, &b) in sum.iter_mut().zip(vertex.bits()) {
                *acc += f64::from(b);
            }
        }
        let count = self.vertices.len() as f64;
        Some(sum.into_iter().map(|s| s / count).collect())
    }

    /// Vertex minimizing `<direction, v>`; the earliest one wins ties.
    #[must_use]
    pub fn argmin(&self, direction: &[f64]) -> Option<(&Vertex, f64)> {
        let mut best: Option<(&Vertex, f64)> = None;
        for vertex in &self.vertices {
            let value = vertex.dot(direction);
            match best {
                Some((_, current)) if value >= current => {}
                _ => best = Some((vertex, value)),
            }
        }
        best
    }
}

impl<'a> IntoIterator for &'a VertexSet {
    type Item = &'a Vertex;
    type IntoIter = std::slice::Iter<'a, Vertex>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A soft probability assignment strictly inside the unit cube.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginalPoint(Vec<f64>);

impl MarginalPoint {
    /// Clamp every coordinate of `values` into `[lower, upper]`.
    #[must_use]
    pub fn clamped(values: Vec<f64>, lower: f64, upper: f64) -> Self {
        Self(values.into_iter().map(|x| x.max(lower).min(upper)).collect())
    }

    /// Coordinates as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Consume into the coordinate vector.
    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }

    /// Convex combination `(1 - alpha) * self + alpha * vertex`.
    #[must_use]
    pub fn toward(&self, vertex: &Vertex, alpha: f64) -> Vec<f64> {
        self.0
            .iter()
            .zip(vertex.bits())
            .map(|(&m, &b)| (1.0 - alpha) * m + alpha * f64::from(b))
            .collect()
    }
}
