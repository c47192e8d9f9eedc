//! A module for working with edges.

use std::{
    cmp::Ordering,
    hash::{Hash, Hasher},
};

/// An unordered pair of vertices. Edges carry no direction or weight; `(a, b)` and `(b, a)` are
/// the same edge.
#[derive(Clone, Copy, Debug, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge<T> {
    source: T,
    target: T,
}

impl<T> Edge<T> {
    /// Creates a new edge from two vertices.
    ///
    /// # Examples
    ///
    /// ```
    /// use erosion::edge::Edge;
    ///
    /// assert_eq!(Edge::new(1, 2), Edge::new(2, 1));
    /// ```
    pub fn new(source: T, target: T) -> Self {
        Self { source, target }
    }

    /// Returns the first endpoint, as given at construction.
    pub fn source(&self) -> &T {
        &self.source
    }

    /// Returns the second endpoint, as given at construction.
    pub fn target(&self) -> &T {
        &self.target
    }

    /// Consumes the edge, returning both endpoints.
    pub fn into_vertices(self) -> (T, T) {
        (self.source, self.target)
    }

    /// Returns whether both endpoints are the same vertex.
    pub fn is_loop(&self) -> bool
    where
        T: PartialEq,
    {
        self.source == self.target
    }
}

//
// Trait implementations
//

impl<T: PartialEq> PartialEq for Edge<T> {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (&self.source, &self.target);
        let (c, d) = (&other.source, &other.target);

        a == d && b == c || a == c && b == d
    }
}

impl<T: Hash + Ord> Hash for Edge<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let (a, b) = (&self.source, &self.target);

        // Hash the endpoints smallest first so (a, b) and (b, a) collide.
        match a.cmp(b) {
            Ordering::Greater => {
                b.hash(state);
                a.hash(state);
            }
            _ => {
                a.hash(state);
                b.hash(state);
            }
        }
    }
}

impl<T> From<(T, T)> for Edge<T> {
    fn from((source, target): (T, T)) -> Self {
        Self::new(source, target)
    }
}
