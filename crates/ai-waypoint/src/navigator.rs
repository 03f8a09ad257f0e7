use crate::heuristic::EuclideanHeuristic;
use crate::math::{NavPoint, Vec2};
use crate::WaypointGraph;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavPath<P = Vec2> {
    pub points: Vec<P>,
}

impl<P: NavPoint> NavPath<P> {
    pub fn new(points: Vec<P>) -> Self {
        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sum of segment lengths.
    pub fn length(&self) -> f32 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }
}

pub trait Navigator<P = Vec2> {
    fn find_path(&self, start: P, goal: P) -> Option<NavPath<P>>;

    /// Project a point onto the nearest navigable location.
    ///
    /// Backends that don't support projection may return `None`.
    fn nearest_point(&self, _point: P) -> Option<P> {
        None
    }
}

/// Allocating convenience over the scratch-reuse APIs; graphs without coordinates never yield a
/// path here.
impl<P: NavPoint> Navigator<P> for WaypointGraph<P> {
    fn find_path(&self, start: P, goal: P) -> Option<NavPath<P>> {
        let points = self
            .solve_position_path(start, goal, &EuclideanHeuristic)
            .ok()?;
        if points.is_empty() {
            None
        } else {
            Some(NavPath::new(points))
        }
    }

    fn nearest_point(&self, point: P) -> Option<P> {
        self.find_nearest_point(point).ok().flatten().map(|hit| hit.point)
    }
}
