//! Region geometry variants and the predicates the crossing detector uses.

use geo::coordinate_position::CoordPos;
use geo::{BoundingRect, Coord, CoordinatePosition, Intersects, Line, MultiPolygon, Polygon, Rect};
use serde::{Deserialize, Serialize};

/// How a track point touching only a region's boundary is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointPolicy {
    /// Interior or boundary contact both count.
    #[default]
    Inclusive,
    /// Only strict interior containment counts.
    Interior,
}

impl PointPolicy {
    const fn accepts(self, position: CoordPos) -> bool {
        match (self, position) {
            (_, CoordPos::Inside) | (Self::Inclusive, CoordPos::OnBoundary) => true,
            (Self::Interior, CoordPos::OnBoundary) | (_, CoordPos::Outside) => false,
        }
    }
}

/// A region's polygonal footprint.
///
/// Predicates hold for a multi-polygon when they hold for any of its
/// constituent polygons.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionGeometry {
    /// A single polygon.
    Polygon(Polygon<f64>),
    /// Several disjoint polygons (islands, split counties).
    MultiPolygon(MultiPolygon<f64>),
}

impl RegionGeometry {
    /// The constituent polygons.
    #[must_use]
    pub fn polygons(&self) -> &[Polygon<f64>] {
        match self {
            Self::Polygon(polygon) => std::slice::from_ref(polygon),
            Self::MultiPolygon(multi) => &multi.0,
        }
    }

    /// Where a point (`lon`, `lat`) lies relative to the region.
    ///
    /// Inside wins over boundary, boundary wins over outside.
    #[must_use]
    pub fn locate(&self, lon: f64, lat: f64) -> CoordPos {
        let coord = Coord { x: lon, y: lat };
        let mut best = CoordPos::Outside;

        for polygon in self.polygons() {
            match polygon.coordinate_position(&coord) {
                CoordPos::Inside => return CoordPos::Inside,
                CoordPos::OnBoundary => best = CoordPos::OnBoundary,
                CoordPos::Outside => {}
            }
        }

        best
    }

    /// Whether a track point triggers a crossing under `policy`.
    #[must_use]
    pub fn touches_point(&self, lon: f64, lat: f64, policy: PointPolicy) -> bool {
        policy.accepts(self.locate(lon, lat))
    }

    /// Whether the segment between two (`lon`, `lat`) positions meets the
    /// region anywhere (crossing the boundary, touching it, or lying
    /// inside).
    #[must_use]
    pub fn intersects_segment(&self, from: (f64, f64), to: (f64, f64)) -> bool {
        let line = Line::new(
            Coord {
                x: from.0,
                y: from.1,
            },
            Coord { x: to.0, y: to.1 },
        );
        self.polygons().iter().any(|polygon| polygon.intersects(&line))
    }

    /// Bounding rectangle, `None` for an empty geometry.
    #[must_use]
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        match self {
            Self::Polygon(polygon) => polygon.bounding_rect(),
            Self::MultiPolygon(multi) => multi.bounding_rect(),
        }
    }
}
