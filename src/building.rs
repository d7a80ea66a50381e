//! Level layout of a building model: four corner nodes per slab and the heights between them.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{InputError, MissingDataError, ResponseError};
use crate::geometry::{Direction, Foundation, Level, NodeId, Point};
use crate::series::ensure_same_len;

/// Relative tolerance used when comparing supplied heights with coordinates.
const HEIGHT_TOLERANCE: f64 = 1.0e-6;

/// Order points by `(x, y)`.
fn plan_order(a: &Point, b: &Point) -> Ordering {
    a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
}

/// The four corner nodes of one level.
///
/// Corners are stored in plan order: `0 = (xmin, ymin)`, `1 = (xmin, ymax)`,
/// `2 = (xmax, ymin)` and `3 = (xmax, ymax)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoryNodes {
    /// Level index of the slab.
    level: Level,
    /// Corner node identifiers in plan order.
    nodes: [NodeId; 4],
    /// Corner coordinates in plan order.
    positions: [Point; 4],
}

impl StoryNodes {
    /// Group four corner nodes into a level, sorting them into plan order.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::DuplicateNode`] when a node appears twice.
    pub fn new(level: Level, mut corners: [(NodeId, Point); 4]) -> Result<Self, ResponseError> {
        corners.sort_by(|a, b| plan_order(&a.1, &b.1));
        let nodes = corners.map(|(node, _)| node);
        let mut seen = BTreeSet::new();
        if let Some(node) = nodes.iter().find(|node| !seen.insert(**node)) {
            return Err(InputError::DuplicateNode(*node).into());
        }
        Ok(Self {
            level,
            nodes,
            positions: corners.map(|(_, position)| position),
        })
    }

    /// Level index of the slab.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// Corner nodes in plan order.
    #[must_use]
    pub fn nodes(&self) -> &[NodeId; 4] {
        &self.nodes
    }

    /// Corner coordinates in plan order.
    #[must_use]
    pub fn positions(&self) -> &[Point; 4] {
        &self.positions
    }

    /// Mean elevation of the corners.
    #[must_use]
    pub fn elevation(&self) -> f64 {
        self.positions.iter().map(|p| p.z).sum::<f64>() / 4.0
    }

    /// Signed corner spacing used to turn vertical offsets into rotations.
    ///
    /// Along `X` this is `x0 - x2`, along `Y` it is `y0 - y1`.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::NonHorizontalDirection`] for `Z` and
    /// [`InputError::DegenerateCorners`] when the spacing is zero.
    pub fn spacing(&self, direction: Direction) -> Result<f64, ResponseError> {
        let partner = match direction {
            Direction::X => 2,
            Direction::Y => 1,
            Direction::Z => return Err(InputError::NonHorizontalDirection(direction).into()),
        };
        let spacing =
            self.positions[0].coordinate(direction) - self.positions[partner].coordinate(direction);
        if spacing == 0.0 || !spacing.is_finite() {
            return Err(InputError::DegenerateCorners {
                level: self.level,
                direction,
            }
            .into());
        }
        Ok(spacing)
    }
}

/// Stack of levels from the deepest sub-level up to the roof.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Building {
    /// Levels ordered from lowest to highest, contiguous and containing level 0.
    levels: Vec<StoryNodes>,
    /// `heights[k]` separates `levels[k]` and `levels[k + 1]`.
    heights: Vec<f64>,
    /// Soil-structure configuration of the run.
    foundation: Foundation,
}

impl Building {
    /// Assemble a building from level groups and explicit story heights.
    ///
    /// `heights[k]` is the distance between the `k`-th and `(k + 1)`-th lowest
    /// level. Each height must be positive and agree with the corner coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::InvalidInput`] when levels are not contiguous,
    /// share nodes, or the heights are invalid, and
    /// [`MissingDataError::Level`] when the base level is absent.
    pub fn new(mut levels: Vec<StoryNodes>, heights: Vec<f64>) -> Result<Self, ResponseError> {
        levels.sort_by_key(StoryNodes::level);
        if !levels.iter().any(|group| group.level() == 0) {
            return Err(MissingDataError::Level(0).into());
        }
        for pair in levels.windows(2) {
            if pair[1].level() != pair[0].level() + 1 {
                return Err(MissingDataError::Level(pair[0].level() + 1).into());
            }
        }

        let mut seen = BTreeSet::new();
        for node in levels.iter().flat_map(|group| group.nodes().iter()) {
            if !seen.insert(*node) {
                return Err(InputError::DuplicateNode(*node).into());
            }
        }

        ensure_same_len(levels.len() - 1, heights.len())?;
        for (pair, &supplied) in levels.windows(2).zip(&heights) {
            if !(supplied.is_finite() && supplied > 0.0) {
                return Err(InputError::NonPositiveHeight(supplied).into());
            }
            let measured = pair[1].elevation() - pair[0].elevation();
            if (supplied - measured).abs() > HEIGHT_TOLERANCE * supplied.abs().max(measured.abs()) {
                return Err(InputError::InconsistentHeight {
                    lower: pair[0].level(),
                    upper: pair[1].level(),
                    supplied,
                    measured,
                }
                .into());
            }
        }

        Ok(Self {
            levels,
            heights,
            foundation: Foundation::default(),
        })
    }

    /// Group nodes into levels by elevation and derive the heights between them.
    ///
    /// Nodes are sorted by `(z, x, y)` and taken four at a time, starting at
    /// level `-subs` and ending at level `stories`.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::NodeCount`] when the node count is not
    /// `4 * (stories + subs + 1)` and [`InputError::NonPositiveHeight`] when two
    /// consecutive levels share an elevation.
    ///
    /// # Examples
    /// ```
    /// use seismic_response::{point, Building, NodeId};
    ///
    /// let mut nodes = Vec::new();
    /// for level in 0..3u32 {
    ///     let z = 3.0 * f64::from(level);
    ///     for (k, (x, y)) in [(0.0, 0.0), (0.0, 8.0), (12.0, 0.0), (12.0, 8.0)].into_iter().enumerate() {
    ///         nodes.push((NodeId(10 * level + k as u32), point(x, y, z)));
    ///     }
    /// }
    /// let building = Building::from_coordinates(nodes, 2, 0)?;
    /// assert_eq!(building.roof(), 2);
    /// assert_eq!(building.height(1)?, 3.0);
    /// # Ok::<(), seismic_response::ResponseError>(())
    /// ```
    pub fn from_coordinates(
        coordinates: impl IntoIterator<Item = (NodeId, Point)>,
        stories: u32,
        subs: u32,
    ) -> Result<Self, ResponseError> {
        let out_of_range = || InputError::LevelRange { stories, subs };
        let lowest = -Level::try_from(subs).map_err(|_| out_of_range())?;
        Level::try_from(stories).map_err(|_| out_of_range())?;
        let expected = stories
            .checked_add(subs)
            .and_then(|count| count.checked_add(1))
            .and_then(|count| usize::try_from(count).ok())
            .and_then(|count| count.checked_mul(4))
            .ok_or_else(out_of_range)?;

        let mut nodes: Vec<(NodeId, Point)> = coordinates.into_iter().collect();
        if nodes.len() != expected {
            return Err(InputError::NodeCount {
                expected,
                found: nodes.len(),
            }
            .into());
        }
        nodes.sort_by(|a, b| a.1.z.total_cmp(&b.1.z).then(plan_order(&a.1, &b.1)));

        let levels = nodes
            .chunks_exact(4)
            .zip(lowest..)
            .map(|(chunk, level)| StoryNodes::new(level, [chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect::<Result<Vec<_>, _>>()?;
        let heights: Vec<f64> = levels
            .windows(2)
            .map(|pair| pair[1].elevation() - pair[0].elevation())
            .collect();
        debug!(levels = levels.len(), stories, subs, "grouped nodes into levels");
        Self::new(levels, heights)
    }

    /// Builder-style setter for the foundation configuration.
    #[must_use]
    pub fn with_foundation(mut self, foundation: Foundation) -> Self {
        self.foundation = foundation;
        self
    }

    /// Soil-structure configuration of the run.
    #[must_use]
    pub fn foundation(&self) -> Foundation {
        self.foundation
    }

    /// Levels from lowest to highest.
    #[must_use]
    pub fn levels(&self) -> &[StoryNodes] {
        &self.levels
    }

    /// Index of the deepest level, `0` without sub-levels.
    #[must_use]
    pub fn lowest(&self) -> Level {
        self.levels.first().map_or(0, StoryNodes::level)
    }

    /// Index of the roof level.
    #[must_use]
    pub fn roof(&self) -> Level {
        self.levels.last().map_or(0, StoryNodes::level)
    }

    /// Number of stories above the base.
    #[must_use]
    pub fn stories(&self) -> usize {
        self.roof().max(0) as usize
    }

    /// Position of `level` inside [`levels`](Self::levels).
    fn position(&self, level: Level) -> Result<usize, ResponseError> {
        level
            .checked_sub(self.lowest())
            .and_then(|offset| usize::try_from(offset).ok())
            .filter(|&index| index < self.levels.len())
            .ok_or_else(|| MissingDataError::Level(level).into())
    }

    /// Corner nodes of `level`.
    ///
    /// # Errors
    ///
    /// Returns [`MissingDataError::Level`] when the level is not modelled.
    pub fn level(&self, level: Level) -> Result<&StoryNodes, ResponseError> {
        Ok(&self.levels[self.position(level)?])
    }

    /// Height of the story between `lower` and `lower + 1`.
    ///
    /// # Errors
    ///
    /// Returns [`MissingDataError::Level`] when either level is not modelled.
    pub fn height(&self, lower: Level) -> Result<f64, ResponseError> {
        let index = self.position(lower)?;
        self.heights
            .get(index)
            .copied()
            .ok_or_else(|| MissingDataError::Level(lower.saturating_add(1)).into())
    }

    /// Story heights from the lowest level upward.
    #[must_use]
    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    /// Vertical distance from `lower` to `upper`, summed over the stories in between.
    ///
    /// # Errors
    ///
    /// Returns [`MissingDataError::Level`] when either level is not modelled.
    pub fn span(&self, lower: Level, upper: Level) -> Result<f64, ResponseError> {
        let (from, to) = (self.position(lower)?, self.position(upper)?);
        Ok(self.heights[from.min(to)..from.max(to)].iter().sum())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::point;

    /// Corner coordinates of a 12 m by 8 m plan at elevation `z`, deliberately unsorted.
    fn plan(first: u32, z: f64) -> Vec<(NodeId, Point)> {
        vec![
            (NodeId(first + 3), point(12.0, 8.0, z)),
            (NodeId(first), point(0.0, 0.0, z)),
            (NodeId(first + 2), point(12.0, 0.0, z)),
            (NodeId(first + 1), point(0.0, 8.0, z)),
        ]
    }

    fn tower(stories: u32, subs: u32) -> Vec<(NodeId, Point)> {
        (0..=stories + subs)
            .flat_map(|k| plan(10 * k, 3.0 * f64::from(k) - 3.0 * f64::from(subs)))
            .collect()
    }

    #[test]
    fn corners_are_sorted_into_plan_order() {
        let nodes = plan(0, 0.0);
        let group = StoryNodes::new(0, [nodes[0], nodes[1], nodes[2], nodes[3]]).expect("distinct");
        assert_eq!(group.nodes(), &[NodeId(0), NodeId(1), NodeId(2), NodeId(3)]);
        assert_eq!(group.spacing(Direction::X).expect("rectangle"), -12.0);
        assert_eq!(group.spacing(Direction::Y).expect("rectangle"), -8.0);
        assert!(group.spacing(Direction::Z).is_err());
    }

    #[test]
    fn levels_follow_elevation_including_sub_levels() {
        let building = Building::from_coordinates(tower(3, 2), 3, 2).expect("valid tower");
        assert_eq!(building.lowest(), -2);
        assert_eq!(building.roof(), 3);
        assert_eq!(building.stories(), 3);
        assert_eq!(building.levels().len(), 6);
        assert_eq!(building.level(-2).expect("modelled").nodes()[0], NodeId(0));
        assert_eq!(building.level(0).expect("modelled").nodes()[0], NodeId(20));
        assert_relative_eq!(building.level(0).expect("modelled").elevation(), 0.0);
        assert_relative_eq!(building.span(0, 3).expect("modelled"), 9.0);
        assert_relative_eq!(building.height(-1).expect("modelled"), 3.0);
    }

    #[test]
    fn missing_levels_are_reported() {
        let building = Building::from_coordinates(tower(2, 0), 2, 0).expect("valid tower");
        assert_eq!(building.level(5), Err(MissingDataError::Level(5).into()));
        assert_eq!(building.level(-1), Err(MissingDataError::Level(-1).into()));
        assert_eq!(building.height(2), Err(MissingDataError::Level(3).into()));
    }

    #[test]
    fn extreme_levels_are_missing_rather_than_overflowing() {
        let building = Building::from_coordinates(tower(1, 1), 1, 1).expect("valid tower");
        assert_eq!(building.level(Level::MAX), Err(MissingDataError::Level(Level::MAX).into()));
        assert_eq!(building.level(Level::MIN), Err(MissingDataError::Level(Level::MIN).into()));
        assert_eq!(building.height(Level::MAX), Err(MissingDataError::Level(Level::MAX).into()));
        assert_eq!(
            building.span(Level::MIN, 1),
            Err(MissingDataError::Level(Level::MIN).into())
        );
    }

    #[test]
    fn level_counts_beyond_the_index_range_are_rejected() {
        for (stories, subs) in [(u32::MAX, 0), (0, u32::MAX), (1, 1 << 31), (1 << 31, 1)] {
            assert_eq!(
                Building::from_coordinates(Vec::new(), stories, subs),
                Err(InputError::LevelRange { stories, subs }.into())
            );
        }
    }

    #[test]
    fn node_count_must_fill_every_level() {
        let mut nodes = tower(2, 0);
        nodes.pop();
        assert_eq!(
            Building::from_coordinates(nodes, 2, 0),
            Err(InputError::NodeCount {
                expected: 12,
                found: 11
            }
            .into())
        );
    }

    #[test]
    fn supplied_heights_must_match_coordinates() {
        let levels: Vec<StoryNodes> = (0..2)
            .map(|k| {
                let nodes = plan(10 * k, 3.0 * f64::from(k));
                StoryNodes::new(k as Level, [nodes[0], nodes[1], nodes[2], nodes[3]])
                    .expect("distinct")
            })
            .collect();
        assert!(Building::new(levels.clone(), vec![3.0]).is_ok());
        assert_eq!(
            Building::new(levels.clone(), vec![0.0]),
            Err(InputError::NonPositiveHeight(0.0).into())
        );
        assert!(matches!(
            Building::new(levels, vec![3.5]),
            Err(ResponseError::InvalidInput(InputError::InconsistentHeight { lower: 0, upper: 1, .. }))
        ));
    }

    #[test]
    fn flat_stacks_are_rejected() {
        let mut nodes = plan(0, 0.0);
        nodes.extend(plan(10, 0.0));
        assert_eq!(
            Building::from_coordinates(nodes, 1, 0),
            Err(InputError::NonPositiveHeight(0.0).into())
        );
    }
}
