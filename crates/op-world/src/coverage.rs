//! Lateral remainder/coverage computation: for each lane an agent occupies,
//! how much lane width is left uncovered on its left and right.
//!
//! This is evaluated lazily, on demand, for whichever lane a caller actually
//! asks about — it is not part of the localization pass itself, matching
//! the reference model's split between locating points and later asking
//! "how much room is left on this lane".

use std::collections::BTreeMap;

use op_core::LaneId;

use crate::localization::{PointAggregator, PointType};
use crate::network::RoadNetwork;

/// Lateral margin between an agent's silhouette and a lane's two edges.
/// A remainder of `0.0` means the agent's edge coincides with (or exceeds)
/// the lane boundary on that side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coverage {
    pub remainder_left: f64,
    pub remainder_right: f64,
}

/// `true` if the agent's heading roughly follows the lane's stream
/// direction rather than running against it — determines whether a
/// missing front/rear corner reads as a missing left or right edge.
fn is_aligned(aggregator: &PointAggregator) -> bool {
    aggregator
        .reference()
        .map(|p| p.heading.cos() >= 0.0)
        .unwrap_or(true)
}

fn missing(aggregator: &PointAggregator, point_type: PointType) -> bool {
    aggregator.get(point_type).is_none()
}

fn missing_whole_diagonal(aggregator: &PointAggregator) -> bool {
    (missing(aggregator, PointType::CornerFrontLeft) && missing(aggregator, PointType::CornerRearRight))
        || (missing(aggregator, PointType::CornerFrontRight) && missing(aggregator, PointType::CornerRearLeft))
}

fn missing_left(aggregator: &PointAggregator) -> bool {
    missing(aggregator, PointType::CornerFrontLeft) || missing(aggregator, PointType::CornerRearLeft)
}

fn missing_right(aggregator: &PointAggregator) -> bool {
    missing(aggregator, PointType::CornerFrontRight) || missing(aggregator, PointType::CornerRearRight)
}

/// Closest approach, among the boundary points that landed in `lane`, to
/// each of its two edges.
fn remainder_for_lane(network: &RoadNetwork, lane: LaneId, aggregator: &PointAggregator) -> Option<Coverage> {
    let width = network.lane(lane)?.width;
    let half_width = width / 2.0;

    let mut remainder_left = f64::MAX;
    let mut remainder_right = f64::MAX;
    let mut found_any = false;

    for (_, point) in aggregator
        .found_points()
        .filter(|(_, point)| point.lane == lane)
    {
        found_any = true;
        remainder_left = remainder_left.min(half_width - point.t);
        remainder_right = remainder_right.min(half_width + point.t);
    }

    found_any.then_some(Coverage {
        remainder_left,
        remainder_right,
    })
}

/// Coverage for every lane the agent touched, keyed by lane id.
///
/// When corners diagonally opposite each other are both missing (the agent
/// is known to span past both edges of the lane but we have no sample
/// point to measure the margin precisely), the lane is reported as fully
/// covered rather than left unresolved — matching the reference model's
/// `FullCoverage` degradation.
pub fn compute(network: &RoadNetwork, aggregator: &PointAggregator) -> BTreeMap<LaneId, Coverage> {
    let aligned = is_aligned(aggregator);
    let full_coverage = missing_whole_diagonal(aggregator);
    let (left_missing, right_missing) = if aligned {
        (missing_left(aggregator), missing_right(aggregator))
    } else {
        (missing_right(aggregator), missing_left(aggregator))
    };

    let mut result = BTreeMap::new();
    for lane in aggregator.touched_lanes() {
        let Some(measured) = remainder_for_lane(network, *lane, aggregator) else {
            continue;
        };
        let coverage = if full_coverage {
            Coverage {
                remainder_left: 0.0,
                remainder_right: 0.0,
            }
        } else if left_missing {
            Coverage {
                remainder_left: 0.0,
                remainder_right: measured.remainder_right,
            }
        } else if right_missing {
            Coverage {
                remainder_left: measured.remainder_left,
                remainder_right: 0.0,
            }
        } else {
            measured
        };
        result.insert(*lane, coverage);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::LaneGeometryElement;
    use crate::localization::{locate, searchable_points};
    use crate::network::RoadNetworkBuilder;
    use crate::object::{VehicleParameters, WorldObject};
    use op_core::{AgentId, Vector2d};

    fn straight_element(s_offset: f64) -> LaneGeometryElement {
        LaneGeometryElement::new(
            Vector2d::new(s_offset, 1.75),
            Vector2d::new(s_offset, -1.75),
            Vector2d::new(s_offset, 0.0),
            Vector2d::new(s_offset + 20.0, 1.75),
            Vector2d::new(s_offset + 20.0, -1.75),
            Vector2d::new(1.0, 0.0),
            Vector2d::new(0.0, 1.0),
            s_offset,
            0.0,
        )
    }

    #[test]
    fn centered_agent_has_symmetric_remainder() {
        let mut builder = RoadNetworkBuilder::new();
        let road = builder.add_road();
        let section = builder.add_section(road, 0.0);
        let lane = builder.add_lane(section, 1, 3.5, vec![straight_element(0.0)]);
        let network = builder.build();

        let mut agent = WorldObject::new(
            AgentId(0),
            VehicleParameters {
                length: 4.5,
                width: 1.8,
                weight: 1500.0,
                wheelbase: 2.7,
                distance_cog_to_front_axle: 1.3,
                track_width: 1.6,
                friction_coeff: 1.0,
            },
        );
        agent.position = Vector2d::new(10.0, 0.0);
        let points = searchable_points(&agent);
        let result = locate(&network, points, None, 50.0).unwrap();

        let coverage = compute(&network, &result.aggregator);
        let lane_coverage = coverage.get(&lane).expect("lane should have coverage");
        assert!((lane_coverage.remainder_left - lane_coverage.remainder_right).abs() < 1e-6);
        assert!(lane_coverage.remainder_left > 0.0);
    }
}
