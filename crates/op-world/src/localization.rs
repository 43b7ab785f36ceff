//! The per-tick localization pass: places an agent's reference point and
//! bounding-box perimeter onto the road network and derives which lanes it
//! currently occupies.
//!
//! The search walks sections in road order rather than every lane's own
//! geometry individually (unlike the upstream point locator's per-lane
//! walkers), which keeps the resume/full-scan bookkeeping in one place.
//! Once a point lands in some element, the budget in
//! [`steps_after_first_hit`](LocateResult) bounds how much further we keep
//! scanning before giving up on the rest: a curved road's `s` coordinate can
//! advance faster than Euclidean distance, so the budget includes a buffer
//! factor rather than a tight bound on `max_distance`.

use std::collections::BTreeSet;

use op_core::{LaneId, RoadId, SectionId, Vector2d};

use crate::error::LocalizationError;
use crate::geometry::bounding_box;
use crate::network::RoadNetwork;
use crate::object::WorldObject;

/// Spacing between perimeter sample points, matching the reference model's
/// boundary sampling density.
const PERIMETER_SAMPLE_SPACING: f64 = 6.0;

/// Buffer multiplier applied to the step budget to compensate for curved
/// sections where `s` outpaces Euclidean distance.
const STEP_BUDGET_BUFFER: f64 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointType {
    Reference,
    CornerFrontLeft,
    CornerFrontRight,
    CornerRearLeft,
    CornerRearRight,
    MainLaneLocator,
    Boundary,
}

#[derive(Clone, Copy, Debug)]
pub struct SearchablePoint {
    pub position: Vector2d,
    pub heading: f64,
    pub point_type: PointType,
}

/// A point that was successfully placed onto the network.
#[derive(Clone, Copy, Debug)]
pub struct LocatedPoint {
    pub road: RoadId,
    pub lane: LaneId,
    pub s: f64,
    pub t: f64,
    pub heading: f64,
}

/// Accumulates located points across a search and tracks which lanes were
/// touched, for the caller to classify and project back onto the agent.
#[derive(Clone, Debug, Default)]
pub struct PointAggregator {
    found: Vec<(PointType, LocatedPoint)>,
    touched_lanes: BTreeSet<LaneId>,
}

impl PointAggregator {
    fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, point_type: PointType, located: LocatedPoint) {
        self.touched_lanes.insert(located.lane);
        self.found.push((point_type, located));
    }

    pub fn get(&self, point_type: PointType) -> Option<&LocatedPoint> {
        self.found
            .iter()
            .find(|(t, _)| *t == point_type)
            .map(|(_, p)| p)
    }

    pub fn reference(&self) -> Option<&LocatedPoint> {
        self.get(PointType::Reference)
    }

    pub fn main_lane(&self) -> Option<&LocatedPoint> {
        self.get(PointType::MainLaneLocator)
    }

    pub fn touched_lanes(&self) -> &BTreeSet<LaneId> {
        &self.touched_lanes
    }

    pub fn found_points(&self) -> impl Iterator<Item = (PointType, &LocatedPoint)> {
        self.found.iter().map(|(t, p)| (*t, p))
    }
}

/// How an agent's bounding box relates to the lanes it touched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamKind {
    /// Every sampled point landed in the same lane.
    Single,
    /// Points landed in more than one lane, all mutual stream neighbors of
    /// each other within their section (a normal lane-straddling position).
    Neighbours,
    /// No point landed in any lane.
    Empty,
}

pub struct LocateResult {
    pub aggregator: PointAggregator,
    /// Section of the last successful hit, to resume from next tick.
    pub next_initializer: Option<SectionId>,
    pub stream_kind: StreamKind,
}

/// Sample an agent's closed 5-point bounding box into the reference point,
/// its four corners, the midpoint of the front corners (the main-lane
/// locator), and evenly spaced boundary points along each edge.
pub fn searchable_points(object: &WorldObject) -> Vec<SearchablePoint> {
    let corners = bounding_box(
        object.position.x,
        object.position.y,
        object.vehicle.length,
        object.vehicle.width,
        object.yaw,
        object.vehicle.length,
    );
    let mut points = vec![SearchablePoint {
        position: object.position,
        heading: object.yaw,
        point_type: PointType::Reference,
    }];

    let corner_types = [
        PointType::CornerRearRight,
        PointType::CornerRearLeft,
        PointType::CornerFrontLeft,
        PointType::CornerFrontRight,
    ];
    for i in 0..4 {
        points.push(SearchablePoint {
            position: corners[i],
            heading: object.yaw,
            point_type: corner_types[i],
        });
        let edge = corners[i + 1] - corners[i];
        let edge_len = edge.length();
        let steps = (edge_len / PERIMETER_SAMPLE_SPACING).floor() as usize;
        for step in 1..steps.max(1) {
            if (step as f64) * PERIMETER_SAMPLE_SPACING >= edge_len {
                break;
            }
            let t = (step as f64) * PERIMETER_SAMPLE_SPACING / edge_len;
            points.push(SearchablePoint {
                position: corners[i] + edge * t,
                heading: object.yaw,
                point_type: PointType::Boundary,
            });
        }
    }

    let front_left = corners[2];
    let front_right = corners[3];
    points.push(SearchablePoint {
        position: Vector2d::new(
            (front_left.x + front_right.x) / 2.0,
            (front_left.y + front_right.y) / 2.0,
        ),
        heading: object.yaw,
        point_type: PointType::MainLaneLocator,
    });

    points
}

/// Step budget after the first hit in a section: bounds how long we keep
/// scanning once we've found something, since curved roads advance `s`
/// faster than Euclidean distance.
fn max_steps_after_first_hit(network: &RoadNetwork, section: &crate::network::Section, max_distance: f64) -> usize {
    let lanes_in_section = section.lanes.len().max(1);
    let joint_distance = section
        .lanes
        .first()
        .and_then(|id| network.lane(*id))
        .and_then(|lane| {
            if lane.elements.len() >= 2 {
                Some((lane.elements[1].s_offset - lane.elements[0].s_offset).abs())
            } else {
                lane.elements
                    .first()
                    .map(|e| (e.next_left - e.current_left).length())
            }
        })
        .filter(|d| *d > 1e-6)
        .unwrap_or(1.0);

    ((max_distance / joint_distance * STEP_BUDGET_BUFFER).ceil() as usize) * lanes_in_section
}

/// Sections to scan, in stream order, starting from `start` (or the whole
/// network in road order when `start` is `None`).
fn search_order(network: &RoadNetwork, start: Option<SectionId>) -> Vec<SectionId> {
    if let Some(start) = start {
        if let Some(section) = network.section(start) {
            if let Some(road) = network.road(section.road) {
                let position = road.sections.iter().position(|s| *s == start).unwrap_or(0);
                return road.sections[position..].to_vec();
            }
        }
    }
    network
        .roads()
        .flat_map(|road| road.sections.iter().copied())
        .collect()
}

/// Scan `order` placing as many of `remaining` as possible, respecting the
/// per-section step budget once a hit has occurred anywhere in the scan.
fn scan_sections(
    network: &RoadNetwork,
    order: &[SectionId],
    remaining: &mut Vec<SearchablePoint>,
    aggregator: &mut PointAggregator,
    max_distance: f64,
) -> Option<SectionId> {
    let mut first_hit_section = None;
    let mut steps_after_first_hit = 0usize;
    let mut max_steps = usize::MAX;

    for section_id in order {
        if remaining.is_empty() {
            break;
        }
        let Some(section) = network.section(*section_id) else {
            continue;
        };
        if first_hit_section.is_some() {
            max_steps = max_steps_after_first_hit(network, section, max_distance);
        }

        for lane_id in &section.lanes {
            let Some(lane) = network.lane(*lane_id) else {
                continue;
            };
            for element in &lane.elements {
                if remaining.is_empty() {
                    break;
                }
                let mut i = 0;
                while i < remaining.len() {
                    if element.contains(remaining[i].position) {
                        let (s, t, heading) =
                            element.road_coordinate(remaining[i].position, remaining[i].heading);
                        aggregator.add(
                            remaining[i].point_type,
                            LocatedPoint {
                                road: section.road,
                                lane: lane.id,
                                s,
                                t,
                                heading,
                            },
                        );
                        if first_hit_section.is_none() {
                            first_hit_section = Some(section.id);
                        }
                        remaining.remove(i);
                    } else {
                        i += 1;
                    }
                }
                if first_hit_section.is_some() {
                    steps_after_first_hit += 1;
                    if steps_after_first_hit > max_steps {
                        return first_hit_section;
                    }
                }
            }
        }
    }

    first_hit_section
}

/// Group touched lanes by section and report whether any section has lanes
/// that are not mutual stream neighbors of one another — a sign the agent
/// straddles unrelated lanes rather than a normal multi-lane position.
pub fn is_crossing_lanes(network: &RoadNetwork, aggregator: &PointAggregator) -> bool {
    let mut by_section: std::collections::BTreeMap<SectionId, Vec<LaneId>> = Default::default();
    for lane_id in aggregator.touched_lanes() {
        if let Some(lane) = network.lane(*lane_id) {
            by_section.entry(lane.section).or_default().push(*lane_id);
        }
    }
    for lanes in by_section.values() {
        for i in 0..lanes.len() {
            for j in (i + 1)..lanes.len() {
                if !network.are_stream_neighbors(lanes[i], lanes[j]) {
                    return true;
                }
            }
        }
    }
    false
}

/// Locate `points` on `network`, resuming from `search_initializer` when
/// given. A quickstart that finds nothing degrades to a full network scan
/// within the same call, rather than failing the agent outright.
pub fn locate(
    network: &RoadNetwork,
    points: Vec<SearchablePoint>,
    search_initializer: Option<SectionId>,
    max_distance: f64,
) -> Result<LocateResult, LocalizationError> {
    let mut remaining = points.clone();
    let mut aggregator = PointAggregator::new();

    let quickstart_order = search_order(network, search_initializer);
    let mut next_initializer = scan_sections(
        network,
        &quickstart_order,
        &mut remaining,
        &mut aggregator,
        max_distance,
    );

    if aggregator.reference().is_none() && search_initializer.is_some() {
        remaining = points;
        aggregator = PointAggregator::new();
        let full_order = search_order(network, None);
        next_initializer = scan_sections(
            network,
            &full_order,
            &mut remaining,
            &mut aggregator,
            max_distance,
        );
    }

    if aggregator.reference().is_none() {
        return Err(LocalizationError::OffRoad);
    }
    if aggregator.main_lane().is_none() {
        return Err(LocalizationError::NotLocalizable);
    }

    let stream_kind = match aggregator.touched_lanes().len() {
        0 => StreamKind::Empty,
        1 => StreamKind::Single,
        _ => StreamKind::Neighbours,
    };

    Ok(LocateResult {
        aggregator,
        next_initializer,
        stream_kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::LaneGeometryElement;
    use crate::network::RoadNetworkBuilder;
    use crate::object::VehicleParameters;
    use op_core::AgentId;

    const TEST_AGENT: AgentId = AgentId(0);

    fn straight_element(s_offset: f64) -> LaneGeometryElement {
        LaneGeometryElement::new(
            Vector2d::new(s_offset, 1.75),
            Vector2d::new(s_offset, -1.75),
            Vector2d::new(s_offset, 0.0),
            Vector2d::new(s_offset + 10.0, 1.75),
            Vector2d::new(s_offset + 10.0, -1.75),
            Vector2d::new(1.0, 0.0),
            Vector2d::new(0.0, 1.0),
            s_offset,
            0.0,
        )
    }

    fn straight_network() -> RoadNetwork {
        let mut builder = RoadNetworkBuilder::new();
        let road = builder.add_road();
        let section = builder.add_section(road, 0.0);
        builder.add_lane(
            section,
            1,
            3.5,
            vec![straight_element(0.0), straight_element(10.0)],
        );
        builder.build()
    }

    fn agent_at(x: f64, y: f64) -> WorldObject {
        let mut obj = WorldObject::new(
            TEST_AGENT,
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
        obj.position = Vector2d::new(x, y);
        obj
    }

    #[test]
    fn locates_agent_centered_in_lane() {
        let network = straight_network();
        let agent = agent_at(5.0, 0.0);
        let points = searchable_points(&agent);
        let result = locate(&network, points, None, 50.0).expect("should localize");
        assert_eq!(result.stream_kind, StreamKind::Single);
        let reference = result.aggregator.reference().unwrap();
        assert!((reference.s - 5.0).abs() < 1e-6);
        assert!((reference.t - 0.0).abs() < 1e-6);
    }

    #[test]
    fn off_road_point_fails_to_localize() {
        let network = straight_network();
        let agent = agent_at(5.0, 100.0);
        let points = searchable_points(&agent);
        let err = locate(&network, points, None, 50.0).unwrap_err();
        assert_eq!(err, LocalizationError::OffRoad);
    }

    #[test]
    fn quickstart_degrades_to_full_scan() {
        let network = straight_network();
        let agent = agent_at(15.0, 0.0);
        let points = searchable_points(&agent);
        // A bogus initializer (section exists but the agent has actually
        // moved elsewhere) still finds the agent via the full-scan fallback.
        let bad_section = network.roads().next().unwrap().sections[0];
        let result = locate(&network, points, Some(bad_section), 50.0).expect("should localize");
        assert_eq!(result.stream_kind, StreamKind::Single);
    }
}
