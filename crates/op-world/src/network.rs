//! Arena-allocated road network: Roads contain Sections, Sections contain
//! Lanes, Lanes carry an ordered run of `LaneGeometryElement`s.
//!
//! All cross-references (a section's road, a lane's section, a lane's
//! left/right neighbor) are resolved as typed-id lookups against the arenas
//! below rather than raw pointers, so the graph can be cyclic (a lane's
//! neighbor may itself point back) without any borrow-checker friction.

use std::collections::HashMap;

use op_core::{LaneId, RoadId, SectionId};

use crate::geometry::LaneGeometryElement;

/// A single lane within a section: its geometry, its stream id (identifying
/// the maximal connected run of lanes along the road direction it belongs
/// to), and its section-local left/right neighbors.
#[derive(Clone, Debug)]
pub struct Lane {
    pub id: LaneId,
    pub section: SectionId,
    pub stream_id: u32,
    pub width: f64,
    pub left: Option<LaneId>,
    pub right: Option<LaneId>,
    pub elements: Vec<LaneGeometryElement>,
}

impl Lane {
    /// Arc-length range `[start, end)` this lane's geometry spans, relative
    /// to the lane's own start (not the section's).
    pub fn s_range(&self) -> Option<(f64, f64)> {
        let first = self.elements.first()?;
        let last = self.elements.last()?;
        let start = first.s_offset;
        let approx_len = (last.next_left - last.current_left).length();
        Some((start, last.s_offset + approx_len.max(0.0)))
    }
}

/// A cross-section of a road: an ordered set of lanes, left-to-right.
#[derive(Clone, Debug)]
pub struct Section {
    pub id: SectionId,
    pub road: RoadId,
    pub start_s: f64,
    pub lanes: Vec<LaneId>,
}

/// A road: an ordered run of sections from start to end.
#[derive(Clone, Debug, Default)]
pub struct Road {
    pub id: RoadId,
    pub sections: Vec<SectionId>,
}

/// The full road network: three parallel arenas (roads, sections, lanes)
/// addressed by typed id, plus a convenience index from lane id to its
/// section/road.
#[derive(Clone, Debug, Default)]
pub struct RoadNetwork {
    roads: Vec<Road>,
    sections: Vec<Section>,
    lanes: Vec<Lane>,
}

impl RoadNetwork {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn roads(&self) -> impl Iterator<Item = &Road> {
        self.roads.iter()
    }

    pub fn road(&self, id: RoadId) -> Option<&Road> {
        self.roads.get(id.index())
    }

    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.get(id.index())
    }

    pub fn lane(&self, id: LaneId) -> Option<&Lane> {
        self.lanes.get(id.index())
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// World-coordinate position and heading of arc length `s` along `lane`,
    /// the inverse of [`crate::geometry::LaneGeometryElement::road_coordinate`].
    ///
    /// Walks the lane's elements for the one `s` falls into (clamping to the
    /// first/last element when `s` is outside the lane's own range) and
    /// interpolates along its `s_axis` from `current_reference`.
    pub fn world_position(&self, lane: LaneId, s: f64) -> Option<(op_core::Vector2d, f64)> {
        let lane = self.lane(lane)?;
        let element = lane
            .elements
            .iter()
            .rfind(|element| element.s_offset <= s)
            .or_else(|| lane.elements.first())?;

        let mut axis = element.s_axis;
        axis.normalize();
        let position = element.current_reference + axis * (s - element.s_offset);
        Some((position, element.s_heading))
    }

    /// `true` iff two lanes are "stream neighbors": adjacent via an explicit
    /// section-local left/right link, and their s-ranges overlap over their
    /// full shared extent (a partial-overlap link, as at a fork or merge
    /// taper, does not count).
    pub fn are_stream_neighbors(&self, a: LaneId, b: LaneId) -> bool {
        let Some(lane_a) = self.lane(a) else {
            return false;
        };
        if lane_a.left != Some(b) && lane_a.right != Some(b) {
            return false;
        }
        let Some(lane_b) = self.lane(b) else {
            return false;
        };
        match (lane_a.s_range(), lane_b.s_range()) {
            (Some(ra), Some(rb)) => {
                let overlap_start = ra.0.max(rb.0);
                let overlap_end = ra.1.min(rb.1);
                overlap_start < overlap_end
                    && (overlap_end - overlap_start) >= (ra.1 - ra.0).min(rb.1 - rb.0) - 1e-6
            }
            _ => false,
        }
    }
}

/// Fluent builder for a `RoadNetwork`, matching the teacher's
/// `RoadNetworkBuilder` convention for assembling arena-backed graphs.
#[derive(Default)]
pub struct RoadNetworkBuilder {
    roads: Vec<Road>,
    sections: Vec<Section>,
    lanes: Vec<Lane>,
    lane_streams: HashMap<u32, Vec<LaneId>>,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_road(&mut self) -> RoadId {
        let id = RoadId::try_from(self.roads.len()).expect("road id overflow");
        self.roads.push(Road {
            id,
            sections: Vec::new(),
        });
        id
    }

    pub fn add_section(&mut self, road: RoadId, start_s: f64) -> SectionId {
        let id = SectionId::try_from(self.sections.len()).expect("section id overflow");
        self.sections.push(Section {
            id,
            road,
            start_s,
            lanes: Vec::new(),
        });
        self.roads[road.index()].sections.push(id);
        id
    }

    pub fn add_lane(
        &mut self,
        section: SectionId,
        stream_id: u32,
        width: f64,
        elements: Vec<LaneGeometryElement>,
    ) -> LaneId {
        let id = LaneId::try_from(self.lanes.len()).expect("lane id overflow");
        self.lanes.push(Lane {
            id,
            section,
            stream_id,
            width,
            left: None,
            right: None,
            elements,
        });
        self.sections[section.index()].lanes.push(id);
        self.lane_streams.entry(stream_id).or_default().push(id);
        id
    }

    /// Link two lanes as section-local left/right neighbors (symmetric).
    pub fn link_neighbors(&mut self, left: LaneId, right: LaneId) {
        self.lanes[left.index()].right = Some(right);
        self.lanes[right.index()].left = Some(left);
    }

    pub fn build(self) -> RoadNetwork {
        RoadNetwork {
            roads: self.roads,
            sections: self.sections,
            lanes: self.lanes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use op_core::Vector2d;

    fn one_element(s_offset: f64) -> LaneGeometryElement {
        LaneGeometryElement::new(
            Vector2d::new(s_offset, 1.0),
            Vector2d::new(s_offset, -1.0),
            Vector2d::new(s_offset, 0.0),
            Vector2d::new(s_offset + 10.0, 1.0),
            Vector2d::new(s_offset + 10.0, -1.0),
            Vector2d::new(1.0, 0.0),
            Vector2d::new(0.0, 1.0),
            s_offset,
            0.0,
        )
    }

    #[test]
    fn builder_links_lanes_and_sections() {
        let mut builder = RoadNetworkBuilder::new();
        let road = builder.add_road();
        let section = builder.add_section(road, 0.0);
        let left = builder.add_lane(section, 1, 3.75, vec![one_element(0.0)]);
        let right = builder.add_lane(section, 2, 3.75, vec![one_element(0.0)]);
        builder.link_neighbors(left, right);
        let network = builder.build();

        assert_eq!(network.lane(left).unwrap().right, Some(right));
        assert_eq!(network.lane(right).unwrap().left, Some(left));
        assert!(network.are_stream_neighbors(left, right));
    }
}
