//! A* search over the jump-lane graph (§4.6). Lane weight is uniform
//! (1 hop) except that `Restricted` lanes are excluded entirely for
//! movers that cannot cross them; the caller decides that via
//! `can_cross_restricted`.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use ec4x_common::entities::system::{HexCoord, LaneClass};
use ec4x_common::ids::SystemId;
use ec4x_common::store::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    cost: u32,
    node: SystemId,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.cmp(&self.cost).then_with(|| self.node.raw().cmp(&other.node.raw()))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn heuristic(state: &GameState, a: SystemId, b: SystemId) -> u32 {
    match (state.system(a), state.system(b)) {
        (Some(sa), Some(sb)) => sa.coord.distance(&sb.coord),
        _ => 0,
    }
}

/// Returns the shortest lane-hop path from `from` to `to` inclusive of
/// both endpoints, or `None` if no path exists under the given crossing
/// rule. Deterministic: ties are broken by ascending `SystemId` so the
/// result never depends on `BTreeMap`/`HashMap` iteration order.
pub fn shortest_path(
    state: &GameState,
    from: SystemId,
    to: SystemId,
    can_cross_restricted: bool,
) -> Option<Vec<SystemId>> {
    if from == to {
        return Some(vec![from]);
    }

    let mut open = BinaryHeap::new();
    let mut g_score: HashMap<SystemId, u32> = HashMap::new();
    let mut came_from: HashMap<SystemId, SystemId> = HashMap::new();

    g_score.insert(from, 0);
    open.push(Candidate { cost: heuristic(state, from, to), node: from });

    while let Some(Candidate { node, .. }) = open.pop() {
        if node == to {
            return Some(reconstruct(&came_from, node));
        }
        let current_g = *g_score.get(&node).unwrap_or(&u32::MAX);
        let Some(system) = state.system(node) else { continue };

        let mut neighbors: Vec<_> = system.adjacency.clone();
        neighbors.sort_by_key(|(id, _)| id.raw());

        for (neighbor, lane) in neighbors {
            if matches!(lane, LaneClass::Restricted) && !can_cross_restricted {
                continue;
            }
            let tentative = current_g + 1;
            if tentative < *g_score.get(&neighbor).unwrap_or(&u32::MAX) {
                g_score.insert(neighbor, tentative);
                came_from.insert(neighbor, node);
                open.push(Candidate { cost: tentative + heuristic(state, neighbor, to), node: neighbor });
            }
        }
    }
    None
}

fn reconstruct(came_from: &HashMap<SystemId, SystemId>, mut node: SystemId) -> Vec<SystemId> {
    let mut path = vec![node];
    while let Some(&prev) = came_from.get(&node) {
        path.push(prev);
        node = prev;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use ec4x_common::entities::system::{PlanetClass, System};
    use std::collections::BTreeMap;

    fn line_map(n: u64) -> BTreeMap<SystemId, System> {
        let mut systems = BTreeMap::new();
        for i in 0..n {
            let id = SystemId::from_raw(i);
            let mut adjacency = Vec::new();
            if i > 0 {
                adjacency.push((SystemId::from_raw(i - 1), LaneClass::Minor));
            }
            if i + 1 < n {
                adjacency.push((SystemId::from_raw(i + 1), LaneClass::Minor));
            }
            systems.insert(
                id,
                System {
                    id,
                    coord: HexCoord::new(i as i32, 0),
                    ring_index: i as u32,
                    planet_class: PlanetClass::Terran,
                    resource_rating: 1,
                    adjacency,
                },
            );
        }
        systems
    }

    #[test]
    fn finds_shortest_path_on_a_line() {
        let systems = line_map(5);
        let state = GameState::new(1, systems);
        let path = shortest_path(&state, SystemId::from_raw(0), SystemId::from_raw(4), true).unwrap();
        assert_eq!(path.len(), 5);
    }

    #[test]
    fn restricted_lane_blocks_movers_that_cannot_cross_it() {
        let mut systems = line_map(3);
        systems.get_mut(&SystemId::from_raw(1)).unwrap().adjacency =
            vec![(SystemId::from_raw(0), LaneClass::Restricted), (SystemId::from_raw(2), LaneClass::Restricted)];
        systems.get_mut(&SystemId::from_raw(0)).unwrap().adjacency = vec![(SystemId::from_raw(1), LaneClass::Restricted)];
        systems.get_mut(&SystemId::from_raw(2)).unwrap().adjacency = vec![(SystemId::from_raw(1), LaneClass::Restricted)];
        let state = GameState::new(1, systems);

        assert!(shortest_path(&state, SystemId::from_raw(0), SystemId::from_raw(2), false).is_none());
        assert!(shortest_path(&state, SystemId::from_raw(0), SystemId::from_raw(2), true).is_some());
    }
}
