//! Where an agent moves.
//!
//! An agent looks along the four cardinal rays, up to `vision` cells each,
//! with every step resolved through the grid's edge strategy. A ray ends at
//! the first rejected coordinate. Candidates are the unoccupied cells seen
//! plus the agent's own cell. The richest candidate (sugar plus spice)
//! wins; ties go to the shorter distance, then to the earlier candidate in
//! scan order (own cell, then north, east, south, west, each outward).

use cellsim_grid::Grid;
use cellsim_types::{CellState, Position};

use crate::agent::{Agent, AgentRoster};
use crate::field::ResourceField;

/// Cardinal directions in scan order: north, east, south, west.
pub const CARDINALS: [(isize, isize); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

/// The distinct cells orthogonally adjacent to `position`, excluding the
/// cell itself (a mirror edge can reflect a neighbor back onto it).
pub fn cardinal_neighbors<S: CellState>(grid: &Grid<S>, position: Position) -> Vec<Position> {
    let mut neighbors: Vec<Position> = Vec::with_capacity(CARDINALS.len());
    for (d_row, d_col) in CARDINALS {
        if let Some(neighbor) = grid.offset(position, d_row, d_col) {
            if neighbor != position && !neighbors.contains(&neighbor) {
                neighbors.push(neighbor);
            }
        }
    }
    neighbors
}

/// A cell the agent could move to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// The cell.
    pub position: Position,
    /// Steps along the ray; zero for the agent's own cell.
    pub distance: u32,
    /// Sugar plus spice lying there.
    pub wealth: u32,
}

/// Every candidate cell for `agent`, in scan order.
pub fn candidates<S: CellState>(
    grid: &Grid<S>,
    field: &ResourceField,
    roster: &AgentRoster,
    agent: &Agent,
) -> Vec<Candidate> {
    let origin = agent.position;
    let mut seen = vec![Candidate {
        position: origin,
        distance: 0,
        wealth: field.wealth(origin),
    }];
    for (d_row, d_col) in CARDINALS {
        for distance in 1..=agent.vision {
            let Ok(steps) = isize::try_from(distance) else {
                break;
            };
            let (Some(row_step), Some(col_step)) =
                (d_row.checked_mul(steps), d_col.checked_mul(steps))
            else {
                break;
            };
            let Some(position) = grid.offset(origin, row_step, col_step) else {
                break;
            };
            if position == origin || roster.is_occupied(position) {
                continue;
            }
            if seen.iter().any(|candidate| candidate.position == position) {
                continue;
            }
            seen.push(Candidate {
                position,
                distance,
                wealth: field.wealth(position),
            });
        }
    }
    seen
}

/// The best candidate for `agent`: richest, then nearest, then first seen.
pub fn choose_destination<S: CellState>(
    grid: &Grid<S>,
    field: &ResourceField,
    roster: &AgentRoster,
    agent: &Agent,
) -> Position {
    let mut best: Option<Candidate> = None;
    for candidate in candidates(grid, field, roster, agent) {
        let better = best.is_none_or(|current| {
            candidate.wealth > current.wealth
                || (candidate.wealth == current.wealth && candidate.distance < current.distance)
        });
        if better {
            best = Some(candidate);
        }
    }
    best.map_or(agent.position, |candidate| candidate.position)
}

#[cfg(test)]
mod tests {
    use cellsim_types::{AgentId, CellShape, EdgePolicy, NeighborArrangement, Sex, SugarscapeState};

    use super::*;
    use crate::agent::AgentSeed;
    use crate::field::FieldCell;

    fn seed(row: usize, col: usize, vision: u32) -> AgentSeed {
        AgentSeed {
            position: Some(Position::new(row, col)),
            sugar: 5,
            spice: 5,
            vision,
            sugar_metabolism: 1,
            spice_metabolism: 1,
            sex: Sex::Female,
            fertile_ages: (1, 10),
            immune: Vec::new(),
            diseases: Vec::new(),
        }
    }

    /// A 5x5 field whose sugar equals the value in `layout`.
    fn field(layout: [[u32; 5]; 5]) -> ResourceField {
        let cells = layout
            .iter()
            .flatten()
            .map(|&sugar| FieldCell {
                sugar,
                sugar_capacity: sugar,
                spice: 0,
                spice_capacity: 0,
            })
            .collect();
        ResourceField::from_cells(5, 5, cells).unwrap()
    }

    fn grid(edge: EdgePolicy) -> Grid<SugarscapeState> {
        let mut grid = Grid::new(5, 5).unwrap();
        grid.configure(edge, CellShape::Square, NeighborArrangement::Cardinal)
            .unwrap();
        grid
    }

    #[test]
    fn richest_visible_cell_wins() {
        let field = field([
            [0, 0, 9, 0, 0],
            [0, 0, 0, 0, 0],
            [0, 0, 0, 3, 4],
            [0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0],
        ]);
        let mut roster = AgentRoster::new();
        let id = roster.spawn(seed(2, 2, 2), 5, 5).unwrap();
        let agent = roster.get(id).unwrap();
        let grid = grid(EdgePolicy::Bounded);
        assert_eq!(choose_destination(&grid, &field, &roster, agent), Position::new(0, 2));
    }

    #[test]
    fn ties_prefer_nearer_then_scan_order() {
        let field = field([
            [0, 0, 5, 0, 0],
            [0, 0, 0, 0, 0],
            [5, 0, 0, 5, 0],
            [0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0],
        ]);
        let mut roster = AgentRoster::new();
        let id = roster.spawn(seed(2, 2, 2), 5, 5).unwrap();
        let grid = grid(EdgePolicy::Bounded);
        let agent = roster.get(id).unwrap();
        assert_eq!(choose_destination(&grid, &field, &roster, agent), Position::new(2, 3));

        roster.spawn(seed(2, 3, 1), 5, 5).unwrap();
        let agent = roster.get(AgentId(0)).unwrap();
        // Nearer cell now occupied; north comes before west.
        assert_eq!(choose_destination(&grid, &field, &roster, agent), Position::new(0, 2));
    }

    #[test]
    fn bounded_rays_stop_at_the_edge_and_torus_wraps() {
        let field = field([
            [0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0],
            [7, 0, 0, 0, 0],
        ]);
        let mut roster = AgentRoster::new();
        let id = roster.spawn(seed(0, 0, 1), 5, 5).unwrap();
        let agent = roster.get(id).unwrap();
        assert_eq!(
            choose_destination(&grid(EdgePolicy::Bounded), &field, &roster, agent),
            Position::new(0, 0)
        );
        assert_eq!(
            choose_destination(&grid(EdgePolicy::Toroidal), &field, &roster, agent),
            Position::new(4, 0)
        );
    }

    #[test]
    fn mirror_neighbors_exclude_self() {
        let grid = grid(EdgePolicy::Mirror);
        let neighbors = cardinal_neighbors(&grid, Position::new(0, 0));
        assert_eq!(neighbors, vec![Position::new(0, 1), Position::new(1, 0)]);
    }
}
