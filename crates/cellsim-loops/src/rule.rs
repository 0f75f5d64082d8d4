//! Transition tables.
//!
//! A table is an ordered list of [`TransitionRule`]s. For each cell the
//! first rule whose `current` state matches and whose predicate holds over
//! the four cardinal neighbors fires; when none does the cell keeps its
//! state. Reads outside the grid see [`LoopState::Empty`], whatever edge
//! policy the grid was configured with.
//!
//! | Langton-style   | fires when                           |
//! |-----------------|--------------------------------------|
//! | head -> tail    | always                               |
//! | tail -> core    | always                               |
//! | core -> head    | exactly one head neighbor            |
//! | cap -> core     | any head neighbor                    |
//! | empty -> cap    | exactly one core neighbor            |
//! | empty -> sheath | a cap neighbor and a sheath neighbor |
//!
//! | Tempesti-style  | fires when                           |
//! |-----------------|--------------------------------------|
//! | head -> tail    | always                               |
//! | tail -> core    | always                               |
//! | core -> head    | a head neighbor and no tail neighbor |
//! | empty -> sheath | a core, head or tail neighbor        |

use cellsim_grid::Grid;
use cellsim_types::{LoopState, Position};
use serde::{Deserialize, Serialize};

/// North, east, south, west.
pub const CARDINALS: [(isize, isize); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

/// The four cardinal neighbor states of a cell, north first, clockwise.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Neighbors(pub [LoopState; 4]);

impl Neighbors {
    /// Read the neighbors of `position`.
    ///
    /// Coordinates past the boundary read as empty under every edge policy;
    /// a loop never sees wrapped or reflected cells.
    pub fn read(grid: &Grid<LoopState>, position: Position) -> Self {
        Self(CARDINALS.map(|(d_row, d_col)| {
            let row = position.row.checked_add_signed(d_row);
            let col = position.col.checked_add_signed(d_col);
            row.zip(col)
                .and_then(|(row, col)| grid.state_at(Position::new(row, col)))
                .unwrap_or_default()
        }))
    }

    /// How many neighbors are in `state`.
    pub fn count(&self, state: LoopState) -> usize {
        self.0.iter().filter(|neighbor| **neighbor == state).count()
    }

    /// Whether at least one neighbor is in `state`.
    pub fn has(&self, state: LoopState) -> bool {
        self.0.contains(&state)
    }
}

/// One row of a transition table.
#[derive(Debug, Clone, Copy)]
pub struct TransitionRule {
    /// State the cell must be in.
    pub current: LoopState,
    /// State the cell moves to.
    pub next: LoopState,
    /// Condition over the cardinal neighbors.
    pub predicate: fn(&Neighbors) -> bool,
}

impl TransitionRule {
    /// Whether this rule fires for a cell in `current` with `neighbors`.
    pub fn fires(&self, current: LoopState, neighbors: &Neighbors) -> bool {
        self.current == current && (self.predicate)(neighbors)
    }
}

/// Which transition table a loop runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopVariant {
    /// Signals extend a construction arm one cell per revolution.
    Langton,
    /// Direction-checked signals inside a self-repairing sheath.
    Tempesti,
}

impl LoopVariant {
    /// The variant's transition table, in firing priority order.
    pub const fn rules(self) -> &'static [TransitionRule] {
        match self {
            Self::Langton => &LANGTON,
            Self::Tempesti => &TEMPESTI,
        }
    }

    /// Whether the seed carries a construction arm.
    pub const fn grows(self) -> bool {
        matches!(self, Self::Langton)
    }
}

/// Apply the first matching rule of `rules`, or keep `current`.
pub fn next_state(
    rules: &[TransitionRule],
    current: LoopState,
    neighbors: &Neighbors,
) -> LoopState {
    rules
        .iter()
        .find(|rule| rule.fires(current, neighbors))
        .map_or(current, |rule| rule.next)
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

static LANGTON: [TransitionRule; 6] = [
    TransitionRule {
        current: LoopState::Head,
        next: LoopState::Tail,
        predicate: always,
    },
    TransitionRule {
        current: LoopState::Tail,
        next: LoopState::Core,
        predicate: always,
    },
    TransitionRule {
        current: LoopState::Core,
        next: LoopState::Head,
        predicate: single_head,
    },
    TransitionRule {
        current: LoopState::Cap,
        next: LoopState::Core,
        predicate: any_head,
    },
    TransitionRule {
        current: LoopState::Empty,
        next: LoopState::Cap,
        predicate: single_core,
    },
    TransitionRule {
        current: LoopState::Empty,
        next: LoopState::Sheath,
        predicate: beside_cap,
    },
];

static TEMPESTI: [TransitionRule; 4] = [
    TransitionRule {
        current: LoopState::Head,
        next: LoopState::Tail,
        predicate: always,
    },
    TransitionRule {
        current: LoopState::Tail,
        next: LoopState::Core,
        predicate: always,
    },
    TransitionRule {
        current: LoopState::Core,
        next: LoopState::Head,
        predicate: head_without_tail,
    },
    TransitionRule {
        current: LoopState::Empty,
        next: LoopState::Sheath,
        predicate: exposed_conductor,
    },
];

const fn always(_: &Neighbors) -> bool {
    true
}

fn single_head(neighbors: &Neighbors) -> bool {
    neighbors.count(LoopState::Head) == 1
}

fn any_head(neighbors: &Neighbors) -> bool {
    neighbors.has(LoopState::Head)
}

fn single_core(neighbors: &Neighbors) -> bool {
    neighbors.count(LoopState::Core) == 1
}

fn beside_cap(neighbors: &Neighbors) -> bool {
    neighbors.has(LoopState::Cap) && neighbors.has(LoopState::Sheath)
}

// Direction comes from the tail: the cell behind a head is never eligible.
fn head_without_tail(neighbors: &Neighbors) -> bool {
    neighbors.has(LoopState::Head) && !neighbors.has(LoopState::Tail)
}

fn exposed_conductor(neighbors: &Neighbors) -> bool {
    [LoopState::Core, LoopState::Head, LoopState::Tail]
        .into_iter()
        .any(|state| neighbors.has(state))
}
