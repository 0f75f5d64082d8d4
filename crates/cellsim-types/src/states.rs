//! Cell state alphabets for each model family.
//!
//! Every model declares a closed, ordered set of states. The [`CellState`]
//! trait exposes the integer code and display name of each state along with
//! its default color token, so collaborators can render or serialize a grid
//! without knowing which model produced it.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A member of a model's closed state alphabet.
pub trait CellState:
    Copy + Eq + Ord + core::hash::Hash + core::fmt::Debug + Default + 'static
{
    /// Every state in ascending code order.
    const ALL: &'static [Self];

    /// Integer code used in configuration files and state maps.
    fn code(self) -> i32;

    /// Human-readable state name.
    fn name(self) -> &'static str;

    /// Color token used when no override is configured.
    fn default_color(self) -> &'static str;

    /// Look up a state by its integer code.
    fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|state| state.code() == code)
    }
}

/// Generates a state enum together with its [`CellState`] implementation.
macro_rules! define_states {
    (
        $(#[$meta:meta])*
        $name:ident (default = $default:ident) {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $code:literal => ($label:literal, $color:literal)
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[serde(rename_all = "snake_case")]
        #[ts(export, export_to = "bindings/")]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl CellState for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn code(self) -> i32 {
                match self {
                    $(Self::$variant => $code,)+
                }
            }

            fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }

            fn default_color(self) -> &'static str {
                match self {
                    $(Self::$variant => $color,)+
                }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", CellState::name(*self))
            }
        }
    };
}

define_states! {
    /// States of Game of Life and other life-like automata.
    LifeState (default = Empty) {
        /// Dead cell.
        Empty = 0 => ("empty", "white"),
        /// Live cell.
        Alive = 1 => ("alive", "black"),
    }
}

define_states! {
    /// States of the spreading-fire forest model.
    FireState (default = Empty) {
        /// Bare ground that may regrow a tree.
        Empty = 0 => ("empty", "white"),
        /// Unburnt tree.
        Tree = 1 => ("tree", "green"),
        /// Tree that burns out on the next step.
        Burning = 2 => ("burning", "red"),
    }
}

define_states! {
    /// States of the Schelling segregation model.
    SegregationState (default = Empty) {
        /// Unoccupied house.
        Empty = 0 => ("empty", "white"),
        /// House occupied by a member of the first group.
        GroupA = 1 => ("group_a", "blue"),
        /// House occupied by a member of the second group.
        GroupB = 2 => ("group_b", "orange"),
    }
}

define_states! {
    /// Occupancy states of the sugarscape grid.
    SugarscapeState (default = Patch) {
        /// Resource patch with no agent on it.
        Patch = 0 => ("patch", "yellow"),
        /// Patch occupied by an agent.
        Agent = 1 => ("agent", "red"),
    }
}

define_states! {
    /// States of the self-replicating signal loops.
    LoopState (default = Empty) {
        /// Background.
        Empty = 0 => ("empty", "black"),
        /// Signal pathway.
        Core = 1 => ("core", "blue"),
        /// Protective wall around the pathway.
        Sheath = 2 => ("sheath", "red"),
        /// Leading edge of a signal.
        Head = 3 => ("head", "yellow"),
        /// Trailing edge of a signal.
        Tail = 4 => ("tail", "white"),
        /// Growth tip of the construction arm.
        Cap = 5 => ("cap", "green"),
    }
}
