//! Birth/survival rule strings for life-like automata.
//!
//! Accepted forms are `B<digits>/S<digits>` and `S<digits>/B<digits>`.
//! Letters are case-insensitive, surrounding whitespace is ignored, and
//! digits run from 0 to 8. An empty string means Conway's `B3/S23`.

use cellsim_core::ConfigError;

/// Highest neighbor count a square Moore neighborhood can produce.
const MAX_COUNT: usize = 8;

/// Well-known rule strings.
pub mod presets {
    /// Conway's Game of Life.
    pub const LIFE: &str = "B3/S23";
    /// `HighLife`, which adds birth on six neighbors.
    pub const HIGH_LIFE: &str = "B36/S23";
    /// Seeds: every live cell dies each generation.
    pub const SEEDS: &str = "B2/S";
    /// Day & Night.
    pub const DAY_AND_NIGHT: &str = "B3678/S34678";
}

/// Neighbor counts that cause birth and survival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LifeRule {
    birth: [bool; MAX_COUNT + 1],
    survival: [bool; MAX_COUNT + 1],
}

impl Default for LifeRule {
    fn default() -> Self {
        Self::conway()
    }
}

impl LifeRule {
    /// Conway's `B3/S23`.
    pub const fn conway() -> Self {
        Self {
            birth: [false, false, false, true, false, false, false, false, false],
            survival: [false, false, true, true, false, false, false, false, false],
        }
    }

    /// Build a rule from explicit count lists. Counts above 8 are ignored.
    pub fn from_counts(birth: &[usize], survival: &[usize]) -> Self {
        let mut rule = Self {
            birth: [false; MAX_COUNT + 1],
            survival: [false; MAX_COUNT + 1],
        };
        for count in birth {
            if let Some(slot) = rule.birth.get_mut(*count) {
                *slot = true;
            }
        }
        for count in survival {
            if let Some(slot) = rule.survival.get_mut(*count) {
                *slot = true;
            }
        }
        rule
    }

    /// Parse a rule string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::RuleString`] for missing or repeated sections,
    /// unknown section letters, and digits that are not 0 through 8.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Self::conway());
        }
        let fail = |reason: &str| ConfigError::RuleString {
            rule: text.to_owned(),
            reason: reason.to_owned(),
        };

        let sections: Vec<&str> = trimmed.split('/').collect();
        let [first, second] = sections.as_slice() else {
            return Err(fail("expected exactly two sections separated by '/'"));
        };

        let mut birth: Option<Vec<usize>> = None;
        let mut survival: Option<Vec<usize>> = None;
        for section in [first, second] {
            let section = section.trim();
            let mut chars = section.chars();
            let letter = chars.next().map(|c| c.to_ascii_uppercase());
            let counts = parse_counts(chars.as_str()).map_err(|reason| fail(&reason))?;
            let target = match letter {
                Some('B') => &mut birth,
                Some('S') => &mut survival,
                _ => return Err(fail("each section must start with 'B' or 'S'")),
            };
            if target.is_some() {
                return Err(fail("section given twice"));
            }
            *target = Some(counts);
        }

        match (birth, survival) {
            (Some(birth), Some(survival)) => Ok(Self::from_counts(&birth, &survival)),
            _ => Err(fail("both a 'B' and an 'S' section are required")),
        }
    }

    /// Whether a dead cell with `count` live neighbors is born.
    pub fn births(&self, count: usize) -> bool {
        self.birth.get(count).copied().unwrap_or(false)
    }

    /// Whether a live cell with `count` live neighbors survives.
    pub fn survives(&self, count: usize) -> bool {
        self.survival.get(count).copied().unwrap_or(false)
    }
}

impl core::fmt::Display for LifeRule {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let digits = |set: &[bool]| -> String {
            set.iter()
                .zip('0'..='8')
                .filter_map(|(on, digit)| on.then_some(digit))
                .collect()
        };
        write!(f, "B{}/S{}", digits(&self.birth), digits(&self.survival))
    }
}

fn parse_counts(digits: &str) -> Result<Vec<usize>, String> {
    digits
        .chars()
        .map(|c| match c.to_digit(10) {
            Some(d) if d <= 8 => usize::try_from(d).map_err(|_e| format!("bad digit '{c}'")),
            Some(_) => Err(format!("neighbor count '{c}' is out of range 0-8")),
            None => Err(format!("'{c}' is not a digit")),
        })
        .collect()
}
