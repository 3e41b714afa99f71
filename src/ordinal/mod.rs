//! Ordinals and trackers
//!
//! An [`Ordinal`] is a Dewey-decimal path (`0.3.0.1`) that orders every event
//! reported during a run. A [`Tracker`] hands out successive ordinals on one
//! thread and forks off fresh trackers for threads it spawns.
//!
//! ## Ordering
//!
//! Ordinals compare component by component; when one path is a prefix of the
//! other, the shorter one sorts first:
//!
//! ```text
//! 0.1  <  0.1.0  <  0.1.0.7  <  0.1.1  <  0.2
//! ```
//!
//! ## Forking
//!
//! `fork(p)` returns `(p.0, advance(p))`. Everything the new branch issues is
//! an extension of `p`, so it sorts after `p` and before `advance(p)`, which is
//! where the forking branch resumes.

mod tracker;

pub use tracker::Tracker;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised when building an ordinal from raw components
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrdinalError {
    #[error("Ordinal must have at least one component")]
    Empty,

    #[error("Negative component {value} at position {index}")]
    NegativeComponent { index: usize, value: i64 },

    #[error("Invalid component '{text}' at position {index}")]
    InvalidComponent { index: usize, text: String },
}

/// Position of an event in the total order of a run
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u64>", into = "Vec<u64>")]
pub struct Ordinal {
    components: Vec<u64>,
}

impl Ordinal {
    /// Baseline ordinal for a run: `[run_stamp, 0]`
    pub fn new(run_stamp: u64) -> Self {
        Self {
            components: vec![run_stamp, 0],
        }
    }

    /// Build an ordinal from an explicit path
    pub fn from_components(components: Vec<u64>) -> Result<Self, OrdinalError> {
        if components.is_empty() {
            return Err(OrdinalError::Empty);
        }
        Ok(Self { components })
    }

    /// Leading component, identifying the run
    pub fn run_stamp(&self) -> u64 {
        self.components[0]
    }

    pub fn components(&self) -> &[u64] {
        &self.components
    }

    /// Number of components in the path
    pub fn depth(&self) -> usize {
        self.components.len()
    }

    /// Next ordinal on the same branch.
    ///
    /// Increments the final component and leaves the rest untouched.
    ///
    /// # Panics
    ///
    /// Panics if the final component is already `u64::MAX`.
    pub fn advance(&self) -> Ordinal {
        match self.checked_advance() {
            Some(next) => next,
            None => panic!("ordinal component overflow at {self}"),
        }
    }

    /// Like [`Ordinal::advance`], but `None` when the final component is
    /// already `u64::MAX`
    pub fn checked_advance(&self) -> Option<Ordinal> {
        let mut components = self.components.clone();
        let last = components.len() - 1;
        components[last] = components[last].checked_add(1)?;
        Some(Ordinal { components })
    }

    /// First ordinal of a branch forked at this value.
    ///
    /// Always available, even when this value cannot be advanced.
    pub fn branch(&self) -> Ordinal {
        let mut components = Vec::with_capacity(self.components.len() + 1);
        components.extend_from_slice(&self.components);
        components.push(0);
        Ordinal { components }
    }

    /// Split into `(for_new_branch, for_continuing_branch)`.
    ///
    /// Both are strictly greater than `self`, and no chain of advances and
    /// forks starting from one ever reaches a value produced from the other.
    ///
    /// # Panics
    ///
    /// Panics if the final component is already `u64::MAX`, like
    /// [`Ordinal::advance`].
    pub fn fork(&self) -> (Ordinal, Ordinal) {
        (self.branch(), self.advance())
    }

    /// True when `other` extends this path, i.e. was issued on a branch forked
    /// from this exact value or one of its descendants.
    pub fn is_ancestor_of(&self, other: &Ordinal) -> bool {
        other.components.len() > self.components.len()
            && other.components.starts_with(&self.components)
    }
}

impl Ord for Ordinal {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.components.iter().zip(&other.components) {
            match a.cmp(b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        // Common prefix: the shorter path comes first
        self.components.len().cmp(&other.components.len())
    }
}

impl PartialOrd for Ordinal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Default for Ordinal {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Display for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for component in &self.components {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{component}")?;
            first = false;
        }
        Ok(())
    }
}

impl TryFrom<Vec<u64>> for Ordinal {
    type Error = OrdinalError;

    fn try_from(components: Vec<u64>) -> Result<Self, Self::Error> {
        Self::from_components(components)
    }
}

impl TryFrom<Vec<i64>> for Ordinal {
    type Error = OrdinalError;

    fn try_from(raw: Vec<i64>) -> Result<Self, Self::Error> {
        let components = raw
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                u64::try_from(value).map_err(|_| OrdinalError::NegativeComponent { index, value })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_components(components)
    }
}

impl From<Ordinal> for Vec<u64> {
    fn from(ordinal: Ordinal) -> Self {
        ordinal.components
    }
}

impl FromStr for Ordinal {
    type Err = OrdinalError;

    /// Accepts `0.2.1` as well as `[0, 2, 1]`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(trimmed)
            .trim();

        if inner.is_empty() {
            return Err(OrdinalError::Empty);
        }

        let components = inner
            .split(|c| c == '.' || c == ',')
            .enumerate()
            .map(|(index, part)| parse_component(index, part.trim()))
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_components(components)
    }
}

fn parse_component(index: usize, text: &str) -> Result<u64, OrdinalError> {
    if let Ok(value) = text.parse::<u64>() {
        return Ok(value);
    }
    match text.parse::<i64>() {
        Ok(value) if value < 0 => Err(OrdinalError::NegativeComponent { index, value }),
        _ => Err(OrdinalError::InvalidComponent {
            index,
            text: text.to_string(),
        }),
    }
}
