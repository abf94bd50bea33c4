//! Search space: the speeds a search may try
//!
//! A space is an ordered list of dimensions, one per tuned actor. Each
//! dimension ranges over whole speeds from its lower bound to its inclusive
//! upper bound. A lower bound is either a fixed speed or `not_below` an
//! earlier dimension, which encodes "this actor is at least as fast as
//! that one" and turns the Cartesian product into a triangular enumeration.
//!
//! Candidates are produced in lexicographic order, first dimension
//! outermost: the order nested loops over the dimensions would visit them.
//!
//! # Example
//!
//! ```rust
//! use speed_tune_core_rs::search::{Dimension, LowerBound, SearchSpace};
//!
//! let space = SearchSpace::new(vec![
//!     Dimension::new("Slow", LowerBound::Fixed(1), 2),
//!     Dimension::new("Fast", LowerBound::NotBelow("Slow".to_string()), 3),
//! ]);
//!
//! let all: Vec<Vec<u32>> = space.candidates().unwrap().collect();
//! assert_eq!(all, vec![vec![1, 1], vec![1, 2], vec![1, 3], vec![2, 2], vec![2, 3]]);
//! assert_eq!(space.size().unwrap(), 5);
//! ```

use super::SearchError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::ops::RangeInclusive;

/// Lower bound of one dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LowerBound {
    /// Fixed minimum speed
    Fixed(u32),

    /// At least the value chosen for the named earlier dimension
    NotBelow(String),
}

/// One tuned actor's speed range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    /// Name of the tuned actor
    pub name: String,

    pub lower: LowerBound,

    /// Highest speed tried (inclusive)
    pub upper: u32,
}

impl Dimension {
    pub fn new(name: impl Into<String>, lower: LowerBound, upper: u32) -> Self {
        Self {
            name: name.into(),
            lower,
            upper,
        }
    }
}

/// Ordered dimensions of a speed-tune search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSpace {
    pub dimensions: Vec<Dimension>,
}

/// Lower bound resolved to a dimension index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Floor {
    Fixed(u32),
    Dimension(usize),
}

impl SearchSpace {
    pub fn new(dimensions: Vec<Dimension>) -> Self {
        Self { dimensions }
    }

    /// Dimension names in enumeration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.dimensions.iter().map(|d| d.name.as_str())
    }

    /// Index of the named dimension
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.dimensions.iter().position(|d| d.name == name)
    }

    /// Check names are unique, references point backwards, fixed ranges are non-empty
    pub fn validate(&self) -> Result<(), SearchError> {
        self.floors().map(|_| ())
    }

    fn floors(&self) -> Result<Vec<Floor>, SearchError> {
        if self.dimensions.is_empty() {
            return Err(SearchError::InvalidSpace(
                "at least one dimension is required".to_string(),
            ));
        }

        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut floors = Vec::with_capacity(self.dimensions.len());

        for (index, dim) in self.dimensions.iter().enumerate() {
            let floor = match &dim.lower {
                LowerBound::Fixed(min) => {
                    if *min > dim.upper {
                        return Err(SearchError::InvalidSpace(format!(
                            "'{}' has lower bound {} above upper bound {}",
                            dim.name, min, dim.upper
                        )));
                    }
                    Floor::Fixed(*min)
                }
                LowerBound::NotBelow(other) => match seen.get(other.as_str()) {
                    Some(&k) => Floor::Dimension(k),
                    None => {
                        return Err(SearchError::InvalidSpace(format!(
                            "'{}' must be not_below an earlier dimension, '{}' is not one",
                            dim.name, other
                        )))
                    }
                },
            };

            if seen.insert(dim.name.as_str(), index).is_some() {
                return Err(SearchError::InvalidSpace(format!(
                    "duplicate dimension '{}'",
                    dim.name
                )));
            }
            floors.push(floor);
        }

        Ok(floors)
    }

    /// Values of the first (outermost) dimension
    pub fn outer_values(&self) -> Result<RangeInclusive<u32>, SearchError> {
        let floors = self.floors()?;
        let min = match floors[0] {
            Floor::Fixed(min) => min,
            // Validation guarantees the first dimension cannot reference another
            Floor::Dimension(_) => 0,
        };
        Ok(min..=self.dimensions[0].upper)
    }

    /// Every candidate in enumeration order
    pub fn candidates(&self) -> Result<Candidates, SearchError> {
        Ok(Candidates::new(
            self.floors()?,
            self.dimensions.iter().map(|d| d.upper).collect(),
        ))
    }

    /// Candidates whose first dimension equals `outer`
    pub fn candidates_with_outer(&self, outer: u32) -> Result<Candidates, SearchError> {
        let mut floors = self.floors()?;
        let mut uppers: Vec<u32> = self.dimensions.iter().map(|d| d.upper).collect();
        let in_range = self.outer_values()?.contains(&outer);

        floors[0] = Floor::Fixed(outer);
        uppers[0] = outer;
        let mut candidates = Candidates::new(floors, uppers);
        if !in_range {
            candidates.state = State::Done;
        }
        Ok(candidates)
    }

    /// Exact number of candidates, without running any of them
    pub fn size(&self) -> Result<u64, SearchError> {
        let floors = self.floors()?;
        let n = floors.len();

        // needed[i]: earlier values that bounds at i or later depend on
        let mut needed: Vec<Vec<usize>> = vec![Vec::new(); n + 1];
        let mut refs = BTreeSet::new();
        for i in (0..n).rev() {
            if let Floor::Dimension(k) = floors[i] {
                refs.insert(k);
            }
            needed[i] = refs.iter().copied().filter(|&k| k < i).collect();
        }

        let counter = Counter {
            floors: &floors,
            uppers: self.dimensions.iter().map(|d| d.upper).collect(),
            needed,
        };
        let mut values = vec![0; n];
        let mut memo = HashMap::new();
        Ok(counter.count_from(0, &mut values, &mut memo))
    }
}

/// Memoized candidate counter
struct Counter<'a> {
    floors: &'a [Floor],
    uppers: Vec<u32>,
    needed: Vec<Vec<usize>>,
}

impl Counter<'_> {
    fn floor_at(&self, i: usize, values: &[u32]) -> u32 {
        match self.floors[i] {
            Floor::Fixed(min) => min,
            Floor::Dimension(k) => values[k],
        }
    }

    fn count_from(
        &self,
        i: usize,
        values: &mut [u32],
        memo: &mut HashMap<(usize, Vec<u32>), u64>,
    ) -> u64 {
        if i == self.floors.len() {
            return 1;
        }

        let key = (i, self.needed[i].iter().map(|&k| values[k]).collect::<Vec<_>>());
        if let Some(&count) = memo.get(&key) {
            return count;
        }

        let lo = self.floor_at(i, values);
        let hi = self.uppers[i];
        let mut total = 0u64;
        if lo <= hi {
            if i + 1 == self.floors.len() {
                total = u64::from(hi - lo) + 1;
            } else {
                for v in lo..=hi {
                    values[i] = v;
                    total = total.saturating_add(self.count_from(i + 1, values, memo));
                }
            }
        }

        memo.insert(key, total);
        total
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Fresh,
    Running,
    Done,
}

/// Lexicographic odometer over a search space
///
/// Yields one `Vec<u32>` per candidate, values in dimension order.
#[derive(Debug, Clone)]
pub struct Candidates {
    floors: Vec<Floor>,
    uppers: Vec<u32>,
    current: Vec<u32>,
    state: State,
}

impl Candidates {
    fn new(floors: Vec<Floor>, uppers: Vec<u32>) -> Self {
        let current = vec![0; floors.len()];
        Self {
            floors,
            uppers,
            current,
            state: State::Fresh,
        }
    }

    fn floor_at(&self, i: usize) -> u32 {
        match self.floors[i] {
            Floor::Fixed(min) => min,
            Floor::Dimension(k) => self.current[k],
        }
    }

    /// Bump the last position before `end` that has room; returns its index
    fn increment_before(&mut self, end: usize) -> Option<usize> {
        (0..end).rev().find(|&j| self.current[j] < self.uppers[j]).map(|j| {
            self.current[j] += 1;
            j
        })
    }

    /// Set positions `start..` to their floors, carrying past empty ranges
    fn fill_from(&mut self, start: usize) -> bool {
        let mut i = start;
        while i < self.floors.len() {
            let lo = self.floor_at(i);
            if lo <= self.uppers[i] {
                self.current[i] = lo;
                i += 1;
            } else {
                match self.increment_before(i) {
                    Some(j) => i = j + 1,
                    None => return false,
                }
            }
        }
        true
    }
}

impl Iterator for Candidates {
    type Item = Vec<u32>;

    fn next(&mut self) -> Option<Self::Item> {
        let positioned = match self.state {
            State::Done => false,
            State::Fresh => self.fill_from(0),
            State::Running => match self.increment_before(self.floors.len()) {
                Some(j) => self.fill_from(j + 1),
                None => false,
            },
        };

        if positioned {
            self.state = State::Running;
            Some(self.current.clone())
        } else {
            self.state = State::Done;
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn not_below(name: &str) -> LowerBound {
        LowerBound::NotBelow(name.to_string())
    }

    #[test]
    fn test_triangular_enumeration_matches_nested_loops() {
        let space = SearchSpace::new(vec![
            Dimension::new("a", LowerBound::Fixed(1), 2),
            Dimension::new("b", LowerBound::Fixed(3), 4),
            Dimension::new("c", not_below("b"), 5),
        ]);

        let mut expected = Vec::new();
        for a in 1..=2 {
            for b in 3..=4 {
                for c in b..=5 {
                    expected.push(vec![a, b, c]);
                }
            }
        }

        let got: Vec<Vec<u32>> = space.candidates().unwrap().collect();
        assert_eq!(got, expected);
        assert_eq!(space.size().unwrap(), expected.len() as u64);
    }

    #[test]
    fn test_empty_inner_range_carries_to_outer() {
        // b's range is empty whenever a > 3
        let space = SearchSpace::new(vec![
            Dimension::new("a", LowerBound::Fixed(2), 5),
            Dimension::new("b", not_below("a"), 3),
        ]);
        let got: Vec<Vec<u32>> = space.candidates().unwrap().collect();
        assert_eq!(got, vec![vec![2, 2], vec![2, 3], vec![3, 3]]);
        assert_eq!(space.size().unwrap(), 3);
    }

    #[test]
    fn test_candidates_with_outer_restricts_first_dimension() {
        let space = SearchSpace::new(vec![
            Dimension::new("a", LowerBound::Fixed(1), 3),
            Dimension::new("b", not_below("a"), 3),
        ]);
        let got: Vec<Vec<u32>> = space.candidates_with_outer(2).unwrap().collect();
        assert_eq!(got, vec![vec![2, 2], vec![2, 3]]);
        assert_eq!(space.candidates_with_outer(9).unwrap().count(), 0);
    }

    #[test]
    fn test_validation_errors() {
        let forward = SearchSpace::new(vec![
            Dimension::new("a", not_below("b"), 3),
            Dimension::new("b", LowerBound::Fixed(1), 3),
        ]);
        assert!(matches!(forward.validate(), Err(SearchError::InvalidSpace(_))));

        let inverted = SearchSpace::new(vec![Dimension::new("a", LowerBound::Fixed(5), 3)]);
        assert!(matches!(inverted.validate(), Err(SearchError::InvalidSpace(_))));

        let dup = SearchSpace::new(vec![
            Dimension::new("a", LowerBound::Fixed(1), 3),
            Dimension::new("a", LowerBound::Fixed(1), 3),
        ]);
        assert!(matches!(dup.validate(), Err(SearchError::InvalidSpace(_))));

        assert!(SearchSpace::new(vec![]).validate().is_err());
    }

    #[test]
    fn test_lower_bound_json_shape() {
        let dim: Dimension = serde_json::from_str(
            r#"{"name": "Ignatius", "lower": {"not_below": "Crypt King"}, "upper": 274}"#,
        )
        .unwrap();
        assert_eq!(dim.lower, not_below("Crypt King"));

        let dim: Dimension =
            serde_json::from_str(r#"{"name": "Renegade", "lower": {"fixed": 125}, "upper": 174}"#)
                .unwrap();
        assert_eq!(dim.lower, LowerBound::Fixed(125));
    }

    #[test]
    fn test_size_counts_without_enumerating() {
        // Five nested dimensions shaped like the spider-den search, narrowed
        let space = SearchSpace::new(vec![
            Dimension::new("rg", LowerBound::Fixed(148), 150),
            Dimension::new("ck", LowerBound::Fixed(255), 255),
            Dimension::new("ig", not_below("ck"), 255),
            Dimension::new("ch2", not_below("ig"), 300),
            Dimension::new("ch1", not_below("ch2"), 300),
        ]);
        assert_eq!(space.size().unwrap(), 3 * 1081);
        assert_eq!(space.candidates().unwrap().count(), 3 * 1081);
    }
}
