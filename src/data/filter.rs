use std::collections::BTreeSet;

use super::model::Boat;

// ---------------------------------------------------------------------------
// Filter predicate parameters
// ---------------------------------------------------------------------------

pub const DEFAULT_YEAR_RANGE: (i64, i64) = (1990, 2026);
pub const DEFAULT_LENGTH_RANGE: (f64, f64) = (0.0, 100.0);

/// Active inclusion criteria. All criteria are AND-combined.
///
/// An empty builder or model set means "no constraint" (show all). Ranges
/// are inclusive on both ends; `lo <= hi` is the caller's responsibility.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub builders: BTreeSet<String>,
    pub models: BTreeSet<String>,
    pub year_range: (i64, i64),
    pub length_range: (f64, f64),
    pub include_sold: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            builders: BTreeSet::new(),
            models: BTreeSet::new(),
            year_range: DEFAULT_YEAR_RANGE,
            length_range: DEFAULT_LENGTH_RANGE,
            include_sold: false,
        }
    }
}

impl FilterState {
    /// Add the builder if absent, remove it otherwise.
    pub fn toggle_builder(&mut self, builder: &str) {
        if !self.builders.remove(builder) {
            self.builders.insert(builder.to_string());
        }
    }

    /// Add the model if absent, remove it otherwise.
    pub fn toggle_model(&mut self, model: &str) {
        if !self.models.remove(model) {
            self.models.insert(model.to_string());
        }
    }

    pub fn set_year_range(&mut self, lo: i64, hi: i64) {
        self.year_range = (lo, hi);
    }

    pub fn set_length_range(&mut self, lo: f64, hi: f64) {
        self.length_range = (lo, hi);
    }

    pub fn toggle_sold(&mut self) {
        self.include_sold = !self.include_sold;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether a single listing passes every active criterion.
    pub fn matches(&self, boat: &Boat) -> bool {
        if !self.builders.is_empty() && !self.builders.contains(&boat.builder) {
            return false;
        }
        if !self.models.is_empty() && !self.models.contains(&boat.model) {
            return false;
        }
        // Unknown year cannot satisfy a year range.
        match boat.year_built {
            Some(year) if year >= self.year_range.0 && year <= self.year_range.1 => {}
            _ => return false,
        }
        // Missing length counts as 0; NaN fails both comparisons.
        let length = boat.length.unwrap_or(0.0);
        if !(length >= self.length_range.0 && length <= self.length_range.1) {
            return false;
        }
        if !self.include_sold && boat.is_sold {
            return false;
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Filter engine
// ---------------------------------------------------------------------------

/// Return indices of listings that pass all active filters, in input order.
pub fn filtered_indices(boats: &[Boat], filters: &FilterState) -> Vec<usize> {
    boats
        .iter()
        .enumerate()
        .filter(|(_, boat)| filters.matches(boat))
        .map(|(i, _)| i)
        .collect()
}

/// Return the listings that pass all active filters, in input order.
pub fn filter_boats(boats: &[Boat], filters: &FilterState) -> Vec<Boat> {
    boats
        .iter()
        .filter(|boat| filters.matches(boat))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boat(id: &str, builder: &str, model: &str, year: i64, length: f64, price: f64, sold: bool) -> Boat {
        Boat {
            id: id.to_string(),
            builder: builder.to_string(),
            model: model.to_string(),
            year_built: Some(year),
            length: Some(length),
            price_eur: Some(price),
            is_sold: sold,
            ..Default::default()
        }
    }

    fn sample() -> Vec<Boat> {
        vec![
            boat("1", "A", "X", 2000, 10.0, 50_000.0, false),
            boat("2", "B", "Y", 2010, 20.0, 2_000_000.0, true),
            boat("3", "A", "Z", 1985, 8.0, 20_000.0, false),
            boat("4", "C", "W", 2020, 30.0, 900_000.0, false),
            boat("5", "B", "Y", 2015, 120.0, 9_000_000.0, false),
        ]
    }

    #[test]
    fn default_filter_excludes_sold_and_out_of_range() {
        let result = filtered_indices(&sample(), &FilterState::default());
        // 2 is sold, 3 is before 1990, 5 is longer than 100m
        assert_eq!(result, vec![0, 3]);
    }

    #[test]
    fn scenario_two_records_default_state() {
        let boats = vec![
            boat("1", "A", "X", 2000, 10.0, 50_000.0, false),
            boat("2", "B", "Y", 2010, 20.0, 2_000_000.0, true),
        ];
        let filtered = filter_boats(&boats, &FilterState::default());
        assert_eq!(filtered, vec![boats[0].clone()]);
    }

    #[test]
    fn builder_and_model_sets_constrain_when_non_empty() {
        let mut state = FilterState {
            include_sold: true,
            length_range: (0.0, 200.0),
            ..Default::default()
        };
        state.toggle_builder("B");
        assert_eq!(filtered_indices(&sample(), &state), vec![1, 4]);

        state.toggle_model("Y");
        state.set_year_range(2011, 2026);
        assert_eq!(filtered_indices(&sample(), &state), vec![4]);

        state.toggle_builder("B");
        assert!(state.builders.is_empty());
        state.toggle_model("Y");
        state.toggle_model("X");
        assert_eq!(filtered_indices(&sample(), &state), Vec::<usize>::new());
    }

    #[test]
    fn ranges_are_inclusive() {
        let state = FilterState {
            year_range: (2000, 2020),
            length_range: (10.0, 30.0),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&sample(), &state), vec![0, 3]);
    }

    #[test]
    fn missing_length_counts_as_zero() {
        let mut b = boat("1", "A", "X", 2000, 0.0, 1.0, false);
        b.length = None;
        let state = FilterState::default();
        assert!(state.matches(&b));
        let state = FilterState {
            length_range: (1.0, 100.0),
            ..Default::default()
        };
        assert!(!state.matches(&b));
    }

    #[test]
    fn missing_year_and_nan_length_are_excluded() {
        let mut no_year = boat("1", "A", "X", 2000, 10.0, 1.0, false);
        no_year.year_built = None;
        let nan_length = boat("2", "A", "X", 2000, f64::NAN, 1.0, false);
        let state = FilterState::default();
        assert!(!state.matches(&no_year));
        assert!(!state.matches(&nan_length));
    }

    #[test]
    fn every_result_satisfies_the_predicate_and_keeps_order() {
        let boats = sample();
        let state = FilterState {
            include_sold: true,
            length_range: (5.0, 150.0),
            ..Default::default()
        };
        let idx = filtered_indices(&boats, &state);
        assert!(idx.windows(2).all(|w| w[0] < w[1]));
        for i in &idx {
            assert!(state.matches(&boats[*i]));
        }
        for (i, b) in boats.iter().enumerate() {
            if !idx.contains(&i) {
                assert!(!state.matches(b));
            }
        }
    }

    #[test]
    fn filtering_is_idempotent() {
        let boats = sample();
        let state = FilterState {
            include_sold: true,
            ..Default::default()
        };
        let once = filter_boats(&boats, &state);
        let twice = filter_boats(&once, &state);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(filter_boats(&[], &FilterState::default()).is_empty());
    }

    #[test]
    fn reset_restores_defaults() {
        let mut state = FilterState::default();
        state.toggle_builder("A");
        state.toggle_model("X");
        state.set_year_range(2000, 2001);
        state.set_length_range(5.0, 6.0);
        state.toggle_sold();
        state.reset();
        assert_eq!(state, FilterState::default());
        assert_eq!(state.year_range, (1990, 2026));
        assert_eq!(state.length_range, (0.0, 100.0));
        assert!(!state.include_sold);
    }
}
