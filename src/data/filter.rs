use std::collections::BTreeSet;

use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Filter predicate: which years and stations are selected
// ---------------------------------------------------------------------------

/// Multi-select state for the two filter dimensions.
///
/// Both dimensions are conjunctive: a record passes only if its year is
/// selected AND its station is selected. An empty set on either dimension
/// selects nothing (the UI's "None" button hides everything, it does not
/// reset the filter).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSelection {
    pub years: BTreeSet<i32>,
    pub stations: BTreeSet<String>,
}

impl FilterSelection {
    /// Select every year and station present in the dataset.
    pub fn all_of(dataset: &Dataset) -> Self {
        FilterSelection {
            years: dataset.years().clone(),
            stations: dataset.stations().clone(),
        }
    }

    /// Initial selection after a load: first year only, all stations.
    pub fn initial(dataset: &Dataset) -> Self {
        FilterSelection {
            years: dataset.years().iter().copied().take(1).collect(),
            stations: dataset.stations().clone(),
        }
    }

    pub fn matches(&self, rec: &Record) -> bool {
        self.years.contains(&rec.year) && self.stations.contains(rec.station.as_str())
    }
}

/// Return indices of records that pass the current selection.
///
/// Pure; never fails. An empty result is a legitimate outcome that every
/// downstream aggregation accepts.
pub fn filtered_rows(dataset: &Dataset, selection: &FilterSelection) -> Vec<usize> {
    if selection.years.is_empty() || selection.stations.is_empty() {
        return Vec::new();
    }
    dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| selection.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::blank_record;

    fn two_by_two() -> Dataset {
        Dataset::from_records(vec![
            blank_record(2013, 1, 0, "A"),
            blank_record(2013, 1, 1, "B"),
            blank_record(2014, 1, 0, "A"),
            blank_record(2014, 1, 1, "B"),
        ])
    }

    #[test]
    fn conjunction_of_year_and_station() {
        let ds = two_by_two();
        let sel = FilterSelection {
            years: BTreeSet::from([2013]),
            stations: BTreeSet::from(["A".to_string()]),
        };
        let rows = filtered_rows(&ds, &sel);
        assert_eq!(rows, vec![0]);
        for &i in &rows {
            assert_eq!(ds.records()[i].year, 2013);
            assert_eq!(ds.records()[i].station, "A");
        }
    }

    #[test]
    fn empty_dimension_matches_nothing() {
        let ds = two_by_two();
        let no_years = FilterSelection {
            years: BTreeSet::new(),
            stations: BTreeSet::from(["A".to_string(), "B".to_string()]),
        };
        assert!(filtered_rows(&ds, &no_years).is_empty());

        let no_stations = FilterSelection {
            years: BTreeSet::from([2013, 2014]),
            stations: BTreeSet::new(),
        };
        assert!(filtered_rows(&ds, &no_stations).is_empty());
    }

    #[test]
    fn output_is_a_subset_of_the_dataset() {
        let ds = two_by_two();
        let sel = FilterSelection::all_of(&ds);
        let rows = filtered_rows(&ds, &sel);
        assert_eq!(rows.len(), ds.len());
        assert!(rows.iter().all(|&i| i < ds.len()));
    }

    #[test]
    fn no_match_yields_empty_not_error() {
        let ds = two_by_two();
        let sel = FilterSelection {
            years: BTreeSet::from([2015]),
            stations: BTreeSet::from(["A".to_string()]),
        };
        assert!(filtered_rows(&ds, &sel).is_empty());
    }

    #[test]
    fn initial_selection_is_first_year_all_stations() {
        let ds = two_by_two();
        let sel = FilterSelection::initial(&ds);
        assert_eq!(sel.years, BTreeSet::from([2013]));
        assert_eq!(sel.stations.len(), 2);
    }
}
