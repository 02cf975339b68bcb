use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::data::cache::DatasetCache;
use crate::data::filter::{filtered_rows, FilterSelection};
use crate::data::model::{Dataset, Metric, Pollutant};
use crate::data::view::ViewMode;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which analysis tab is shown in the central panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Temporal,
    Stations,
    Correlation,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Temporal, Tab::Stations, Tab::Correlation];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Temporal => "Temporal patterns",
            Tab::Stations => "Station comparison",
            Tab::Correlation => "Weather correlation",
        }
    }
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// TTL cache around the loader; the only memoized operation.
    pub cache: DatasetCache,

    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Arc<Dataset>>,

    /// Path the dataset was loaded from; drives TTL refreshes.
    pub source_path: Option<PathBuf>,

    /// Year / station multi-select.
    pub selection: FilterSelection,

    /// Indices of records passing the current selection (cached).
    pub visible_rows: Vec<usize>,

    pub tab: Tab,
    pub view_mode: ViewMode,

    /// Metric for the Monthly / Hourly / Month×Hour views.
    pub metric: Metric,

    /// Pollutant subset for the yearly trend multi-select.
    pub trend_pollutants: BTreeSet<Pollutant>,

    /// Pollutant for the station-comparison bar chart.
    pub station_pollutant: Pollutant,

    /// Show the filtered table verbatim.
    pub show_raw: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            cache: DatasetCache::default(),
            dataset: None,
            source_path: None,
            selection: FilterSelection::default(),
            visible_rows: Vec::new(),
            tab: Tab::default(),
            view_mode: ViewMode::default(),
            metric: Metric::Pollutant(Pollutant::Pm25),
            // The yearly view opens with PM2.5 and PM10, as the dashboard
            // always has.
            trend_pollutants: BTreeSet::from([Pollutant::Pm25, Pollutant::Pm10]),
            station_pollutant: Pollutant::Pm25,
            show_raw: false,
            status_message: None,
        }
    }
}

impl AppState {
    /// Load (or re-load) the dataset at `path` through the cache.
    pub fn open_path(&mut self, path: &Path) {
        match self.cache.get(path) {
            Ok(dataset) => {
                self.source_path = Some(path.to_path_buf());
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Ingest a newly loaded dataset and reset the selection to the
    /// default (first year, all stations).
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.selection = FilterSelection::initial(&dataset);
        self.visible_rows = filtered_rows(&dataset, &self.selection);
        self.dataset = Some(dataset);
        self.status_message = None;
    }

    /// Re-fetch from the cache; picks up a TTL reload without losing the
    /// current selection (pruned to values still present).
    pub fn refresh_from_cache(&mut self) {
        let Some(path) = self.source_path.clone() else {
            return;
        };
        let Ok(fresh) = self.cache.get(&path) else {
            return;
        };
        let stale = match &self.dataset {
            Some(current) => !Arc::ptr_eq(current, &fresh),
            None => true,
        };
        if stale {
            self.selection.years.retain(|y| fresh.years().contains(y));
            self.selection
                .stations
                .retain(|s| fresh.stations().contains(s));
            self.visible_rows = filtered_rows(&fresh, &self.selection);
            self.dataset = Some(fresh);
        }
    }

    /// Recompute `visible_rows` after a selection change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.visible_rows = filtered_rows(ds, &self.selection);
        }
    }

    pub fn toggle_year(&mut self, year: i32) {
        if !self.selection.years.remove(&year) {
            self.selection.years.insert(year);
        }
        self.refilter();
    }

    pub fn toggle_station(&mut self, station: &str) {
        if !self.selection.stations.remove(station) {
            self.selection.stations.insert(station.to_string());
        }
        self.refilter();
    }

    pub fn select_all_years(&mut self) {
        if let Some(ds) = &self.dataset {
            self.selection.years = ds.years().clone();
        }
        self.refilter();
    }

    pub fn select_no_years(&mut self) {
        self.selection.years.clear();
        self.refilter();
    }

    pub fn select_all_stations(&mut self) {
        if let Some(ds) = &self.dataset {
            self.selection.stations = ds.stations().clone();
        }
        self.refilter();
    }

    pub fn select_no_stations(&mut self) {
        self.selection.stations.clear();
        self.refilter();
    }

    pub fn toggle_trend_pollutant(&mut self, p: Pollutant) {
        if !self.trend_pollutants.remove(&p) {
            self.trend_pollutants.insert(p);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::blank_record;

    fn state_with_dataset() -> AppState {
        let ds = Dataset::from_records(vec![
            blank_record(2013, 1, 0, "A"),
            blank_record(2013, 1, 1, "B"),
            blank_record(2014, 1, 0, "A"),
        ]);
        let mut state = AppState::default();
        state.set_dataset(Arc::new(ds));
        state
    }

    #[test]
    fn set_dataset_selects_first_year_and_all_stations() {
        let state = state_with_dataset();
        assert_eq!(state.selection.years, BTreeSet::from([2013]));
        assert_eq!(state.selection.stations.len(), 2);
        assert_eq!(state.visible_rows, vec![0, 1]);
    }

    #[test]
    fn toggles_refilter_immediately() {
        let mut state = state_with_dataset();
        state.toggle_year(2014);
        assert_eq!(state.visible_rows, vec![0, 1, 2]);

        state.toggle_station("B");
        assert_eq!(state.visible_rows, vec![0, 2]);

        state.select_no_years();
        assert!(state.visible_rows.is_empty());

        state.select_all_years();
        state.select_all_stations();
        assert_eq!(state.visible_rows.len(), 3);
    }

    #[test]
    fn default_trend_pollutants_are_pm25_and_pm10() {
        let state = AppState::default();
        assert_eq!(
            state.trend_pollutants,
            BTreeSet::from([Pollutant::Pm25, Pollutant::Pm10])
        );
    }
}
