use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// Pollutant – the six measured concentration columns
// ---------------------------------------------------------------------------

/// One of the six pollutant concentration columns, in canonical column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Pollutant {
    Pm25,
    Pm10,
    So2,
    No2,
    Co,
    O3,
}

pub const POLLUTANT_COUNT: usize = 6;

impl Pollutant {
    pub const ALL: [Pollutant; POLLUTANT_COUNT] = [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::So2,
        Pollutant::No2,
        Pollutant::Co,
        Pollutant::O3,
    ];

    /// Column name as it appears in the source file.
    pub fn label(self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::So2 => "SO2",
            Pollutant::No2 => "NO2",
            Pollutant::Co => "CO",
            Pollutant::O3 => "O3",
        }
    }

    /// Position in the canonical order (index into per-station mean arrays).
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Metric – what the trend / heatmap views plot
// ---------------------------------------------------------------------------

/// A plottable variable: one of the six pollutants, or the composite AQI.
/// The trend and heatmap selectors offer all seven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Pollutant(Pollutant),
    Aqi,
}

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::Pollutant(Pollutant::Pm25),
        Metric::Pollutant(Pollutant::Pm10),
        Metric::Pollutant(Pollutant::So2),
        Metric::Pollutant(Pollutant::No2),
        Metric::Pollutant(Pollutant::Co),
        Metric::Pollutant(Pollutant::O3),
        Metric::Aqi,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Metric::Pollutant(p) => p.label(),
            Metric::Aqi => "AQI",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// AqiCategory – the fixed ordered category set
// ---------------------------------------------------------------------------

/// AQI bucket labels used by the dataset, from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthySensitive,
    Unhealthy,
    Hazardous,
}

impl AqiCategory {
    pub const ALL: [AqiCategory; 5] = [
        AqiCategory::Good,
        AqiCategory::Moderate,
        AqiCategory::UnhealthySensitive,
        AqiCategory::Unhealthy,
        AqiCategory::Hazardous,
    ];

    /// Label as it appears in the `Category_AQI` column.
    pub fn label(self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthySensitive => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }

    /// Parse the exact file label.
    pub fn parse(s: &str) -> Option<AqiCategory> {
        AqiCategory::ALL.iter().copied().find(|c| c.label() == s)
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Record – one hourly observation (one row of the source file)
// ---------------------------------------------------------------------------

/// A single hourly observation. Measurements may be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub year: i32,
    pub month: u32,
    pub hour: u32,
    pub station: String,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub so2: Option<f64>,
    pub no2: Option<f64>,
    pub co: Option<f64>,
    pub o3: Option<f64>,
    pub aqi: Option<f64>,
    pub category: Option<AqiCategory>,
    pub temp: Option<f64>,
    pub pres: Option<f64>,
    pub wspm: Option<f64>,
    pub rain: Option<f64>,
}

impl Record {
    pub fn pollutant(&self, p: Pollutant) -> Option<f64> {
        match p {
            Pollutant::Pm25 => self.pm25,
            Pollutant::Pm10 => self.pm10,
            Pollutant::So2 => self.so2,
            Pollutant::No2 => self.no2,
            Pollutant::Co => self.co,
            Pollutant::O3 => self.o3,
        }
    }

    pub fn metric(&self, m: Metric) -> Option<f64> {
        match m {
            Metric::Pollutant(p) => self.pollutant(p),
            Metric::Aqi => self.aqi,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed filter domains.
/// Immutable once built; pipeline stages borrow it.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// All observations (rows), in file order.
    records: Vec<Record>,
    /// Sorted set of years present in the data.
    years: BTreeSet<i32>,
    /// Sorted set of station identifiers present in the data.
    stations: BTreeSet<String>,
}

impl Dataset {
    /// Build the filter domains from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut years = BTreeSet::new();
        let mut stations = BTreeSet::new();
        for rec in &records {
            years.insert(rec.year);
            stations.insert(rec.station.clone());
        }
        Dataset {
            records,
            years,
            stations,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn years(&self) -> &BTreeSet<i32> {
        &self.years
    }

    pub fn stations(&self) -> &BTreeSet<String> {
        &self.stations
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
pub(crate) fn blank_record(year: i32, month: u32, hour: u32, station: &str) -> Record {
    Record {
        year,
        month,
        hour,
        station: station.to_string(),
        pm25: None,
        pm10: None,
        so2: None,
        no2: None,
        co: None,
        o3: None,
        aqi: None,
        category: None,
        temp: None,
        pres: None,
        wspm: None,
        rain: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_round_trip() {
        for cat in AqiCategory::ALL {
            assert_eq!(AqiCategory::parse(cat.label()), Some(cat));
        }
        assert_eq!(AqiCategory::parse("Very Unhealthy"), None);
    }

    #[test]
    fn metric_reads_the_right_field() {
        let mut rec = blank_record(2013, 5, 10, "Aotizhongxin");
        rec.pm25 = Some(42.0);
        rec.aqi = Some(98.5);
        assert_eq!(rec.metric(Metric::Pollutant(Pollutant::Pm25)), Some(42.0));
        assert_eq!(rec.metric(Metric::Pollutant(Pollutant::O3)), None);
        assert_eq!(rec.metric(Metric::Aqi), Some(98.5));
    }

    #[test]
    fn dataset_collects_filter_domains() {
        let ds = Dataset::from_records(vec![
            blank_record(2013, 1, 0, "Dingling"),
            blank_record(2014, 1, 0, "Aotizhongxin"),
            blank_record(2013, 2, 5, "Dingling"),
        ]);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.years().iter().copied().collect::<Vec<_>>(), vec![2013, 2014]);
        assert_eq!(
            ds.stations().iter().cloned().collect::<Vec<_>>(),
            vec!["Aotizhongxin".to_string(), "Dingling".to_string()]
        );
    }
}
