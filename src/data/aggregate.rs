use std::collections::BTreeMap;

use super::model::{AqiCategory, Dataset, Metric, Pollutant, POLLUTANT_COUNT};

pub const HOURS: usize = 24;
pub const MONTHS: usize = 12;

// ---------------------------------------------------------------------------
// Running mean over optionally-missing values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
struct MeanAcc {
    sum: f64,
    n: usize,
}

impl MeanAcc {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.n += 1;
        }
    }

    /// None when no value was observed (an undefined mean, not zero).
    fn mean(self) -> Option<f64> {
        (self.n > 0).then(|| self.sum / self.n as f64)
    }
}

// ---------------------------------------------------------------------------
// Yearly trend
// ---------------------------------------------------------------------------

/// One (year, pollutant) group mean for multi-series plotting.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub year: i32,
    pub pollutant: Pollutant,
    pub value: f64,
}

/// The pollutant with the highest mean among the caller's subset, together
/// with its peak yearly mean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DominantPollutant {
    pub pollutant: Pollutant,
    pub peak_yearly_mean: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakYear {
    pub year: i32,
    pub mean_aqi: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearlyTrend {
    /// (year, pollutant, mean) triples, years ascending. A group whose
    /// values are all missing produces no triple.
    pub points: Vec<TrendPoint>,
    /// Mean AQI across every filtered row; None when no AQI values exist.
    pub mean_aqi: Option<f64>,
    pub dominant: Option<DominantPollutant>,
    pub peak_year: Option<PeakYear>,
}

/// Group filtered rows by year and average each requested pollutant.
///
/// The dominant pollutant is the argmax over `pollutants` of the unweighted
/// mean of that pollutant's yearly means; ties break to canonical pollutant
/// order. The peak year is the year with the highest mean AQI; ties break to
/// the earliest year. Both are None over empty or all-missing data.
pub fn yearly_trend(dataset: &Dataset, rows: &[usize], pollutants: &[Pollutant]) -> YearlyTrend {
    // year → per-pollutant accumulator
    let mut groups: BTreeMap<i32, [MeanAcc; POLLUTANT_COUNT]> = BTreeMap::new();
    let mut aqi_by_year: BTreeMap<i32, MeanAcc> = BTreeMap::new();
    let mut overall_aqi = MeanAcc::default();

    for &i in rows {
        let rec = &dataset.records()[i];
        let accs = groups.entry(rec.year).or_default();
        for p in Pollutant::ALL {
            accs[p.index()].push(rec.pollutant(p));
        }
        aqi_by_year.entry(rec.year).or_default().push(rec.aqi);
        overall_aqi.push(rec.aqi);
    }

    let mut points = Vec::new();
    for (&year, accs) in &groups {
        for &p in pollutants {
            if let Some(mean) = accs[p.index()].mean() {
                points.push(TrendPoint {
                    year,
                    pollutant: p,
                    value: mean,
                });
            }
        }
    }

    // Argmax of the mean of yearly means, over the selected subset only.
    let mut dominant: Option<(Pollutant, f64, f64)> = None; // (pollutant, mean-of-means, peak)
    for &p in pollutants {
        let yearly: Vec<f64> = points
            .iter()
            .filter(|tp| tp.pollutant == p)
            .map(|tp| tp.value)
            .collect();
        if yearly.is_empty() {
            continue;
        }
        let mean_of_means = yearly.iter().sum::<f64>() / yearly.len() as f64;
        let peak = yearly.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        match dominant {
            Some((_, best, _)) if mean_of_means <= best => {}
            _ => dominant = Some((p, mean_of_means, peak)),
        }
    }

    let mut peak_year: Option<PeakYear> = None;
    for (&year, acc) in &aqi_by_year {
        let Some(mean) = acc.mean() else { continue };
        match peak_year {
            // Strictly-greater keeps the earliest year on ties.
            Some(best) if mean <= best.mean_aqi => {}
            _ => {
                peak_year = Some(PeakYear {
                    year,
                    mean_aqi: mean,
                })
            }
        }
    }

    YearlyTrend {
        points,
        mean_aqi: overall_aqi.mean(),
        dominant: dominant.map(|(pollutant, _, peak)| DominantPollutant {
            pollutant,
            peak_yearly_mean: peak,
        }),
        peak_year,
    }
}

// ---------------------------------------------------------------------------
// Monthly / hourly trends
// ---------------------------------------------------------------------------

/// One line of a per-year trend chart, keyed by month (1–12) or hour (0–23).
#[derive(Debug, Clone, PartialEq)]
pub struct YearSeries {
    pub year: i32,
    /// (bucket, mean) pairs sorted by bucket; buckets with no data are absent.
    pub points: Vec<(u32, f64)>,
}

fn bucketed_trend(
    dataset: &Dataset,
    rows: &[usize],
    metric: Metric,
    bucket: impl Fn(&super::model::Record) -> u32,
) -> Vec<YearSeries> {
    let mut groups: BTreeMap<(i32, u32), MeanAcc> = BTreeMap::new();
    for &i in rows {
        let rec = &dataset.records()[i];
        groups
            .entry((rec.year, bucket(rec)))
            .or_default()
            .push(rec.metric(metric));
    }

    let mut series: BTreeMap<i32, Vec<(u32, f64)>> = BTreeMap::new();
    for ((year, b), acc) in groups {
        if let Some(mean) = acc.mean() {
            series.entry(year).or_default().push((b, mean));
        }
    }
    series
        .into_iter()
        .map(|(year, points)| YearSeries { year, points })
        .collect()
}

/// Mean of the metric per (month, year); one series per year.
pub fn monthly_trend(dataset: &Dataset, rows: &[usize], metric: Metric) -> Vec<YearSeries> {
    bucketed_trend(dataset, rows, metric, |rec| rec.month)
}

/// Mean of the metric per (hour, year); one series per year.
pub fn hourly_trend(dataset: &Dataset, rows: &[usize], metric: Metric) -> Vec<YearSeries> {
    bucketed_trend(dataset, rows, metric, |rec| rec.hour)
}

// ---------------------------------------------------------------------------
// Month × hour heatmap
// ---------------------------------------------------------------------------

/// Dense 24×12 grid of mean metric values: hour rows, month columns.
///
/// Combinations absent from the filtered data hold exactly 0.0 so the grid
/// stays rectangular for the heatmap. The zero-fill is part of the contract:
/// an absent group and a true zero mean render identically here, unlike the
/// category distribution which omits absent groups.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthHourGrid {
    values: [[f64; MONTHS]; HOURS],
}

impl MonthHourGrid {
    /// Mean for (hour 0–23, month 1–12).
    pub fn cell(&self, hour: u32, month: u32) -> f64 {
        self.values[hour as usize][(month - 1) as usize]
    }

    pub fn rows(&self) -> &[[f64; MONTHS]; HOURS] {
        &self.values
    }

    pub fn max_value(&self) -> f64 {
        self.values
            .iter()
            .flatten()
            .copied()
            .fold(0.0_f64, f64::max)
    }
}

/// Pivot filtered rows into the dense hour×month grid.
pub fn month_hour_grid(dataset: &Dataset, rows: &[usize], metric: Metric) -> MonthHourGrid {
    let mut accs = [[MeanAcc::default(); MONTHS]; HOURS];
    for &i in rows {
        let rec = &dataset.records()[i];
        if rec.hour < HOURS as u32 && (1..=MONTHS as u32).contains(&rec.month) {
            accs[rec.hour as usize][(rec.month - 1) as usize].push(rec.metric(metric));
        }
    }

    let mut values = [[0.0; MONTHS]; HOURS];
    for (h, row) in accs.iter().enumerate() {
        for (m, acc) in row.iter().enumerate() {
            values[h][m] = acc.mean().unwrap_or(0.0);
        }
    }
    MonthHourGrid { values }
}

// ---------------------------------------------------------------------------
// AQI category distribution
// ---------------------------------------------------------------------------

/// Count category labels present in the filtered rows, most frequent first
/// (ties in category order). Zero-count categories are omitted.
pub fn category_distribution(dataset: &Dataset, rows: &[usize]) -> Vec<(AqiCategory, usize)> {
    let mut counts: BTreeMap<AqiCategory, usize> = BTreeMap::new();
    for &i in rows {
        if let Some(cat) = dataset.records()[i].category {
            *counts.entry(cat).or_insert(0) += 1;
        }
    }
    let mut out: Vec<(AqiCategory, usize)> = counts.into_iter().collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    out
}

// ---------------------------------------------------------------------------
// Station comparison
// ---------------------------------------------------------------------------

/// Per-station mean of each of the six pollutants.
#[derive(Debug, Clone, PartialEq)]
pub struct StationMeans {
    pub station: String,
    /// Indexed by `Pollutant::index()`; None when the station has no data
    /// for that pollutant.
    pub means: [Option<f64>; POLLUTANT_COUNT],
}

/// Group filtered rows by station, stations ascending.
pub fn station_comparison(dataset: &Dataset, rows: &[usize]) -> Vec<StationMeans> {
    let mut groups: BTreeMap<&str, [MeanAcc; POLLUTANT_COUNT]> = BTreeMap::new();
    for &i in rows {
        let rec = &dataset.records()[i];
        let accs = groups.entry(rec.station.as_str()).or_default();
        for p in Pollutant::ALL {
            accs[p.index()].push(rec.pollutant(p));
        }
    }
    groups
        .into_iter()
        .map(|(station, accs)| StationMeans {
            station: station.to_string(),
            means: accs.map(MeanAcc::mean),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::blank_record;

    fn rec_with(
        year: i32,
        month: u32,
        hour: u32,
        station: &str,
        pm25: Option<f64>,
        aqi: Option<f64>,
    ) -> crate::data::model::Record {
        let mut rec = blank_record(year, month, hour, station);
        rec.pm25 = pm25;
        rec.aqi = aqi;
        rec
    }

    fn all_rows(ds: &Dataset) -> Vec<usize> {
        (0..ds.len()).collect()
    }

    #[test]
    fn yearly_trend_groups_by_year() {
        let ds = Dataset::from_records(vec![
            rec_with(2013, 1, 0, "A", Some(10.0), Some(50.0)),
            rec_with(2013, 2, 0, "A", Some(30.0), Some(70.0)),
            rec_with(2014, 1, 0, "A", Some(40.0), Some(40.0)),
        ]);
        let trend = yearly_trend(&ds, &all_rows(&ds), &[Pollutant::Pm25]);
        assert_eq!(
            trend.points,
            vec![
                TrendPoint {
                    year: 2013,
                    pollutant: Pollutant::Pm25,
                    value: 20.0
                },
                TrendPoint {
                    year: 2014,
                    pollutant: Pollutant::Pm25,
                    value: 40.0
                },
            ]
        );
        // Overall AQI mean is row-weighted, not a mean of yearly means.
        assert_eq!(trend.mean_aqi, Some((50.0 + 70.0 + 40.0) / 3.0));
    }

    #[test]
    fn peak_year_matches_brute_force_and_breaks_ties_early() {
        let ds = Dataset::from_records(vec![
            rec_with(2013, 1, 0, "A", None, Some(80.0)),
            rec_with(2014, 1, 0, "A", None, Some(80.0)),
            rec_with(2015, 1, 0, "A", None, Some(20.0)),
        ]);
        let trend = yearly_trend(&ds, &all_rows(&ds), &[]);
        let peak = trend.peak_year.unwrap();
        assert_eq!(peak.year, 2013);
        assert_eq!(peak.mean_aqi, 80.0);

        // Brute force: no year's mean AQI exceeds the reported peak.
        for year in [2013, 2014, 2015] {
            let vals: Vec<f64> = ds
                .records()
                .iter()
                .filter(|r| r.year == year)
                .filter_map(|r| r.aqi)
                .collect();
            let mean = vals.iter().sum::<f64>() / vals.len() as f64;
            assert!(mean <= peak.mean_aqi);
        }
    }

    #[test]
    fn dominant_pollutant_considers_only_the_selected_subset() {
        let mut a = blank_record(2013, 1, 0, "A");
        a.pm25 = Some(10.0);
        a.pm10 = Some(100.0);
        a.o3 = Some(500.0);
        let ds = Dataset::from_records(vec![a]);

        let trend = yearly_trend(&ds, &[0], &[Pollutant::Pm25, Pollutant::Pm10]);
        let dom = trend.dominant.unwrap();
        // O3 is higher but not selected.
        assert_eq!(dom.pollutant, Pollutant::Pm10);
        assert_eq!(dom.peak_yearly_mean, 100.0);
    }

    #[test]
    fn summaries_are_none_over_empty_or_all_missing_data() {
        let ds = Dataset::from_records(vec![blank_record(2013, 1, 0, "A")]);

        let empty = yearly_trend(&ds, &[], &[Pollutant::Pm25]);
        assert!(empty.points.is_empty());
        assert_eq!(empty.mean_aqi, None);
        assert_eq!(empty.dominant, None);
        assert_eq!(empty.peak_year, None);

        // One row, but every measurement missing.
        let missing = yearly_trend(&ds, &[0], &[Pollutant::Pm25]);
        assert!(missing.points.is_empty());
        assert_eq!(missing.mean_aqi, None);
        assert_eq!(missing.dominant, None);
        assert_eq!(missing.peak_year, None);
    }

    #[test]
    fn monthly_trend_is_one_series_per_year() {
        let ds = Dataset::from_records(vec![
            rec_with(2013, 1, 0, "A", Some(10.0), None),
            rec_with(2013, 1, 1, "A", Some(20.0), None),
            rec_with(2013, 3, 0, "A", Some(60.0), None),
            rec_with(2014, 1, 0, "A", Some(40.0), None),
        ]);
        let series = monthly_trend(&ds, &all_rows(&ds), Metric::Pollutant(Pollutant::Pm25));
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].year, 2013);
        // Month 2 has no data and is absent, not zero-filled.
        assert_eq!(series[0].points, vec![(1, 15.0), (3, 60.0)]);
        assert_eq!(series[1].year, 2014);
        assert_eq!(series[1].points, vec![(1, 40.0)]);
    }

    #[test]
    fn hourly_trend_buckets_by_hour() {
        let ds = Dataset::from_records(vec![
            rec_with(2013, 1, 7, "A", Some(10.0), None),
            rec_with(2013, 2, 7, "A", Some(30.0), None),
            rec_with(2013, 1, 23, "A", Some(5.0), None),
        ]);
        let series = hourly_trend(&ds, &all_rows(&ds), Metric::Pollutant(Pollutant::Pm25));
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].points, vec![(7, 20.0), (23, 5.0)]);
    }

    #[test]
    fn grid_is_dense_with_zero_fill() {
        let ds = Dataset::from_records(vec![rec_with(2013, 5, 10, "A", Some(42.0), None)]);
        let grid = month_hour_grid(&ds, &[0], Metric::Pollutant(Pollutant::Pm25));

        let mut nonzero = 0;
        for hour in 0..HOURS as u32 {
            for month in 1..=MONTHS as u32 {
                let v = grid.cell(hour, month);
                if hour == 10 && month == 5 {
                    assert_eq!(v, 42.0);
                    nonzero += 1;
                } else {
                    assert_eq!(v, 0.0);
                }
            }
        }
        assert_eq!(nonzero, 1);
        assert_eq!(grid.rows().len() * grid.rows()[0].len(), 288);
    }

    #[test]
    fn grid_zero_fills_all_missing_groups() {
        // A group that exists but has no metric values behaves like an
        // absent group.
        let ds = Dataset::from_records(vec![rec_with(2013, 5, 10, "A", None, None)]);
        let grid = month_hour_grid(&ds, &[0], Metric::Pollutant(Pollutant::Pm25));
        assert_eq!(grid.cell(10, 5), 0.0);
        assert_eq!(grid.max_value(), 0.0);
    }

    #[test]
    fn category_distribution_omits_zero_counts_and_sorts_by_count() {
        let mut recs = Vec::new();
        for _ in 0..3 {
            let mut r = blank_record(2013, 1, 0, "A");
            r.category = Some(AqiCategory::Moderate);
            recs.push(r);
        }
        let mut good = blank_record(2013, 1, 1, "A");
        good.category = Some(AqiCategory::Good);
        recs.push(good);
        recs.push(blank_record(2013, 1, 2, "A")); // no category

        let ds = Dataset::from_records(recs);
        let dist = category_distribution(&ds, &all_rows(&ds));
        assert_eq!(
            dist,
            vec![(AqiCategory::Moderate, 3), (AqiCategory::Good, 1)]
        );
        assert!(dist.iter().all(|&(_, n)| n > 0));
    }

    #[test]
    fn station_comparison_sorts_stations_and_keeps_missing_as_none() {
        let ds = Dataset::from_records(vec![
            rec_with(2013, 1, 0, "Wanliu", Some(30.0), None),
            rec_with(2013, 1, 0, "Dingling", Some(10.0), None),
            rec_with(2013, 1, 1, "Dingling", Some(20.0), None),
        ]);
        let stats = station_comparison(&ds, &all_rows(&ds));
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].station, "Dingling");
        assert_eq!(stats[0].means[Pollutant::Pm25.index()], Some(15.0));
        assert_eq!(stats[0].means[Pollutant::O3.index()], None);
        assert_eq!(stats[1].station, "Wanliu");
        assert_eq!(stats[1].means[Pollutant::Pm25.index()], Some(30.0));
    }

    #[test]
    fn empty_rows_yield_empty_shapes_everywhere() {
        let ds = Dataset::from_records(vec![rec_with(2013, 5, 10, "A", Some(1.0), Some(2.0))]);
        let rows: Vec<usize> = Vec::new();

        assert!(yearly_trend(&ds, &rows, &Pollutant::ALL).points.is_empty());
        assert!(monthly_trend(&ds, &rows, Metric::Aqi).is_empty());
        assert!(hourly_trend(&ds, &rows, Metric::Aqi).is_empty());
        assert_eq!(month_hour_grid(&ds, &rows, Metric::Aqi).max_value(), 0.0);
        assert!(category_distribution(&ds, &rows).is_empty());
        assert!(station_comparison(&ds, &rows).is_empty());
    }
}
