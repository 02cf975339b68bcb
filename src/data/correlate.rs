use std::fmt;

use super::model::{Dataset, Pollutant, Record};

// ---------------------------------------------------------------------------
// Correlation columns: six pollutants + four weather covariates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrColumn {
    Pollutant(Pollutant),
    Temp,
    Pres,
    Wspm,
    Rain,
}

pub const CORR_COLUMN_COUNT: usize = 10;

impl CorrColumn {
    pub const ALL: [CorrColumn; CORR_COLUMN_COUNT] = [
        CorrColumn::Pollutant(Pollutant::Pm25),
        CorrColumn::Pollutant(Pollutant::Pm10),
        CorrColumn::Pollutant(Pollutant::So2),
        CorrColumn::Pollutant(Pollutant::No2),
        CorrColumn::Pollutant(Pollutant::Co),
        CorrColumn::Pollutant(Pollutant::O3),
        CorrColumn::Temp,
        CorrColumn::Pres,
        CorrColumn::Wspm,
        CorrColumn::Rain,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CorrColumn::Pollutant(p) => p.label(),
            CorrColumn::Temp => "TEMP",
            CorrColumn::Pres => "PRES",
            CorrColumn::Wspm => "WSPM",
            CorrColumn::Rain => "RAIN",
        }
    }

    pub fn value(self, rec: &Record) -> Option<f64> {
        match self {
            CorrColumn::Pollutant(p) => rec.pollutant(p),
            CorrColumn::Temp => rec.temp,
            CorrColumn::Pres => rec.pres,
            CorrColumn::Wspm => rec.wspm,
            CorrColumn::Rain => rec.rain,
        }
    }
}

impl fmt::Display for CorrColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Pearson correlation matrix
// ---------------------------------------------------------------------------

/// Symmetric 10×10 Pearson matrix over [`CorrColumn::ALL`].
///
/// Entries are NaN when a pair has fewer than two complete observations or
/// either column has zero variance. NaN is the contract for "undefined"; the
/// UI renders it distinctly and must not coerce it to 0.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    values: [[f64; CORR_COLUMN_COUNT]; CORR_COLUMN_COUNT],
}

impl CorrelationMatrix {
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    pub fn labels() -> [&'static str; CORR_COLUMN_COUNT] {
        CorrColumn::ALL.map(CorrColumn::label)
    }
}

/// Compute the pairwise Pearson matrix over the filtered rows.
///
/// Each pair uses its pairwise-complete observations (rows where both
/// columns are present), matching DataFrame `.corr()` semantics.
pub fn correlation_matrix(dataset: &Dataset, rows: &[usize]) -> CorrelationMatrix {
    // Materialise the ten columns once; pairs then walk plain slices.
    let columns: Vec<Vec<Option<f64>>> = CorrColumn::ALL
        .iter()
        .map(|&col| rows.iter().map(|&i| col.value(&dataset.records()[i])).collect())
        .collect();

    let mut values = [[f64::NAN; CORR_COLUMN_COUNT]; CORR_COLUMN_COUNT];
    for i in 0..CORR_COLUMN_COUNT {
        for j in i..CORR_COLUMN_COUNT {
            let r = pearson(&columns[i], &columns[j]);
            // A column correlates with itself at exactly 1.0 whenever it has
            // variance; don't let rounding in sqrt spoil that.
            let r = if i == j && !r.is_nan() { 1.0 } else { r };
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    CorrelationMatrix { values }
}

/// Pearson r over pairwise-complete observations; NaN when undefined.
fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|&(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|&(_, y)| y).sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for &(x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}
