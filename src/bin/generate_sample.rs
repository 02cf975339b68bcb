use std::fs::File;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct Observation {
    year: i64,
    month: i64,
    hour: i64,
    station: &'static str,
    pm25: Option<f64>,
    pm10: Option<f64>,
    so2: Option<f64>,
    no2: Option<f64>,
    co: Option<f64>,
    o3: Option<f64>,
    aqi: Option<f64>,
    category: Option<&'static str>,
    temp: Option<f64>,
    pres: Option<f64>,
    wspm: Option<f64>,
    rain: Option<f64>,
}

const STATIONS: [(&str, f64); 4] = [
    ("Aotizhongxin", 1.10),
    ("Dingling", 0.75),
    ("Dongsi", 1.05),
    ("Wanliu", 0.95),
];

/// Linear AQI from PM2.5 over EPA-style breakpoints.
fn aqi_from_pm25(pm25: f64) -> f64 {
    let breakpoints = [
        (0.0, 12.0, 0.0, 50.0),
        (12.1, 35.4, 51.0, 100.0),
        (35.5, 55.4, 101.0, 150.0),
        (55.5, 150.4, 151.0, 200.0),
        (150.5, 500.4, 201.0, 500.0),
    ];
    for (lo_c, hi_c, lo_i, hi_i) in breakpoints {
        if pm25 <= hi_c {
            let frac = ((pm25 - lo_c) / (hi_c - lo_c)).clamp(0.0, 1.0);
            return lo_i + frac * (hi_i - lo_i);
        }
    }
    500.0
}

fn category_label(aqi: f64) -> &'static str {
    if aqi <= 50.0 {
        "Good"
    } else if aqi <= 100.0 {
        "Moderate"
    } else if aqi <= 150.0 {
        "Unhealthy for Sensitive Groups"
    } else if aqi <= 200.0 {
        "Unhealthy"
    } else {
        "Hazardous"
    }
}

fn generate(rng: &mut SimpleRng) -> Vec<Observation> {
    let mut observations = Vec::new();

    for year in 2013..=2017 {
        for month in 1..=12u32 {
            // Winter-heavy pollution, summer-heavy ozone.
            let season = ((month as f64 - 1.0) / 12.0 * std::f64::consts::TAU).cos();
            for hour in (0..24u32).step_by(3) {
                // Rush-hour bumps around 08:00 and 19:00.
                let h = hour as f64;
                let diurnal =
                    1.0 + 0.35 * (-(h - 8.0).powi(2) / 18.0).exp() + 0.3 * (-(h - 19.0).powi(2) / 18.0).exp();

                for (station, level) in STATIONS {
                    let base = 70.0 * level * (1.0 + 0.5 * season) * diurnal;
                    let pm25 = (base + rng.gauss(0.0, 15.0)).max(2.0);
                    let pm10 = (pm25 * 1.4 + rng.gauss(0.0, 20.0)).max(4.0);
                    let so2 = (12.0 * level * (1.0 + 0.6 * season) + rng.gauss(0.0, 4.0)).max(1.0);
                    let no2 = (45.0 * level * diurnal + rng.gauss(0.0, 10.0)).max(2.0);
                    let co = (900.0 * level * (1.0 + 0.4 * season) + rng.gauss(0.0, 150.0)).max(100.0);
                    let o3 = (60.0 * (1.0 - 0.5 * season) * (1.0 + 0.4 * (-(h - 14.0).powi(2) / 32.0).exp())
                        + rng.gauss(0.0, 12.0))
                    .max(2.0);

                    let temp = 13.0 - 14.0 * season + 4.0 * (-(h - 14.0).powi(2) / 50.0).exp()
                        + rng.gauss(0.0, 2.0);
                    let pres = 1013.0 + 8.0 * season + rng.gauss(0.0, 3.0);
                    let wspm = (rng.gauss(2.0, 1.2)).max(0.0);
                    let rain = if rng.next_f64() < 0.06 {
                        rng.next_f64() * 5.0
                    } else {
                        0.0
                    };

                    let aqi = aqi_from_pm25(pm25);

                    // Sensors drop out now and then.
                    let mut sensor = |v: f64| (rng.next_f64() >= 0.02).then_some(v);

                    let pm25_v = sensor(pm25);
                    let pm10_v = sensor(pm10);
                    let so2_v = sensor(so2);
                    let no2_v = sensor(no2);
                    let co_v = sensor(co);
                    let o3_v = sensor(o3);
                    let temp_v = sensor(temp);
                    let pres_v = sensor(pres);
                    let wspm_v = sensor(wspm);

                    observations.push(Observation {
                        year,
                        month: month as i64,
                        hour: hour as i64,
                        station,
                        pm25: pm25_v,
                        pm10: pm10_v,
                        so2: so2_v,
                        no2: no2_v,
                        co: co_v,
                        o3: o3_v,
                        aqi: Some(aqi),
                        category: Some(category_label(aqi)),
                        temp: temp_v,
                        pres: pres_v,
                        wspm: wspm_v,
                        rain: Some(rain),
                    });
                }
            }
        }
    }
    observations
}

fn write_csv(observations: &[Observation], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    writer
        .write_record([
            "year", "month", "hour", "station", "PM2.5", "PM10", "SO2", "NO2", "CO", "O3", "AQI",
            "Category_AQI", "TEMP", "PRES", "WSPM", "RAIN",
        ])
        .context("writing CSV header")?;

    let fmt = |v: Option<f64>| v.map(|x| format!("{x:.1}")).unwrap_or_default();
    for obs in observations {
        writer
            .write_record([
                obs.year.to_string(),
                obs.month.to_string(),
                obs.hour.to_string(),
                obs.station.to_string(),
                fmt(obs.pm25),
                fmt(obs.pm10),
                fmt(obs.so2),
                fmt(obs.no2),
                fmt(obs.co),
                fmt(obs.o3),
                fmt(obs.aqi),
                obs.category.unwrap_or_default().to_string(),
                fmt(obs.temp),
                fmt(obs.pres),
                fmt(obs.wspm),
                fmt(obs.rain),
            ])
            .context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(observations: &[Observation], path: &str) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("year", DataType::Int64, false),
        Field::new("month", DataType::Int64, false),
        Field::new("hour", DataType::Int64, false),
        Field::new("station", DataType::Utf8, false),
        Field::new("PM2.5", DataType::Float64, true),
        Field::new("PM10", DataType::Float64, true),
        Field::new("SO2", DataType::Float64, true),
        Field::new("NO2", DataType::Float64, true),
        Field::new("CO", DataType::Float64, true),
        Field::new("O3", DataType::Float64, true),
        Field::new("AQI", DataType::Float64, true),
        Field::new("Category_AQI", DataType::Utf8, true),
        Field::new("TEMP", DataType::Float64, true),
        Field::new("PRES", DataType::Float64, true),
        Field::new("WSPM", DataType::Float64, true),
        Field::new("RAIN", DataType::Float64, true),
    ]));

    let float_col = |get: fn(&Observation) -> Option<f64>| -> ArrayRef {
        Arc::new(Float64Array::from(
            observations.iter().map(get).collect::<Vec<_>>(),
        ))
    };

    let batch = RecordBatch::try_new(
        Arc::clone(&schema),
        vec![
            Arc::new(Int64Array::from(
                observations.iter().map(|o| o.year).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(
                observations.iter().map(|o| o.month).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(
                observations.iter().map(|o| o.hour).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                observations.iter().map(|o| o.station).collect::<Vec<_>>(),
            )),
            float_col(|o| o.pm25),
            float_col(|o| o.pm10),
            float_col(|o| o.so2),
            float_col(|o| o.no2),
            float_col(|o| o.co),
            float_col(|o| o.o3),
            float_col(|o| o.aqi),
            Arc::new(StringArray::from(
                observations.iter().map(|o| o.category).collect::<Vec<_>>(),
            )),
            float_col(|o| o.temp),
            float_col(|o| o.pres),
            float_col(|o| o.wspm),
            float_col(|o| o.rain),
        ],
    )
    .context("building record batch")?;

    let file = File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);

    let observations = generate(&mut rng);
    log::info!("generated {} observations", observations.len());

    write_csv(&observations, "sample_data.csv")?;
    write_parquet(&observations, "sample_data.parquet")?;

    println!(
        "Wrote {} observations to sample_data.csv and sample_data.parquet",
        observations.len()
    );
    Ok(())
}
