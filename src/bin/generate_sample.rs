use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Deterministic splitmix64 generator
struct SplitMix {
    state: u64,
}

impl SplitMix {
    fn new(seed: u64) -> Self {
        SplitMix { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn uniform(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform
    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.uniform().max(1e-15);
        let u2 = self.uniform();
        mean + std_dev * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }
}

/// Synthetic logs along one hole.  Each log has its own gaps.
struct SampleLogs {
    depth: Vec<f64>,
    columns: Vec<(&'static str, Vec<Option<f64>>)>,
}

fn generate(rng: &mut SplitMix, nrows: usize) -> SampleLogs {
    // Irregular spacing: nominal 0.1 m with jitter
    let mut depth = Vec::with_capacity(nrows);
    let mut d = 12.0;
    for _ in 0..nrows {
        depth.push(d);
        d += 0.1 + rng.uniform() * 0.05;
    }

    // Gamma ray: cyclic layering, logging tool failed between 40 m and 43 m
    let gamma = depth
        .iter()
        .map(|&z| {
            if (40.0..43.0).contains(&z) {
                None
            } else {
                Some(60.0 + 25.0 * (z / 3.0).sin() + rng.normal(0.0, 3.0))
            }
        })
        .collect();

    // Bulk density: only every third depth measured
    let bulk_density = depth
        .iter()
        .enumerate()
        .map(|(i, &z)| (i % 3 == 0).then(|| 2.3 + 0.004 * z + rng.normal(0.0, 0.02)))
        .collect();

    // Resistivity: log-normal with random dropouts
    let resistivity = depth
        .iter()
        .map(|&z| {
            if rng.uniform() < 0.05 {
                None
            } else {
                Some((1.5 + 0.5 * (z / 7.0).cos() + rng.normal(0.0, 0.2)).exp())
            }
        })
        .collect();

    SampleLogs {
        depth,
        columns: vec![
            ("gamma", gamma),
            ("bulk_density", bulk_density),
            ("resistivity", resistivity),
        ],
    }
}

fn write_csv(logs: &SampleLogs, path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV output")?;
    let mut header = vec!["depth"];
    header.extend(logs.columns.iter().map(|(name, _)| *name));
    writer.write_record(&header)?;

    for (row, depth) in logs.depth.iter().enumerate() {
        let mut record = vec![format!("{depth:.4}")];
        for (_, values) in &logs.columns {
            // Gaps are written as empty cells
            record.push(values[row].map(|v| format!("{v:.4}")).unwrap_or_default());
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(logs: &SampleLogs, path: &str) -> Result<()> {
    let mut fields = vec![Field::new("depth", DataType::Float64, false)];
    let mut arrays: Vec<ArrayRef> = vec![Arc::new(Float64Array::from(logs.depth.clone()))];
    for (name, values) in &logs.columns {
        fields.push(Field::new(*name, DataType::Float64, true));
        arrays.push(Arc::new(Float64Array::from(values.clone())));
    }
    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = SplitMix::new(42);
    let logs = generate(&mut rng, 600);

    write_csv(&logs, "sample_borehole.csv")?;
    write_parquet(&logs, "sample_borehole.parquet")?;

    println!(
        "Wrote {} logs over {} depths ({:.2} m to {:.2} m) to sample_borehole.{{csv,parquet}}",
        logs.columns.len(),
        logs.depth.len(),
        logs.depth[0],
        logs.depth[logs.depth.len() - 1]
    );
    Ok(())
}
