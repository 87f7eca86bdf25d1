use std::io;
use std::path::Path;

use anyhow::{Context, Result};

use crate::borehole::Borehole;

/// Write the aligned domain and matrix as CSV: `domain_header,<key>...`.
pub fn write_aligned<W: io::Write>(borehole: &Borehole, domain_header: &str, out: W) -> Result<()> {
    let domain = borehole
        .get_domain()
        .context("borehole has not been resampled")?;
    let data = borehole
        .get_data()
        .context("borehole has not been resampled")?;

    let mut writer = csv::Writer::from_writer(out);
    let mut header = vec![domain_header];
    header.extend(borehole.get_keys());
    writer.write_record(&header).context("writing CSV header")?;

    for (depth, row) in domain.iter().zip(data.rows()) {
        let mut record = Vec::with_capacity(row.len() + 1);
        record.push(depth.to_string());
        record.extend(row.iter().map(|v| v.to_string()));
        writer.write_record(&record).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(())
}

/// [`write_aligned`] to a file at `path`.
pub fn write_aligned_csv(borehole: &Borehole, domain_header: &str, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_aligned(borehole, domain_header, file)
}
