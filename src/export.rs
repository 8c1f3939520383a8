use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::store::COLUMNS;
use crate::system::snapshot::MetricSnapshot;

/// Header row plus one comma-separated row per snapshot, in the order given.
pub fn write_csv<W: Write>(mut out: W, snapshots: &[MetricSnapshot]) -> io::Result<()> {
    writeln!(out, "{}", COLUMNS.join(","))?;
    for s in snapshots {
        writeln!(
            out,
            "{},{},{},{},{},{}",
            s.timestamp_text(),
            s.cpu_percent,
            s.ram_percent,
            s.ram_used_gb,
            s.bytes_sent_gb,
            s.bytes_recv_gb
        )?;
    }
    out.flush()
}

/// Write the export file, creating its parent directory. Returns the row count.
pub fn export_to_path(path: &Path, snapshots: &[MetricSnapshot]) -> io::Result<usize> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_csv(BufWriter::new(file), snapshots)?;
    Ok(snapshots.len())
}
