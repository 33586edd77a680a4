//! CSV serialization of metric records.
//!
//! Columns are fixed as `image,scale,RMSE,PSNR,SSIM`; downstream plotting
//! reads them by name. Non-finite PSNR values render as `inf`, `-inf` or `NaN`.

use crate::metrics::MetricRecord;
use crate::util::{DepthEvalError, DepthEvalResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Output column names in order.
pub const COLUMNS: [&str; 5] = ["image", "scale", "RMSE", "PSNR", "SSIM"];

/// Writes the header followed by one row per record.
///
/// The header is written exactly once, also when `records` is empty.
pub fn write_records<'a, W, I>(writer: W, records: I) -> DepthEvalResult<()>
where
    W: Write,
    I: IntoIterator<Item = &'a MetricRecord>,
{
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv.write_record(COLUMNS)?;
    for record in records {
        csv.serialize(record)?;
    }
    csv.flush()
        .map_err(|err| DepthEvalError::Csv {
            reason: err.to_string(),
        })?;
    Ok(())
}

/// Creates (or truncates) `path` and writes the records to it.
pub fn write_csv<'a, I>(path: &Path, records: I) -> DepthEvalResult<()>
where
    I: IntoIterator<Item = &'a MetricRecord>,
{
    let file = File::create(path).map_err(|err| DepthEvalError::io(path, err))?;
    write_records(file, records)
}

#[cfg(test)]
mod tests {
    use super::write_records;
    use crate::metrics::MetricRecord;

    fn record(image: &str, psnr: f64) -> MetricRecord {
        MetricRecord {
            image: image.to_string(),
            scale: 0.5,
            rmse: 1.25,
            psnr,
            ssim: 0.75,
        }
    }

    #[test]
    fn header_only_for_empty_input() {
        let mut out = Vec::new();
        write_records(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "image,scale,RMSE,PSNR,SSIM\n");
    }

    #[test]
    fn rows_follow_header_in_column_order() {
        let mut out = Vec::new();
        write_records(&mut out, &[record("5", 30.5), record("7", f64::INFINITY)]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "image,scale,RMSE,PSNR,SSIM");
        assert_eq!(lines[1], "5,0.5,1.25,30.5,0.75");
        assert_eq!(lines[2], "7,0.5,1.25,inf,0.75");
    }
}
