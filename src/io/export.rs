//! CSV export for candidate plans and status timelines.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::error::Result;
use crate::schedule::CandidateOperation;
use crate::schedule::timeline::TimelineEntry;

/// Column header for candidate plan export.
const PLAN_HEADER: &str = "delay,run_start,run_end,window_start,window_end,\
                           off_peak_minutes,off_peak_ratio,range_lower,range_upper";

/// Column header for status timeline export.
const TIMELINE_HEADER: &str = "at,status,until_secs";

/// Exports candidate operations to a CSV file at the given path.
///
/// Writes a header row followed by one row per candidate in input order.
///
/// # Errors
///
/// Returns an error if file creation or writing fails.
pub fn export_plan_csv(operations: &[CandidateOperation], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_plan_csv(operations, io::BufWriter::new(file))
}

/// Writes candidate operations as CSV to any writer.
///
/// Candidates without an overlapping window leave the window and range
/// columns empty.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_plan_csv(operations: &[CandidateOperation], writer: impl Write) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(PLAN_HEADER.split(',').map(str::trim))?;

    for op in operations {
        let window = op.best_window();
        let range = op.off_peak_range_ratio();
        wtr.write_record(&[
            op.delay().to_string(),
            op.run_start().to_rfc3339(),
            op.run_end().to_rfc3339(),
            window.map(|w| w.start().to_rfc3339()).unwrap_or_default(),
            window.map(|w| w.end().to_rfc3339()).unwrap_or_default(),
            op.off_peak_minutes().to_string(),
            format!("{:.4}", op.off_peak_ratio()),
            range
                .as_ref()
                .map(|r| format!("{:.4}", r.start()))
                .unwrap_or_default(),
            range
                .as_ref()
                .map(|r| format!("{:.4}", r.end()))
                .unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports a status timeline to a CSV file at the given path.
///
/// # Errors
///
/// Returns an error if file creation or writing fails.
pub fn export_timeline_csv(entries: &[TimelineEntry], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_timeline_csv(entries, io::BufWriter::new(file))
}

/// Writes a status timeline as CSV to any writer.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_timeline_csv(entries: &[TimelineEntry], writer: impl Write) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(TIMELINE_HEADER.split(','))?;

    for entry in entries {
        wtr.write_record(&[
            entry.at.to_rfc3339(),
            entry.status.label().to_string(),
            entry
                .status
                .until()
                .map(|d| d.num_seconds().to_string())
                .unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, Utc};

    use super::*;
    use crate::schedule::clock::Ticker;
    use crate::schedule::timeline::status_timeline;
    use crate::schedule::{Calendar, Delay, Period, PeriodId, plan};

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn sample_plan() -> Vec<CandidateOperation> {
        let periods = [Period::new(PeriodId(1), 23, 0, 7, 0).unwrap()];
        let delays: Vec<Delay> = (0..4).map(Delay::from_hours).collect();
        plan(
            &periods,
            Duration::hours(2),
            &delays,
            at("2024-05-10T20:00:00Z"),
            &Calendar::utc(),
        )
        .unwrap()
    }

    #[test]
    fn plan_header_and_row_count() {
        let mut buf = Vec::new();
        write_plan_csv(&sample_plan(), &mut buf).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines[0],
            "delay,run_start,run_end,window_start,window_end,\
             off_peak_minutes,off_peak_ratio,range_lower,range_upper"
        );
        // 1 header + 4 candidates
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn plan_rows_are_parseable() {
        let mut buf = Vec::new();
        write_plan_csv(&sample_plan(), &mut buf).unwrap();

        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        // delay 0h: run 20:00-22:00 sees no window
        assert_eq!(&rows[0][3], "");
        assert_eq!(&rows[0][6], "0.0000");
        // delay 3h: run 23:00-01:00 is fully off-peak
        assert_eq!(&rows[3][5], "120");
        assert_eq!(&rows[3][6], "1.0000");
        assert_eq!(&rows[3][8], "1.0000");
    }

    #[test]
    fn timeline_rows_match_entries() {
        let periods = [Period::new(PeriodId(1), 23, 0, 7, 0).unwrap()];
        let entries = status_timeline(
            &periods,
            &Calendar::utc(),
            Ticker::new(at("2024-05-10T22:00:00Z"), Duration::hours(1), 3),
        );
        let mut buf = Vec::new();
        write_timeline_csv(&entries, &mut buf).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "at,status,until_secs");
        assert_eq!(lines[1], "2024-05-10T22:00:00+00:00,peak,3600");
        assert_eq!(lines[2], "2024-05-10T23:00:00+00:00,off_peak,28800");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn deterministic_output() {
        let ops = sample_plan();
        let mut buf1 = Vec::new();
        let mut buf2 = Vec::new();
        write_plan_csv(&ops, &mut buf1).unwrap();
        write_plan_csv(&ops, &mut buf2).unwrap();
        assert_eq!(buf1, buf2);
    }
}
