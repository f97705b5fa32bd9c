use std::io::{self, Write};
use std::path::PathBuf;

use chatreplay_core::{EventStore, LoadReport, OrderPolicy, format_time};
use clap::Args;
use serde::Serialize;

use crate::error::Result;
use crate::format::{Format, OrderArg, load_log};

#[derive(Debug, Clone, Args)]
pub struct InspectArgs {
    /// Chat log to inspect.
    pub file: PathBuf,

    /// Record format of the log.
    #[arg(long, value_enum, default_value_t = Format::Auto)]
    pub format: Format,

    /// Handling of records that go back in time.
    #[arg(long, value_enum, default_value_t = OrderArg::Sort)]
    pub order: OrderArg,

    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,
}

/// What `inspect` prints about a log.
#[derive(Debug, Clone, Serialize)]
pub struct InspectSummary {
    pub file: PathBuf,
    pub events: usize,
    pub duration: String,
    pub first_offset_ms: Option<u64>,
    pub last_offset_ms: Option<u64>,
    pub authors: usize,
    pub report: LoadReport,
}

impl InspectSummary {
    #[must_use]
    pub fn new(file: PathBuf, store: &EventStore, report: LoadReport) -> Self {
        let mut authors: Vec<&str> = store.events().iter().map(|e| e.author.as_str()).collect();
        authors.sort_unstable();
        authors.dedup();
        Self {
            file,
            events: store.len(),
            duration: format_time(store.max_offset_ms()),
            first_offset_ms: store.events().first().map(|e| e.offset_ms),
            last_offset_ms: store.events().last().map(|e| e.offset_ms),
            authors: authors.len(),
            report,
        }
    }

    pub fn write_text<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let report = &self.report;
        writeln!(out, "file:         {}", self.file.display())?;
        writeln!(out, "format:       {}", report.parser)?;
        writeln!(out, "events:       {}", self.events)?;
        writeln!(out, "authors:      {}", self.authors)?;
        writeln!(out, "duration:     {}", self.duration)?;
        if let (Some(first), Some(last)) = (self.first_offset_ms, self.last_offset_ms) {
            writeln!(out, "first/last:   {} / {}", format_time(first), format_time(last))?;
        }
        writeln!(
            out,
            "lines:        {} total, {} blank, {} dropped",
            report.total_lines, report.blank_lines, report.dropped
        )?;
        if report.out_of_order > 0 {
            writeln!(out, "out of order: {}", report.out_of_order)?;
        }
        for dropped in &report.dropped_samples {
            writeln!(out, "  line {}: {}", dropped.line, dropped.reason)?;
        }
        if report.dropped > report.dropped_samples.len() {
            writeln!(
                out,
                "  ... and {} more",
                report.dropped - report.dropped_samples.len()
            )?;
        }
        Ok(())
    }
}

pub fn run_inspect(args: InspectArgs) -> Result<()> {
    let stdout = io::stdout();
    inspect_to(args, &mut stdout.lock())
}

pub fn inspect_to<W: Write>(args: InspectArgs, out: &mut W) -> Result<()> {
    let order: OrderPolicy = args.order.into();
    let (store, report) = load_log(&args.file, args.format, order)?;
    let summary = InspectSummary::new(args.file, &store, report);
    if args.json {
        serde_json::to_writer_pretty(&mut *out, &summary)?;
        writeln!(out)?;
    } else {
        summary.write_text(out)?;
    }
    Ok(())
}
