//! Per-host output buffers and the single-flush printer.
//!
//! A host task never writes to the console while it runs. Everything it
//! produces lands in a [`HostOutput`] and is printed as one block once the
//! task is over, so blocks from different hosts never interleave.

use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Local;

use crate::action::Action;
use crate::helper::format_elapsed;
use crate::task::HostReport;

/// Timestamped log lines for one host.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    lines: Vec<String>,
}

impl Diagnostics {
    /// Prefer the [`diag!`](crate::diag) macro, which fills in the location.
    pub fn record(&mut self, file: &str, line: u32, message: impl AsRef<str>) {
        let file = Path::new(file)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(file);
        self.lines.push(format!(
            "{} {}:{}: {}",
            Local::now().format("%Y/%m/%d %H:%M:%S"),
            file,
            line,
            message.as_ref()
        ));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Everything one host produced.
#[derive(Debug, Default, Clone)]
pub struct HostOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub diagnostics: Diagnostics,
}

/**
    header, then stdout, stderr and diagnostics, each only when non-empty
*/
pub fn render_block(report: &HostReport, action: &Action) -> Vec<u8> {
    let mut block = format!(
        "{} ❭❭❭ {} (time: {})\n",
        report.target,
        action,
        format_elapsed(report.elapsed)
    )
    .into_bytes();

    for section in [&report.output.stdout, &report.output.stderr] {
        if !section.is_empty() {
            block.extend_from_slice(section);
            if !section.ends_with(b"\n") {
                block.push(b'\n');
            }
        }
    }
    for line in report.output.diagnostics.lines() {
        block.extend_from_slice(line.as_bytes());
        block.push(b'\n');
    }
    block
}

/// Shared sink for finished host blocks.
#[derive(Clone)]
pub struct Printer {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Printer {
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(out))),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Write one whole block under a single lock.
    pub fn emit(&self, report: &HostReport, action: &Action) -> io::Result<()> {
        let block = render_block(report, action);
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        out.write_all(&block)?;
        out.flush()
    }
}
