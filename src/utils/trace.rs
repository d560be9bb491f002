use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::kernel::{Scheduler, TickReport};

/// Registro CSV do estado do escalonador, uma linha por frame
pub struct TraceWriter<W: Write> {
    writer: csv::Writer<W>,
    rows: u64,
}

impl TraceWriter<File> {
    /// Cria o arquivo de trace, sobrescrevendo o anterior
    pub fn create(path: impl AsRef<Path>) -> Result<Self, csv::Error> {
        Self::from_writer(File::create(path)?)
    }
}

impl<W: Write> TraceWriter<W> {
    /// Envolve um writer e grava o cabeçalho
    pub fn from_writer(inner: W) -> Result<Self, csv::Error> {
        let mut writer = csv::Writer::from_writer(inner);
        writer.write_record([
            "frame", "current", "depth", "live", "entered", "ticked", "expired",
        ])?;
        Ok(Self { writer, rows: 0 })
    }

    /// Grava o resultado de um `run_once()`
    pub fn record(&mut self, report: &TickReport, scheduler: &Scheduler) -> Result<(), csv::Error> {
        self.writer.write_record([
            report.frame.to_string(),
            scheduler.current_name().unwrap_or_default().to_string(),
            scheduler.depth().to_string(),
            scheduler.live_count().to_string(),
            report.entered.to_string(),
            report.ticked.clone().unwrap_or_default(),
            report.expired.clone().unwrap_or_default(),
        ])?;
        self.rows += 1;
        Ok(())
    }

    /// Linhas gravadas (sem contar o cabeçalho)
    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Descarrega o buffer e devolve o writer interno
    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error())
    }
}
