/// Workload file writer
///
/// Writes the header and open marker on construction, one line per event,
/// and the close marker on `finish`.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use rand::Rng;
use thiserror::Error;
use tracing::info;

use crate::config::{ConfigError, GeneratorConfig};
use crate::generator::OrderGenerator;
use crate::protocol::{Event, CLOSE_MARKER, OPEN_MARKER};
use crate::stats::GenerationStats;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to create {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("write failed: {0}")]
    Io(#[from] io::Error),
}

pub struct WorkloadWriter<W: Write> {
    inner: W,
    events_written: usize,
}

impl<W: Write> WorkloadWriter<W> {
    pub fn new(mut inner: W, n_threads: u32) -> io::Result<Self> {
        writeln!(inner, "{}", n_threads)?;
        writeln!(inner, "{}", OPEN_MARKER)?;
        Ok(WorkloadWriter {
            inner,
            events_written: 0,
        })
    }

    pub fn write_event(&mut self, event: &Event) -> io::Result<()> {
        writeln!(self.inner, "{}", event)?;
        self.events_written += 1;
        Ok(())
    }

    pub fn events_written(&self) -> usize {
        self.events_written
    }

    /// Write the close marker (no trailing newline), flush, and hand back the sink
    pub fn finish(mut self) -> io::Result<W> {
        self.inner.write_all(CLOSE_MARKER.as_bytes())?;
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Generate a full workload into `out` using `rng`
pub fn generate_into<W, R>(
    config: &GeneratorConfig,
    rng: R,
    out: W,
) -> Result<(W, GenerationStats), GenerateError>
where
    W: Write,
    R: Rng,
{
    let generator = OrderGenerator::new(config, rng)?;
    write_workload(generator, out)
}

/// Drain a validated generator's quota into `out`, framed
pub fn write_workload<W, R>(
    mut generator: OrderGenerator<R>,
    out: W,
) -> Result<(W, GenerationStats), GenerateError>
where
    W: Write,
    R: Rng,
{
    let mut writer = WorkloadWriter::new(out, generator.n_threads())?;
    let mut stats = GenerationStats::new();

    generator.run(&mut stats, |event| writer.write_event(event))?;

    let out = writer.finish()?;
    Ok((out, stats))
}

/// Generate a workload at `config.filename`, seeded from `config.seed`.
/// The file is only created once the config has been accepted.
pub fn generate_to_path(config: &GeneratorConfig) -> Result<GenerationStats, GenerateError> {
    let generator = OrderGenerator::new(config, config.rng())?;
    let file = File::create(&config.filename).map_err(|source| GenerateError::Create {
        path: config.filename.clone(),
        source,
    })?;

    let (_, stats) = write_workload(generator, BufWriter::new(file))?;
    info!(
        path = %config.filename.display(),
        events = stats.total_events(),
        "workload written"
    );
    Ok(stats)
}
