//! Output formatting utilities

use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

use clap::ValueEnum;
use serde::Serialize;

use ontocrawl_core::Graph;
use ontocrawl_engine::ResultSink;

/// What goes to stdout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The result graph as N-Triples
    #[default]
    #[value(name = "ntriples")]
    NTriples,
    /// A JSON summary of the run
    Json,
}

/// Write text to a file with owner-only permissions
pub fn write_file(path: &Path, content: &str) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)?;
        file.write_all(content.as_bytes())
    }
    #[cfg(not(unix))]
    {
        std::fs::write(path, content)
    }
}

/// Emit a result graph and/or a summary.
///
/// The graph goes to `path` when given; otherwise it is printed unless the
/// summary takes stdout.
pub fn emit<T: Serialize>(
    graph: &Graph,
    summary: &T,
    path: Option<&Path>,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    if let Some(path) = path {
        write_file(path, &graph.to_ntriples())?;
        if format == OutputFormat::NTriples && !quiet {
            eprintln!("Wrote {} triples to {}", graph.len(), path.display());
        }
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(summary)?),
        OutputFormat::NTriples if path.is_none() => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(graph.to_ntriples().as_bytes())?;
            stdout.flush()?;
        }
        OutputFormat::NTriples => {}
    }
    Ok(())
}

/// Writes each context graph to `<dir>/<key>.nt`
pub struct DirectorySink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    pub fn create(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            written: Vec::new(),
        })
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl ResultSink for DirectorySink {
    fn accept(&mut self, key: &str, graph: &Graph) -> ontocrawl_core::Result<()> {
        let path = self.dir.join(format!("{}.nt", key));
        write_file(&path, &graph.to_ntriples())?;
        tracing::info!("Wrote context {} ({} triples) to {:?}", key, graph.len(), path);
        self.written.push(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontocrawl_core::Triple;

    #[test]
    fn test_directory_sink_writes_one_file_per_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::create(dir.path().join("out")).unwrap();
        let graph: Graph =
            vec![Triple::iris("http://example.org/A", "http://example.org/p", "http://example.org/B")]
                .into();

        sink.accept("chebi", &graph).unwrap();

        let written = std::fs::read_to_string(dir.path().join("out").join("chebi.nt")).unwrap();
        assert_eq!(written, graph.to_ntriples());
        assert_eq!(sink.written().len(), 1);
    }
}
