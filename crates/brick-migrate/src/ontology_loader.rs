//! Assemble the reference ontology graph.
//!
//! The base vocabulary is a single Turtle document; the extension graphs come
//! as a zip archive of serialized documents. Each document is parsed with its
//! own blank-node scope and the merged graph is skolemized, so the result can
//! be unioned with and subtracted from building graphs safely.

use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::OntologyConfig;
use crate::error::OntologyError;
use crate::model::Graph;
use crate::parser::{parse_into, Syntax};

/// Where one ontology document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OntologySource {
    Url(String),
    File(PathBuf),
}

impl OntologySource {
    /// Base vocabulary source: a local file if configured, otherwise the
    /// nightly or release URL.
    pub fn base(config: &OntologyConfig) -> Self {
        match &config.brick_file {
            Some(path) => OntologySource::File(path.clone()),
            None if config.use_nightly => OntologySource::Url(config.nightly_url.clone()),
            None => OntologySource::Url(config.brick_url.clone()),
        }
    }

    pub fn imports(config: &OntologyConfig) -> Self {
        match &config.imports_file {
            Some(path) => OntologySource::File(path.clone()),
            None => OntologySource::Url(config.imports_url.clone()),
        }
    }

    fn describe(&self) -> String {
        match self {
            OntologySource::Url(url) => url.clone(),
            OntologySource::File(path) => path.display().to_string(),
        }
    }

    /// Raw bytes of the document.
    pub fn read(&self, config: &OntologyConfig) -> Result<Vec<u8>, OntologyError> {
        match self {
            OntologySource::File(path) => {
                std::fs::read(path).map_err(|source| OntologyError::Read {
                    path: path.clone(),
                    source,
                })
            }
            OntologySource::Url(url) => fetch(url, config.timeout_secs, config.retries),
        }
    }
}

/// GET `url`, retrying up to `retries` more times on failure.
fn fetch(url: &str, timeout_secs: u64, retries: u32) -> Result<Vec<u8>, OntologyError> {
    let agent = ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(timeout_secs))
        .build();
    let attempts = retries.saturating_add(1);
    let mut last_error = String::new();
    for attempt in 1..=attempts {
        debug!(url, attempt, "fetching");
        match agent.get(url).call() {
            Ok(response) => {
                let mut body = Vec::new();
                match response.into_reader().read_to_end(&mut body) {
                    Ok(_) => return Ok(body),
                    Err(e) => last_error = format!("failed to read body: {e}"),
                }
            }
            Err(ureq::Error::Status(code, _)) => last_error = format!("HTTP error {code}"),
            Err(ureq::Error::Transport(transport)) => {
                last_error = format!("transport error: {transport}")
            }
        }
        if attempt < attempts {
            warn!(url, attempt, error = %last_error, "fetch failed, retrying");
            std::thread::sleep(Duration::from_secs(u64::from(attempt)));
        }
    }
    Err(OntologyError::Fetch {
        url: url.to_string(),
        attempts,
        message: last_error,
    })
}

fn is_graph_document(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    [".ttl", ".nt", ".n3"].iter().any(|ext| name.ends_with(ext))
}

/// Parse every graph document in a zip archive into `graph`.
///
/// Directories and files without a graph extension are skipped. Returns the
/// number of documents parsed.
pub fn parse_archive(bytes: &[u8], graph: &mut Graph) -> Result<usize, OntologyError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut parsed = 0;
    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        let name = entry.name().to_string();
        if entry.is_dir() || !is_graph_document(&name) {
            debug!(entry = %name, "skipping archive entry");
            continue;
        }
        let scope = format!("imports_{i}");
        let count = parse_into(
            BufReader::new(entry),
            Syntax::from_file_name(&name),
            &scope,
            graph,
        )
        .map_err(|source| OntologyError::Parse {
            document: name.clone(),
            source,
        })?;
        debug!(entry = %name, statements = count, "parsed archive entry");
        parsed += 1;
    }
    Ok(parsed)
}

/// Load the base vocabulary and the extension bundle into one skolemized
/// graph.
pub fn load_ontology(config: &OntologyConfig) -> Result<Graph, OntologyError> {
    let mut graph = Graph::new();

    let base = OntologySource::base(config);
    let document = base.describe();
    info!(source = %document, "loading base vocabulary");
    let bytes = base.read(config)?;
    let syntax = match &base {
        OntologySource::File(path) => Syntax::from_file_name(&file_name(path)),
        OntologySource::Url(_) => Syntax::Turtle,
    };
    parse_into(bytes.as_slice(), syntax, "brick", &mut graph)
        .map_err(|source| OntologyError::Parse { document, source })?;

    let imports = OntologySource::imports(config);
    info!(source = %imports.describe(), "loading imports bundle");
    let bytes = imports.read(config)?;
    let documents = parse_archive(&bytes, &mut graph)?;

    let graph = graph.skolemize();
    info!(documents = documents + 1, triples = graph.len(), "ontology loaded");
    Ok(graph)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
