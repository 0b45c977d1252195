use rustc_hash::FxHashSet;
use sparql_ld_model::Identifier;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};
use tracing::{debug, error, warn};

/// The set of identifiers that are known to answer as SPARQL endpoints.
///
/// The registry is the only state of the resolver that outlives a single query evaluation. It is
/// loaded once from a newline-delimited file and every addition is appended to that file before
/// [EndpointRegistry::add] returns. The file is never rewritten.
///
/// Membership tests ignore case. The file stores the identifiers exactly as they were added.
///
/// # Persistence failures
///
/// Neither a missing file nor a failed write is fatal. The failure is logged and the registry
/// continues to work in memory.
#[derive(Debug)]
pub struct EndpointRegistry {
    /// The folded identifiers.
    endpoints: RwLock<FxHashSet<String>>,
    /// The backing file, if any.
    path: Option<PathBuf>,
    /// The append handle of the backing file. Opened on the first addition.
    appender: Mutex<Option<File>>,
}

impl EndpointRegistry {
    /// Creates a registry that is not backed by a file.
    pub fn in_memory() -> Self {
        Self {
            endpoints: RwLock::new(FxHashSet::default()),
            path: None,
            appender: Mutex::new(None),
        }
    }

    /// Loads the registry from the file at `path`.
    ///
    /// Blank lines and lines starting with `#` are skipped. If the file cannot be read, the
    /// registry starts empty and later additions still try to create the file.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let endpoints = match read_endpoints(&path) {
            Ok(endpoints) => {
                debug!(path = %path.display(), count = endpoints.len(), "Loaded known endpoints");
                endpoints
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "Could not read known endpoints, starting empty"
                );
                FxHashSet::default()
            }
        };

        Self {
            endpoints: RwLock::new(endpoints),
            path: Some(path),
            appender: Mutex::new(None),
        }
    }

    /// Returns whether `identifier` is a known endpoint, ignoring case.
    pub fn contains(&self, identifier: &Identifier) -> bool {
        self.contains_str(identifier.folded())
    }

    /// Returns whether the text `identifier` is a known endpoint, ignoring case.
    pub fn contains_str(&self, identifier: &str) -> bool {
        let folded = identifier.trim().to_lowercase();
        self.endpoints
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&folded)
    }

    /// Adds `identifier` to the registry and appends it to the backing file.
    ///
    /// Returns whether the identifier was not yet known. The file is written even for known
    /// identifiers, loading the file removes the duplicates again.
    pub fn add(&self, identifier: &Identifier) -> bool {
        let inserted = self
            .endpoints
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(identifier.folded().to_owned());

        if let Err(err) = self.append(identifier.as_str()) {
            error!(
                identifier = %identifier,
                error = %err,
                "Could not persist known endpoint, keeping it in memory only"
            );
        }
        inserted
    }

    /// Returns a snapshot of the (folded) known endpoints.
    pub fn endpoints(&self) -> Vec<String> {
        let mut endpoints = self
            .endpoints
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect::<Vec<_>>();
        endpoints.sort_unstable();
        endpoints
    }

    pub fn len(&self) -> usize {
        self.endpoints
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Flushes all appended identifiers to the storage device.
    pub fn flush(&self) {
        let mut appender = self.appender.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(file) = appender.as_mut() {
            if let Err(err) = file.flush().and_then(|()| file.sync_data()) {
                error!(error = %err, "Could not flush known endpoints");
            }
        }
    }

    /// Flushes and releases the backing file.
    ///
    /// Later additions re-open the file.
    pub fn close(&self) {
        self.flush();
        self.appender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    fn append(&self, identifier: &str) -> io::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let mut appender = self.appender.lock().unwrap_or_else(PoisonError::into_inner);
        let file = match appender.take() {
            Some(file) => file,
            None => OpenOptions::new().create(true).append(true).open(path)?,
        };
        let file = appender.insert(file);
        writeln!(file, "{identifier}")?;
        file.flush()
    }
}

impl Drop for EndpointRegistry {
    fn drop(&mut self) {
        self.flush();
    }
}

fn read_endpoints(path: &Path) -> io::Result<FxHashSet<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut endpoints = FxHashSet::default();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        endpoints.insert(line.to_lowercase());
    }
    Ok(endpoints)
}
