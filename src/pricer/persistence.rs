//! Market-state persistence.
//!
//! [`MarketStateStore`] saves the stock of every priced item to one file per
//! item and loads those files back as stock-only registry entries.
//!
//! # On-Disk Format
//!
//! The file name is the item key verbatim. The body is UTF-8 text:
//!
//! ```text
//! <stock>
//! <spread>
//! ```
//!
//! `stock` is the real stock with the base-price offset removed, so that
//! promoting the loaded entry with the same base price rebuilds the same
//! counter. `spread` is the spread in effect when the file was written; it is
//! optional on read, and single-line files are accepted.
//!
//! # Parallelism
//!
//! Below the configured threshold files are handled serially on the calling
//! thread. At or above it they are drained from a shared queue by a bounded
//! set of scoped worker threads. Both paths return only after every file was
//! handled.

use super::error::PricerError;
use super::registry::{PricedEntry, Registry};
use crossbeam::queue::SegQueue;
use std::fs;
use std::io::ErrorKind;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use tracing::{debug, info, warn};

/// Outcome of a load phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Files registered as stock-only entries
    pub loaded: usize,
    /// Files that could not be read or parsed
    pub skipped: usize,
    /// Files whose key was already registered
    pub duplicates: usize,
    /// Whether the worker pool was used
    pub parallel: bool,
}

/// Outcome of a save phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// Items written to disk
    pub written: usize,
    /// Items whose file could not be replaced or written
    pub failed: usize,
    /// The market-state directory could not be created and nothing was saved
    pub directory_unavailable: bool,
    /// Whether the worker pool was used
    pub parallel: bool,
}

#[derive(Default)]
struct Tally {
    ok: AtomicUsize,
    failed: AtomicUsize,
    duplicates: AtomicUsize,
}

impl Tally {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Reads and writes the market-state directory.
#[derive(Debug, Clone)]
pub struct MarketStateStore {
    dir: PathBuf,
    parallel_threshold: usize,
}

impl MarketStateStore {
    /// Store rooted at `dir`, fanning out at `parallel_threshold` items.
    pub fn new<P: Into<PathBuf>>(dir: P, parallel_threshold: usize) -> Self {
        Self {
            dir: dir.into(),
            parallel_threshold,
        }
    }

    /// The market-state directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Item count at which saving fans out. Saving uses a larger threshold
    /// than loading since only priced items are written.
    #[must_use]
    pub fn save_threshold(&self) -> usize {
        self.parallel_threshold.saturating_mul(3) / 2
    }

    /// Register every readable market-state file as a stock-only entry.
    ///
    /// Unreadable and malformed files are logged and skipped. A missing
    /// directory loads nothing.
    ///
    /// # Errors
    ///
    /// [`PricerError::WorkerPanicked`] if a loader thread panicked.
    pub fn load_into(&self, registry: &Registry) -> Result<LoadReport, PricerError> {
        let files = match self.list_files() {
            Ok(files) => files,
            Err(PricerError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                debug!("no market state at {}", self.dir.display());
                return Ok(LoadReport::default());
            }
            Err(e) => {
                warn!("{e}");
                return Ok(LoadReport::default());
            }
        };

        let parallel = files.len() >= self.parallel_threshold;
        let tally = Tally::default();
        let load = |path: PathBuf| match read_entry(&path) {
            Ok((key, stock, spread)) => {
                if registry.insert_stock(&key, stock, spread) {
                    warn!("item {key} has duplicate entries");
                    Tally::bump(&tally.duplicates);
                }
                Tally::bump(&tally.ok);
            }
            Err(e) => {
                warn!("error reading market state: {e}");
                Tally::bump(&tally.failed);
            }
        };

        if parallel {
            run_pooled(files, load)?;
        } else {
            files.into_iter().for_each(load);
        }

        let report = LoadReport {
            loaded: tally.ok.into_inner(),
            skipped: tally.failed.into_inner(),
            duplicates: tally.duplicates.into_inner(),
            parallel,
        };
        info!(
            "loaded market state for {} items ({} skipped) from {}",
            report.loaded,
            report.skipped,
            self.dir.display()
        );
        Ok(report)
    }

    /// Write the stock of every priced entry of `registry`.
    ///
    /// Stock-only and unpriced entries are not written. Per-item failures
    /// are logged and do not stop the remaining items.
    ///
    /// # Errors
    ///
    /// [`PricerError::WorkerPanicked`] if a writer thread panicked.
    pub fn save_from(&self, registry: &Registry) -> Result<SaveReport, PricerError> {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            warn!(
                "could not create market state directory {}: {e}",
                self.dir.display()
            );
            return Ok(SaveReport {
                directory_unavailable: true,
                ..SaveReport::default()
            });
        }

        let entries = registry.priced_snapshot();
        let parallel = entries.len() >= self.save_threshold();
        let tally = Tally::default();
        let save = |entry: PricedEntry| match self.write_entry(&entry) {
            Ok(()) => Tally::bump(&tally.ok),
            Err(e) => {
                warn!("could not save market state for {}: {e}", entry.key);
                Tally::bump(&tally.failed);
            }
        };

        if parallel {
            run_pooled(entries, save)?;
        } else {
            entries.into_iter().for_each(save);
        }

        let report = SaveReport {
            written: tally.ok.into_inner(),
            failed: tally.failed.into_inner(),
            directory_unavailable: false,
            parallel,
        };
        info!(
            "saved market state for {} items ({} failed) to {}",
            report.written,
            report.failed,
            self.dir.display()
        );
        Ok(report)
    }

    fn list_files(&self) -> Result<Vec<PathBuf>, PricerError> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(|e| PricerError::io(&self.dir, e))? {
            let entry = entry.map_err(|e| PricerError::io(&self.dir, e))?;
            let path = entry.path();
            if path.is_file() {
                files.push(path);
            } else {
                debug!("ignoring non-file {}", path.display());
            }
        }
        Ok(files)
    }

    fn write_entry(&self, entry: &PricedEntry) -> Result<(), PricerError> {
        let path = self.entry_path(&entry.key)?;
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(PricerError::io(path, e)),
        }
        fs::write(&path, encode(entry.stock, entry.spread)).map_err(|e| PricerError::io(path, e))
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf, PricerError> {
        let path = self.dir.join(key);
        let plain = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\'])
            && path.parent() == Some(self.dir.as_path());
        if plain {
            Ok(path)
        } else {
            Err(PricerError::Parse {
                path,
                message: format!("item key {key:?} is not a valid file name"),
            })
        }
    }
}

/// Encode a stock and spread in the market-state file format.
#[must_use]
pub fn encode(stock: f64, spread: f64) -> String {
    format!("{stock}\n{spread}\n")
}

/// Decode a market-state file body into its stock and optional spread.
///
/// # Errors
///
/// [`PricerError::Parse`] for an empty body, a non-finite stock, a
/// non-positive or non-finite spread, or trailing data.
pub fn decode(contents: &str, path: &Path) -> Result<(f64, Option<f64>), PricerError> {
    let parse_error = |message: String| PricerError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let mut lines = contents.lines().map(str::trim).filter(|l| !l.is_empty());

    let stock = lines
        .next()
        .ok_or_else(|| parse_error("empty file".to_string()))?;
    let stock: f64 = stock
        .parse()
        .map_err(|e| parse_error(format!("stock {stock:?}: {e}")))?;
    if !stock.is_finite() {
        return Err(parse_error(format!("stock {stock} is not finite")));
    }

    let spread = match lines.next() {
        None => None,
        Some(raw) => {
            let spread: f64 = raw
                .parse()
                .map_err(|e| parse_error(format!("spread {raw:?}: {e}")))?;
            if !spread.is_finite() || spread <= 0.0 {
                return Err(parse_error(format!("spread {spread} is not positive")));
            }
            Some(spread)
        }
    };

    if lines.next().is_some() {
        return Err(parse_error("unexpected trailing data".to_string()));
    }
    Ok((stock, spread))
}

fn read_entry(path: &Path) -> Result<(String, f64, Option<f64>), PricerError> {
    let key = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| PricerError::Parse {
            path: path.to_path_buf(),
            message: "file name is not valid UTF-8".to_string(),
        })?
        .to_owned();
    let contents = fs::read_to_string(path).map_err(|e| PricerError::io(path, e))?;
    let (stock, spread) = decode(&contents, path)?;
    Ok((key, stock, spread))
}

/// Run `job` on every item using at most `available_parallelism` scoped
/// threads, returning once all of them finished.
fn run_pooled<T, F>(items: Vec<T>, job: F) -> Result<(), PricerError>
where
    T: Send,
    F: Fn(T) + Sync,
{
    let workers = thread::available_parallelism()
        .map_or(1, NonZeroUsize::get)
        .min(items.len())
        .max(1);

    let queue = SegQueue::new();
    for item in items {
        queue.push(item);
    }

    let queue = &queue;
    let job = &job;
    crossbeam::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(move |_| {
                while let Some(item) = queue.pop() {
                    job(item);
                }
            });
        }
    })
    .map_err(|_| PricerError::WorkerPanicked)
}
