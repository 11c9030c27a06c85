//! Batch driver: every input file through extraction, results concatenated
//! in discovery order, then persisted as a feature matrix and label vector.
//!
//! Files share nothing but the read-only subject table, so they are spread
//! over a small pool of worker threads. Each result carries the index it
//! was dispatched with and is put back in that slot, which keeps the output
//! byte-identical to a sequential run.

use crate::config::Config;
use crate::core::features::{extract, FeatureVector, FileFeatures};
use crate::core::manifest::SourceEntry;
use crate::dataset::{discover_inputs, read_stream, SubjectTable};
use crate::error::{Error, Result};
use crate::report::{create_shared_log, SharedRunLog};
use csv::WriterBuilder;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

/// Concatenated output of a run. Row `i` of `rows` is labelled `labels[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMatrix {
    pub rows: Vec<FeatureVector>,
    pub labels: Vec<u32>,
    /// Per-file provenance, in the same order the rows were appended
    pub sources: Vec<SourceEntry>,
}

impl FeatureMatrix {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn append(&mut self, source: SourceEntry, features: FileFeatures) {
        self.rows.extend(features.rows);
        self.labels.extend(features.labels);
        self.sources.push(source);
    }
}

/// An input file with its resolved subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub path: PathBuf,
    pub subject_id: u32,
}

struct FileOutcome {
    source: SourceEntry,
    features: FileFeatures,
}

/// Runs extraction over a whole dataset.
pub struct BatchDriver {
    config: Config,
    table: SubjectTable,
    log: SharedRunLog,
}

impl BatchDriver {
    pub fn new(config: Config, table: SubjectTable) -> Self {
        Self {
            config,
            table,
            log: create_shared_log(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Counters for this driver's runs.
    pub fn log(&self) -> &SharedRunLog {
        &self.log
    }

    /// Discover inputs and resolve each file's subject.
    ///
    /// Every subject is checked against the table here, before any file is
    /// read, so an unknown subject fails the run without partial work.
    pub fn plan(&self) -> Result<Vec<InputFile>> {
        let rule = self.config.subject_rule()?;
        let paths = discover_inputs(
            &self.config.dataset_dir,
            &self.config.subdirs,
            &self.config.extension,
        )?;
        info!(
            files = paths.len(),
            root = %self.config.dataset_dir.display(),
            pattern = rule.as_str(),
            "discovered input files"
        );

        paths
            .into_iter()
            .map(|path| {
                let subject_id = rule.parse(&path)?;
                self.table.get(subject_id)?;
                Ok(InputFile { path, subject_id })
            })
            .collect()
    }

    /// Run the whole batch and return the concatenated matrix.
    pub fn run(&self) -> Result<FeatureMatrix> {
        let inputs = self.plan()?;
        self.run_inputs(&inputs)
    }

    /// Process an explicit list of inputs, concatenating in list order.
    pub fn run_inputs(&self, inputs: &[InputFile]) -> Result<FeatureMatrix> {
        let workers = self.config.worker_count().min(inputs.len()).max(1);
        debug!(workers, files = inputs.len(), "starting extraction");

        let outcomes = if workers == 1 {
            inputs
                .iter()
                .map(|input| self.process_file(input))
                .collect::<Result<Vec<_>>>()?
        } else {
            self.process_parallel(inputs, workers)?
        };

        let mut matrix = FeatureMatrix::default();
        for outcome in outcomes {
            matrix.append(outcome.source, outcome.features);
        }
        Ok(matrix)
    }

    fn process_parallel(&self, inputs: &[InputFile], workers: usize) -> Result<Vec<FileOutcome>> {
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<usize>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<(usize, Result<FileOutcome>)>();
        for index in 0..inputs.len() {
            // The receiver is alive until the scope below ends.
            let _ = job_tx.send(index);
        }
        drop(job_tx);

        // Lowest failing index seen so far; later files are skipped.
        let failed_at = AtomicUsize::new(usize::MAX);
        let mut slots: Vec<Option<FileOutcome>> = (0..inputs.len()).map(|_| None).collect();

        let failure = std::thread::scope(|scope| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                let failed_at = &failed_at;
                scope.spawn(move || {
                    for index in job_rx.iter() {
                        if index > failed_at.load(Ordering::Relaxed) {
                            continue;
                        }
                        let outcome = self.process_file(&inputs[index]);
                        if result_tx.send((index, outcome)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(result_tx);

            // Files before a failure are never skipped, so the lowest failing
            // index is the error a sequential run reports.
            let mut failure: Option<(usize, Error)> = None;
            for (index, outcome) in result_rx.iter() {
                match outcome {
                    Ok(outcome) => slots[index] = Some(outcome),
                    Err(e) => {
                        failed_at.fetch_min(index, Ordering::Relaxed);
                        if !matches!(failure, Some((first, _)) if first < index) {
                            failure = Some((index, e));
                        }
                    }
                }
            }
            failure
        });

        if let Some((_, e)) = failure {
            return Err(e);
        }

        slots
            .into_iter()
            .zip(inputs)
            .map(|(slot, input)| slot.ok_or_else(|| Error::WorkerLost(input.path.clone())))
            .collect()
    }

    fn process_file(&self, input: &InputFile) -> Result<FileOutcome> {
        let stream = read_stream(&input.path)?;
        let transient = stream.iter().filter(|s| s.is_transient()).count();
        let features = extract(&stream, input.subject_id, &self.table)?;
        if features.is_empty() {
            debug!(path = %input.path.display(), "no activity segments in file");
        }

        self.log.record_file(
            stream.len() as u64,
            transient as u64,
            features.len() as u64,
            features.substituted as u64,
        );
        info!(
            path = %input.path.display(),
            subject_id = input.subject_id,
            samples = stream.len(),
            segments = features.len(),
            "processed file"
        );

        let source = SourceEntry {
            path: input.path.clone(),
            subject_id: input.subject_id,
            samples: stream.len(),
            segments: features.len(),
            activities: features.labels.clone(),
        };
        Ok(FileOutcome { source, features })
    }
}

/// Write the feature matrix and label vector.
///
/// Features are comma-separated with no header, labels one per line. Both
/// files are staged next to their targets and only renamed into place once
/// both are complete.
pub fn write_outputs(
    matrix: &FeatureMatrix,
    features_path: &Path,
    labels_path: &Path,
) -> Result<()> {
    let features_tmp = staging_path(features_path);
    let labels_tmp = staging_path(labels_path);

    let staged = write_features(matrix, &features_tmp)
        .and_then(|()| write_labels(matrix, &labels_tmp));
    if let Err(e) = staged {
        discard(&[features_tmp.as_path(), labels_tmp.as_path()]);
        return Err(e);
    }

    if let Err(source) = std::fs::rename(&features_tmp, features_path) {
        discard(&[features_tmp.as_path(), labels_tmp.as_path()]);
        return Err(Error::Io {
            path: features_path.to_path_buf(),
            source,
        });
    }
    if let Err(source) = std::fs::rename(&labels_tmp, labels_path) {
        discard(&[features_path, labels_tmp.as_path()]);
        return Err(Error::Io {
            path: labels_path.to_path_buf(),
            source,
        });
    }

    info!(
        rows = matrix.len(),
        features = %features_path.display(),
        labels = %labels_path.display(),
        "wrote outputs"
    );
    Ok(())
}

fn write_features(matrix: &FeatureMatrix, path: &Path) -> Result<()> {
    let output_err = |source| Error::Output {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(output_err)?;
    for row in &matrix.rows {
        writer
            .write_record(row.as_slice().iter().map(|v| format_value(*v)))
            .map_err(output_err)?;
    }
    writer.flush().map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_labels(matrix: &FeatureMatrix, path: &Path) -> Result<()> {
    let output_err = |source| Error::Output {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(output_err)?;
    for label in &matrix.labels {
        writer.write_record([label.to_string()]).map_err(output_err)?;
    }
    writer.flush().map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Shortest representation that round-trips.
fn format_value(value: f64) -> String {
    format!("{value:?}")
}

fn discard(paths: &[&Path]) {
    for path in paths {
        let _ = std::fs::remove_file(path);
    }
}

fn staging_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    target.with_file_name(name)
}
