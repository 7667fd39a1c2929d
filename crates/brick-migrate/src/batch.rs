//! Batch driver: run every building graph in a directory through the
//! migration pipeline.
//!
//! Per file: parse, compose with the ontology, apply the global rules, then
//! the building's own rules, validate, make at most one repair, and write the
//! clean graph. A failure in one file is logged, reported as not a valid
//! graph and recorded in the summary; the remaining files are still
//! processed.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, error, info};

use crate::emitter::{write_graph, OutputFormat};
use crate::error::{BatchError, BuildingError};
use crate::model::iri::building_name;
use crate::model::Graph;
use crate::parser::load_file;
use crate::repair::RepairState;
use crate::rules::RuleRegistry;
use crate::update::{bind_prefixes, save_graph, UpdateInterface};
use crate::validation::{self, Validation, ViolationSummary};

const SEPARATOR_WIDTH: usize = 79;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    /// Print the validity line and report for every graph.
    pub print_validation: bool,
    /// Where to write report graphs of failing buildings, if anywhere.
    pub report_dir: Option<PathBuf>,
}

/// What happened to one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    /// Clean graph written.
    Migrated {
        repaired: bool,
        triples: u64,
        output: PathBuf,
    },
    /// Validation-only run: the graph conforms and was written unchanged.
    Valid { triples: u64, output: PathBuf },
    /// Validation-only run: the graph does not conform.
    Invalid { violations: Vec<ViolationSummary> },
    Failed {
        error: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        violations: Vec<ViolationSummary>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    pub file: PathBuf,
    pub building: String,
    #[serde(flatten)]
    pub status: FileStatus,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self.status,
            FileStatus::Migrated { .. } | FileStatus::Valid { .. }
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn outcome(&self, building: &str) -> Option<&FileOutcome> {
        self.outcomes.iter().find(|o| o.building == building)
    }
}

pub struct BatchDriver<'a> {
    ontology: &'a Graph,
    registry: &'a RuleRegistry,
    options: BatchOptions,
}

fn print_report(validation: &Validation) {
    let rule = "-".repeat(SEPARATOR_WIDTH);
    println!("{rule}");
    print!("{validation}");
    println!("{rule}");
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl<'a> BatchDriver<'a> {
    pub fn new(ontology: &'a Graph, registry: &'a RuleRegistry, options: BatchOptions) -> Self {
        Self {
            ontology,
            registry,
            options,
        }
    }

    /// Regular files in the input directory, sorted by name.
    fn input_files(&self) -> Result<Vec<PathBuf>, BatchError> {
        let dir = &self.options.input_dir;
        let list_err = |source| BatchError::ListInput {
            path: dir.clone(),
            source,
        };
        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(list_err)? {
            let path = entry.map_err(list_err)?.path();
            if path.is_file() {
                files.push(path);
            } else {
                debug!(path = %path.display(), "skipping non-file entry");
            }
        }
        files.sort();
        Ok(files)
    }

    fn create_dir(path: &Path) -> Result<(), BatchError> {
        fs::create_dir_all(path).map_err(|source| BatchError::CreateOutput {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Migrate every file and write the clean graphs.
    pub fn run(&self) -> Result<BatchSummary, BatchError> {
        let files = self.input_files()?;
        Self::create_dir(&self.options.output_dir)?;
        if let Some(dir) = &self.options.report_dir {
            Self::create_dir(dir)?;
        }
        info!(
            files = files.len(),
            input = %self.options.input_dir.display(),
            "starting migration"
        );

        let mut summary = BatchSummary::default();
        for path in files {
            let name = file_name(&path);
            let building = building_name(&name).to_string();
            println!("{building}");

            let status = match self.migrate_file(&path, &building) {
                Ok(status) => status,
                Err(e) => {
                    error!(file = %path.display(), error = %e, "migration failed");
                    println!("{} not a valid graph", path.display());
                    if let Some(report) = e.report() {
                        self.dump_report(&building, report);
                    }
                    FileStatus::Failed {
                        error: e.to_string(),
                        violations: e.report().map(Validation::violations).unwrap_or_default(),
                    }
                }
            };
            summary.outcomes.push(FileOutcome {
                file: path,
                building,
                status,
            });
        }
        info!(
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            "migration finished"
        );
        Ok(summary)
    }

    fn show_validation(&self, path: &Path, validation: &Validation) {
        if !self.options.print_validation {
            return;
        }
        println!("Graph {} is valid? {}", path.display(), validation.conforms);
        if !validation.conforms {
            print_report(validation);
        }
    }

    fn migrate_file(&self, path: &Path, building: &str) -> Result<FileStatus, BuildingError> {
        let data = load_file(path, building).map_err(|source| BuildingError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(building, triples = data.len(), "parsed building graph");

        let update = UpdateInterface::new(building, &data, self.ontology)?;
        update.apply_rules(self.registry.global())?;
        let local = self.registry.for_building(building);
        update.apply_rules(local)?;
        debug!(building, building_rules = local.len(), "rules applied");

        let mut state = RepairState::Unvalidated;
        while !state.is_terminal() {
            let initial = match &state {
                RepairState::Invalid(v) => Some(Box::new(v.clone())),
                _ => None,
            };
            state = update
                .step_repair(state)
                .map_err(|source| BuildingError::Repair {
                    source,
                    report: initial,
                })?;
            match &state {
                RepairState::Valid(v) | RepairState::Invalid(v) => self.show_validation(path, v),
                RepairState::Revalidated { report, .. } => self.show_validation(path, report),
                _ => {}
            }
        }

        if let RepairState::Revalidated { report, .. } = &state {
            if !report.conforms {
                return Err(BuildingError::Unrepairable {
                    report: Box::new(report.clone()),
                });
            }
        }

        let output = self.output_path(path);
        let triples = update.save_clean_graph(&output, self.options.format)?;
        info!(building, triples, output = %output.display(), "wrote clean graph");
        Ok(FileStatus::Migrated {
            repaired: state.patch().is_some(),
            triples,
            output,
        })
    }

    fn output_path(&self, input: &Path) -> PathBuf {
        self.options
            .output_dir
            .join(file_name(input))
            .with_extension(self.options.format.extension())
    }

    /// Validate every file against the ontology as-is. No rule is applied
    /// and no repair is attempted; conforming graphs are written to the
    /// output directory unchanged.
    pub fn validate_only(&self) -> Result<BatchSummary, BatchError> {
        let files = self.input_files()?;
        Self::create_dir(&self.options.output_dir)?;
        if let Some(dir) = &self.options.report_dir {
            Self::create_dir(dir)?;
        }
        let mut summary = BatchSummary::default();
        for path in files {
            let name = file_name(&path);
            let building = building_name(&name).to_string();
            let status = match self.validate_file(&path, &building) {
                Ok(status) => status,
                Err(e) => {
                    error!(file = %path.display(), error = %e, "validation failed");
                    println!("{} not a valid graph", path.display());
                    FileStatus::Failed {
                        error: e.to_string(),
                        violations: Vec::new(),
                    }
                }
            };
            summary.outcomes.push(FileOutcome {
                file: path,
                building,
                status,
            });
        }
        Ok(summary)
    }

    fn validate_file(&self, path: &Path, building: &str) -> Result<FileStatus, BuildingError> {
        let mut data = load_file(path, building).map_err(|source| BuildingError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let validation = validation::validate(&(&data + self.ontology));
        println!("Graph {} is valid? {}", path.display(), validation.conforms);
        if !validation.conforms {
            print_report(&validation);
            self.dump_report(building, &validation);
            return Ok(FileStatus::Invalid {
                violations: validation.violations(),
            });
        }
        bind_prefixes(&mut data, building);
        let output = self.output_path(path);
        let triples = save_graph(&data, &output, self.options.format)?;
        info!(building, triples, output = %output.display(), "wrote conforming graph");
        Ok(FileStatus::Valid { triples, output })
    }

    /// Write a failing building's report graph to the report directory.
    fn dump_report(&self, building: &str, validation: &Validation) {
        let Some(dir) = &self.options.report_dir else {
            return;
        };
        let path = dir.join(format!("{building}_report.ttl"));
        let written = File::create(&path)
            .and_then(|f| write_graph(BufWriter::new(f), &validation.report, OutputFormat::Turtle));
        match written {
            Ok(_) => debug!(report = %path.display(), "wrote validation report"),
            Err(e) => error!(report = %path.display(), error = %e, "could not write report"),
        }
    }
}
