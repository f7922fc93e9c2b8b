use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::core::state::Cycle;
use crate::program::instruction::{self, Instruction, InstructionKind, ParseError};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path}: no instructions")]
    EmptyProgram { path: PathBuf },
}

/// A parsed process definition file. Malformed instruction lines are kept as
/// no-op computes so a bad program degrades instead of stalling the run; each
/// one is reported in `warnings` with its 1-based line number.
#[derive(Debug)]
pub struct ProgramImage {
    pub name: String,
    pub instructions: Vec<Instruction>,
    pub warnings: Vec<(usize, ParseError)>,
}

fn meaningful(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        None
    } else {
        Some(line)
    }
}

/// Read one process definition file. The first meaningful line names the
/// process unless it already decodes as an instruction, in which case the
/// file stem is used as an implicit name.
pub fn load_program(path: &Path) -> Result<ProgramImage, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let implicit_name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unnamed".to_string());

    let mut name = None;
    let mut instructions = Vec::new();
    let mut warnings = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = match meaningful(raw) {
            Some(line) => line,
            None => continue,
        };

        if name.is_none() && instructions.is_empty() && instruction::decode(line).is_err() {
            name = Some(line.to_string());
            continue;
        }

        match instruction::decode(line) {
            Ok(instr) => instructions.push(instr),
            Err(err) => {
                warnings.push((idx + 1, err));
                instructions.push(Instruction {
                    ordinal: instructions.len() as u32 + 1,
                    kind: InstructionKind::Compute,
                });
            }
        }
    }

    if instructions.is_empty() {
        return Err(LoadError::EmptyProgram {
            path: path.to_path_buf(),
        });
    }

    Ok(ProgramImage {
        name: name.unwrap_or(implicit_name),
        instructions,
        warnings,
    })
}

/// The scripted creation schedule: which process files come into existence
/// at which cycle. Listed file order within a cycle is preserved, which fixes
/// the FIFO tie-break among same-cycle admissions.
#[derive(Debug, Default)]
pub struct CreationSchedule {
    by_cycle: FxHashMap<Cycle, Vec<PathBuf>>,
    last_cycle: Option<Cycle>,
}

impl CreationSchedule {
    /// Parse creation-order text. Lines are `cycle file...`; `#` comments and
    /// blanks are ignored, malformed lines are skipped and returned as
    /// warnings. Relative file names are resolved against `base_dir`.
    pub fn parse(text: &str, base_dir: &Path) -> (Self, Vec<String>) {
        let mut schedule = CreationSchedule::default();
        let mut warnings = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = match meaningful(raw) {
                Some(line) => line,
                None => continue,
            };
            let mut fields = line.split_whitespace();
            let cycle_field = fields.next().unwrap_or_default();
            let cycle: Cycle = match cycle_field.parse() {
                Ok(cycle) => cycle,
                Err(_) => {
                    warnings.push(format!(
                        "creation order line {}: malformed cycle {:?}, line skipped",
                        idx + 1,
                        cycle_field
                    ));
                    continue;
                }
            };

            let files: Vec<PathBuf> = fields.map(|f| base_dir.join(f)).collect();
            if files.is_empty() {
                warnings.push(format!(
                    "creation order line {}: no process files listed, line skipped",
                    idx + 1
                ));
                continue;
            }

            schedule.last_cycle = Some(schedule.last_cycle.map_or(cycle, |l| l.max(cycle)));
            schedule.by_cycle.entry(cycle).or_default().extend(files);
        }

        (schedule, warnings)
    }

    pub fn from_file(path: &Path) -> Result<(Self, Vec<String>), LoadError> {
        let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(Self::parse(&text, base_dir))
    }

    /// Process files due at exactly this cycle, in listed order.
    pub fn due(&self, cycle: Cycle) -> &[PathBuf] {
        self.by_cycle.get(&cycle).map_or(&[], |v| v.as_slice())
    }

    /// Whether any entry is still scheduled at or after `cycle`.
    pub fn pending_at_or_after(&self, cycle: Cycle) -> bool {
        self.last_cycle.is_some_and(|last| last >= cycle)
    }
}
