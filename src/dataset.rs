//! @ai:module:intent Build and check training data from text and annotation files
//! @ai:module:layer application
//! @ai:module:public_api build_file, build_directory, check_file, check_lines, load_chunks, BuildReport, BatchReport, CheckResult
//! @ai:module:depends_on aligner, chunk, config, directive, emitter, error

use crate::aligner::{AlignmentOutcome, Aligner};
use crate::chunk::{clean_text, split_chunks, Chunk};
use crate::config::{ChunkingConfig, SylnerConfig};
use crate::directive::{read_directives, validate, ValidationError};
use crate::emitter::JsonlEmitter;
use crate::error::{Error, Result};
use crate::label::LabelSet;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// @ai:intent Result of validating directive lines without aligning them
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CheckResult {
    pub files_checked: usize,
    pub lines_checked: usize,
    pub valid: usize,
    pub rejected: Vec<ValidationError>,
}

impl CheckResult {
    /// @ai:intent Check passed when no line was rejected
    pub fn passed(&self) -> bool {
        self.rejected.is_empty()
    }

    pub fn merge(&mut self, other: CheckResult) {
        self.files_checked += other.files_checked;
        self.lines_checked += other.lines_checked;
        self.valid += other.valid;
        self.rejected.extend(other.rejected);
    }
}

/// @ai:intent Summary of building one training file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    pub text_path: PathBuf,
    pub annotations_path: PathBuf,
    pub output_path: PathBuf,
    pub chunks: usize,
    pub records_written: usize,
    pub outcome: AlignmentOutcome,
}

/// @ai:intent A file that could not be built during a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub message: String,
}

/// @ai:intent Summary of a directory batch run
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BatchReport {
    pub built: Vec<BuildReport>,
    pub skipped: Vec<PathBuf>,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    /// @ai:intent Batch passed when every paired file was built
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn documents_emitted(&self) -> usize {
        self.built.iter().map(|r| r.outcome.documents_emitted).sum()
    }

    pub fn rejected_lines(&self) -> usize {
        self.built.iter().map(|r| r.outcome.rejected.len()).sum()
    }
}

/// @ai:intent Read a text file and turn it into chunks according to the chunking config
/// @ai:effects fs:read
pub fn load_chunks(path: &Path, chunking: &ChunkingConfig) -> Result<Vec<Chunk>> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(prepare_chunks(&text, chunking))
}

/// @ai:intent Optionally clean text, then split it into chunks
/// @ai:effects pure
pub fn prepare_chunks(text: &str, chunking: &ChunkingConfig) -> Vec<Chunk> {
    if chunking.clean {
        split_chunks(&clean_text(text), &chunking.separator)
    } else {
        split_chunks(text, &chunking.separator)
    }
}

/// @ai:intent Read the directive source file
/// @ai:effects fs:read
pub fn load_directives(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    read_directives(BufReader::new(file))
}

/// @ai:intent Validate directive lines against the label set
/// @ai:effects pure
pub fn check_lines(lines: &[String], labels: &LabelSet) -> CheckResult {
    let mut result = CheckResult {
        files_checked: 1,
        lines_checked: lines.len(),
        ..Default::default()
    };

    for (idx, line) in lines.iter().enumerate() {
        match validate(line, idx + 1, labels) {
            Ok(_) => result.valid += 1,
            Err(rejection) => result.rejected.push(rejection),
        }
    }

    result
}

/// @ai:intent Validate an annotation file without aligning it
/// @ai:effects fs:read
pub fn check_file(path: &Path, labels: &LabelSet) -> Result<CheckResult> {
    let lines = load_directives(path)?;
    Ok(check_lines(&lines, labels))
}

/// @ai:intent Align one text file with its annotation file and write JSON-lines training data
/// @ai:pre text_path and annotations_path exist
/// @ai:post output_path holds one record per emitted document
/// @ai:effects fs:read, fs:write
pub fn build_file(
    text_path: &Path,
    annotations_path: &Path,
    output_path: &Path,
    config: &SylnerConfig,
) -> Result<BuildReport> {
    let chunks = load_chunks(text_path, &config.chunking)?;
    let directives = load_directives(annotations_path)?;

    let mut emitter = JsonlEmitter::create(output_path)?;
    let outcome = Aligner::new(&config.labels).run(&chunks, &directives, &mut emitter)?;
    let records_written = emitter.written();
    emitter.finish()?;

    tracing::info!(
        "Built {} ({} documents, {} rejected lines)",
        output_path.display(),
        outcome.documents_emitted,
        outcome.rejected.len()
    );

    Ok(BuildReport {
        text_path: text_path.to_path_buf(),
        annotations_path: annotations_path.to_path_buf(),
        output_path: output_path.to_path_buf(),
        chunks: chunks.len(),
        records_written,
        outcome,
    })
}

/// @ai:intent Build every `*.txt` under text_dir that has an annotation file at the same relative path
/// @ai:post outputs mirror the relative layout of text_dir, so nested files never collide
/// @ai:post files without annotations are skipped; per-file errors do not abort the batch
/// @ai:effects fs:read, fs:write
pub fn build_directory(
    text_dir: &Path,
    annotations_dir: &Path,
    output_dir: &Path,
    config: &SylnerConfig,
) -> Result<BatchReport> {
    std::fs::create_dir_all(output_dir).map_err(|e| Error::FileWrite {
        path: output_dir.to_path_buf(),
        source: e,
    })?;

    let mut report = BatchReport::default();

    let mut text_files: Vec<PathBuf> = WalkDir::new(text_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .filter(|p| p.extension().map(|ext| ext == "txt").unwrap_or(false))
        .collect();
    text_files.sort();

    for text_path in text_files {
        let Ok(relative) = text_path.strip_prefix(text_dir) else {
            continue;
        };
        let annotations_path = annotations_dir.join(relative);
        if !annotations_path.is_file() {
            tracing::warn!(
                "Skipping {}: no annotations at {}",
                text_path.display(),
                annotations_path.display()
            );
            report.skipped.push(text_path);
            continue;
        }

        let output_path = output_dir.join(relative).with_extension("jsonl");
        if let Some(parent) = output_path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                report.failures.push(BatchFailure {
                    path: text_path,
                    message: format!("Failed to create {}: {}", parent.display(), e),
                });
                continue;
            }
        }

        match build_file(&text_path, &annotations_path, &output_path, config) {
            Ok(built) => report.built.push(built),
            Err(e) => {
                tracing::warn!("Failed to build {}: {}", text_path.display(), e);
                report.failures.push(BatchFailure {
                    path: text_path,
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aligner::Termination;
    use crate::emitter::TrainingRecord;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_check_file_reports_rejections() {
        let file = write_temp("midterm>>2\nxyz9\nquiz>>a\n\nafter blank>>9\n");
        let result = check_file(file.path(), &LabelSet::default()).unwrap();

        assert_eq!(result.lines_checked, 3);
        assert_eq!(result.valid, 1);
        assert_eq!(result.rejected.len(), 2);
        assert_eq!(result.rejected[0].line_number(), 2);
        assert!(!result.passed());
    }

    #[test]
    fn test_prepare_chunks_cleans_by_default() {
        let chunks = prepare_chunks("Midterm (Week 5)\nFinal", &ChunkingConfig::default());
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "midterm week 5");
    }

    #[test]
    fn test_prepare_chunks_raw() {
        let chunking = ChunkingConfig {
            clean: false,
            separator: "|".to_string(),
        };
        let chunks = prepare_chunks("Quiz (1)|Exam", &chunking);
        assert_eq!(chunks[0].text, "Quiz (1)");
        assert_eq!(chunks[1].text, "Exam");
    }

    #[test]
    fn test_build_file_writes_records() {
        let text = write_temp("Homework 1 due Friday\n\nMidterm Exam in week 5\n");
        let annotations = write_temp("homework 1>>1\nmidterm exam>>2\n");
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.jsonl");

        let report =
            build_file(text.path(), annotations.path(), &output, &SylnerConfig::default()).unwrap();

        assert_eq!(report.outcome.documents_emitted, 2);
        assert_eq!(report.outcome.termination, Termination::DirectivesExhausted);
        assert_eq!(report.records_written, 2);

        let records: Vec<TrainingRecord> = std::fs::read_to_string(&output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(records[0].entities, vec![(0, 10, "ASSIGNMENT".to_string())]);
        assert_eq!(records[1].chunk_index, 2);
        assert_eq!(records[1].entities, vec![(0, 12, "ASSESSMENT".to_string())]);
    }

    #[test]
    fn test_build_directory_pairs_files() {
        let root = tempfile::tempdir().unwrap();
        let texts = root.path().join("texts");
        let annotations = root.path().join("annotations");
        let output = root.path().join("train");
        std::fs::create_dir_all(&texts).unwrap();
        std::fs::create_dir_all(&annotations).unwrap();

        std::fs::write(texts.join("geog3.txt"), "lecture 1\nquiz 1\n").unwrap();
        std::fs::write(texts.join("math5.txt"), "no annotations here\n").unwrap();
        std::fs::write(texts.join("notes.md"), "ignored\n").unwrap();
        std::fs::write(annotations.join("geog3.txt"), "lecture 1>>3\nquiz 1>>2\n").unwrap();

        let report =
            build_directory(&texts, &annotations, &output, &SylnerConfig::default()).unwrap();

        assert!(report.passed());
        assert_eq!(report.built.len(), 1);
        assert_eq!(report.skipped, vec![texts.join("math5.txt")]);
        assert_eq!(report.documents_emitted(), 2);
        assert!(output.join("geog3.jsonl").is_file());
    }

    #[test]
    fn test_build_directory_keeps_nested_files_apart() {
        let root = tempfile::tempdir().unwrap();
        let texts = root.path().join("texts");
        let annotations = root.path().join("annotations");
        let output = root.path().join("train");
        for term in ["fall", "spring"] {
            std::fs::create_dir_all(texts.join(term)).unwrap();
            std::fs::create_dir_all(annotations.join(term)).unwrap();
        }

        std::fs::write(texts.join("fall/cs148.txt"), "quiz 1\n").unwrap();
        std::fs::write(texts.join("spring/cs148.txt"), "lecture 9\n").unwrap();
        std::fs::write(annotations.join("fall/cs148.txt"), "quiz 1>>2\n").unwrap();
        std::fs::write(annotations.join("spring/cs148.txt"), "lecture 9>>3\n").unwrap();
        std::fs::write(annotations.join("cs148.txt"), "quiz 1>>2\n").unwrap();

        let report =
            build_directory(&texts, &annotations, &output, &SylnerConfig::default()).unwrap();
        assert!(report.passed());
        assert_eq!(report.built.len(), 2);

        let read = |path: PathBuf| -> TrainingRecord {
            let content = std::fs::read_to_string(path).unwrap();
            serde_json::from_str(content.lines().next().unwrap()).unwrap()
        };
        let fall = read(output.join("fall/cs148.jsonl"));
        let spring = read(output.join("spring/cs148.jsonl"));
        assert_eq!(fall.entities, vec![(0, 6, "ASSESSMENT".to_string())]);
        assert_eq!(spring.entities, vec![(0, 9, "LECTURE".to_string())]);
        assert!(!output.join("cs148.jsonl").exists());
    }

    #[test]
    fn test_build_directory_skips_nested_file_without_own_annotations() {
        let root = tempfile::tempdir().unwrap();
        let texts = root.path().join("texts");
        let annotations = root.path().join("annotations");
        std::fs::create_dir_all(texts.join("fall")).unwrap();
        std::fs::create_dir_all(&annotations).unwrap();

        std::fs::write(texts.join("fall/cs148.txt"), "quiz 1\n").unwrap();
        std::fs::write(annotations.join("cs148.txt"), "quiz 1>>2\n").unwrap();

        let report = build_directory(
            &texts,
            &annotations,
            &root.path().join("train"),
            &SylnerConfig::default(),
        )
        .unwrap();
        assert!(report.built.is_empty());
        assert_eq!(report.skipped, vec![texts.join("fall/cs148.txt")]);
    }
}
