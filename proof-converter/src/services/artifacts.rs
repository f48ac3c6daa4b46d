//! Artifact file handling
//!
//! Reads the three native snarkjs files and writes the two flattened artifacts.
//! Both artifacts are rendered before anything touches the filesystem. Each is
//! staged in a temporary sibling and renamed into place; if the second rename
//! fails the first one is rolled back, so a failed run leaves no partial output.

use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::services::converter::ConversionOutput;
use crate::types::{NativeProof, NativeVerificationKey};

/// Default artifact file names inside an output directory
pub const PROOF_ARTIFACT: &str = "proof.json";
pub const VK_ARTIFACT: &str = "vk.json";

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Missing input file {path}: {source}")]
    MissingInputFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid JSON in {path}: {source}")]
    InvalidInputJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to serialize {artifact}: {source}")]
    Serialization {
        artifact: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to write {path}: {source}")]
    OutputWriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Native inputs of one conversion run
#[derive(Debug, Clone)]
pub struct NativeInputs {
    pub proof: NativeProof,
    pub public_inputs: Vec<String>,
    pub verification_key: NativeVerificationKey,
}

impl NativeInputs {
    /// Load `proof.json`, `public.json` and `verification_key.json`
    pub fn load(
        proof_path: &Path,
        public_path: &Path,
        vk_path: &Path,
    ) -> Result<Self, ArtifactError> {
        let inputs = Self {
            proof: read_json(proof_path)?,
            public_inputs: read_json(public_path)?,
            verification_key: read_json(vk_path)?,
        };

        info!(
            ic_points = inputs.verification_key.ic.len(),
            n_public = inputs.verification_key.n_public,
            public_inputs = inputs.public_inputs.len(),
            "Loaded native inputs"
        );

        Ok(inputs)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let content = fs::read_to_string(path).map_err(|source| ArtifactError::MissingInputFile {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ArtifactError::InvalidInputJson {
        path: path.to_path_buf(),
        source,
    })
}

/// Pretty-printed artifacts, ready to write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifacts {
    pub proof_json: String,
    pub verification_key_json: String,
}

impl RenderedArtifacts {
    pub fn render(output: &ConversionOutput) -> Result<Self, ArtifactError> {
        let proof_json = serde_json::to_string_pretty(&output.proof).map_err(|source| {
            ArtifactError::Serialization {
                artifact: "proof",
                source,
            }
        })?;
        let verification_key_json = serde_json::to_string_pretty(&output.verification_key)
            .map_err(|source| ArtifactError::Serialization {
                artifact: "verification key",
                source,
            })?;

        Ok(Self {
            proof_json,
            verification_key_json,
        })
    }

    pub fn proof_digest(&self) -> String {
        sha256_hex(self.proof_json.as_bytes())
    }

    pub fn verification_key_digest(&self) -> String {
        sha256_hex(self.verification_key_json.as_bytes())
    }

    /// Write both artifacts, creating parent directories as needed.
    ///
    /// Existing files at either path are set aside as `<name>.bak` and restored
    /// if any rename fails, so the pair is replaced together or not at all.
    pub fn write(&self, proof_path: &Path, vk_path: &Path) -> Result<(), ArtifactError> {
        ensure_file_target(proof_path)?;
        ensure_file_target(vk_path)?;

        let staged_proof = stage(proof_path, &self.proof_json)?;
        let staged_vk = match stage(vk_path, &self.verification_key_json) {
            Ok(staged) => staged,
            Err(e) => {
                discard(&staged_proof);
                return Err(e);
            }
        };

        let mut committed: Vec<(&Path, Option<PathBuf>)> = Vec::with_capacity(2);
        for (staged, path) in [(&staged_proof, proof_path), (&staged_vk, vk_path)] {
            let previous = match set_aside(path) {
                Ok(previous) => previous,
                Err(e) => {
                    rollback(&committed, &[&staged_proof, &staged_vk]);
                    return Err(e);
                }
            };
            if let Err(e) = commit(staged, path) {
                committed.push((path, previous));
                rollback(&committed, &[&staged_proof, &staged_vk]);
                return Err(e);
            }
            committed.push((path, previous));
        }

        for (_, previous) in &committed {
            if let Some(backup) = previous {
                discard(backup);
            }
        }

        info!(
            proof = %proof_path.display(),
            verification_key = %vk_path.display(),
            "Wrote flattened artifacts"
        );
        Ok(())
    }
}

/// Output paths for an output directory
pub fn artifact_paths(out_dir: &Path) -> (PathBuf, PathBuf) {
    (out_dir.join(PROOF_ARTIFACT), out_dir.join(VK_ARTIFACT))
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn stage(path: &Path, contents: &str) -> Result<PathBuf, ArtifactError> {
    let write_failure = |source| ArtifactError::OutputWriteFailure {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_failure)?;
    }

    let staged = staging_path(path);
    fs::write(&staged, contents).map_err(write_failure)?;
    debug!(path = %staged.display(), "Staged artifact");
    Ok(staged)
}

fn commit(staged: &Path, path: &Path) -> Result<(), ArtifactError> {
    fs::rename(staged, path).map_err(|source| ArtifactError::OutputWriteFailure {
        path: path.to_path_buf(),
        source,
    })
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".bak");
    path.with_file_name(name)
}

/// Artifacts are files; a directory in the way is refused before anything is staged
fn ensure_file_target(path: &Path) -> Result<(), ArtifactError> {
    if path.is_dir() {
        return Err(ArtifactError::OutputWriteFailure {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::Other, "target is a directory"),
        });
    }
    Ok(())
}

/// Move an existing artifact out of the way, returning where it went
fn set_aside(path: &Path) -> Result<Option<PathBuf>, ArtifactError> {
    if !path.is_file() {
        return Ok(None);
    }
    let backup = backup_path(path);
    fs::rename(path, &backup).map_err(|source| ArtifactError::OutputWriteFailure {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(backup))
}

fn discard(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Removed file"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove file"),
    }
}

/// Undo committed renames (newest first) and drop leftover staged files
fn rollback(committed: &[(&Path, Option<PathBuf>)], staged: &[&PathBuf]) {
    for (path, previous) in committed.iter().rev() {
        discard(path);
        if let Some(backup) = previous {
            if let Err(e) = fs::rename(backup, path) {
                warn!(
                    path = %path.display(),
                    backup = %backup.display(),
                    error = %e,
                    "Failed to restore previous artifact"
                );
            }
        }
    }
    for path in staged {
        discard(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::converter::FormatConverter;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("{name}-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn sample_output() -> ConversionOutput {
        let proof: NativeProof = serde_json::from_value(serde_json::json!({
            "pi_a": ["1", "2", "1"],
            "pi_b": [["3", "4"], ["5", "6"], ["1", "0"]],
            "pi_c": ["7", "8", "1"],
            "protocol": "groth16",
            "curve": "bn128"
        }))
        .unwrap();
        let vk: NativeVerificationKey = serde_json::from_value(serde_json::json!({
            "protocol": "groth16",
            "curve": "bn128",
            "nPublic": 1,
            "vk_alpha_1": ["1", "2", "1"],
            "vk_beta_2": [["3", "4"], ["5", "6"], ["1", "0"]],
            "vk_gamma_2": [["3", "4"], ["5", "6"], ["1", "0"]],
            "vk_delta_2": [["3", "4"], ["5", "6"], ["1", "0"]],
            "vk_alphabeta_12": [[["1", "2"], ["3", "4"], ["5", "6"]], [["7", "8"], ["9", "10"], ["11", "12"]]],
            "IC": [["1", "2", "1"], ["3", "4", "1"]]
        }))
        .unwrap();

        FormatConverter::default()
            .convert(&proof, &vk, &["42".to_string()])
            .unwrap()
    }

    #[test]
    fn test_missing_input_file() {
        let dir = scratch_dir("missing-input");
        let missing = dir.join("proof.json");
        let err = NativeInputs::load(&missing, &missing, &missing).unwrap_err();
        match err {
            ArtifactError::MissingInputFile { path, .. } => assert_eq!(path, missing),
            other => panic!("Wrong error: {other}"),
        }
    }

    #[test]
    fn test_invalid_input_json() {
        let dir = scratch_dir("invalid-json");
        let proof = dir.join("proof.json");
        fs::write(&proof, "{\"pi_a\": [1, 2]}").unwrap();

        let err = NativeInputs::load(&proof, &proof, &proof).unwrap_err();
        assert!(matches!(err, ArtifactError::InvalidInputJson { .. }));
    }

    #[test]
    fn test_write_creates_directories() {
        let dir = scratch_dir("write-artifacts");
        let (proof_path, vk_path) = artifact_paths(&dir.join("converted_circuit"));

        let rendered = RenderedArtifacts::render(&sample_output()).unwrap();
        rendered.write(&proof_path, &vk_path).unwrap();

        assert_eq!(fs::read_to_string(&proof_path).unwrap(), rendered.proof_json);
        assert_eq!(
            fs::read_to_string(&vk_path).unwrap(),
            rendered.verification_key_json
        );
        assert!(!staging_path(&proof_path).exists());
        assert!(!staging_path(&vk_path).exists());
    }

    #[test]
    fn test_directory_target_leaves_no_output() {
        let dir = scratch_dir("directory-target");
        let proof_path = dir.join("proof.json");
        let vk_path = dir.join("vk_dir");
        fs::create_dir_all(&vk_path).unwrap();
        fs::write(vk_path.join("keep.txt"), "keep").unwrap();

        let rendered = RenderedArtifacts::render(&sample_output()).unwrap();
        let err = rendered.write(&proof_path, &vk_path).unwrap_err();
        assert!(matches!(err, ArtifactError::OutputWriteFailure { ref path, .. } if path == &vk_path));

        assert!(!proof_path.exists());
        assert!(!staging_path(&proof_path).exists());
        assert!(!staging_path(&vk_path).exists());
        assert!(vk_path.join("keep.txt").exists());
    }

    #[test]
    fn test_rollback_restores_previous_artifacts() {
        let dir = scratch_dir("rollback");
        let (proof_path, vk_path) = artifact_paths(&dir);
        fs::write(&proof_path, "old proof").unwrap();

        // Proof already committed over a previous file, vk rename then failed
        let previous = set_aside(&proof_path).unwrap();
        let staged_proof = stage(&proof_path, "new proof").unwrap();
        commit(&staged_proof, &proof_path).unwrap();
        let staged_vk = stage(&vk_path, "new vk").unwrap();

        rollback(&[(proof_path.as_path(), previous)], &[&staged_proof, &staged_vk]);

        assert_eq!(fs::read_to_string(&proof_path).unwrap(), "old proof");
        assert!(!backup_path(&proof_path).exists());
        assert!(!staging_path(&vk_path).exists());
        assert!(!vk_path.exists());
    }

    #[test]
    fn test_rollback_removes_fresh_artifacts() {
        let dir = scratch_dir("rollback-fresh");
        let (proof_path, vk_path) = artifact_paths(&dir);

        let staged_proof = stage(&proof_path, "new proof").unwrap();
        commit(&staged_proof, &proof_path).unwrap();
        let staged_vk = stage(&vk_path, "new vk").unwrap();

        rollback(&[(proof_path.as_path(), None)], &[&staged_proof, &staged_vk]);

        assert!(!proof_path.exists());
        assert!(!vk_path.exists());
        assert!(!staging_path(&vk_path).exists());
    }

    #[test]
    fn test_overwrite_drops_backups() {
        let dir = scratch_dir("overwrite");
        let (proof_path, vk_path) = artifact_paths(&dir);
        fs::write(&proof_path, "old proof").unwrap();
        fs::write(&vk_path, "old vk").unwrap();

        let rendered = RenderedArtifacts::render(&sample_output()).unwrap();
        rendered.write(&proof_path, &vk_path).unwrap();

        assert_eq!(fs::read_to_string(&proof_path).unwrap(), rendered.proof_json);
        assert!(!backup_path(&proof_path).exists());
        assert!(!backup_path(&vk_path).exists());
    }

    #[test]
    fn test_digests_are_stable() {
        let first = RenderedArtifacts::render(&sample_output()).unwrap();
        let second = RenderedArtifacts::render(&sample_output()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.proof_digest(), second.proof_digest());
        assert_eq!(first.proof_digest().len(), 64);
        assert_ne!(first.proof_digest(), first.verification_key_digest());
    }

    #[test]
    fn test_rendered_proof_is_pretty() {
        let rendered = RenderedArtifacts::render(&sample_output()).unwrap();
        assert!(rendered.proof_json.starts_with("{\n  \"negA\": {"));
        assert!(rendered.proof_json.contains("\"pi1\": \"42\""));
    }
}
