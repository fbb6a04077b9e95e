//! File emitter: the only place that touches persistent storage
//!
//! Artifacts are written verbatim into the init folder, replacing any
//! previous content. In dry-run mode they are printed to stdout instead.
//! The JAAS file is never logged or printed in full.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::error::{InitError, Result};
use crate::types::GeneratedArtifact;

/// Write `content` to `directory/file_name`, creating or truncating the file
pub fn write_file(directory: &Path, file_name: &str, content: &str) -> Result<PathBuf> {
    let path = directory.join(file_name);
    fs::write(&path, content).map_err(|source| InitError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Writes generated artifacts into the init folder
#[derive(Debug, Clone)]
pub struct FileEmitter {
    directory: PathBuf,
    dry_run: bool,
}

impl FileEmitter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            dry_run: false,
        }
    }

    /// Print artifacts instead of writing them
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Emit one artifact. Failures are logged and reported as `false`.
    pub fn write(&self, artifact: &GeneratedArtifact) -> bool {
        let file = artifact.kind.file_name();

        if self.dry_run {
            println!("==> {}", self.directory.join(file).display());
            if artifact.kind.is_sensitive() {
                println!("<{} bytes redacted>", artifact.content.len());
            } else {
                println!("{}", artifact.content);
            }
            return true;
        }

        match write_file(&self.directory, file, &artifact.content) {
            Ok(path) => {
                if artifact.kind.is_sensitive() {
                    info!(
                        file = %path.display(),
                        length = artifact.content.len(),
                        "Jaas information written successfully"
                    );
                } else {
                    info!(
                        file = %path.display(),
                        information = %artifact.content,
                        "Information written successfully"
                    );
                }
                true
            }
            Err(e) => {
                error!(file = %file, error = %e, "Failed to write information");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ArtifactKind;

    #[test]
    fn test_write_file_overwrites() {
        let dir = tempfile::tempdir().expect("temp dir");
        write_file(dir.path(), "rack.id", "old-value").expect("first write");
        let path = write_file(dir.path(), "rack.id", "new").expect("second write");
        assert_eq!(fs::read_to_string(path).expect("read back"), "new");
    }

    #[test]
    fn test_write_file_missing_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("does-not-exist");
        let err = write_file(&missing, "rack.id", "x").unwrap_err();
        assert!(matches!(err, InitError::Write { .. }));
    }

    #[test]
    fn test_emitter_reports_failure() {
        let emitter = FileEmitter::new("/nonexistent/kafka/init");
        let artifact = GeneratedArtifact::new(ArtifactKind::RackId, "zone-a");
        assert!(!emitter.write(&artifact));
    }

    #[test]
    fn test_dry_run_does_not_write() {
        let dir = tempfile::tempdir().expect("temp dir");
        let emitter = FileEmitter::new(dir.path()).dry_run(true);
        let artifact = GeneratedArtifact::new(ArtifactKind::JaasConf, "secret");
        assert!(emitter.write(&artifact));
        assert!(!dir.path().join("jaas.conf").exists());
    }
}
