use std::path::{Path, PathBuf};

use m2bridge_pom::ArtifactCoordinate;

/// Environment override for the local repository root, the equivalent of
/// Maven's `maven.repo.local`.
pub const REPO_ENV_VAR: &str = "MAVEN_REPO_LOCAL";

/// The local repository layout:
/// `<root>/<group as path>/<artifact>/<version>/<artifact>-<version>[-<classifier>].<ext>`.
///
/// Pure path arithmetic; the only filesystem access is the existence checks
/// in [`LocalRepo::locate`] deciding the binary-vs-descriptor fallback.
#[derive(Debug, Clone)]
pub struct LocalRepo {
    root: PathBuf,
}

impl LocalRepo {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root discovery order: explicit override, then [`REPO_ENV_VAR`], then
    /// `<home>/.m2/repository`.
    pub fn discover(override_root: Option<PathBuf>) -> Self {
        let root = override_root
            .or_else(|| std::env::var_os(REPO_ENV_VAR).map(PathBuf::from))
            .or_else(default_repo_root)
            .unwrap_or_else(|| PathBuf::from(".m2/repository"));
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn artifact_dir(&self, group_id: &str, artifact_id: &str) -> PathBuf {
        let group_path = group_id.replace('.', "/");
        self.root.join(group_path).join(artifact_id)
    }

    pub fn version_dir(&self, group_id: &str, artifact_id: &str, version: &str) -> PathBuf {
        self.artifact_dir(group_id, artifact_id).join(version)
    }

    /// Canonical path of the descriptor for a coordinate.
    pub fn pom_path(&self, group_id: &str, artifact_id: &str, version: &str) -> PathBuf {
        self.version_dir(group_id, artifact_id, version)
            .join(format!("{artifact_id}-{version}.pom"))
    }

    /// Canonical path of the binary artifact for a coordinate; the extension
    /// is the coordinate's packaging.
    pub fn artifact_path(&self, coord: &ArtifactCoordinate) -> PathBuf {
        if coord.packaging == "pom" {
            return self.pom_path(&coord.group_id, &coord.artifact_id, &coord.version);
        }
        let file_name = match &coord.classifier {
            Some(classifier) => format!(
                "{}-{}-{}.{}",
                coord.artifact_id, coord.version, classifier, coord.packaging
            ),
            None => format!("{}-{}.{}", coord.artifact_id, coord.version, coord.packaging),
        };
        self.version_dir(&coord.group_id, &coord.artifact_id, &coord.version)
            .join(file_name)
    }

    /// The local file backing a coordinate: the binary when present, the
    /// descriptor as a fallback, `None` when neither exists.
    pub fn locate(&self, coord: &ArtifactCoordinate) -> Option<PathBuf> {
        let binary = self.artifact_path(coord);
        if binary.is_file() {
            return Some(binary);
        }
        let pom = self.pom_path(&coord.group_id, &coord.artifact_id, &coord.version);
        pom.is_file().then_some(pom)
    }

    /// Version directories cached locally for `group:artifact`, sorted by
    /// name for deterministic output.
    pub fn versions_of(&self, group_id: &str, artifact_id: &str) -> Vec<String> {
        let dir = self.artifact_dir(group_id, artifact_id);
        if !dir.is_dir() {
            return Vec::new();
        }
        walkdir::WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_dir())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .collect()
    }

    /// A missing root is an empty repository; an unreadable one is the
    /// caller's catastrophic error.
    pub(crate) fn ensure_readable(&self) -> std::io::Result<()> {
        if !self.root.exists() {
            return Ok(());
        }
        std::fs::read_dir(&self.root).map(|_| ())
    }
}

fn default_repo_root() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)?;
    Some(home.join(".m2/repository"))
}
