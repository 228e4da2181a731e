use std::collections::{BTreeSet, VecDeque};
use std::path::{Path, PathBuf};

use m2bridge_pom::{ArtifactCoordinate, CoordinateSource};

use crate::graph::{resolve_descriptor, resolve_roots, ResolveError};
use crate::{LocalRepo, ResolveContext};

const BINARY_EXTS: &[&str] = &["jar", "war", "ear", "zip"];

fn is_ignored_dir(name: &str) -> bool {
    name.starts_with('.') || matches!(name, "target" | "build" | "out" | "node_modules")
}

fn is_descriptor(path: &Path, name: &str) -> bool {
    name == "pom.xml" || path.extension().is_some_and(|ext| ext == "pom")
}

fn is_binary(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| BINARY_EXTS.contains(&ext))
}

/// Breadth-first scan of `roots` for candidate descriptors.
///
/// Hidden directories and build outputs are skipped. A binary artifact found
/// without its sibling descriptor tries the `<stem>.pom` filename convention
/// before being skipped. Directory entries are visited in name order so the
/// candidate list is deterministic.
pub fn scan_candidates(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen: BTreeSet<PathBuf> = BTreeSet::new();
    let mut candidates = Vec::new();
    let mut queue: VecDeque<PathBuf> = roots.iter().cloned().collect();

    while let Some(dir) = queue.pop_front() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::debug!(path = %dir.display(), %err, "skipping unreadable directory");
                continue;
            }
        };
        let mut entries: Vec<_> = entries.filter_map(Result::ok).collect();
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            let name = entry.file_name();
            let name = name.to_string_lossy();

            if file_type.is_dir() {
                if !is_ignored_dir(&name) {
                    queue.push_back(path);
                }
                continue;
            }
            if !file_type.is_file() {
                continue;
            }

            if is_descriptor(&path, &name) {
                if seen.insert(path.clone()) {
                    candidates.push(path);
                }
            } else if is_binary(&path) {
                let sibling = path.with_extension("pom");
                if sibling.is_file() {
                    if seen.insert(sibling.clone()) {
                        candidates.push(sibling);
                    }
                } else {
                    tracing::debug!(
                        path = %path.display(),
                        "binary artifact without a sibling descriptor"
                    );
                }
            }
        }
    }

    candidates
}

/// Scan `roots`, resolve every candidate descriptor, then run the
/// completeness pass: for each `group:artifact` collected, resolve every
/// version cached in the local repository. The pass deliberately broadens
/// the result — locally cached versions nothing currently declares are still
/// surfaced, and consumers filter by need.
pub fn resolve_scan(roots: &[PathBuf], ctx: &mut ResolveContext<'_>) -> Result<(), ResolveError> {
    let candidates = scan_candidates(roots);
    tracing::debug!(count = candidates.len(), "batch scan found candidate descriptors");
    resolve_roots(&candidates, ctx)?;

    let pairs: BTreeSet<(String, String)> = ctx
        .collector
        .as_slice()
        .iter()
        .map(|c| (c.group_id.clone(), c.artifact_id.clone()))
        .collect();

    'pairs: for (group_id, artifact_id) in pairs {
        if ctx.is_cancelled() {
            break;
        }
        ctx.progress.report(
            None,
            &format!("Checking cached versions of {group_id}:{artifact_id}"),
        );
        for version in ctx.repo.versions_of(&group_id, &artifact_id) {
            if ctx.is_cancelled() {
                break 'pairs;
            }
            let pom_path = ctx.repo.pom_path(&group_id, &artifact_id, &version);
            if pom_path.is_file() {
                resolve_descriptor(&pom_path, ctx);
            } else if let Some(coord) =
                binary_only_coordinate(&ctx.repo, &group_id, &artifact_id, &version)
            {
                ctx.collector.add(coord);
            }
        }
    }

    Ok(())
}

/// A cached version directory holding a binary but no descriptor still names
/// an artifact worth surfacing.
fn binary_only_coordinate(
    repo: &LocalRepo,
    group_id: &str,
    artifact_id: &str,
    version: &str,
) -> Option<ArtifactCoordinate> {
    let version_dir = repo.version_dir(group_id, artifact_id, version);
    BINARY_EXTS.iter().find_map(|ext| {
        let path = version_dir.join(format!("{artifact_id}-{version}.{ext}"));
        if !path.is_file() {
            return None;
        }
        ArtifactCoordinate::checked(group_id, artifact_id, version, CoordinateSource::Project)
            .map(|coord| coord.with_packaging(ext))
    })
}
