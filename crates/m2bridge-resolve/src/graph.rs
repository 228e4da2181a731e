use std::path::{Path, PathBuf};

use m2bridge_pom::{
    has_placeholder, ArtifactCoordinate, CoordinateSource, Dependency, Plugin, DEFAULT_PACKAGING,
};

use crate::{build_effective, ResolveContext};

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("local repository {path} is not readable: {source}")]
    RepoUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolve every root descriptor, populating the context's collector.
///
/// Individual unreadable descriptors are skipped and counted; only an
/// unreadable repository root is fatal. A cancelled run returns `Ok` with
/// whatever was collected up to the cancellation point.
pub fn resolve_roots(roots: &[PathBuf], ctx: &mut ResolveContext<'_>) -> Result<(), ResolveError> {
    ctx.repo
        .ensure_readable()
        .map_err(|source| ResolveError::RepoUnreadable {
            path: ctx.repo.root().to_path_buf(),
            source,
        })?;

    let total = roots.len();
    for (index, root) in roots.iter().enumerate() {
        if ctx.is_cancelled() {
            tracing::debug!("resolution cancelled, returning partial result");
            break;
        }
        ctx.progress.report(
            percentage(index, total),
            &format!("Resolving {}", root.display()),
        );
        resolve_descriptor(root, ctx);
    }
    Ok(())
}

fn percentage(index: usize, total: usize) -> Option<u32> {
    (total > 0).then(|| ((index * 100) / total) as u32)
}

fn canonicalize_or_fallback(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// How a descriptor was reached, which decides how much of it is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expansion {
    /// A root or submodule descriptor: everything is emitted, including its
    /// merged build-plugin list.
    Root,
    /// A descriptor reached through a coordinate edge (parent, dependency,
    /// BOM, plugin). Its parent, dependencies, management entries and
    /// plugin *dependencies* are still expanded, but its own plugin
    /// coordinates are not re-emitted — plugin versions are resolved exactly
    /// once, against the root's merged property table, so an inherited
    /// plugin never resurfaces at an ancestor-scoped version.
    Referenced,
}

/// Expand one root descriptor: emit its own coordinate, its parent, and
/// every dependency/management/plugin coordinate, then recurse into
/// submodules.
///
/// Also the entry point for descriptors discovered by the batch scanner's
/// completeness pass.
pub(crate) fn resolve_descriptor(pom_path: &Path, ctx: &mut ResolveContext<'_>) {
    expand_descriptor(pom_path, Expansion::Root, ctx);
}

fn expand_descriptor(pom_path: &Path, expansion: Expansion, ctx: &mut ResolveContext<'_>) {
    // Each on-disk descriptor is expanded at most once per run; this also
    // bounds module lists that point back up the tree.
    if !ctx.expanded_paths.insert(canonicalize_or_fallback(pom_path)) {
        return;
    }

    let Some(model) = build_effective(pom_path, ctx.repo()) else {
        ctx.stats.skipped_descriptors += 1;
        return;
    };

    if let (Some(group_id), Some(artifact_id), Some(version)) =
        (&model.group_id, &model.artifact_id, &model.version)
    {
        if let Some(coord) =
            ArtifactCoordinate::checked(group_id, artifact_id, version, CoordinateSource::Project)
        {
            let coord =
                coord.with_packaging(model.packaging.as_deref().unwrap_or(DEFAULT_PACKAGING));
            // The project itself is now fully expanded; don't re-expand it
            // when it shows up as someone else's dependency.
            ctx.visited.insert((
                coord.group_id.clone(),
                coord.artifact_id.clone(),
                coord.version.clone(),
            ));
            ctx.collector.add(coord);
        }
    }

    if let Some(parent) = &model.parent {
        if let Some(coord) = ArtifactCoordinate::checked(
            &parent.group_id,
            &parent.artifact_id,
            &parent.version,
            CoordinateSource::Parent,
        ) {
            emit_and_expand(coord.with_packaging("pom"), ctx);
        }
    }

    for dep in &model.dependencies {
        emit_dependency(dep, CoordinateSource::Dependency, ctx);
    }

    for dep in model.dependency_management.values() {
        let source = if dep.is_bom_import() {
            CoordinateSource::Bom
        } else {
            CoordinateSource::DepManaged
        };
        emit_dependency(dep, source, ctx);
    }

    for plugin in model.resolved_plugins() {
        if expansion == Expansion::Root {
            emit_plugin_coordinate(&plugin, CoordinateSource::Plugin, ctx);
        }
        for dep in &plugin.dependencies {
            emit_dependency(dep, CoordinateSource::PluginDep, ctx);
        }
    }
    for plugin in model.resolved_managed_plugins() {
        if expansion == Expansion::Root {
            emit_plugin_coordinate(&plugin, CoordinateSource::PluginManaged, ctx);
        }
        for dep in &plugin.dependencies {
            emit_dependency(dep, CoordinateSource::PluginDep, ctx);
        }
    }

    // Multi-module layout: every submodule is another root.
    if !model.modules.is_empty() {
        if let Some(dir) = pom_path.parent() {
            for module in &model.modules {
                if ctx.is_cancelled() {
                    return;
                }
                let module_path = dir.join(module);
                let module_pom = if module_path.is_file() {
                    module_path
                } else {
                    module_path.join("pom.xml")
                };
                if module_pom.is_file() {
                    expand_descriptor(&module_pom, Expansion::Root, ctx);
                } else {
                    tracing::debug!(path = %module_pom.display(), "submodule descriptor not found");
                }
            }
        }
    }
}

fn emit_dependency(dep: &Dependency, source: CoordinateSource, ctx: &mut ResolveContext<'_>) {
    let Some(version) = dep.version.as_deref() else {
        ctx.stats.dropped += 1;
        tracing::debug!(
            group = %dep.group_id,
            artifact = %dep.artifact_id,
            "dropping dependency without a resolvable version"
        );
        return;
    };
    let Some(coord) = ArtifactCoordinate::checked(&dep.group_id, &dep.artifact_id, version, source)
    else {
        ctx.stats.dropped += 1;
        tracing::debug!(
            group = %dep.group_id,
            artifact = %dep.artifact_id,
            version,
            "dropping dependency with unresolved or blank coordinate"
        );
        return;
    };
    let coord = coord
        .with_packaging(dep.type_.as_deref().unwrap_or(DEFAULT_PACKAGING))
        .with_classifier(dep.classifier.clone())
        .with_scope(dep.scope.clone());
    emit_and_expand(coord, ctx);
}

fn emit_plugin_coordinate(plugin: &Plugin, source: CoordinateSource, ctx: &mut ResolveContext<'_>) {
    match plugin.version.as_deref() {
        Some(version) if !has_placeholder(version) => {
            if let Some(coord) = ArtifactCoordinate::checked(
                &plugin.group_id,
                &plugin.artifact_id,
                version,
                source,
            ) {
                emit_and_expand(coord, ctx);
            } else {
                ctx.stats.dropped += 1;
            }
        }
        _ => {
            ctx.stats.dropped += 1;
            tracing::debug!(
                group = %plugin.group_id,
                artifact = %plugin.artifact_id,
                "dropping plugin without a resolvable version"
            );
        }
    }
}

/// Collect the coordinate and, when its descriptor is cached locally and not
/// yet visited, expand that descriptor the same way. The visited mark is set
/// *before* recursing, so cycles terminate and every coordinate is expanded
/// at most once.
fn emit_and_expand(coord: ArtifactCoordinate, ctx: &mut ResolveContext<'_>) {
    if ctx.is_cancelled() {
        return;
    }

    let gav = (
        coord.group_id.clone(),
        coord.artifact_id.clone(),
        coord.version.clone(),
    );
    ctx.collector.add(coord);

    if ctx.visited.contains(&gav) {
        return;
    }
    let pom_path = ctx.repo.pom_path(&gav.0, &gav.1, &gav.2);
    if !pom_path.is_file() {
        return;
    }
    ctx.visited.insert(gav);
    expand_descriptor(&pom_path, Expansion::Referenced, ctx);
}
