use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use m2bridge_pom::{
    has_placeholder, parse_pom, resolve_placeholders, Dependency, ParentRef, Plugin, RawPom,
};

use crate::LocalRepo;

type Gav = (String, String, String);

/// The fully merged view of a descriptor and its parent chain.
///
/// Properties and dependency management are merged parent-first with the
/// child overriding on key collisions; dependency versions are resolved
/// eagerly. Plugins are merged but kept *unresolved* — their versions are
/// substituted on demand by [`EffectivePom::resolved_plugins`], so that when
/// this model is itself used as a parent, a child's property override still
/// wins for plugins declared only in an ancestor.
#[derive(Debug, Clone, Default)]
pub struct EffectivePom {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub packaging: Option<String>,
    pub parent: Option<ParentRef>,
    pub properties: BTreeMap<String, String>,
    pub dependency_management: BTreeMap<(String, String), Dependency>,
    pub dependencies: Vec<Dependency>,
    pub modules: Vec<String>,
    plugins: Vec<Plugin>,
    managed_plugins: BTreeMap<(String, String), Plugin>,
}

impl EffectivePom {
    /// Declared plugins, ancestors first, each `(group, artifact)` pair
    /// exactly once, versions resolved against this model's merged property
    /// table.
    ///
    /// Version-less plugins consult, in order: the merged `pluginManagement`
    /// table, then the property conventions `"{group}:{artifact}.version"`,
    /// `"{artifact}.version"`, `"plugin.{artifact}.version"`. A version that
    /// stays unresolved is left in place for the caller to drop.
    pub fn resolved_plugins(&self) -> Vec<Plugin> {
        self.plugins
            .iter()
            .map(|plugin| self.resolve_plugin(plugin))
            .collect()
    }

    /// Managed plugins with the same version resolution as
    /// [`EffectivePom::resolved_plugins`].
    pub fn resolved_managed_plugins(&self) -> Vec<Plugin> {
        self.managed_plugins
            .values()
            .map(|plugin| self.resolve_plugin(plugin))
            .collect()
    }

    fn resolve_plugin(&self, plugin: &Plugin) -> Plugin {
        let mut plugin = plugin.clone();
        plugin.version = plugin
            .version
            .as_deref()
            .map(|v| resolve_placeholders(v, &self.properties))
            .or_else(|| {
                let key = (plugin.group_id.clone(), plugin.artifact_id.clone());
                self.managed_plugins
                    .get(&key)
                    .and_then(|managed| managed.version.as_deref())
                    .map(|v| resolve_placeholders(v, &self.properties))
            })
            .or_else(|| {
                plugin_version_from_properties(
                    &plugin.group_id,
                    &plugin.artifact_id,
                    &self.properties,
                )
            });
        plugin.dependencies = plugin
            .dependencies
            .iter()
            .map(|dep| resolve_dependency(dep, &self.properties, Some(&self.dependency_management)))
            .collect();
        plugin
    }
}

/// Property conventions for version-less plugins, tried in declaration
/// order: (1) `{group}:{artifact}.version`, (2) `{artifact}.version`,
/// (3) `plugin.{artifact}.version`.
fn plugin_version_from_properties(
    group_id: &str,
    artifact_id: &str,
    properties: &BTreeMap<String, String>,
) -> Option<String> {
    let candidates = [
        format!("{group_id}:{artifact_id}.version"),
        format!("{artifact_id}.version"),
        format!("plugin.{artifact_id}.version"),
    ];
    candidates.iter().find_map(|key| properties.get(key).cloned())
}

/// Build the effective model for the descriptor at `pom_path`.
///
/// Returns `None` when the descriptor itself is unreadable or malformed.
/// Missing or cyclic *ancestors* never fail the build; the chain just ends
/// with an empty parent model.
pub fn build_effective(pom_path: &Path, repo: &LocalRepo) -> Option<EffectivePom> {
    let mut ancestry = HashSet::new();
    build_guarded(pom_path, repo, &mut ancestry)
}

fn build_guarded(
    pom_path: &Path,
    repo: &LocalRepo,
    ancestry: &mut HashSet<Gav>,
) -> Option<EffectivePom> {
    let raw = match parse_pom(pom_path) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::debug!(path = %pom_path.display(), %err, "skipping unreadable descriptor");
            return None;
        }
    };
    Some(merge(raw, pom_path, repo, ancestry))
}

fn merge(
    raw: RawPom,
    pom_path: &Path,
    repo: &LocalRepo,
    ancestry: &mut HashSet<Gav>,
) -> EffectivePom {
    let parent_model = match raw.parent.as_ref() {
        Some(parent) => {
            let gav = (
                parent.group_id.clone(),
                parent.artifact_id.clone(),
                parent.version.clone(),
            );
            if ancestry.insert(gav) {
                locate_parent(pom_path, parent, repo)
                    .and_then(|path| build_guarded(&path, repo, ancestry))
                    .unwrap_or_default()
            } else {
                tracing::debug!(
                    group = %parent.group_id,
                    artifact = %parent.artifact_id,
                    "parent cycle detected, ending chain"
                );
                EffectivePom::default()
            }
        }
        None => EffectivePom::default(),
    };

    let group_id = raw
        .group_id
        .clone()
        .or_else(|| raw.parent.as_ref().map(|p| p.group_id.clone()))
        .or_else(|| parent_model.group_id.clone());
    let artifact_id = raw
        .artifact_id
        .clone()
        .or_else(|| parent_model.artifact_id.clone());
    let version = raw
        .version
        .clone()
        .or_else(|| raw.parent.as_ref().map(|p| p.version.clone()))
        .or_else(|| parent_model.version.clone());

    let mut properties = parent_model.properties.clone();
    properties.extend(raw.properties.clone());

    if let Some(v) = group_id.as_ref() {
        properties.insert("project.groupId".to_string(), v.clone());
        properties.insert("pom.groupId".to_string(), v.clone());
    }
    if let Some(v) = artifact_id.as_ref() {
        properties.insert("project.artifactId".to_string(), v.clone());
        properties.insert("pom.artifactId".to_string(), v.clone());
    }
    if let Some(v) = version.as_ref() {
        properties.insert("project.version".to_string(), v.clone());
        properties.insert("pom.version".to_string(), v.clone());
    }

    // Own management entries overlay the parent's as a block, so a BOM
    // imported here behaves like entries declared here: it overrides the
    // parent but never this descriptor's own explicit entries.
    let mut own_management: BTreeMap<(String, String), Dependency> = BTreeMap::new();
    for dep in &raw.dependency_management {
        let dep = resolve_dependency(dep, &properties, None);
        if dep.is_bom_import() {
            if let Some(bom_version) = dep.version.clone().filter(|v| !has_placeholder(v)) {
                inline_bom(&dep, &bom_version, repo, ancestry, &mut own_management);
            } else {
                tracing::debug!(
                    group = %dep.group_id,
                    artifact = %dep.artifact_id,
                    "skipping BOM import with unresolved version"
                );
            }
        }
        // The entry itself stays in the table either way; for BOM imports the
        // collector will tag it by its import scope/type.
        own_management.insert((dep.group_id.clone(), dep.artifact_id.clone()), dep);
    }
    let mut dependency_management = parent_model.dependency_management.clone();
    dependency_management.extend(own_management);

    let dependencies = raw
        .dependencies
        .iter()
        .map(|dep| resolve_dependency(dep, &properties, Some(&dependency_management)))
        .collect();

    // Plugins merge by (group, artifact), ancestors first, child redeclaring
    // in place. Versions stay unresolved here; see `resolved_plugins`.
    let mut plugins = parent_model.plugins.clone();
    for plugin in &raw.plugins {
        let slot = plugins.iter_mut().find(|existing| {
            existing.group_id == plugin.group_id && existing.artifact_id == plugin.artifact_id
        });
        match slot {
            Some(existing) => *existing = plugin.clone(),
            None => plugins.push(plugin.clone()),
        }
    }

    let mut managed_plugins = parent_model.managed_plugins.clone();
    for plugin in &raw.managed_plugins {
        managed_plugins.insert(
            (plugin.group_id.clone(), plugin.artifact_id.clone()),
            plugin.clone(),
        );
    }

    EffectivePom {
        group_id,
        artifact_id,
        version,
        packaging: raw.packaging,
        parent: raw.parent,
        properties,
        dependency_management,
        dependencies,
        modules: raw.modules,
        plugins,
        managed_plugins,
    }
}

/// Merge a BOM's effective managed entries into `own_management` as if the
/// import were inlined at its declaration point.
fn inline_bom(
    dep: &Dependency,
    version: &str,
    repo: &LocalRepo,
    ancestry: &mut HashSet<Gav>,
    own_management: &mut BTreeMap<(String, String), Dependency>,
) {
    let gav = (
        dep.group_id.clone(),
        dep.artifact_id.clone(),
        version.to_string(),
    );
    if !ancestry.insert(gav) {
        tracing::debug!(
            group = %dep.group_id,
            artifact = %dep.artifact_id,
            "BOM import cycle detected, skipping"
        );
        return;
    }

    let bom_path = repo.pom_path(&dep.group_id, &dep.artifact_id, version);
    if !bom_path.is_file() {
        tracing::debug!(path = %bom_path.display(), "BOM descriptor not in local repository");
        return;
    }
    if let Some(bom) = build_guarded(&bom_path, repo, ancestry) {
        for (key, managed) in bom.dependency_management {
            own_management.entry(key).or_insert(managed);
        }
    }
}

/// Resolve a dependency's identity and version against the merged property
/// table, falling back to dependency management for the version when none is
/// declared.
fn resolve_dependency(
    dep: &Dependency,
    properties: &BTreeMap<String, String>,
    management: Option<&BTreeMap<(String, String), Dependency>>,
) -> Dependency {
    let mut dep = dep.clone();
    dep.group_id = resolve_placeholders(&dep.group_id, properties);
    dep.artifact_id = resolve_placeholders(&dep.artifact_id, properties);
    dep.version = dep
        .version
        .as_deref()
        .map(|v| resolve_placeholders(v, properties))
        .or_else(|| {
            management?
                .get(&(dep.group_id.clone(), dep.artifact_id.clone()))
                .and_then(|managed| managed.version.clone())
        });
    dep
}

/// The parent descriptor's path: the `relativePath` hint when it points at a
/// real file, the repository location otherwise. `None` when neither exists.
fn locate_parent(child_path: &Path, parent: &ParentRef, repo: &LocalRepo) -> Option<PathBuf> {
    if let Some(rel) = parent.relative_path.as_deref().filter(|r| !r.is_empty()) {
        if let Some(base) = child_path.parent() {
            let mut candidate = base.join(rel);
            if candidate.is_dir() {
                candidate = candidate.join("pom.xml");
            }
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    let repo_path = repo.pom_path(&parent.group_id, &parent.artifact_id, &parent.version);
    repo_path.is_file().then_some(repo_path)
}
