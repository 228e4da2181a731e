use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::props::has_placeholder;

/// Group used for build plugins that don't declare one.
pub const DEFAULT_PLUGIN_GROUP: &str = "org.apache.maven.plugins";

/// Packaging assumed when a descriptor or dependency doesn't declare one.
pub const DEFAULT_PACKAGING: &str = "jar";

/// Why a coordinate was collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoordinateSource {
    /// The root project itself.
    Project,
    /// A parent descriptor in an inheritance chain.
    Parent,
    /// A declared dependency.
    Dependency,
    /// A `dependencyManagement` entry.
    DepManaged,
    /// A bill-of-materials import (`scope=import`, `type=pom`).
    Bom,
    /// A declared build plugin.
    Plugin,
    /// A `pluginManagement` entry.
    PluginManaged,
    /// A dependency declared inside a plugin block.
    PluginDep,
}

/// A fully resolved artifact coordinate.
///
/// Construction goes through [`ArtifactCoordinate::checked`], which rejects
/// blank identity fields and unresolved `${...}` placeholders — a coordinate
/// value in hand is always usable for repository path arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactCoordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub packaging: String,
    pub classifier: Option<String>,
    pub scope: Option<String>,
    pub source: CoordinateSource,
}

impl ArtifactCoordinate {
    /// Returns `None` unless `group_id`, `artifact_id` and `version` are
    /// non-blank and free of unresolved placeholders.
    pub fn checked(
        group_id: &str,
        artifact_id: &str,
        version: &str,
        source: CoordinateSource,
    ) -> Option<Self> {
        let group_id = group_id.trim();
        let artifact_id = artifact_id.trim();
        let version = version.trim();
        if group_id.is_empty() || artifact_id.is_empty() || version.is_empty() {
            return None;
        }
        if has_placeholder(group_id) || has_placeholder(artifact_id) || has_placeholder(version) {
            return None;
        }
        Some(Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            version: version.to_string(),
            packaging: DEFAULT_PACKAGING.to_string(),
            classifier: None,
            scope: None,
            source,
        })
    }

    /// Blank packaging keeps the default.
    pub fn with_packaging(mut self, packaging: &str) -> Self {
        let packaging = packaging.trim();
        if !packaging.is_empty() {
            self.packaging = packaging.to_string();
        }
        self
    }

    pub fn with_classifier(mut self, classifier: Option<String>) -> Self {
        self.classifier = classifier.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn with_scope(mut self, scope: Option<String>) -> Self {
        self.scope = scope.filter(|s| !s.trim().is_empty());
        self
    }

    /// Identity used for deduplication. Provenance and scope are excluded:
    /// the first discovery of a coordinate wins.
    pub fn key(&self) -> CoordinateKey {
        CoordinateKey {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            version: self.version.clone(),
            packaging: self.packaging.clone(),
            classifier: self.classifier.clone(),
        }
    }
}

impl std::fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.group_id, self.artifact_id, self.version, self.packaging
        )?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        Ok(())
    }
}

/// Dedup identity of a coordinate; see [`ArtifactCoordinate::key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoordinateKey {
    group_id: String,
    artifact_id: String,
    version: String,
    packaging: String,
    classifier: Option<String>,
}

/// A single descriptor file, parsed but not merged.
///
/// Identity fields may be absent when they are inherited from the parent.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RawPom {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub packaging: Option<String>,
    pub parent: Option<ParentRef>,
    pub properties: BTreeMap<String, String>,
    pub dependencies: Vec<Dependency>,
    pub dependency_management: Vec<Dependency>,
    pub plugins: Vec<Plugin>,
    pub managed_plugins: Vec<Plugin>,
    pub modules: Vec<String>,
}

/// A `<parent>` block. All three identity fields are required to locate the
/// parent descriptor; `relative_path` is only a hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub relative_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub scope: Option<String>,
    pub classifier: Option<String>,
    pub type_: Option<String>,
}

impl Dependency {
    /// A bill-of-materials import inside `dependencyManagement`.
    pub fn is_bom_import(&self) -> bool {
        self.scope.as_deref() == Some("import") && self.type_.as_deref() == Some("pom")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Plugin {
    /// Defaulted to [`DEFAULT_PLUGIN_GROUP`] when the descriptor omits it.
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub dependencies: Vec<Dependency>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_rejects_blank_and_placeholder_fields() {
        assert!(ArtifactCoordinate::checked("", "a", "1.0", CoordinateSource::Project).is_none());
        assert!(ArtifactCoordinate::checked("g", "  ", "1.0", CoordinateSource::Project).is_none());
        assert!(ArtifactCoordinate::checked("g", "a", "", CoordinateSource::Project).is_none());
        assert!(
            ArtifactCoordinate::checked("g", "a", "${x.version}", CoordinateSource::Project)
                .is_none()
        );
        assert!(
            ArtifactCoordinate::checked("${g}", "a", "1.0", CoordinateSource::Project).is_none()
        );
        assert!(ArtifactCoordinate::checked("g", "a", "1.0", CoordinateSource::Project).is_some());
    }

    #[test]
    fn key_ignores_scope_and_source() {
        let a = ArtifactCoordinate::checked("g", "a", "1.0", CoordinateSource::Dependency)
            .unwrap()
            .with_scope(Some("test".to_string()));
        let b = ArtifactCoordinate::checked("g", "a", "1.0", CoordinateSource::Plugin).unwrap();
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn key_distinguishes_packaging_and_classifier() {
        let jar = ArtifactCoordinate::checked("g", "a", "1.0", CoordinateSource::Dependency).unwrap();
        let pom = jar.clone().with_packaging("pom");
        let sources = jar.clone().with_classifier(Some("sources".to_string()));
        assert_ne!(jar.key(), pom.key());
        assert_ne!(jar.key(), sources.key());
    }

    #[test]
    fn with_packaging_keeps_default_on_blank() {
        let coord = ArtifactCoordinate::checked("g", "a", "1.0", CoordinateSource::Project)
            .unwrap()
            .with_packaging("  ");
        assert_eq!(coord.packaging, DEFAULT_PACKAGING);
    }

    #[test]
    fn display_includes_classifier_when_present() {
        let coord = ArtifactCoordinate::checked("com.acme", "app", "1.0", CoordinateSource::Project)
            .unwrap()
            .with_classifier(Some("sources".to_string()));
        assert_eq!(coord.to_string(), "com.acme:app:1.0:jar:sources");
    }
}
