use std::path::{Path, PathBuf};

use crate::model::{Dependency, ParentRef, Plugin, RawPom, DEFAULT_PLUGIN_GROUP};

#[derive(Debug, thiserror::Error)]
pub enum PomError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse XML in {path}: {source}")]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },
}

/// Parse the descriptor at `path`. Single pass, no property resolution, no
/// parent-chain handling.
pub fn parse_pom(path: &Path) -> Result<RawPom, PomError> {
    let contents = std::fs::read_to_string(path).map_err(|source| PomError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_pom_str(&contents).map_err(|source| PomError::Xml {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse descriptor text directly. Callers with a file should prefer
/// [`parse_pom`], which attaches the path to errors.
pub fn parse_pom_str(contents: &str) -> Result<RawPom, roxmltree::Error> {
    let doc = roxmltree::Document::parse(contents)?;
    let project = doc.root_element();

    let mut pom = RawPom::default();
    pom.group_id = child_text(&project, "groupId");
    pom.artifact_id = child_text(&project, "artifactId");
    pom.version = child_text(&project, "version");
    pom.packaging = child_text(&project, "packaging");

    if let Some(parent_node) = child_element(&project, "parent") {
        let group_id = child_text(&parent_node, "groupId");
        let artifact_id = child_text(&parent_node, "artifactId");
        let version = child_text(&parent_node, "version");
        // A parent block missing any identity field can't be located; ignore it.
        if let (Some(group_id), Some(artifact_id), Some(version)) = (group_id, artifact_id, version)
        {
            pom.parent = Some(ParentRef {
                group_id,
                artifact_id,
                version,
                relative_path: child_text(&parent_node, "relativePath"),
            });
        }
    }

    if let Some(props_node) = child_element(&project, "properties") {
        for child in props_node.children().filter(|n| n.is_element()) {
            let key = child.tag_name().name().to_string();
            if let Some(value) = child.text().map(str::trim).filter(|t| !t.is_empty()) {
                pom.properties.insert(key, value.to_string());
            }
        }
    }

    if let Some(deps_node) = child_element(&project, "dependencies") {
        pom.dependencies = parse_dependencies(&deps_node);
    }

    if let Some(dep_mgmt) = child_element(&project, "dependencyManagement") {
        if let Some(deps_node) = child_element(&dep_mgmt, "dependencies") {
            pom.dependency_management = parse_dependencies(&deps_node);
        }
    }

    if let Some(build_node) = child_element(&project, "build") {
        if let Some(plugins_node) = child_element(&build_node, "plugins") {
            pom.plugins = parse_plugins(&plugins_node);
        }
        if let Some(mgmt_node) = child_element(&build_node, "pluginManagement") {
            if let Some(plugins_node) = child_element(&mgmt_node, "plugins") {
                pom.managed_plugins = parse_plugins(&plugins_node);
            }
        }
    }

    if let Some(modules_node) = child_element(&project, "modules") {
        pom.modules = modules_node
            .children()
            .filter(|n| n.is_element() && n.tag_name().name() == "module")
            .filter_map(|n| n.text())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
    }

    Ok(pom)
}

fn parse_dependencies(deps_node: &roxmltree::Node<'_, '_>) -> Vec<Dependency> {
    deps_node
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "dependency")
        .filter_map(|dep_node| {
            let group_id = child_text(&dep_node, "groupId")?;
            let artifact_id = child_text(&dep_node, "artifactId")?;

            Some(Dependency {
                group_id,
                artifact_id,
                version: child_text(&dep_node, "version"),
                scope: child_text(&dep_node, "scope"),
                classifier: child_text(&dep_node, "classifier"),
                type_: child_text(&dep_node, "type"),
            })
        })
        .collect()
}

fn parse_plugins(plugins_node: &roxmltree::Node<'_, '_>) -> Vec<Plugin> {
    plugins_node
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "plugin")
        .filter_map(|plugin_node| {
            let artifact_id = child_text(&plugin_node, "artifactId")?;
            let group_id = child_text(&plugin_node, "groupId")
                .unwrap_or_else(|| DEFAULT_PLUGIN_GROUP.to_string());
            let dependencies = child_element(&plugin_node, "dependencies")
                .map(|deps_node| parse_dependencies(&deps_node))
                .unwrap_or_default();

            Some(Plugin {
                group_id,
                artifact_id,
                version: child_text(&plugin_node, "version"),
                dependencies,
            })
        })
        .collect()
}

// Lookups match on the local element name only, so namespaced
// (`xmlns="http://maven.apache.org/POM/4.0.0"`) and plain descriptors both
// work without a separate fallback pass.
fn child_element<'a>(
    node: &'a roxmltree::Node<'a, 'a>,
    name: &str,
) -> Option<roxmltree::Node<'a, 'a>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn child_text(node: &roxmltree::Node<'_, '_>, name: &str) -> Option<String> {
    child_element(node, name)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
