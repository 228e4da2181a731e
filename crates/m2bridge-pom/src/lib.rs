//! Maven descriptor (`pom.xml`) parsing for m2bridge.
//!
//! This crate turns a single on-disk descriptor into a [`RawPom`]:
//! - identity fields and the parent reference, exactly as declared
//! - properties, dependencies, dependency management
//! - build plugins and plugin management (with nested plugin dependencies)
//!
//! Nothing here resolves `${...}` placeholders against an inheritance chain
//! or consults the local repository — that is the resolver's job. The one
//! piece of property machinery that lives here is [`resolve_placeholders`],
//! the substitution primitive the resolver applies to merged tables.

mod model;
mod props;
mod reader;

pub use model::{
    ArtifactCoordinate, CoordinateKey, CoordinateSource, Dependency, ParentRef, Plugin, RawPom,
    DEFAULT_PACKAGING, DEFAULT_PLUGIN_GROUP,
};
pub use props::{has_placeholder, resolve_placeholders};
pub use reader::{parse_pom, parse_pom_str, PomError};
