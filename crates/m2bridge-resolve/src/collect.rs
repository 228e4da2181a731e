use std::collections::HashSet;

use m2bridge_pom::{ArtifactCoordinate, CoordinateKey};

/// Accumulates resolved coordinates in discovery order.
///
/// Insertion dedups on [`ArtifactCoordinate::key`]; the first occurrence
/// wins, so a coordinate's provenance is never rewritten by a later
/// discovery through a different edge.
#[derive(Debug, Default)]
pub struct CoordinateCollector {
    seen: HashSet<CoordinateKey>,
    coordinates: Vec<ArtifactCoordinate>,
}

impl CoordinateCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the coordinate was newly inserted.
    pub fn add(&mut self, coordinate: ArtifactCoordinate) -> bool {
        if !self.seen.insert(coordinate.key()) {
            return false;
        }
        self.coordinates.push(coordinate);
        true
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    pub fn as_slice(&self) -> &[ArtifactCoordinate] {
        &self.coordinates
    }

    pub fn into_vec(self) -> Vec<ArtifactCoordinate> {
        self.coordinates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use m2bridge_pom::CoordinateSource;

    #[test]
    fn first_seen_provenance_wins() {
        let mut collector = CoordinateCollector::new();
        let dep =
            ArtifactCoordinate::checked("g", "a", "1.0", CoordinateSource::Dependency).unwrap();
        let plugin =
            ArtifactCoordinate::checked("g", "a", "1.0", CoordinateSource::Plugin).unwrap();

        assert!(collector.add(dep));
        assert!(!collector.add(plugin));
        assert_eq!(collector.len(), 1);
        assert_eq!(collector.as_slice()[0].source, CoordinateSource::Dependency);
    }

    #[test]
    fn preserves_discovery_order() {
        let mut collector = CoordinateCollector::new();
        for version in ["3.0", "1.0", "2.0"] {
            let coord =
                ArtifactCoordinate::checked("g", "a", version, CoordinateSource::Dependency)
                    .unwrap();
            collector.add(coord);
        }
        let versions: Vec<&str> = collector
            .as_slice()
            .iter()
            .map(|c| c.version.as_str())
            .collect();
        assert_eq!(versions, vec!["3.0", "1.0", "2.0"]);
    }
}
