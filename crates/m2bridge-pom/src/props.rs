use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

/// Properties whose values reference other properties are supported by
/// re-running substitution; this bounds chains and cuts reference cycles.
const MAX_PASSES: usize = 10;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex"))
}

/// Whether `text` still contains a `${...}` marker.
pub fn has_placeholder(text: &str) -> bool {
    text.contains("${")
}

/// Substitute `${name}` placeholders against `props`.
///
/// Unknown names are left verbatim; this is not an error. Substitution
/// re-runs until it reaches a fixpoint or the pass cap, so `${a}` → `${b}` →
/// literal chains resolve and `${a}` ↔ `${b}` cycles terminate with the
/// marker still present — callers filter on [`has_placeholder`].
pub fn resolve_placeholders(text: &str, props: &BTreeMap<String, String>) -> String {
    let mut current = text.to_string();
    for _ in 0..MAX_PASSES {
        if !has_placeholder(&current) {
            break;
        }
        let next = placeholder_re()
            .replace_all(&current, |caps: &regex::Captures<'_>| {
                let key = &caps[1];
                props
                    .get(key)
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned();
        if next == current {
            break;
        }
        current = next;
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn substitutes_known_properties() {
        let props = props(&[("x.version", "1.2.3")]);
        assert_eq!(resolve_placeholders("${x.version}", &props), "1.2.3");
        assert_eq!(
            resolve_placeholders("lib-${x.version}.jar", &props),
            "lib-1.2.3.jar"
        );
    }

    #[test]
    fn unknown_properties_are_left_verbatim() {
        let props = props(&[]);
        assert_eq!(resolve_placeholders("${missing}", &props), "${missing}");
        assert_eq!(resolve_placeholders("plain", &props), "plain");
    }

    #[test]
    fn chained_properties_resolve() {
        let props = props(&[("a", "${b}"), ("b", "${c}"), ("c", "2.0")]);
        assert_eq!(resolve_placeholders("${a}", &props), "2.0");
    }

    #[test]
    fn reference_cycle_terminates_with_marker_left() {
        let props = props(&[("a", "${b}"), ("b", "${a}")]);
        let resolved = resolve_placeholders("${a}", &props);
        assert!(has_placeholder(&resolved));
    }

    #[test]
    fn mixed_resolution_keeps_unknown_part() {
        let props = props(&[("known", "1.0")]);
        assert_eq!(
            resolve_placeholders("${known}-${unknown}", &props),
            "1.0-${unknown}"
        );
    }
}
