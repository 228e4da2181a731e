use std::path::Path;

use m2bridge_resolve::{resolve_scan, scan_candidates, LocalRepo, ResolveContext};

fn write_file(path: &Path, contents: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

fn pom(group: &str, artifact: &str, version: &str, extra: &str) -> String {
    format!(
        "<project>\
           <groupId>{group}</groupId>\
           <artifactId>{artifact}</artifactId>\
           <version>{version}</version>\
           {extra}\
         </project>"
    )
}

#[test]
fn scan_skips_hidden_and_build_output_directories() {
    let dir = tempfile::tempdir().unwrap();
    write_file(&dir.path().join("project/pom.xml"), &pom("g", "kept", "1.0", ""));
    write_file(
        &dir.path().join("project/target/classes/pom.xml"),
        &pom("g", "built", "1.0", ""),
    );
    write_file(&dir.path().join(".hidden/pom.xml"), &pom("g", "hidden", "1.0", ""));
    write_file(
        &dir.path().join("node_modules/dep/pom.xml"),
        &pom("g", "vendored", "1.0", ""),
    );

    let candidates = scan_candidates(&[dir.path().to_path_buf()]);
    assert_eq!(candidates, vec![dir.path().join("project/pom.xml")]);
}

#[test]
fn scan_collects_repository_style_descriptors() {
    let dir = tempfile::tempdir().unwrap();
    let version_dir = dir.path().join("g/widget/1.0");
    write_file(&version_dir.join("widget-1.0.pom"), &pom("g", "widget", "1.0", ""));
    std::fs::write(version_dir.join("widget-1.0.jar"), b"jar").unwrap();

    let candidates = scan_candidates(&[dir.path().to_path_buf()]);
    // The descriptor appears once even though both the .pom listing and the
    // binary's sibling convention reach it.
    assert_eq!(candidates, vec![version_dir.join("widget-1.0.pom")]);
}

#[test]
fn binary_without_sibling_descriptor_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let version_dir = dir.path().join("g/widget/1.0");
    std::fs::create_dir_all(&version_dir).unwrap();
    std::fs::write(version_dir.join("widget-1.0.jar"), b"jar").unwrap();

    assert!(scan_candidates(&[dir.path().to_path_buf()]).is_empty());
}

#[test]
fn completeness_pass_surfaces_other_cached_versions() {
    let dir = tempfile::tempdir().unwrap();
    let repo = LocalRepo::new(dir.path().join("repo"));

    write_file(
        &repo.pom_path("org.acme", "widget", "1.0"),
        &pom("org.acme", "widget", "1.0", ""),
    );
    write_file(
        &repo.pom_path("org.acme", "widget", "2.0"),
        &pom("org.acme", "widget", "2.0", ""),
    );
    // Version 3.0 is cached as a bare binary, no descriptor.
    let bare = repo.version_dir("org.acme", "widget", "3.0");
    std::fs::create_dir_all(&bare).unwrap();
    std::fs::write(bare.join("widget-3.0.jar"), b"jar").unwrap();

    let scan_dir = dir.path().join("checkout");
    write_file(
        &scan_dir.join("app/pom.xml"),
        &pom(
            "com.acme",
            "app",
            "1.0",
            "<dependencies><dependency>\
               <groupId>org.acme</groupId>\
               <artifactId>widget</artifactId>\
               <version>1.0</version>\
             </dependency></dependencies>",
        ),
    );

    let mut ctx = ResolveContext::new(repo.clone());
    resolve_scan(&[scan_dir], &mut ctx).unwrap();

    let versions: Vec<&str> = ctx
        .coordinates()
        .iter()
        .filter(|c| c.artifact_id == "widget")
        .map(|c| c.version.as_str())
        .collect();
    assert!(versions.contains(&"1.0"));
    assert!(versions.contains(&"2.0"), "undeclared cached version must surface");
    assert!(versions.contains(&"3.0"), "binary-only cached version must surface");
}

#[test]
fn scan_resolves_found_descriptors_transitively() {
    let dir = tempfile::tempdir().unwrap();
    let repo = LocalRepo::new(dir.path().join("repo"));

    write_file(
        &repo.pom_path("org.acme", "lib", "1.0"),
        &pom(
            "org.acme",
            "lib",
            "1.0",
            "<dependencies><dependency>\
               <groupId>org.acme</groupId>\
               <artifactId>core</artifactId>\
               <version>2.0</version>\
             </dependency></dependencies>",
        ),
    );

    let scan_dir = dir.path().join("checkout");
    write_file(
        &scan_dir.join("app/pom.xml"),
        &pom(
            "com.acme",
            "app",
            "1.0",
            "<dependencies><dependency>\
               <groupId>org.acme</groupId>\
               <artifactId>lib</artifactId>\
               <version>1.0</version>\
             </dependency></dependencies>",
        ),
    );

    let mut ctx = ResolveContext::new(repo.clone());
    resolve_scan(&[scan_dir], &mut ctx).unwrap();

    let names: Vec<&str> = ctx
        .coordinates()
        .iter()
        .map(|c| c.artifact_id.as_str())
        .collect();
    assert!(names.contains(&"app"));
    assert!(names.contains(&"lib"));
    assert!(names.contains(&"core"));
}
