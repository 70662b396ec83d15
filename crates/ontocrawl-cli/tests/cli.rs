use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SUB_CLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";

fn statement(s: &str, o: &str) -> String {
    format!("<http://example.org/{}> <{}> <http://example.org/{}> .", s, SUB_CLASS_OF, o)
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Command pointed at a config file that does not exist
fn ontocrawl(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ontocrawl").unwrap();
    cmd.arg("--config").arg(dir.path().join("config.toml"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn taxonomy(dir: &TempDir) -> PathBuf {
    write(
        dir,
        "taxonomy.ttl",
        r#"@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix ex: <http://example.org/> .

ex:A a owl:Class ; rdfs:subClassOf ex:B .
ex:B rdfs:subClassOf ex:C .
ex:Z rdfs:subClassOf ex:A .
"#,
    )
}

fn arg(path: &Path) -> String {
    path.display().to_string()
}

#[test]
fn test_help() {
    Command::cargo_bin("ontocrawl")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("crawl"))
        .stdout(predicate::str::contains("contexts"));
}

#[test]
fn test_crawl_deep_downstream() {
    let dir = TempDir::new().unwrap();
    let source = taxonomy(&dir);

    ontocrawl(&dir)
        .args(["crawl", &arg(&source), "--seed", "http://example.org/A"])
        .args(["-P", SUB_CLASS_OF, "--no-upstream", "--deep-downstream"])
        .assert()
        .success()
        .stdout(predicate::str::contains(statement("A", "B")))
        .stdout(predicate::str::contains(statement("B", "C")))
        .stdout(predicate::str::contains(statement("Z", "A")).not());
}

#[test]
fn test_crawl_shallow_both_directions() {
    let dir = TempDir::new().unwrap();
    let source = taxonomy(&dir);

    ontocrawl(&dir)
        .args(["crawl", &arg(&source), "--seed", "http://example.org/A"])
        .args(["-P", SUB_CLASS_OF])
        .assert()
        .success()
        .stdout(predicate::str::contains(statement("A", "B")))
        .stdout(predicate::str::contains(statement("Z", "A")))
        .stdout(predicate::str::contains(statement("B", "C")).not());
}

#[test]
fn test_crawl_with_seed_query_to_file() {
    let dir = TempDir::new().unwrap();
    let source = taxonomy(&dir);
    let query = write(
        &dir,
        "seeds.rq",
        "SELECT ?c WHERE { ?c a <http://www.w3.org/2002/07/owl#Class> }",
    );
    let output = dir.path().join("out.nt");

    ontocrawl(&dir)
        .args(["crawl", &arg(&source)])
        .args(["--seed-query", &format!("@{}", arg(&query))])
        .args(["-P", SUB_CLASS_OF, "--no-upstream", "--deep"])
        .args(["--output", &arg(&output), "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"seeds\": 1"))
        .stdout(predicate::str::contains("\"triples\": 2"));

    let written = std::fs::read_to_string(&output).unwrap();
    assert_eq!(written.lines().count(), 2);
    assert!(written.contains(&statement("B", "C")));
}

#[test]
fn test_seed_and_seed_query_are_exclusive() {
    let dir = TempDir::new().unwrap();
    let source = taxonomy(&dir);

    ontocrawl(&dir)
        .args(["crawl", &arg(&source), "--seed", "http://example.org/A"])
        .args(["--seed-query", "SELECT ?c WHERE { ?c a ?t }"])
        .assert()
        .failure();

    ontocrawl(&dir)
        .args(["crawl", &arg(&source)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("seed"));
}

#[test]
fn test_unparseable_source_fails() {
    let dir = TempDir::new().unwrap();
    let source = write(&dir, "broken.txt", "this is {{ not rdf in any format");

    ontocrawl(&dir)
        .args(["crawl", &arg(&source), "--seed", "http://example.org/A"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exhausted format list"));
}

#[test]
fn test_imports_closure() {
    let dir = TempDir::new().unwrap();
    let imported = write(
        &dir,
        "imported.ttl",
        r#"@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
<http://example.org/B> rdfs:subClassOf <http://example.org/C> .
"#,
    );
    let root = write(
        &dir,
        "root.ttl",
        &format!(
            r#"@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
<http://example.org/root> a owl:Ontology ; owl:imports <file://{}> .
<http://example.org/A> a owl:Class ; rdfs:subClassOf <http://example.org/B> .
"#,
            arg(&imported)
        ),
    );

    ontocrawl(&dir)
        .args(["imports", &arg(&root)])
        .assert()
        .success()
        .stdout(predicate::str::contains(statement("B", "C")))
        .stdout(predicate::str::contains(statement("A", "B")).not());

    ontocrawl(&dir)
        .args(["imports", &arg(&root), "--inplace"])
        .assert()
        .success()
        .stdout(predicate::str::contains(statement("A", "B")))
        .stdout(predicate::str::contains(statement("B", "C")));

    ontocrawl(&dir)
        .args(["crawl", &arg(&root), "--seed", "http://example.org/A", "--imports"])
        .args(["-P", SUB_CLASS_OF, "--no-upstream", "--deep"])
        .assert()
        .success()
        .stdout(predicate::str::contains(statement("B", "C")));
}

#[test]
fn test_contexts_to_directory() {
    let dir = TempDir::new().unwrap();
    let seeds = write(
        &dir,
        "seeds.ttl",
        r#"@prefix owl: <http://www.w3.org/2002/07/owl#> .
<http://example.org/CHEBI_1> a owl:Class .
<http://example.org/GO_1> a owl:Class .
"#,
    );
    let chebi = write(&dir, "chebi.nt", &format!("{}\n", statement("CHEBI_1", "CHEBI_0")));
    let table = write(
        &dir,
        "contexts.toml",
        &format!(
            r#"[[contexts]]
key = "chebi"
prefix = "http://example.org/CHEBI_"
locator = "{}"

[[contexts]]
key = "go"
prefix = "http://example.org/GO_"
locator = ""
"#,
            arg(&chebi)
        ),
    );
    let out = dir.path().join("out");

    ontocrawl(&dir)
        .args(["contexts", &arg(&seeds), "--contexts", &arg(&table)])
        .args([
            "--template",
            r#"SELECT ?c WHERE { ?c a <http://www.w3.org/2002/07/owl#Class> . FILTER(STRSTARTS(STR(?c), "%PREFIX%")) }"#,
        ])
        .args(["-P", SUB_CLASS_OF, "--no-upstream"])
        .args(["--output-dir", &arg(&out)])
        .assert()
        .success()
        .stderr(predicate::str::contains("Skipped context go"));

    let written = std::fs::read_to_string(out.join("chebi.nt")).unwrap();
    assert_eq!(written.trim(), statement("CHEBI_1", "CHEBI_0"));
    assert!(!out.join("go.nt").exists());
}

#[test]
fn test_config_init_show_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    ontocrawl(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));

    ontocrawl(&dir).args(["config", "init"]).assert().success();
    assert!(path.exists());

    ontocrawl(&dir)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    ontocrawl(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[crawl]"))
        .stdout(predicate::str::contains("[loader]"));
}

#[test]
fn test_completions() {
    Command::cargo_bin("ontocrawl")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ontocrawl"));
}
