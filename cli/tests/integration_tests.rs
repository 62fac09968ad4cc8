use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const SCHEMA_YAML: &str = r#"title: people
fields:
  id:    { types: [int], required: true }
  name:  { types: [string], required: true }
  email: { types: [string, null] }
"#;

const ROWS: &str = r#"{"id": 1, "name": "ada", "email": null}
{"id": 2, "name": "bob"}
{"id": "3", "name": "cy", "email": "cy@example.com"}
{"name": "dee", "nickname": "d"}
"#;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("failed to write fixture");
    path
}

fn docschema(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_docschema"))
        .args(args)
        .output()
        .expect("failed to run docschema")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("temp path is not UTF-8")
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_reports_schema_shape() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "people.yaml", SCHEMA_YAML);

    let out = docschema(&["check", path_str(&schema)]);
    assert!(out.status.success());
    assert_eq!(
        stdout(&out).trim(),
        "Schema 'people' OK: 3 field(s), 2 required, 1 nullable."
    );
}

#[test]
fn check_rejects_undeclared_required_name() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(
        dir.path(),
        "bad.json",
        r#"{"$jsonSchema": {"bsonType": "object", "required": ["ghost"], "properties": {"id": {"bsonType": "int"}}}}"#,
    );

    let out = docschema(&["check", path_str(&schema)]);
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Failed to load schema"), "{stderr}");
}

#[test]
fn check_rejects_unknown_type_name() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(
        dir.path(),
        "bad.yaml",
        "fields:\n  id: { types: [integer64], required: true }\n",
    );

    let out = docschema(&["check", path_str(&schema)]);
    assert_eq!(out.status.code(), Some(2));
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

#[test]
fn validate_clean_batch_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "people.yaml", SCHEMA_YAML);
    let docs = write(
        dir.path(),
        "docs.json",
        r#"[{"id": 1, "name": "ada"}, {"id": 2, "name": "bob", "email": null}]"#,
    );

    let out = docschema(&["validate", "--schema", path_str(&schema), path_str(&docs)]);
    assert!(out.status.success());
    assert_eq!(
        stdout(&out).trim(),
        "Validated 2 document(s): 2 accepted, 0 rejected."
    );
}

#[test]
fn validate_rejected_documents_exit_one() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "people.yaml", SCHEMA_YAML);
    let docs = write(dir.path(), "rows.jsonl", ROWS);

    let out = docschema(&["validate", "--schema", path_str(&schema), path_str(&docs)]);
    assert_eq!(out.status.code(), Some(1));

    let text = stdout(&out);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "document 2: field 'id': expected int, got string",
            "document 3: field 'id': missing required field",
            "Validated 4 document(s): 2 accepted, 2 rejected.",
        ]
    );
}

#[test]
fn validate_strict_reports_unknown_fields() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "people.yaml", SCHEMA_YAML);
    let docs = write(dir.path(), "rows.jsonl", ROWS);

    let out = docschema(&[
        "validate",
        "--schema",
        path_str(&schema),
        "--strict",
        path_str(&docs),
    ]);
    assert_eq!(out.status.code(), Some(1));
    assert!(
        stdout(&out).contains("document 3: field 'nickname': unknown field"),
        "{}",
        stdout(&out)
    );
}

#[test]
fn validate_config_file_and_first_flag() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "people.yaml", SCHEMA_YAML);
    let docs = write(dir.path(), "rows.jsonl", ROWS);
    let config = write(dir.path(), "validator.yml", "unknown_fields: strict\n");

    let out = docschema(&[
        "validate",
        "--schema",
        path_str(&schema),
        "--config",
        path_str(&config),
        "--first",
        path_str(&docs),
    ]);
    assert_eq!(out.status.code(), Some(1));

    let text = stdout(&out);
    assert!(text.contains("document 3: field 'id': missing required field"));
    assert!(!text.contains("nickname"), "{text}");
}

#[test]
fn validate_json_report_with_jobs() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "people.yaml", SCHEMA_YAML);
    let docs = write(dir.path(), "rows.jsonl", ROWS);

    let out = docschema(&[
        "validate",
        "--schema",
        path_str(&schema),
        "--jobs",
        "2",
        "--format",
        "json",
        path_str(&docs),
    ]);
    assert_eq!(out.status.code(), Some(1));

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["total"], 4);
    let rejected = report["rejected"].as_array().unwrap();
    assert_eq!(rejected.len(), 2);
    assert_eq!(rejected[0]["index"], 2);
    assert_eq!(rejected[0]["violations"][0]["field"], "id");
    assert_eq!(rejected[0]["violations"][0]["kind"], "type_mismatch");
    assert_eq!(rejected[0]["violations"][0]["actual"], "string");
    assert_eq!(rejected[1]["violations"][0]["kind"], "missing");
}

#[test]
fn validate_zero_jobs_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "people.yaml", SCHEMA_YAML);
    let docs = write(dir.path(), "rows.jsonl", ROWS);

    let out = docschema(&[
        "validate",
        "--schema",
        path_str(&schema),
        "--jobs",
        "0",
        path_str(&docs),
    ]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn validate_unreadable_documents_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "people.yaml", SCHEMA_YAML);
    let docs = write(dir.path(), "rows.jsonl", "{\"id\": 1}\n{\"id\": [1]}\n");

    let out = docschema(&["validate", "--schema", path_str(&schema), path_str(&docs)]);
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("line 2"), "{stderr}");
}

// ---------------------------------------------------------------------------
// export
// ---------------------------------------------------------------------------

#[test]
fn export_writes_collection_validator() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "people.yaml", SCHEMA_YAML);
    let target = dir.path().join("out").join("people.json");

    let out = docschema(&["export", path_str(&schema), "--output", path_str(&target)]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("Exported 3 field(s)"));

    let exported: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&target).unwrap()).unwrap();
    let root = &exported["$jsonSchema"];
    assert_eq!(root["bsonType"], "object");
    assert_eq!(root["title"], "people");
    assert_eq!(root["required"], serde_json::json!(["id", "name"]));
    assert_eq!(root["properties"]["id"]["bsonType"], "int");
    assert_eq!(
        root["properties"]["email"]["bsonType"],
        serde_json::json!(["string", "null"])
    );

    // The exported file is itself a loadable schema.
    let recheck = docschema(&["check", path_str(&target)]);
    assert!(recheck.status.success());
}

#[test]
fn export_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "people.yaml", SCHEMA_YAML);

    let out = docschema(&["export", path_str(&schema)]);
    assert!(out.status.success());
    let exported: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert!(exported.get("$jsonSchema").is_some());
}
