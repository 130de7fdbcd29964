//! Join planner tests
//!
//! Builds a small catalog of users and scores that share an `id` field and
//! checks planning, execution, views, filters and related-data reports.

#[path = "testutils/mod.rs"]
mod testutils;

use datacook::{CookBook, EngineError, JoinKind, JoinTarget, Value};
use serde_json::json;
use testutils::test_fixture::{no_vars, TestFixture};

fn catalog() -> serde_json::Value {
    json!({
        "DEFAULTS": {"TYPE": "csv"},
        "DATA": {
            "users.csv": {"FIELDS": [{"id": "int"}, {"name": "str"}]},
            "scores.csv": {"FIELDS": ["id", {"score": "float"}]},
            "report.csv": {
                "LOCAL_FIELDS_ONLY": true,
                "FIELDS": ["id", "name", "score", {"rank": "int"}]
            }
        }
    })
}

fn seed(fixture: &TestFixture) {
    fixture.write("users.csv", "id,name\n1,ann\n2,bob\n3,cy\n");
    fixture.write("scores.csv", "id,score\n1,9.5\n3,7\n");
}

#[test]
fn test_scheme_picks_base_and_join_steps() {
    let fixture = TestFixture::new().expect("Failed to create test fixture");
    seed(&fixture);
    let ds = fixture.source(catalog());

    let plan = ds
        .autogen_scheme(&JoinTarget::dataset("report.csv"), &[])
        .expect("Planning failed");
    assert_eq!(plan.fields, vec!["id", "name", "score", "rank"]);

    let base = plan.base.as_ref().expect("users.csv should be the base");
    assert_eq!(base.source, "users.csv");
    assert_eq!(base.columns, vec!["id", "name"]);

    assert_eq!(plan.steps.len(), 1);
    assert_eq!(plan.steps[0].source, "scores.csv");
    assert_eq!(plan.steps[0].key, vec!["id"]);
    assert_eq!(plan.steps[0].columns, vec!["id", "score"]);
    assert_eq!(plan.unresolved, vec!["rank"]);
    assert!(!plan.is_complete());
}

#[test]
fn test_autogen_joins_and_reports_unresolved() {
    let fixture = TestFixture::new().expect("Failed to create test fixture");
    seed(&fixture);
    let ds = fixture.source(catalog());

    let (table, unresolved) = ds
        .autogen(&JoinTarget::dataset("report.csv"), JoinKind::Inner, &[])
        .expect("Autogen failed");
    assert_eq!(table.columns(), ["id", "name", "score", "rank"]);
    assert_eq!(table.num_rows(), 2);
    assert_eq!(table.get(1, "name"), Some(&Value::from("cy")));
    assert_eq!(table.get(1, "score"), Some(&Value::Float(7.0)));
    assert_eq!(table.get(1, "rank"), Some(&Value::Null));
    assert_eq!(unresolved, vec!["rank"]);

    let (left, _) = ds
        .autogen(&JoinTarget::dataset("report.csv"), JoinKind::Left, &[])
        .expect("Autogen failed");
    assert_eq!(left.num_rows(), 3);
    assert_eq!(left.get(1, "score"), Some(&Value::Null));
}

#[test]
fn test_unavailable_sources_are_not_joined() {
    let fixture = TestFixture::new().expect("Failed to create test fixture");
    fixture.write("users.csv", "id,name\n1,ann\n");
    let ds = fixture.source(catalog());

    let plan = ds
        .autogen_scheme(&JoinTarget::dataset("report.csv"), &[])
        .expect("Planning failed");
    assert!(plan.steps.is_empty());
    assert_eq!(plan.unresolved, vec!["score", "rank"]);
}

#[test]
fn test_unknown_fields_have_no_base() {
    let fixture = TestFixture::new().expect("Failed to create test fixture");
    seed(&fixture);
    let ds = fixture.source(catalog());

    let target = JoinTarget::fields(["team"]);
    let plan = ds.autogen_scheme(&target, &[]).expect("Planning failed");
    assert!(plan.base.is_none());
    assert_eq!(plan.unresolved, vec!["team"]);

    let err = ds.autogen(&target, JoinKind::Inner, &[]).unwrap_err();
    assert!(matches!(err, EngineError::NoRecipeFound { .. }), "got {:?}", err);
}

#[test]
fn test_auto_recipe_materializes_joined_dataset() {
    let fixture = TestFixture::new().expect("Failed to create test fixture");
    seed(&fixture);

    let mut book = CookBook::new("Reports");
    book.auto_recipe("report.csv");
    let ds = fixture
        .builder(catalog())
        .cookbook(book)
        .build()
        .expect("Failed to build data source");

    let report = ds.load("report.csv", &no_vars()).expect("Failed to generate report");
    let table = report.as_table().expect("report is a table");
    assert_eq!(table.num_rows(), 2);
    assert_eq!(table.get(0, "score"), Some(&Value::Float(9.5)));
    assert!(fixture.path("report.csv").is_file());
}

#[test]
fn test_view_and_filter() {
    let fixture = TestFixture::new().expect("Failed to create test fixture");
    seed(&fixture);
    let ds = fixture.source(catalog());

    let view = ds.view(&["id", "name", "score"]).expect("View failed");
    assert_eq!(view.num_rows(), 2);

    let high = ds
        .filter(
            &["id", "name", "score"],
            |row| row.get("score").and_then(Value::as_float).map_or(false, |s| s > 8.0),
            &["name"],
        )
        .expect("Filter failed");
    assert_eq!(high.columns(), ["name"]);
    assert_eq!(high.num_rows(), 1);
    assert_eq!(high.get(0, "name"), Some(&Value::from("ann")));
}

#[test]
fn test_related_data_reports() {
    let fixture = TestFixture::new().expect("Failed to create test fixture");
    let ds = fixture.source(catalog());

    let related = ds.related_data(&["id", "name", "team"], &[]);
    let sources: Vec<&str> = related.sources.iter().map(|(s, _)| s.as_str()).collect();
    assert_eq!(sources, vec!["users.csv", "scores.csv"]);
    assert_eq!(related.sources[0].1, vec!["id", "name"]);
    assert_eq!(related.unknown, vec!["team"]);

    let lines = ds.show_related_data("users.csv").expect("Report failed");
    assert_eq!(
        lines,
        vec![
            "[\"id\"] in scores.csv".to_string(),
            "Fields not found: [\"name\"]".to_string(),
        ]
    );
}
