//! Integration test: render the example recipe in `recipes/` against the
//! sample descriptors in `schemas/`.

use std::path::PathBuf;

use bsync_cli::config::{OutputConfig, OutputFormat};
use bsync_cli::render::{run_render, RenderArgs};

/// Find the repository root.
fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

fn render_args(out: PathBuf) -> RenderArgs {
    let root = repo_root();
    RenderArgs {
        recipe: root.join("recipes").join("example-building.yaml"),
        schema: root.join("schemas"),
        out: Some(out),
        format: None,
        indent: None,
        no_declaration: false,
        strict_attributes: false,
    }
}

#[test]
fn test_example_recipe_renders_xml() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("building.xml");
    let code = run_render(&render_args(out.clone()), &OutputConfig::default()).unwrap();
    assert_eq!(code, 0);

    let xml = std::fs::read_to_string(&out).unwrap();
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains("<BuildingSync version=\"2.5.0\">"));
    assert!(xml.contains("<Facility ID=\"Facility-1\">"));
    assert!(xml.contains("<WeatherStationName>A weather station</WeatherStationName>"));
    assert!(xml.contains("<RetrocommissioningDate>2019-01-01</RetrocommissioningDate>"));
    assert!(xml.contains("<FloorAreaValue>1250.000000</FloorAreaValue>"));
    assert!(xml.contains("<ContactID IDref=\"Contact-1\"/>"));
    assert!(xml.contains("<SectionType>Whole building</SectionType>"));
    assert!(xml.contains("<StoriesAboveGrade>2</StoriesAboveGrade>"));

    // Building children come out in declared order, not recipe order.
    let premises = xml.find("<PremisesName>").unwrap();
    let station = xml.find("<WeatherDataStationID").unwrap();
    let year = xml.find("<YearOfConstruction>").unwrap();
    let sections = xml.find("<Sections>").unwrap();
    assert!(premises < station && station < year && year < sections);

    let first = xml.find("<Story>1</Story>").unwrap();
    let second = xml.find("<Story>2</Story>").unwrap();
    assert!(first < second);
}

#[test]
fn test_example_recipe_under_strict_attributes() {
    let dir = tempfile::tempdir().unwrap();
    let mut args = render_args(dir.path().join("building.xml"));
    args.strict_attributes = true;
    assert_eq!(run_render(&args, &OutputConfig::default()).unwrap(), 0);
}

#[test]
fn test_example_recipe_renders_json() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("building.json");
    let config = OutputConfig {
        format: OutputFormat::Json,
        ..OutputConfig::default()
    };
    run_render(&render_args(out.clone()), &config).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["name"], "BuildingSync");
    assert_eq!(json["children"][0]["name"], "Facilities");
}
