//! End-to-end runs of the merge pipeline over a temporary data directory.

use std::fs;
use std::path::Path;

use serde_json::json;

use admerge::edition::ProvinceEntry;
use admerge::error::PipelineError;
use admerge::hierarchy::{report, validate};
use admerge::models::Totals;
use admerge::source::{load_json, DirectoryLayout, DirectorySource};
use admerge::{Edition, MergeResult, Pipeline, PipelineState};

fn square(x: f64, y: f64) -> serde_json::Value {
    json!({
        "type": "Polygon",
        "coordinates": [[[x, y], [x + 1.0, y], [x + 1.0, y + 1.0], [x, y + 1.0], [x, y]]]
    })
}

fn collection(features: &[(&str, &str)]) -> String {
    let features: Vec<_> = features
        .iter()
        .enumerate()
        .map(|(i, (code, name))| {
            json!({
                "type": "Feature",
                "properties": { "id": code, "name": name },
                "geometry": square(i as f64, i as f64)
            })
        })
        .collect();
    serde_json::to_string_pretty(&json!({ "type": "FeatureCollection", "features": features }))
        .unwrap()
}

/// Beijing (direct administration), Henan (two cities), Hubei (no city file).
fn write_fixture(base: &Path) {
    fs::create_dir_all(base.join("geometryProvince")).unwrap();
    fs::create_dir_all(base.join("geometryCouties")).unwrap();

    fs::write(
        base.join("china.json"),
        collection(&[("11", "北京市"), ("41", "河南省"), ("42", "湖北省")]),
    )
    .unwrap();
    fs::write(
        base.join("geometryProvince/41.json"),
        collection(&[("4101", "郑州市"), ("4102", "开封市")]),
    )
    .unwrap();
    fs::write(
        base.join("geometryCouties/110100.json"),
        collection(&[("110101", "东城区"), ("110105", "朝阳区")]),
    )
    .unwrap();
    fs::write(
        base.join("geometryCouties/410100.json"),
        collection(&[("410102", "中原区"), ("410103", "二七区")]),
    )
    .unwrap();
}

fn edition() -> Edition {
    let entry = |code: &str, name: &str| ProvinceEntry {
        code: code.to_string(),
        name: name.to_string(),
    };
    Edition::new(
        "fixture",
        vec![entry("11", "北京市"), entry("41", "河南省"), entry("42", "湖北省")],
        vec!["11".to_string()],
    )
    .unwrap()
}

#[test]
fn test_full_run_over_directory() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_fixture(data.path());

    let edition = edition();
    let source = DirectorySource::new(data.path(), &DirectoryLayout::default());
    let mut pipeline = Pipeline::new(
        &edition,
        &source,
        out.path().join("hierarchy.json"),
        out.path().join("report.json"),
    );
    let summary = pipeline.run().unwrap();
    assert_eq!(pipeline.state(), PipelineState::Done);

    assert_eq!(
        summary.totals,
        Totals {
            province_count: 3,
            city_count: 3,
            county_count: 4
        }
    );

    // Kaifeng has no county file, Hubei has no city file: warnings only.
    assert!(summary.validation.errors.is_empty());
    assert_eq!(summary.validation.warnings.len(), 2);
    assert!(summary.validation.warnings[0].contains("开封市"));
    assert!(summary.validation.warnings[1].contains("湖北省"));

    let merged: MergeResult = load_json(&out.path().join("hierarchy.json")).unwrap();
    assert_eq!(merged.totals, Totals::tally(&merged.provinces));
    assert!(merged.provinces[1].geometry.is_some());
    assert!(merged.provinces[1].children[0].children[0].bbox.is_some());

    let written_report: admerge::hierarchy::SummaryReport =
        load_json(&out.path().join("report.json")).unwrap();
    assert_eq!(written_report, report(&merged));
    assert_eq!(written_report, summary.report);
}

#[test]
fn test_runs_are_byte_identical() {
    let data = tempfile::tempdir().unwrap();
    write_fixture(data.path());
    let edition = edition();

    let mut outputs = Vec::new();
    for _ in 0..2 {
        let out = tempfile::tempdir().unwrap();
        let source = DirectorySource::new(data.path(), &DirectoryLayout::default());
        let summary = Pipeline::new(
            &edition,
            &source,
            out.path().join("hierarchy.json"),
            out.path().join("report.json"),
        )
        .run()
        .unwrap();

        let hierarchy = fs::read(out.path().join("hierarchy.json")).unwrap();
        let report = fs::read(out.path().join("report.json")).unwrap();
        outputs.push((summary.output_digest, summary.report_digest, hierarchy, report));
    }

    assert_eq!(outputs[0], outputs[1]);
}

#[test]
fn test_missing_root_writes_nothing() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_fixture(data.path());
    fs::remove_file(data.path().join("china.json")).unwrap();

    let edition = edition();
    let source = DirectorySource::new(data.path(), &DirectoryLayout::default());
    let mut pipeline = Pipeline::new(
        &edition,
        &source,
        out.path().join("hierarchy.json"),
        out.path().join("report.json"),
    );

    let err = pipeline.run().unwrap_err();
    assert!(matches!(err, PipelineError::RootUnavailable(ref e) if e.is_missing()));
    assert_eq!(pipeline.state(), PipelineState::Failed);
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn test_corrupt_province_file_is_downgraded() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_fixture(data.path());
    fs::write(data.path().join("geometryProvince/41.json"), "{ \"features\": [").unwrap();

    let edition = edition();
    let source = DirectorySource::new(data.path(), &DirectoryLayout::default());
    let summary = Pipeline::new(
        &edition,
        &source,
        out.path().join("hierarchy.json"),
        out.path().join("report.json"),
    )
    .run()
    .unwrap();

    let henan = &summary.report.provinces[1];
    assert_eq!(henan.city_count, 0);
    assert!(summary
        .validation
        .warnings
        .iter()
        .any(|w| w.contains("河南省") && w.contains("no city data")));
}

#[test]
fn test_builtin_edition_over_partial_data() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_fixture(data.path());

    let edition = Edition::china();
    let source = DirectorySource::new(data.path(), &DirectoryLayout::default());
    let summary = Pipeline::new(
        &edition,
        &source,
        out.path().join("hierarchy.json"),
        out.path().join("report.json"),
    )
    .run()
    .unwrap();

    assert_eq!(summary.totals.province_count, 34);
    // Every direct-administration unit gets exactly one synthesized city.
    for code in ["11", "12", "31", "50", "81", "82"] {
        let province = summary
            .report
            .provinces
            .iter()
            .find(|p| p.code == code)
            .unwrap();
        assert_eq!(province.city_count, 1);
        assert_eq!(province.cities[0].code, format!("{}01", code));
    }

    let merged: MergeResult = load_json(&out.path().join("hierarchy.json")).unwrap();
    assert_eq!(validate(&merged), summary.validation);
}
