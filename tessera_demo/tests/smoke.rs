// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end runs of the demo through the file system.

use std::fs;

use tempfile::tempdir;

use tessera_demo::{Args, DemoError, run};

const ENERGY: &str = r#"{
    "width": 600,
    "height": 300,
    "sankey": {
        "nodes": [
            {"name": "coal"}, {"name": "gas"}, {"name": "power"},
            {"name": "homes"}, {"name": "industry"}, {"name": "losses"}
        ],
        "links": [
            {"source": "coal", "target": "power", "value": 40},
            {"source": "gas", "target": "power", "value": 25},
            {"source": "gas", "target": "industry", "value": 10},
            {"source": "power", "target": "homes", "value": 30},
            {"source": "power", "target": "industry", "value": 20},
            {"source": "power", "target": "losses", "value": 15}
        ],
        "nodeAlign": "right"
    },
    "treemap": {
        "name": "budget",
        "sort": "desc",
        "gapWidth": 2,
        "borderWidth": 1,
        "data": [
            {"name": "ops", "children": [
                {"name": "cloud", "value": 120},
                {"name": "office", "value": 40}
            ]},
            {"name": "people", "value": 300},
            {"name": "travel", "value": 25}
        ]
    }
}"#;

fn args(dir: &tempfile::TempDir, input: &str) -> Args {
    Args {
        input: dir.path().join(input),
        output: dir.path().join("out.svg"),
        log_level: "off".into(),
    }
}

#[test]
fn renders_a_document_to_svg() {
    let dir = tempdir().expect("failed to create temp directory");
    let args = args(&dir, "energy.json");
    fs::write(&args.input, ENERGY).unwrap();

    run(&args).expect("demo run failed");

    let svg = fs::read_to_string(&args.output).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.trim_end().ends_with("</svg>"));
    assert_eq!(svg.matches("<path").count(), 6, "one ribbon per link");
    assert!(svg.contains(">coal</text>"));
    assert!(svg.contains(">people</text>"));
    assert!(!svg.contains("NaN"));
}

#[test]
fn missing_input_reports_the_path() {
    let dir = tempdir().expect("failed to create temp directory");
    let args = args(&dir, "missing.json");

    let err = run(&args).unwrap_err();
    assert!(matches!(&err, DemoError::Io { path, .. } if path == &args.input));
    assert!(err.to_string().contains("missing.json"));
    assert!(!args.output.exists());
}

#[test]
fn malformed_json_is_rejected() {
    let dir = tempdir().expect("failed to create temp directory");
    let args = args(&dir, "bad.json");
    fs::write(&args.input, "{ not json").unwrap();

    assert!(matches!(run(&args), Err(DemoError::Json(_))));
}
