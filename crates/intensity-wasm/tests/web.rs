//! Browser-side checks, run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use intensity_wasm::{analyze, category_view_for, region_options};
use wasm_bindgen_test::*;

const REQUEST: &str = r#"{
    "region": "MED",
    "years": [2000, 2005, 2015],
    "histograms": {
        "2000-2005": {"101": 50, "102": 30, "202": 20},
        "2005-2015": {"101": 100, "201": 40, "202": 60}
    }
}"#;

#[wasm_bindgen_test]
fn analyze_returns_object() {
    let out = analyze(REQUEST).unwrap();
    assert!(out.is_object());
}

#[wasm_bindgen_test]
fn unknown_scope_is_an_error() {
    let run = intensity_wasm::analyze_to_json(REQUEST).unwrap();
    assert!(category_view_for(&run, "2000-2005").is_ok());
    assert!(category_view_for(&run, "1990-1995").is_err());
}

#[wasm_bindgen_test]
fn region_dropdown_has_six_entries() {
    assert_eq!(region_options().length(), 6);
}
