use intensity_core::{
    category_view, interval_series, run_analysis, AnalysisContext, AnalysisRun, CategoryView, IntensityError,
    IntervalSeries, Scope,
};
use intensity_core::view::scope_options;
use intensity_core::AnalysisRequest;
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Output of [`analyze`]: the run plus the views a dashboard draws first.
#[derive(Serialize)]
struct AnalyzeOutput<'a> {
    run: &'a AnalysisRun,
    interval_series: IntervalSeries,
    category_view: CategoryView,
    scope_options: Vec<String>,
}

/// Error text with the remediation hint appended, when there is one.
fn describe(err: IntensityError) -> String {
    match err.hint() {
        Some(hint) => format!("{err}. {hint}"),
        None => err.to_string(),
    }
}

fn to_js_error(err: IntensityError) -> JsValue {
    JsValue::from_str(&describe(err))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&format!("Serialization failed: {e}")))
}

fn analyze_json(request_json: &str) -> std::result::Result<String, String> {
    let request: AnalysisRequest =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid request: {e}"))?;
    let context = AnalysisContext::from_config(&request.config).map_err(describe)?;
    let run = run_analysis(&context, &request.histograms).map_err(describe)?;
    serde_json::to_string(&run).map_err(|e| e.to_string())
}

/// Run an analysis from a request JSON document.
///
/// Returns `{ run, interval_series, category_view, scope_options }` with the
/// category view in the average scope. Pass `run` back to
/// [`category_view_for`] when the user picks another scope.
#[wasm_bindgen]
pub fn analyze(request_json: &str) -> Result<JsValue, JsValue> {
    let request: AnalysisRequest = serde_json::from_str(request_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid request: {e}")))?;
    let context = AnalysisContext::from_config(&request.config).map_err(to_js_error)?;
    let run = run_analysis(&context, &request.histograms).map_err(to_js_error)?;

    let output = AnalyzeOutput {
        run: &run,
        interval_series: interval_series(&run),
        category_view: category_view(&run, &Scope::Average).map_err(to_js_error)?,
        scope_options: scope_options(&run),
    };
    to_js(&output)
}

/// Category view of a previously returned run for a dropdown label.
#[wasm_bindgen]
pub fn category_view_for(run_json: &str, scope: &str) -> Result<JsValue, JsValue> {
    let run: AnalysisRun =
        serde_json::from_str(run_json).map_err(|e| JsValue::from_str(&format!("Invalid run: {e}")))?;
    let view = category_view(&run, &Scope::parse(scope)).map_err(to_js_error)?;
    to_js(&view)
}

/// Run an analysis and return the run as a JSON string, for callers that keep
/// the run in storage between scope changes.
#[wasm_bindgen]
pub fn analyze_to_json(request_json: &str) -> Result<String, JsValue> {
    analyze_json(request_json).map_err(|e| JsValue::from_str(&e))
}

/// Region dropdown entries of the reference deployment.
#[wasm_bindgen]
pub fn region_options() -> js_sys::Array {
    intensity_core::config::region_options()
        .into_iter()
        .map(|r| JsValue::from_str(&r))
        .collect()
}
