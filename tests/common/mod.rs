// ==============================================================================
// Shared Test Helpers
// ==============================================================================
//
// Each test file that imports this module compiles its own copy, so not every
// function is used in every binary.
#![allow(dead_code)]

use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme};
use threft::{Model, ModelError, Warning};

/// Add `docs` as `(name, source)` pairs to a fresh model and parse it.
pub fn build(docs: &[(&str, &str)]) -> Result<Model, ModelError> {
    build_with_warnings(docs).0
}

/// Like [`build`], also returning the warnings of the parse.
pub fn build_with_warnings(docs: &[(&str, &str)]) -> (Result<Model, ModelError>, Vec<Warning>) {
    let mut model = Model::new();
    for (name, source) in docs {
        if let Err(e) = model.add_document(*name, source) {
            return (Err(e), Vec::new());
        }
    }
    let result = model.parse();
    let warnings = model.drain_warnings();
    (result.map(|()| model), warnings)
}

/// Build and expect failure.
pub fn build_err(docs: &[(&str, &str)]) -> ModelError {
    match build(docs) {
        Ok(_) => panic!("model should be rejected"),
        Err(e) => e,
    }
}

/// Render a diagnostic the way the CLI shows it, without colors or Unicode,
/// at 80 columns.
pub fn render_diagnostic(diagnostic: &dyn Diagnostic) -> String {
    let handler = GraphicalReportHandler::new_themed(GraphicalTheme::none()).with_width(80);
    let mut buf = String::new();
    handler
        .render_report(&mut buf, diagnostic)
        .expect("render to String is infallible");
    buf
}
