//! Stylesheet post-processing.

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

/// Minify CSS using lightningcss.
pub fn minify_css(css: &str) -> Result<String, String> {
    let stylesheet = StyleSheet::parse(css, ParserOptions::default())
        .map_err(|e| format!("CSS parse error: {}", e))?;

    let minified = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..Default::default()
        })
        .map_err(|e| format!("CSS minify error: {}", e))?;

    Ok(minified.code)
}

/// Prepare a generated stylesheet for writing.
///
/// When minification is requested but the model produced CSS lightningcss
/// cannot parse, the original text is kept.
pub fn prepare_stylesheet(css: &str, minify: bool) -> String {
    if !minify {
        return css.to_string();
    }

    match minify_css(css) {
        Ok(minified) => minified,
        Err(e) => {
            tracing::warn!("Writing stylesheet unminified: {}", e);
            css.to_string()
        }
    }
}
