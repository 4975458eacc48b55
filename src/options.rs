use serde::Deserialize;

/// Options for the viewer payload, as passed from JavaScript.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerOptions {
    /// Number of leading track points in the preview table (default: 10)
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,

    /// Include elevation as the 3rd coordinate of the route line (default: true)
    #[serde(default = "default_true")]
    pub include_elevation: bool,

    /// Initial map zoom level (default: 13)
    #[serde(default = "default_zoom")]
    pub zoom: u8,

    /// Popup label of the start marker (default: "Start")
    #[serde(default = "default_start_label")]
    pub start_label: String,

    /// Popup label of the end marker (default: "Finish")
    #[serde(default = "default_end_label")]
    pub end_label: String,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            preview_rows: default_preview_rows(),
            include_elevation: true,
            zoom: default_zoom(),
            start_label: default_start_label(),
            end_label: default_end_label(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_preview_rows() -> usize {
    10
}

fn default_zoom() -> u8 {
    13
}

fn default_start_label() -> String {
    "Start".to_string()
}

fn default_end_label() -> String {
    "Finish".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_options_fill_defaults() {
        let opts: ViewerOptions =
            serde_json::from_str(r#"{"previewRows": 3, "startLabel": "Go"}"#).unwrap();
        assert_eq!(opts.preview_rows, 3);
        assert_eq!(opts.start_label, "Go");
        assert_eq!(opts.end_label, "Finish");
        assert!(opts.include_elevation);
        assert_eq!(opts.zoom, 13);
    }
}
