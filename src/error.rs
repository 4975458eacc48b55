use thiserror::Error;

/// The document could not be turned into a track point sequence.
#[derive(Debug, Error)]
pub enum MalformedDocument {
    #[error("document is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("not a GPX document: {0}")]
    NotGpx(String),

    #[error("unexpected end of document inside <{0}>")]
    UnexpectedEof(&'static str),

    #[error("Missing attribute '{attribute}' on <{element}>")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("Invalid value '{value}' for attribute '{attribute}' on <{element}>")]
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },
}

impl From<quick_xml::events::attributes::AttrError> for MalformedDocument {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(e.into())
    }
}

#[derive(Debug, Error)]
pub enum GpxViewerError {
    #[error(transparent)]
    MalformedDocument(#[from] MalformedDocument),

    /// Parsing succeeded but the document holds no track points.
    #[error("no usable track data found in the GPX document")]
    EmptyTrackData,
}

impl GpxViewerError {
    /// Stable name for the error kind, used as the JS `Error.name`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedDocument(_) => "MalformedDocument",
            Self::EmptyTrackData => "EmptyTrackData",
        }
    }
}

impl From<GpxViewerError> for wasm_bindgen::JsValue {
    fn from(e: GpxViewerError) -> Self {
        let err = js_sys::Error::new(&e.to_string());
        err.set_name(e.kind());
        err.into()
    }
}

impl From<MalformedDocument> for wasm_bindgen::JsValue {
    fn from(e: MalformedDocument) -> Self {
        GpxViewerError::from(e).into()
    }
}
