//! Wire-level constants shared by the client script and the server.

/// Client-id list value meaning "the whole view".
pub const ALL_CLIENT_IDS: &str = "@all";

/// Client-id list value meaning "nothing".
pub const NO_CLIENT_IDS: &str = "@none";

/// Header (and fallback parameter) value marking an ajax request.
pub const PARTIAL_AJAX: &str = "partial/ajax";

/// Header value marking a non-ajax partial processing request.
pub const PARTIAL_PROCESS: &str = "partial/process";

/// Update key telling the client to replace the whole document.
pub const RENDER_ALL_MARKER: &str = "jakarta.faces.ViewRoot";

/// Update key grouping component resources (scripts, stylesheets).
pub const RESOURCE_UPDATE_KEY: &str = "jakarta.faces.Resource";

/// Name of the hidden view-state field.
pub const VIEW_STATE_PARAM: &str = "jakarta.faces.ViewState";

/// Name of the hidden client-window field.
pub const CLIENT_WINDOW_PARAM: &str = "jakarta.faces.ClientWindow";

/// Facet holding view metadata (view parameters).
pub const METADATA_FACET_NAME: &str = "jakarta_faces_metadata";

/// Content type of a partial response document.
pub const PARTIAL_CONTENT_TYPE: &str = "text/xml";

/// Character encoding used when neither request nor config names one.
pub const DEFAULT_CHARACTER_ENCODING: &str = "UTF-8";

/// Element names of the partial-response document.
pub mod elements {
    pub const PARTIAL_RESPONSE: &str = "partial-response";
    pub const CHANGES: &str = "changes";
    pub const UPDATE: &str = "update";
    pub const EVAL: &str = "eval";
    pub const REDIRECT: &str = "redirect";
    pub const ERROR: &str = "error";
    pub const ERROR_NAME: &str = "error-name";
    pub const ERROR_MESSAGE: &str = "error-message";
}
