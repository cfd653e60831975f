use receipt_core::Pipeline;
use receipt_extract::{CbePdfExtractor, TelebirrHtmlExtractor};

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub pipeline: Pipeline,
    pub cbe: CbePdfExtractor,
    pub telebirr: TelebirrHtmlExtractor,
}
