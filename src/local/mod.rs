//! Domain operations over the entry store, answered with [`Response`]
//! envelopes instead of errors.

mod response;
mod service;

pub use response::{Response, CODE_ERROR, CODE_SUCCESS};
pub use service::{LocalDataService, DEFAULT_ENTRY_TYPE, FORWARD_URL_KEY};
