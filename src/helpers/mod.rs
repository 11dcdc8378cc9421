//! Helper functions shared by the content pipeline and its consumers

mod date;
mod url;

pub use date::*;
pub use url::*;
