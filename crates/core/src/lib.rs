pub mod config;
pub mod data;
pub mod error;
pub mod paths;
pub mod slug;
pub mod types;

pub use config::parse_site_toml;
pub use data::Datasets;
pub use error::{Error, Result};
pub use paths::{BlogBase, Paths};
pub use types::*;
