//! Site document model, configuration, local cache and image uploads

pub mod config;
pub mod error;
pub mod local_cache;
pub mod site;
pub mod upload;
