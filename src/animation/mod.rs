pub(crate) mod config;
pub(crate) mod ease;
pub(crate) mod factory;
pub(crate) mod timeline;
