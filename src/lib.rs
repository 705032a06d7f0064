pub mod application;
pub mod commands;
pub mod http;
pub mod notify;
pub mod pkgbuild;
pub mod release;
pub mod runtime;
pub mod srcinfo;
pub mod store;
