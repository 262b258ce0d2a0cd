pub mod acquire;
pub mod archive;
pub mod asset;
pub mod cleanup;
pub mod commands;
pub mod config;
pub mod error;
pub mod http;
pub mod install;
pub mod manager;
pub mod package;
pub mod runtime;
pub mod source;
