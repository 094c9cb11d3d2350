pub mod api;
pub mod codec;
pub mod config;
pub mod domain;
pub mod error;
pub mod presenter;
pub mod render;
pub mod service;
pub mod storage;
pub mod utils;
