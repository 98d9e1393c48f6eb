pub mod api;
pub mod board;
pub mod config;
pub mod data_models;
pub mod dispatcher;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod presenter;
pub mod schedule;
pub mod session;
pub mod target;
