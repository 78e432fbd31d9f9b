pub mod components;
pub mod config;
pub mod context;
pub mod browser;
pub mod logging;
pub mod pages;
pub mod routes;
pub mod storage;
