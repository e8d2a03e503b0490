// Library exports for binaries and integration tests
pub mod config;
pub mod contact;
pub mod controller;
pub mod document;
pub mod i18n;
pub mod retry;
pub mod server;
pub mod session;
pub mod storage;
