//! Test helpers para surge-server.

#![allow(dead_code, unused_imports)]

pub mod app;
pub mod client;

pub use app::{TestApp, app, app_with_cache, app_with_iterations, unreachable_redis};
pub use client::{TestClient, TestResponse};
