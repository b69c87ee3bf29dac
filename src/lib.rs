// Car price prediction client

// 入力フォームと検証
pub mod form;
pub mod units;
pub mod validation;

// バックエンドとの通信
pub mod cancel;
pub mod gateway;
pub mod http;
pub mod models;
pub mod request;

// 画面状態と表示
pub mod controller;
pub mod metrics;
pub mod render;

pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;

pub use errors::{Error, Result};
