pub mod app;

pub use app::{TestApp, body_json, make_test_app};
