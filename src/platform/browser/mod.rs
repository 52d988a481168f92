//! Browser backend, available on `wasm32` with the `wasm-web` feature.

mod window;

pub use window::{install_analytics_handler, WindowScope};
