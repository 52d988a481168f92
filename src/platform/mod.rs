//! Platform-specific implementations of the host collaborator.

#[cfg(all(target_arch = "wasm32", feature = "wasm-web"))]
pub mod browser;
