#![doc = include_str!("../README.md")]

pub mod bridge;
pub mod host;
pub mod logger;
pub mod platform;
pub mod util;
