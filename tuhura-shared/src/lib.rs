#![cfg_attr(not(test), forbid(unsafe_code))]

//! Wire models and client configuration shared by the Tuhura session crates.

pub mod config;
pub mod models;
