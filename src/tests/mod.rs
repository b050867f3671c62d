pub mod common;
mod live_api;
