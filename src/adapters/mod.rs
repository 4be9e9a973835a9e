//! Backend adapters
//!
//! Each submodule wraps one family of backend endpoints. They share the
//! request-id and error normalization in [`http`].

pub mod exports;
pub mod http;
pub mod metrics;
pub mod storage;
