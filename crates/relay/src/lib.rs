//! ESND credit relay library.
//!
//! This crate provides the relay functionality as a library, allowing it to
//! be tested and reused. The `/proxy` signature verification lives in
//! [`signature`]; everything else is request/response plumbing between the
//! storefront, the credit-scoring service, and the Shopify Admin API.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod signature;
pub mod state;
