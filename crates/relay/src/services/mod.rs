//! Clients for the relay's upstream HTTP services.

pub mod credit;
pub mod demo;
pub mod shopify;

pub use credit::{CreditClient, CreditError};
pub use demo::{DemoClient, DemoError};
pub use shopify::{AccessToken, PriceRule, PriceRuleInput, ShopifyAdminClient, ShopifyError};
