//! Core types for the HK Leather storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod money;
pub mod status;

pub use id::*;
pub use money::format_pkr;
pub use status::{OrderStatus, PaymentMethod, StatusParseError};
