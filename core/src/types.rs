//! Shared primitive types used across the metrics pipeline.

/// Compact calendar date token, e.g. `20240101`. Scopes one run to one day.
pub type DateToken = str;

/// Amount in the smallest on-chain unit (zatoshi).
pub type Zatoshi = i64;

/// Amount in display denomination (ZEC).
pub type Zec = f64;

/// Amount in quote currency (USD).
pub type Usd = f64;
