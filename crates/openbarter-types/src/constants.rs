//! System-wide constants for the OpenBarter settlement engine.

/// Fee rates are expressed in basis points: 1/10000 of the price.
pub const INVERSE_BASIS_POINT: u32 = 10_000;

/// Domain-separation tag for the canonical order digest.
pub const ORDER_DOMAIN_TAG: &[u8] = b"openbarter:order:v1:";

/// Default cap on executions per `bulk_execute` call.
pub const DEFAULT_MAX_BULK_EXECUTIONS: usize = 64;

/// Default cap on fee entries per order.
pub const DEFAULT_MAX_FEES_PER_ORDER: usize = 8;

/// Ed25519 signature length in bytes.
pub const SIGNATURE_LEN: usize = 64;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "OpenBarter";
