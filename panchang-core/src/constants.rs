use std::time::Duration;

/// Cached calendar batches older than this are discarded on read.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// A credential is treated as expired this long before the provider says so.
pub const TOKEN_SAFETY_BUFFER: Duration = Duration::from_secs(5 * 60);

/// Decimal places kept from latitude/longitude when building cache keys (~11 m).
pub const COORDINATE_PRECISION: i32 = 4;

/// Tithis in one half of the lunar month.
pub const TITHIS_PER_PAKSHA: u8 = 15;

/// Tithis in a full lunar month.
pub const TITHIS_PER_MONTH: u8 = 30;

/// Store namespace for cached calendar batches.
pub const CACHE_NAMESPACE: &str = "panchang_cache";

/// Store namespace for the provider credential.
pub const CREDENTIAL_NAMESPACE: &str = "credentials";
