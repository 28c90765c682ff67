//! Upgrade configuration.

/// Size limits handed to the transport for every upgraded connection.
///
/// These limits prevent resource exhaustion and bound per-connection memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum size of a single frame in bytes.
    ///
    /// Default: 16 MB (16 * 1024 * 1024)
    pub max_frame_size: usize,

    /// Maximum size of a complete message in bytes, after reassembly.
    ///
    /// Default: 64 MB (64 * 1024 * 1024)
    pub max_message_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_frame_size: 16 * 1024 * 1024,   // 16 MB
            max_message_size: 64 * 1024 * 1024, // 64 MB
        }
    }
}

impl Limits {
    /// Create new limits with custom values.
    #[must_use]
    pub const fn new(max_frame_size: usize, max_message_size: usize) -> Self {
        Self {
            max_frame_size,
            max_message_size,
        }
    }

    /// Create limits suitable for small embedded systems.
    ///
    /// - Max frame: 64 KB
    /// - Max message: 256 KB
    #[must_use]
    pub const fn embedded() -> Self {
        Self {
            max_frame_size: 64 * 1024,
            max_message_size: 256 * 1024,
        }
    }
}

/// Configuration applied once when an [`Upgrader`](crate::Upgrader) is built.
///
/// The upgrader keeps its own normalized copy; later changes to a `Config`
/// value never reach connections already being served.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    /// Sub-protocols accepted during the handshake.
    ///
    /// An empty string entry accepts clients that request no sub-protocol or
    /// none of the listed ones. Empty list defaults to `[""]`.
    pub protocols: Vec<String>,

    /// Origin that clients must present.
    ///
    /// Empty means no origin restriction.
    pub origin: String,

    /// Reserved. Compression is not negotiated; the flag has no effect.
    pub compress: bool,

    /// Resource limits forwarded to the transport.
    pub limits: Limits,

    /// Number of wrappers pre-allocated in each pool.
    ///
    /// Default: 0
    pub pool_capacity: usize,
}

impl Config {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the accepted sub-protocols.
    #[must_use]
    pub fn with_protocols<I, S>(mut self, protocols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.protocols = protocols.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict upgrades to clients presenting this Origin.
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Set the reserved compression flag.
    #[must_use]
    pub const fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Set custom limits.
    #[must_use]
    pub const fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Pre-allocate `capacity` wrappers in each pool.
    #[must_use]
    pub const fn with_pool_capacity(mut self, capacity: usize) -> Self {
        self.pool_capacity = capacity;
        self
    }

    /// Apply the defaulting policy.
    ///
    /// An empty protocol list becomes `[""]`. An empty origin stays empty,
    /// meaning any origin is accepted.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.protocols.is_empty() {
            self.protocols = vec![String::new()];
        }
        self
    }

    /// Check whether an origin restriction is configured.
    #[inline]
    #[must_use]
    pub fn restricts_origin(&self) -> bool {
        !self.origin.is_empty()
    }

    /// Check whether clients without a matching sub-protocol are accepted.
    #[must_use]
    pub fn accepts_unspecified_protocol(&self) -> bool {
        self.protocols.is_empty() || self.protocols.iter().any(String::is_empty)
    }
}
