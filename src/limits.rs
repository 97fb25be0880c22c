/// Default maximum nesting depth limit.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Default maximum input length in bytes (64 MiB).
pub const DEFAULT_MAX_INPUT_BYTES: usize = 64 << 20;

/// Decode-time resource limits.
///
/// Bencode has no built-in bounds on nesting or size and is routinely parsed from untrusted
/// peers, so every decode runs under explicit limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DecodeLimits {
    /// Maximum total input length in bytes (per document for streaming readers).
    pub max_input_bytes: usize,
    /// Maximum nesting depth of lists and dictionaries.
    pub max_depth: usize,
}

impl DecodeLimits {
    /// Construct limits derived from a maximum message size, with the default depth limit.
    #[must_use]
    pub const fn for_bytes(max_message_bytes: usize) -> Self {
        Self {
            max_input_bytes: max_message_bytes,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Replace the depth limit.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self::for_bytes(DEFAULT_MAX_INPUT_BYTES)
    }
}

/// Encoder options.
///
/// The default is strictly canonical. Anything enabled here produces output that does not
/// round-trip through [`crate::decode`] into the original host value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EncodeOptions {
    /// Encode `f32`/`f64` as the integer of their IEEE-754 bit pattern instead of rejecting them.
    pub float_bits: bool,
}

impl EncodeOptions {
    /// Canonical options: floats are rejected with `UnsupportedType`.
    #[must_use]
    pub const fn canonical() -> Self {
        Self { float_bits: false }
    }

    /// Options that encode floats as raw bit patterns.
    #[must_use]
    pub const fn with_float_bits() -> Self {
        Self { float_bits: true }
    }
}
