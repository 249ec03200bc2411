/*!
Limits and policies applied while decoding.

The same [`Config`] drives the slice [`Decoder`](crate::Decoder), the
[`Scanner`](crate::Scanner) and the [`StreamDecoder`](crate::StreamDecoder).
*/

pub const DEFAULT_MAX_NESTING_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Arrays, maps and tags may nest this deep; the outermost is level 1.
    pub max_nesting_depth: usize,

    /// Upper bound on the length of one byte or text string, chunks included.
    pub max_string_length: Option<usize>,

    /// Upper bound on the element count of an array, or pair count of a map.
    pub max_container_length: Option<usize>,

    pub allow_indefinite_length: bool,

    /// Accept negative integers below `i64::MIN` (down to -2^64).
    pub allow_wide_negative: bool,

    /// Fail a map whose key equals an earlier key in the same map.
    ///
    /// Each key is compared against every earlier key, so the cost grows with
    /// the square of the map size; set `max_container_length` alongside it
    /// when decoding untrusted input.
    pub reject_duplicate_keys: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            max_string_length: None,
            max_container_length: None,
            allow_indefinite_length: true,
            allow_wide_negative: true,
            reject_duplicate_keys: false,
        }
    }
}

impl Config {
    pub(crate) fn string_too_long(&self, len: u64) -> bool {
        matches!(self.max_string_length, Some(max) if len > max as u64)
    }

    pub(crate) fn too_many_items(&self, count: u64) -> bool {
        matches!(self.max_container_length, Some(max) if count > max as u64)
    }
}
