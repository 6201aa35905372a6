use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left untouched by `escape_data_string`: the RFC 3986 unreserved set.
const DATA_STRING: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// URL utility functions.
pub struct UrlUtil;

impl UrlUtil {
    /// Percent-encode every byte of `value` outside the unreserved set, using
    /// upper-case hex digits. Multi-byte characters are encoded as their UTF-8 bytes.
    pub fn escape_data_string(value: &str) -> String {
        utf8_percent_encode(value, DATA_STRING).to_string()
    }
}
