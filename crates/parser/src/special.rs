//! Sentinel string values with a special meaning to the store.

use flatoml_keyset::Key;

/// The marker for a key without a value.
pub const NULL_INDICATOR: &str = "@NULL";

/// The prefix of a base64-encoded binary payload. The payload itself is
/// decoded downstream by the binary layer, not here.
pub const BASE64_PREFIX: &str = "@BASE64";

/// Recognize a sentinel string value and adjust the key accordingly.
///
/// Returns `true` when the value was handled and the caller must not apply
/// the plain-string typing rules.
pub fn check_special_value(key: &Key, value: &str) -> bool {
    if value == NULL_INDICATOR {
        key.set_binary(Vec::new());
        key.set_meta("type", "binary");
        return true;
    }
    if value.starts_with(BASE64_PREFIX) {
        // Left as-is for the binary layer.
        return true;
    }
    false
}
