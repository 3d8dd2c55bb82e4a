//! Utility Functions
//!
//! Small string helpers shared by the compiler and the markup front end.

/// Class annotation for a namespaced node name.
///
/// `"prefix:local"` becomes `"prefix-local"` (lowercased, first colon only).
/// Names without a namespace prefix, or with a leading colon, yield an empty
/// string, which `add_class` treats as a no-op.
pub fn namespace_class(node_name: &str) -> String {
    match node_name.find(':') {
        Some(index) if index > 0 => node_name.to_ascii_lowercase().replacen(':', "-", 1),
        _ => String::new(),
    }
}

/// Decode `%XX` escapes in an attribute value.
///
/// Invalid or truncated escapes pass through verbatim; byte sequences that do
/// not form valid UTF-8 after decoding are replaced lossily.
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out)
        .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
