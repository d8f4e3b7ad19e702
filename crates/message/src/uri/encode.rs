//! Component-aware percent encoding.
//!
//! Every byte outside the set allowed for a component is encoded as `%XX` (uppercase hex),
//! except a `%` that already starts a valid triple, which is copied as is. Running the
//! encoder over its own output is therefore a no-op.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Characters to encode in a query or fragment: everything outside
/// `pchar / "/" / "?"`.
const FRAGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

const QUERY: &AsciiSet = FRAGMENT;

/// Characters to encode in a path: everything outside `pchar / "/"`.
const PATH: &AsciiSet = &FRAGMENT.add(b'?');

/// Characters to encode in a user or password: everything outside
/// `unreserved / sub-delims`.
const USER_INFO: &AsciiSet = &PATH.add(b'/').add(b'@').add(b':');

pub(crate) fn encode_path(path: &str) -> String {
    encode(path, PATH)
}

pub(crate) fn encode_query(query: &str) -> String {
    encode(query, QUERY)
}

pub(crate) fn encode_fragment(fragment: &str) -> String {
    encode(fragment, FRAGMENT)
}

pub(crate) fn encode_user_info_part(part: &str) -> String {
    encode(part, USER_INFO)
}

fn encode(input: &str, set: &'static AsciiSet) -> String {
    let bytes = input.as_bytes();
    let mut encoded = String::with_capacity(input.len());
    let mut start = 0;
    let mut index = 0;

    while index < bytes.len() {
        if is_encoded_triple(&bytes[index..]) {
            // '%' is ascii, so both slice bounds sit on char boundaries
            encoded.extend(utf8_percent_encode(&input[start..index], set));
            encoded.push_str(&input[index..index + 3]);
            index += 3;
            start = index;
        } else {
            index += 1;
        }
    }

    encoded.extend(utf8_percent_encode(&input[start..], set));
    encoded
}

#[inline]
fn is_encoded_triple(bytes: &[u8]) -> bool {
    matches!(bytes, [b'%', high, low, ..] if high.is_ascii_hexdigit() && low.is_ascii_hexdigit())
}
