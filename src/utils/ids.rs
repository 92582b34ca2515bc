// Random identifiers for columns and spans

use rand::Rng;

use crate::models::document::Document;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const TOKEN_LEN: usize = 8;

/// Prefix that marks span identifiers.
pub const SPAN_PREFIX: &str = "S_";

/// Eight random lowercase alphanumerics.
pub fn random_token() -> String {
    let mut rng = rand::thread_rng();
    (0..TOKEN_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// A column id not used by any column of `doc`.
pub fn fresh_column_id(doc: &Document) -> String {
    loop {
        let id = random_token();
        if !doc.has_column(&id) {
            return id;
        }
    }
}

/// A span id not carried by any record of `doc`.
pub fn fresh_span_id(doc: &Document) -> String {
    loop {
        let id = format!("{SPAN_PREFIX}{}", random_token());
        let taken = doc
            .events
            .values()
            .any(|record| record.span_id.as_deref() == Some(id.as_str()));
        if !taken {
            return id;
        }
    }
}
