//! HTML escaping for markup text.
//!
//! Replaces the five reserved characters `&`, `<`, `>`, `"`, `'` with
//! `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&#039;`. Single pass, so `&` is never
//! re-escaped inside an entity produced by this function.
//!
//! Not idempotent: escaping already escaped text double-escapes. Every emitted
//! fragment must go through exactly one escape call.

/// Escape `text` into a fresh `String`.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(&mut out, text);
    out
}

/// Append the escaped form of `text` to `out`.
pub fn escape_into(out: &mut String, text: &str) {
    let mut last = 0;
    for (i, b) in text.bytes().enumerate() {
        let entity = match b {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&quot;",
            b'\'' => "&#039;",
            _ => continue,
        };
        out.push_str(&text[last..i]);
        out.push_str(entity);
        last = i + 1;
    }
    out.push_str(&text[last..]);
}
