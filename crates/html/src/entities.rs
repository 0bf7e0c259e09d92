/// Decode character references in text and attribute values.
///
/// Named references come from a small fixed table of the ones encyclopedia
/// markup actually uses. Numeric references (`&#39;`, `&#x2014;`) decode
/// when semicolon-terminated and a valid scalar value. Anything else,
/// including unknown names and missing semicolons, passes through unchanged.
pub(crate) fn decode_entities(s: &str) -> String {
    let Some(first) = memchr::memchr(b'&', s.as_bytes()) else {
        return s.to_string();
    };

    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    out.push_str(&s[..first]);
    let mut i = first;
    let mut copy_start = first;

    while i < bytes.len() {
        if bytes[i] != b'&' {
            i += 1;
            continue;
        }
        out.push_str(&s[copy_start..i]);

        match decode_one(&s[i..]) {
            Some((ch, consumed)) => {
                out.push(ch);
                i += consumed;
            }
            None => {
                out.push('&');
                i += 1;
            }
        }
        copy_start = i;
    }

    out.push_str(&s[copy_start..]);
    out
}

const NAMED: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", '\u{00A0}'),
    ("ndash", '\u{2013}'),
    ("mdash", '\u{2014}'),
    ("hellip", '\u{2026}'),
    ("middot", '\u{00B7}'),
    ("times", '\u{00D7}'),
    ("copy", '\u{00A9}'),
    ("reg", '\u{00AE}'),
    ("deg", '\u{00B0}'),
    ("laquo", '\u{00AB}'),
    ("raquo", '\u{00BB}'),
    ("lsquo", '\u{2018}'),
    ("rsquo", '\u{2019}'),
    ("ldquo", '\u{201C}'),
    ("rdquo", '\u{201D}'),
];

// 0x10FFFF and 1114111
const MAX_HEX_DIGITS: usize = 6;
const MAX_DEC_DIGITS: usize = 7;
const MAX_NAME_LEN: usize = 8;

/// `rest` starts at `&`. Returns the decoded char and the bytes consumed.
fn decode_one(rest: &str) -> Option<(char, usize)> {
    let body = rest.get(1..)?;
    let end = body
        .bytes()
        .take(MAX_DEC_DIGITS + 2)
        .position(|b| b == b';')?;
    let reference = &body[..end];
    let consumed = end + 2;

    if let Some(numeric) = reference.strip_prefix('#') {
        let (digits, radix, max) = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => (hex, 16, MAX_HEX_DIGITS),
            None => (numeric, 10, MAX_DEC_DIGITS),
        };
        if digits.is_empty()
            || digits.len() > max
            || !digits.bytes().all(|b| (b as char).is_digit(radix))
        {
            return None;
        }
        let ch = u32::from_str_radix(digits, radix)
            .ok()
            .and_then(char::from_u32)?;
        return Some((ch, consumed));
    }

    if reference.len() > MAX_NAME_LEN {
        return None;
    }
    NAMED
        .iter()
        .find(|(name, _)| *name == reference)
        .map(|(_, ch)| (*ch, consumed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(decode_entities("120×32"), "120×32");
        assert_eq!(decode_entities(""), "");
    }

    #[test]
    fn named_references_decode() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&lt;tag&gt;"), "<tag>");
        assert_eq!(decode_entities("&quot;hi&quot;"), "\"hi\"");
        assert_eq!(decode_entities("a&nbsp;b"), "a\u{00A0}b");
        assert_eq!(decode_entities("1990&ndash;2000"), "1990\u{2013}2000");
    }

    #[test]
    fn numeric_references_decode() {
        assert_eq!(decode_entities("&#39;"), "'");
        assert_eq!(decode_entities("&#215;"), "×");
        assert_eq!(decode_entities("&#xD7;"), "×");
        assert_eq!(decode_entities("&#X2014;"), "\u{2014}");
        assert_eq!(decode_entities("&#1114111;"), "\u{10FFFF}");
    }

    #[test]
    fn malformed_references_pass_through() {
        for raw in [
            "&",
            "&&",
            "&;",
            "&#;",
            "&#x;",
            "&amp",
            "loose &amp space",
            "&notanentity;",
            "&#xZZ;",
            "&#xD800;",
            "&#x110000;",
            "&#99999999;",
            "&#-1;",
        ] {
            assert_eq!(decode_entities(raw), raw, "{raw}");
        }
    }

    #[test]
    fn malformed_reference_does_not_hide_the_next_one() {
        assert_eq!(decode_entities("&#xZZ;&amp;"), "&#xZZ;&");
        assert_eq!(decode_entities("π &amp; σ"), "π & σ");
    }
}
