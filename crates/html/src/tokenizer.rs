//! Small HTML tokenizer for article markup.
//!
//! Tag and attribute names are ASCII `[A-Za-z0-9:_-]` and lowercased.
//! Comments, doctypes and other `<!...>` / `<?...>` constructs are dropped.
//! `script` and `style` bodies are raw text up to their close tag.
//! A `<` that does not open a tag is kept as text.
use crate::entities::decode_entities;
use crate::types::Token;
use memchr::memchr;

const COMMENT_START: &[u8] = b"<!--";
const COMMENT_END: &str = "-->";
const SCRIPT_CLOSE_TAG: &[u8] = b"</script";
const STYLE_CLOSE_TAG: &[u8] = b"</style";

fn starts_with_ignore_ascii_case_at(haystack: &[u8], start: usize, needle: &[u8]) -> bool {
    haystack
        .get(start..start + needle.len())
        .is_some_and(|s| s.eq_ignore_ascii_case(needle))
}

fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'_' || c == b':'
}

pub(crate) fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Returns `(start, end)` of the close tag within `haystack`, `end` past its `>`.
fn find_rawtext_close_tag(haystack: &str, close_tag: &[u8]) -> Option<(usize, usize)> {
    let bytes = haystack.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        i += memchr(b'<', &bytes[i..])?;
        if starts_with_ignore_ascii_case_at(bytes, i, close_tag) {
            let mut k = i + close_tag.len();
            while k < bytes.len() && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if k < bytes.len() && bytes[k] == b'>' {
                return Some((i, k + 1));
            }
        }
        i += 1;
    }
    None
}

pub fn tokenize(input: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut i = 0;
    // Slices are only cut at ASCII bytes, so every endpoint is a char boundary.
    let mut text_start = 0;

    let flush_text = |out: &mut Vec<Token>, from: usize, to: usize| {
        if from < to {
            out.push(Token::Text(decode_entities(&input[from..to])));
        }
    };

    while i < len {
        let Some(rel) = memchr(b'<', &bytes[i..]) else {
            break;
        };
        i += rel;
        let next = bytes.get(i + 1).copied();

        // comment: drop up to `-->`, or to the end when unterminated
        if starts_with_ignore_ascii_case_at(bytes, i, COMMENT_START) {
            flush_text(&mut out, text_start, i);
            let body = i + COMMENT_START.len();
            i = input[body..]
                .find(COMMENT_END)
                .map_or(len, |end| body + end + COMMENT_END.len());
            text_start = i;
            continue;
        }

        // doctype, CDATA, processing instructions
        if matches!(next, Some(b'!') | Some(b'?')) {
            flush_text(&mut out, text_start, i);
            i = memchr(b'>', &bytes[i..]).map_or(len, |end| i + end + 1);
            text_start = i;
            continue;
        }

        if next == Some(b'/') {
            let start = i + 2;
            let mut j = start;
            while j < len && is_name_char(bytes[j]) {
                j += 1;
            }
            if j == start {
                // `</` without a name is text
                i += 1;
                continue;
            }
            flush_text(&mut out, text_start, i);
            let name = input[start..j].to_ascii_lowercase();
            i = memchr(b'>', &bytes[j..]).map_or(len, |end| j + end + 1);
            text_start = i;
            out.push(Token::EndTag(name));
            continue;
        }

        if !next.is_some_and(|c| c.is_ascii_alphabetic()) {
            i += 1;
            continue;
        }

        flush_text(&mut out, text_start, i);
        let start = i + 1;
        let mut k = start;
        while k < len && is_name_char(bytes[k]) {
            k += 1;
        }
        let name = input[start..k].to_ascii_lowercase();
        let (attributes, mut self_closing, end) = read_attributes(input, k);
        if is_void_element(&name) {
            self_closing = true;
        }
        i = end;
        text_start = i;

        let raw_close = match name.as_str() {
            "script" if !self_closing => Some((SCRIPT_CLOSE_TAG, name.clone())),
            "style" if !self_closing => Some((STYLE_CLOSE_TAG, name.clone())),
            _ => None,
        };
        out.push(Token::StartTag {
            name,
            attributes,
            self_closing,
        });

        if let Some((close_tag, name)) = raw_close {
            // An unterminated raw text element swallows the rest of the input.
            let (body_end, resume) = find_rawtext_close_tag(&input[i..], close_tag)
                .map_or((len, len), |(s, e)| (i + s, i + e));
            if i < body_end {
                out.push(Token::Text(input[i..body_end].to_string()));
            }
            out.push(Token::EndTag(name));
            i = resume;
            text_start = i;
        }
    }

    flush_text(&mut out, text_start, len);
    out
}

/// Parse attributes starting right after the tag name.
/// Returns the attributes, whether the tag ended in `/>`, and the index past `>`.
fn read_attributes(input: &str, mut k: usize) -> (Vec<(String, Option<String>)>, bool, usize) {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut attributes = Vec::new();

    let skip_whitespace = |k: &mut usize| {
        while *k < len && bytes[*k].is_ascii_whitespace() {
            *k += 1;
        }
    };

    loop {
        skip_whitespace(&mut k);
        if k >= len {
            return (attributes, false, len);
        }
        match bytes[k] {
            b'>' => return (attributes, false, k + 1),
            b'/' if bytes.get(k + 1) == Some(&b'>') => return (attributes, true, k + 2),
            b'/' => {
                k += 1;
                continue;
            }
            _ => {}
        }

        let name_start = k;
        while k < len && is_name_char(bytes[k]) {
            k += 1;
        }
        if name_start == k {
            // junk such as `"` or a non-ASCII byte; skip the whole char
            k += input[k..].chars().next().map_or(1, char::len_utf8);
            continue;
        }
        let name = input[name_start..k].to_ascii_lowercase();

        skip_whitespace(&mut k);
        if k >= len || bytes[k] != b'=' {
            attributes.push((name, None));
            continue;
        }
        k += 1;
        skip_whitespace(&mut k);

        let value = if k < len && (bytes[k] == b'"' || bytes[k] == b'\'') {
            let quote = bytes[k];
            let vstart = k + 1;
            let vend = memchr(quote, &bytes[vstart..]).map_or(len, |rel| vstart + rel);
            k = (vend + 1).min(len);
            decode_entities(&input[vstart..vend])
        } else {
            let vstart = k;
            while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                if bytes[k] == b'/' && bytes.get(k + 1) == Some(&b'>') {
                    break;
                }
                k += 1;
            }
            decode_entities(&input[vstart..k])
        };
        attributes.push((name, Some(value)));
    }
}
