//! Charset detection and byte-exact round-tripping for legacy HTML files.
//!
//! Old site trees mix UTF-8 pages with windows-1251 ones, usually carrying a
//! `<meta ... charset=...>` declaration somewhere in the raw bytes. The
//! resolver reads that declaration, tries an ordered list of candidate
//! encodings, and remembers which one succeeded so the patched text can be
//! written back in the file's original encoding.

// UTF-8 byte order mark
const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Decode attempt order when a windows-1251 charset declaration is present.
const CP1251_DECLARED: [TextEncoding; 4] = [
    TextEncoding::Windows1251,
    TextEncoding::Utf8Bom,
    TextEncoding::Utf8,
    TextEncoding::Latin1,
];

/// Decode attempt order for utf-8 declarations and undeclared files.
const UTF8_DECLARED: [TextEncoding; 4] = [
    TextEncoding::Utf8Bom,
    TextEncoding::Utf8,
    TextEncoding::Windows1251,
    TextEncoding::Latin1,
];

/// Text encoding a file was decoded with and will be re-encoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8 with a leading byte order mark. The BOM is stripped on decode
    /// and restored on encode.
    Utf8Bom,
    /// Plain UTF-8.
    Utf8,
    /// Cyrillic 8-bit encoding common on legacy Russian sites.
    Windows1251,
    /// The `latin1` label resolves to windows-1252, following the WHATWG
    /// encoding standard (browsers treat them as the same encoding).
    Latin1,
}

/// Declared charset found literally in a file's raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharsetHint {
    /// A `charset=windows-1251` (or `cp1251`/`1251`) declaration.
    Windows1251,
    /// A `charset=utf-8` declaration.
    Utf8,
    /// No recognizable declaration.
    Undeclared,
}

/// Error returned when patched text cannot be represented in the encoding
/// the file was read with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// The text contains characters the target encoding has no byte for.
    Unencodable { encoding: TextEncoding },
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeError::Unencodable { encoding } => {
                write!(
                    f,
                    "text contains characters not representable in {}",
                    encoding.name()
                )
            }
        }
    }
}

impl std::error::Error for EncodeError {}

impl TextEncoding {
    /// Encoding label used in messages.
    pub fn name(self) -> &'static str {
        match self {
            TextEncoding::Utf8Bom => "utf-8 (BOM)",
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Windows1251 => "windows-1251",
            TextEncoding::Latin1 => "latin-1",
        }
    }

    /// Attempt a strict decode. Returns `None` on any invalid or unmapped
    /// byte sequence.
    fn decode_strict(self, raw: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8Bom => raw
                .strip_prefix(&UTF8_BOM)
                .and_then(|body| std::str::from_utf8(body).ok())
                .map(str::to_owned),
            TextEncoding::Utf8 => std::str::from_utf8(raw).ok().map(str::to_owned),
            TextEncoding::Windows1251 => decode_single_byte(encoding_rs::WINDOWS_1251, raw),
            TextEncoding::Latin1 => decode_single_byte(encoding_rs::WINDOWS_1252, raw),
        }
    }

    /// Re-encode text with the encoding chosen by [`resolve`].
    ///
    /// The text normally originates from a strict decode with this same
    /// encoding, so the only characters at risk are ones added after the
    /// decode. Failure is fatal for the file rather than silently
    /// substituted.
    pub fn encode(self, text: &str) -> Result<Vec<u8>, EncodeError> {
        match self {
            TextEncoding::Utf8Bom => {
                let mut bytes = UTF8_BOM.to_vec();
                bytes.extend_from_slice(text.as_bytes());
                Ok(bytes)
            }
            TextEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
            TextEncoding::Windows1251 => encode_single_byte(encoding_rs::WINDOWS_1251, text, self),
            TextEncoding::Latin1 => encode_single_byte(encoding_rs::WINDOWS_1252, text, self),
        }
    }
}

/// Decode raw file bytes, preferring the declared charset.
///
/// Always produces text: if no candidate decodes strictly, the bytes are
/// decoded as UTF-8 with U+FFFD replacement and reported as
/// [`TextEncoding::Utf8`].
pub fn resolve(raw: &[u8]) -> (String, TextEncoding) {
    for &encoding in candidates(detect_charset_hint(raw)) {
        if let Some(text) = encoding.decode_strict(raw) {
            return (text, encoding);
        }
    }
    (String::from_utf8_lossy(raw).into_owned(), TextEncoding::Utf8)
}

/// Ordered decode candidates for a declared charset.
pub fn candidates(hint: CharsetHint) -> &'static [TextEncoding; 4] {
    match hint {
        CharsetHint::Windows1251 => &CP1251_DECLARED,
        CharsetHint::Utf8 | CharsetHint::Undeclared => &UTF8_DECLARED,
    }
}

/// Search the lowercased bytes for an explicit charset declaration.
pub fn detect_charset_hint(raw: &[u8]) -> CharsetHint {
    const CP1251_LABELS: [&[u8]; 3] = [
        b"charset=windows-1251",
        b"charset=cp1251",
        b"charset=1251",
    ];

    let low = raw.to_ascii_lowercase();
    if CP1251_LABELS.iter().any(|label| contains(&low, label)) {
        CharsetHint::Windows1251
    } else if contains(&low, b"charset=utf-8") {
        CharsetHint::Utf8
    } else {
        CharsetHint::Undeclared
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

fn decode_single_byte(encoding: &'static encoding_rs::Encoding, raw: &[u8]) -> Option<String> {
    let (text, had_errors) = encoding.decode_without_bom_handling(raw);
    if had_errors {
        None
    } else {
        Some(text.into_owned())
    }
}

fn encode_single_byte(
    encoding: &'static encoding_rs::Encoding,
    text: &str,
    label: TextEncoding,
) -> Result<Vec<u8>, EncodeError> {
    let (bytes, _, had_unmappable) = encoding.encode(text);
    if had_unmappable {
        Err(EncodeError::Unencodable { encoding: label })
    } else {
        Ok(bytes.into_owned())
    }
}
