//! Shared utility helpers.

use std::path::Path;

use encoding_rs::WINDOWS_1252;

/// Case-insensitive substring search without allocating an uppercase copy.
#[inline]
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    let needle_bytes = needle.as_bytes();
    let haystack_bytes = haystack.as_bytes();
    if needle_bytes.len() > haystack_bytes.len() {
        return false;
    }
    haystack_bytes
        .windows(needle_bytes.len())
        .any(|window| window.eq_ignore_ascii_case(needle_bytes))
}

/// Read a file as a string, trying UTF-8 first, then Windows-1252 as fallback.
///
/// Migration dumps and editor-saved TypeScript files occasionally arrive in
/// legacy encodings; a hard UTF-8 requirement would abort the whole run.
pub fn read_file_with_encoding_fallback(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;

    match String::from_utf8(bytes.clone()) {
        Ok(s) => Ok(strip_bom(&s).to_string()),
        Err(_) => {
            let (decoded, _, had_errors) = WINDOWS_1252.decode(&bytes);
            if had_errors {
                Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "File contains invalid characters",
                ))
            } else {
                Ok(strip_bom(&decoded).to_string())
            }
        }
    }
}

/// Strip a UTF-8 BOM if present.
#[inline]
pub fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{FEFF}').unwrap_or(content)
}
