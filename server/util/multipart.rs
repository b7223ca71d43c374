/// Returns the index of the first occurrence of `needle` in `haystack`.
pub fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Splits `haystack` on every occurrence of `needle`, returning the pieces
/// between occurrences (excluding the needle itself).
pub fn split_on<'a>(haystack: &'a [u8], needle: &[u8]) -> Vec<&'a [u8]> {
    let mut result = Vec::new();
    let mut start = 0;
    while start <= haystack.len() {
        if let Some(pos) = find_subsequence(&haystack[start..], needle) {
            result.push(&haystack[start..start + pos]);
            start += pos + needle.len();
        } else {
            result.push(&haystack[start..]);
            break;
        }
    }
    result
}

/// Extracts the boundary token from a Content-Type header value like
/// `multipart/form-data; boundary=----WebKitFormBoundaryXXX`.
pub fn extract_boundary(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .map(|s| s.trim())
        .find_map(|s| s.strip_prefix("boundary="))
        .map(|s| s.trim_matches('"').to_owned())
        .filter(|s| !s.is_empty())
}

/// An uploaded file part.
#[derive(Debug, PartialEq)]
pub struct FilePart {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Finds the file part whose `name="<field_name>"` matches.
///
/// Returns `None` if the form has no such field or the field is not a file
/// upload. An upload with an empty `filename=""` (no file chosen in the
/// browser) is returned with an empty filename so callers can tell the two
/// cases apart.
pub fn extract_file(body: &[u8], boundary: &str, field_name: &str) -> Option<FilePart> {
    let delimiter = format!("--{}", boundary);
    let parts = split_on(body, delimiter.as_bytes());
    let sep = b"\r\n\r\n";

    for part in parts {
        let Some(sep_pos) = find_subsequence(part, sep) else { continue };
        let headers = String::from_utf8_lossy(&part[..sep_pos]);
        if disposition_param(&headers, "name").as_deref() != Some(field_name) {
            continue;
        }
        let filename = disposition_param(&headers, "filename")?;
        let raw = &part[sep_pos + sep.len()..];
        let trimmed = raw.strip_suffix(b"\r\n").unwrap_or(raw);
        return Some(FilePart { filename, bytes: trimmed.to_vec() });
    }
    None
}

/// Value of the `key=` parameter of a part's Content-Disposition header,
/// with surrounding quotes removed. Keys compare exactly, so `name` never
/// matches `filename`.
fn disposition_param(headers: &str, key: &str) -> Option<String> {
    let line = headers
        .lines()
        .find(|l| l.to_ascii_lowercase().starts_with("content-disposition:"))?;
    line.split(';').skip(1).find_map(|param| {
        let (k, v) = param.split_once('=')?;
        k.trim()
            .eq_ignore_ascii_case(key)
            .then(|| v.trim().trim_matches('"').to_owned())
    })
}
