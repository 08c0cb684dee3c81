use crate::error::{MediaError, MediaResult};
use std::path::Path;

/// Extensions that must never land in a web-served media store
const BLOCKED_EXTENSIONS: &[&str] = &[
    // Executables
    "exe", "dll", "so", "dylib", "bin", "com", "bat", "cmd", "ps1", "sh", "bash",
    // Server-side scripts
    "php", "php3", "php4", "php5", "phtml", "pl", "py", "cgi", "asp", "aspx", "jsp", "jspx", "cfm",
    // Web server config
    "htaccess", "htpasswd",
];

/// Validates file size against maximum limit
pub fn validate_file_size(size: usize, max_size: usize) -> MediaResult<()> {
    if size > max_size {
        return Err(MediaError::invalid(format!(
            "File size {} bytes exceeds maximum allowed {} bytes ({} MB)",
            size,
            max_size,
            max_size / 1024 / 1024
        )));
    }
    Ok(())
}

/// Checks the `type/subtype` shape of a MIME type. Parameters are rejected.
pub fn validate_mime_type(mime_type: &str) -> MediaResult<()> {
    let well_formed = !mime_type.is_empty()
        && mime_type.chars().all(|c| c.is_ascii_graphic())
        && mime_type
            .parse::<mime::Mime>()
            .map(|parsed| parsed.params().next().is_none() && !parsed.subtype().as_str().is_empty())
            .unwrap_or(false);

    if well_formed {
        Ok(())
    } else {
        Err(MediaError::invalid(format!(
            "Invalid mime type supplied: '{}'",
            mime_type
        )))
    }
}

/// Parses a six digit hexadecimal RGB triplet such as `ffffff` into its channels.
pub fn parse_hex_color(hex_color: &str) -> MediaResult<[u8; 3]> {
    let mut rgb = [0u8; 3];
    if hex_color.len() != 6 || hex::decode_to_slice(hex_color, &mut rgb).is_err() {
        return Err(MediaError::invalid(format!(
            "'{}' is not a six digit hexadecimal color",
            hex_color
        )));
    }
    Ok(rgb)
}

/// Sanitizes filename to prevent path traversal and injection attacks
/// Returns the sanitized filename or an error if the name is invalid
pub fn sanitize_filename(filename: &str) -> MediaResult<String> {
    // Only the last component survives; browsers on Windows send full paths
    let last_component = filename.rsplit(['/', '\\']).next().unwrap_or("");
    let name = Path::new(last_component)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    if name.is_empty() {
        return Err(MediaError::invalid("Filename cannot be empty"));
    }

    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        tracing::warn!("Path traversal attempt detected: {}", filename);
    }

    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_control()
                || c == ':'
                || c == '*'
                || c == '?'
                || c == '"'
                || c == '<'
                || c == '>'
                || c == '|'
                || c == ';'
            {
                '_'
            } else {
                c
            }
        })
        .collect();

    // Limit length safely for UTF-8
    let sanitized = if sanitized.len() > 255 {
        let mut end = 255;
        while !sanitized.is_char_boundary(end) {
            end -= 1;
        }
        sanitized[..end].to_string()
    } else {
        sanitized
    };

    if let Some(ext) = Path::new(&sanitized).extension().and_then(|e| e.to_str()) {
        let ext_lower = ext.to_lowercase();
        if BLOCKED_EXTENSIONS.contains(&ext_lower.as_str()) {
            return Err(MediaError::invalid(format!(
                "File extension '.{}' is not allowed",
                ext_lower
            )));
        }
    }

    if sanitized.starts_with('.') {
        return Err(MediaError::invalid(
            "Hidden files (starting with '.') are not allowed",
        ));
    }

    Ok(sanitized)
}

/// True for a bare file name that stays inside the directory it is joined to.
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
}
