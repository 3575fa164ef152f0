//! Per-entry name heuristics: path traversal and extension classes.
//!
//! All extension matching is ASCII case-insensitive so `x.EXE` and `x.exe`
//! classify identically.

/// Executable and script extensions that run on double-click or via a shell.
pub const HIGH_RISK_EXTENSIONS: &[&str] = &[
    "apk", "app", "bat", "cmd", "com", "cpl", "dll", "exe", "gadget", "hta", "jar", "js", "jse",
    "lnk", "msc", "msi", "msp", "pif", "ps1", "psm1", "reg", "scr", "sh", "sys", "vb", "vbe",
    "vbs", "ws", "wsc", "wsf", "wsh",
];

/// Macro-enabled Office formats.
pub const MACRO_EXTENSIONS: &[&str] = &[
    "docm", "dotm", "potm", "ppam", "ppsm", "pptm", "sldm", "xlam", "xlsb", "xlsm", "xltm",
];

/// Container formats that hide a second layer of content.
pub const NESTED_ARCHIVE_EXTENSIONS: &[&str] = &[
    "7z", "arj", "bz2", "cab", "gz", "img", "iso", "lz", "lzh", "rar", "tar", "tgz", "vhd", "xz",
    "z", "zip", "zst",
];

/// Extensions a victim expects to be harmless documents or media.
pub const DOCUMENT_EXTENSIONS: &[&str] = &[
    "csv", "doc", "docx", "gif", "htm", "html", "jpeg", "jpg", "mp3", "mp4", "odt", "pdf", "png",
    "ppt", "pptx", "rtf", "txt", "xls", "xlsx",
];

/// Heuristic classes an entry name falls into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntrySignals {
    /// Name escapes the extraction root.
    pub traversal: bool,
    /// `document.ext.exe` style disguise.
    pub double_extension: bool,
    /// Executable or script payload.
    pub high_risk: bool,
    /// Macro-enabled Office document.
    pub macro_document: bool,
    /// Nested archive.
    pub nested_archive: bool,
}

/// Classifies an entry name.
///
/// # Examples
///
/// ```
/// use exhibit_core::archive::signals::classify_entry;
///
/// let signals = classify_entry("invoice.pdf.exe");
/// assert!(signals.high_risk);
/// assert!(signals.double_extension);
/// assert!(!signals.traversal);
/// ```
#[must_use]
pub fn classify_entry(name: &str) -> EntrySignals {
    let normalized = normalize_separators(name);
    let is_dir = normalized.ends_with('/');
    let ext = if is_dir { None } else { extension(&normalized) };
    let in_set = |set: &[&str]| ext.as_deref().is_some_and(|e| set.contains(&e));

    EntrySignals {
        traversal: is_traversal_normalized(&normalized),
        double_extension: !is_dir && has_double_extension(&normalized),
        high_risk: in_set(HIGH_RISK_EXTENSIONS),
        macro_document: in_set(MACRO_EXTENSIONS),
        nested_archive: in_set(NESTED_ARCHIVE_EXTENSIONS),
    }
}

/// Converts backslash separators to forward slashes.
#[must_use]
pub fn normalize_separators(name: &str) -> String {
    name.replace('\\', "/")
}

/// Returns `true` if the name is absolute or contains a `..` segment.
///
/// Absolute covers a leading `/`, UNC `//host` and drive-letter prefixes such
/// as `C:/` or `C:`.
///
/// # Examples
///
/// ```
/// use exhibit_core::archive::signals::is_path_traversal;
///
/// assert!(is_path_traversal("../../etc/passwd"));
/// assert!(is_path_traversal("C:/Windows/x"));
/// assert!(is_path_traversal("a\\..\\b"));
/// assert!(!is_path_traversal("folder/file.txt"));
/// ```
#[must_use]
pub fn is_path_traversal(name: &str) -> bool {
    is_traversal_normalized(&normalize_separators(name))
}

fn is_traversal_normalized(name: &str) -> bool {
    if name.starts_with('/') {
        return true;
    }
    let bytes = name.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        return true;
    }
    name.split('/').any(|segment| segment.trim() == "..")
}

/// Lower-cased extension of the final path component.
fn extension(name: &str) -> Option<String> {
    let file_name = name.rsplit('/').next()?;
    let (stem, ext) = file_name.rsplit_once('.')?;
    let ext = ext.trim();
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn has_double_extension(name: &str) -> bool {
    let Some(file_name) = name.rsplit('/').next() else {
        return false;
    };
    let mut parts = file_name.rsplit('.').map(|p| p.trim().to_ascii_lowercase());
    let (Some(last), Some(previous)) = (parts.next(), parts.next()) else {
        return false;
    };
    // A stem must remain in front of the disguised extension.
    if parts.next().is_none_or(|stem| stem.is_empty()) {
        return false;
    }
    HIGH_RISK_EXTENSIONS.contains(&last.as_str())
        && DOCUMENT_EXTENSIONS.contains(&previous.as_str())
}
