//! Special MPQ files: (listfile), (attributes), (signature), (user data)

/// Directory of the file names stored in the archive
pub const LISTFILE: &str = "(listfile)";

/// File attributes (CRC32, timestamps, MD5)
pub const ATTRIBUTES: &str = "(attributes)";

/// Weak digital signature
pub const SIGNATURE: &str = "(signature)";

/// User data stored as a file
pub const USER_DATA: &str = "(user data)";

/// Special files resolved eagerly when present, listfile excluded
pub const OPTIONAL_SPECIAL_FILES: [&str; 3] = [ATTRIBUTES, SIGNATURE, USER_DATA];

/// Parse a (listfile) into individual filenames
///
/// Names are separated by CRLF. Empty entries are dropped; names are kept
/// exactly as written otherwise.
pub fn parse_listfile(data: &[u8]) -> Vec<String> {
    let content = match std::str::from_utf8(data) {
        Ok(s) => s.to_string(),
        Err(_) => {
            log::warn!("(listfile) contains invalid UTF-8, using lossy conversion");
            String::from_utf8_lossy(data).into_owned()
        }
    };

    let files: Vec<String> = content
        .split("\r\n")
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    log::debug!("Parsed {} files from (listfile)", files.len());
    files
}
