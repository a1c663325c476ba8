//! Path hashes used by archive headers to look up files by name.

/// Multiplier of the 32-bit path hash
pub const PATH_HASH32_PRIME: u32 = 37;

/// Multiplier of the 64-bit path hash
pub const PATH_HASH64_PRIME: u64 = 0x85;

/// Normalizes a path the way archives store it: trimmed, lowercase, forward slashes and a leading
/// slash.
///
/// ```
/// use souls_container::hash::normalize_path;
///
/// assert_eq!(normalize_path(r"N:\GR\data\Param\gameparam.parambnd"), "/n:/gr/data/param/gameparam.parambnd");
/// assert_eq!(normalize_path("/chr/c0000.anibnd"), "/chr/c0000.anibnd");
/// ```
pub fn normalize_path(path: &str) -> String {
    let path = path.trim().to_lowercase().replace('\\', "/");
    if path.starts_with('/') {
        path
    } else {
        format!("/{path}")
    }
}

/// 32-bit hash of the normalized path over its UTF-16 code units
pub fn path_hash32(path: &str) -> u32 {
    normalize_path(path)
        .encode_utf16()
        .fold(0u32, |hash, unit| {
            hash.wrapping_mul(PATH_HASH32_PRIME)
                .wrapping_add(unit as u32)
        })
}

/// 64-bit hash of the normalized path over its UTF-16 code units
pub fn path_hash64(path: &str) -> u64 {
    normalize_path(path)
        .encode_utf16()
        .fold(0u64, |hash, unit| {
            hash.wrapping_mul(PATH_HASH64_PRIME)
                .wrapping_add(unit as u64)
        })
}
