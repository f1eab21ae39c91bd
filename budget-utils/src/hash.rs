pub fn u8s_from_str(input: &str) -> [u8; 32] {
    blake3::hash(input.as_bytes()).into()
}

/// Derives a generator seed from an arbitrary string, e.g. a task id.
pub fn seed_from_str(input: &str) -> u64 {
    let u8s = u8s_from_str(input);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&u8s[..8]);
    u64::from_le_bytes(bytes)
}
