//! Path hashing for index lookups
//!
//! Index keys are CRC-32 values of the lowercased path with the final XOR
//! omitted (CRC-32/JAMCRC). `.index` files hash the folder and the file name
//! separately; `.index2` files hash the full path.

/// Normalize a game path: trim it and turn backslashes into forward slashes
pub fn normalize(path: &str) -> String {
    path.trim().replace('\\', "/")
}

pub fn path_hash(text: &str) -> u32 {
    !crc32fast::hash(text.to_lowercase().as_bytes())
}

/// Split a normalized path into its folder and file name
///
/// A path without a separator lives in the empty folder.
pub fn split_path(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => ("", path),
    }
}

/// Folder and file name hashes used by `.index` entries
pub fn split_hashes(path: &str) -> (u32, u32) {
    let path = normalize(path);
    let (folder, file) = split_path(&path);

    (path_hash(folder), path_hash(file))
}

/// Full path hash used by `.index2` entries
pub fn full_hash(path: &str) -> u32 {
    path_hash(&normalize(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::Fake;
    use fake::faker::lorem::en::Word;

    #[test]
    fn test_hash_matches_jamcrc_check_value() {
        // CRC-32 of "123456789" is 0xCBF43926
        pretty_assertions::assert_eq!(path_hash("123456789"), !0xCBF4_3926);
    }

    #[test]
    fn test_hash_is_case_insensitive() {
        let word = Word().fake::<String>();
        pretty_assertions::assert_eq!(path_hash(&word.to_uppercase()), path_hash(&word));
    }

    #[test]
    fn test_split_path() {
        pretty_assertions::assert_eq!(
            split_path("chara/equipment/e0100/e0100.imc"),
            ("chara/equipment/e0100", "e0100.imc")
        );
        pretty_assertions::assert_eq!(split_path("root.exd"), ("", "root.exd"));
    }

    #[test]
    fn test_backslashes_are_normalized() {
        pretty_assertions::assert_eq!(
            split_hashes(" chara\\weapon\\w0101.mdl "),
            split_hashes("chara/weapon/w0101.mdl")
        );
        pretty_assertions::assert_eq!(
            full_hash("chara\\weapon\\w0101.mdl"),
            full_hash("chara/weapon/w0101.mdl")
        );
    }

    #[test]
    fn test_split_hashes_use_each_part() {
        let (folder, file) = split_hashes("exd/root.exl");

        pretty_assertions::assert_eq!(folder, path_hash("exd"));
        pretty_assertions::assert_eq!(file, path_hash("root.exl"));
        assert_ne!(full_hash("exd/root.exl"), file);
    }
}
