//! Content fingerprinting.
//!
//! A document's identity is the lowercase hex SHA-256 of its bytes. Files
//! are hashed in bounded reads so arbitrarily large PDFs never spike memory.

use crate::error::{StoreError, StoreResult};
use docshelf_core::DocumentId;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

const READ_BUF_BYTES: usize = 64 * 1024;

/// Hash a file's content into its document identity.
///
/// Never returns a partial hash: any read error surfaces as an error.
pub fn fingerprint_file(path: &Path) -> StoreResult<DocumentId> {
    let mut file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => StoreError::FileNotFound(path.to_path_buf()),
        _ => StoreError::Io(e),
    })?;

    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; READ_BUF_BYTES];

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    let id = hex_encode(hasher.finalize());
    debug!("Fingerprinted {}: {}", path.display(), id);
    Ok(id)
}

/// Hash in-memory content (used for inline text imports).
pub fn fingerprint_bytes(bytes: &[u8]) -> DocumentId {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex_encode(hasher.finalize())
}

fn hex_encode(bytes: impl AsRef<[u8]>) -> String {
    bytes
        .as_ref()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_identical_content_same_identity() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("renamed.txt");
        std::fs::write(&a, "the same bytes").unwrap();
        std::fs::write(&b, "the same bytes").unwrap();

        assert_eq!(
            fingerprint_file(&a).unwrap(),
            fingerprint_file(&b).unwrap()
        );
    }

    #[test]
    fn test_file_and_bytes_agree() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, "hello docshelf").unwrap();

        assert_eq!(
            fingerprint_file(&path).unwrap(),
            fingerprint_bytes(b"hello docshelf")
        );
    }

    #[test]
    fn test_large_file_stable_across_buffer_boundaries() {
        // Content larger than one read buffer must hash the same as the
        // whole-slice digest.
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.txt");
        let content: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        std::fs::write(&path, &content).unwrap();

        assert_eq!(
            fingerprint_file(&path).unwrap(),
            fingerprint_bytes(&content)
        );
    }

    #[test]
    fn test_missing_file_errors() {
        let result = fingerprint_file(Path::new("/nonexistent/nope.pdf"));
        assert!(matches!(result, Err(StoreError::FileNotFound(_))));
    }

    #[test]
    fn test_identity_is_lowercase_hex() {
        let id = fingerprint_bytes(b"x");
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_uppercase()));
    }
}
