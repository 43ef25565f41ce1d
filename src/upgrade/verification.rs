use crate::core::LauncherError;
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

/// Result of comparing a file against its expected digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// The digests match.
    Match,
    /// The digests differ.
    Mismatch {
        /// Hex digest of the file on disk
        actual: String,
    },
}

/// SHA-256 verification of downloaded binaries.
///
/// Release binaries ship with a `.sha256` companion in `sha256sum` format: one line, the
/// hex digest, whitespace, then the file name.
///
/// The digest is computed from the file as written to disk, in a second pass after the
/// download completed, so what is verified is exactly what will be moved into place.
pub struct ChecksumVerifier;

impl ChecksumVerifier {
    /// Extract the digest from a `.sha256` file.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::MalformedChecksum`] unless the first field is a
    /// 64 character hex digest.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pants_launcher::upgrade::verification::ChecksumVerifier;
    ///
    /// let digest = "a".repeat(64);
    /// let line = format!("{digest} pants-launcher-linux_x86_64\n");
    /// assert_eq!(ChecksumVerifier::parse_checksum_file("https://example.com/x.sha256", &line).unwrap(), digest);
    /// ```
    pub fn parse_checksum_file(url: &str, content: &str) -> Result<String, LauncherError> {
        let digest = content.split_whitespace().next().unwrap_or_default();
        if digest.len() != 64 || !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(LauncherError::MalformedChecksum {
                url: url.to_string(),
                content: content.chars().take(200).collect(),
            });
        }
        Ok(digest.to_ascii_lowercase())
    }

    /// Compute the hex SHA-256 digest of a file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read.
    pub async fn compute_sha256(file_path: &Path) -> Result<String> {
        debug!("Computing SHA256 checksum for: {:?}", file_path);

        let mut file = fs::File::open(file_path)
            .await
            .with_context(|| format!("Failed to open file: {file_path:?}"))?;

        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; 64 * 1024];
        loop {
            let read = file
                .read(&mut buffer)
                .await
                .with_context(|| format!("Failed to read file: {file_path:?}"))?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }
        Ok(hex::encode(hasher.finalize()))
    }

    /// Compare a file against an expected hex digest, ignoring case.
    ///
    /// # Errors
    ///
    /// Fails only if the file cannot be read; a mismatch is reported as
    /// [`Verification::Mismatch`].
    pub async fn verify_checksum(file_path: &Path, expected_checksum: &str) -> Result<Verification> {
        info!("Verifying checksum for: {:?}", file_path);

        let actual = Self::compute_sha256(file_path).await?;
        if !actual.eq_ignore_ascii_case(expected_checksum) {
            warn!("Checksum verification failed: expected {expected_checksum}, got {actual}");
            return Ok(Verification::Mismatch {
                actual,
            });
        }

        info!("Checksum verification successful");
        Ok(Verification::Match)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    // sha256("hello world")
    const HELLO_DIGEST: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[tokio::test]
    async fn test_compute_sha256() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"hello world").unwrap();
        temp_file.flush().unwrap();

        let checksum = ChecksumVerifier::compute_sha256(temp_file.path()).await.unwrap();
        assert_eq!(checksum, HELLO_DIGEST);
    }

    #[tokio::test]
    async fn test_compute_sha256_spans_several_reads() {
        let contents: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(&contents).unwrap();
        temp_file.flush().unwrap();

        let checksum = ChecksumVerifier::compute_sha256(temp_file.path()).await.unwrap();
        assert_eq!(checksum, hex::encode(Sha256::digest(&contents)));
    }

    #[tokio::test]
    async fn test_verify_checksum() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"hello world").unwrap();
        temp_file.flush().unwrap();

        let verified = ChecksumVerifier::verify_checksum(temp_file.path(), &HELLO_DIGEST.to_uppercase())
            .await
            .unwrap();
        assert_eq!(verified, Verification::Match);

        let wrong = "0".repeat(64);
        let verified = ChecksumVerifier::verify_checksum(temp_file.path(), &wrong).await.unwrap();
        assert_eq!(
            verified,
            Verification::Mismatch {
                actual: HELLO_DIGEST.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_verify_missing_file() {
        let result = ChecksumVerifier::verify_checksum(Path::new("/nonexistent/binary"), HELLO_DIGEST).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_checksum_file() {
        let url = "https://example.com/pants-launcher.sha256";
        let parsed =
            ChecksumVerifier::parse_checksum_file(url, &format!("{} pants-launcher\n", HELLO_DIGEST.to_uppercase()))
                .unwrap();
        assert_eq!(parsed, HELLO_DIGEST);

        for bad in ["", "not-a-digest pants-launcher", "abc123 pants-launcher"] {
            assert!(matches!(
                ChecksumVerifier::parse_checksum_file(url, bad),
                Err(LauncherError::MalformedChecksum { .. })
            ));
        }
    }
}
