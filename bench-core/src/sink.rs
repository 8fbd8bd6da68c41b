//! Response/log sink
//!
//! Ciphertexts are base64-encoded and appended as `secret_value=<base64>\n`
//! lines to a single shared file under the configured testfiles directory.
//! The file grows unboundedly and is never rotated or truncated here. Each
//! request performs one short append; no lock is taken (interleaving can
//! reorder lines, never corrupt them, which is acceptable for a fixture log).

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Shared append-only artifact all crypto fixtures write to.
pub const PASSWORD_FILE: &str = "passwordFile.txt";

/// Sink over one testfiles directory.
#[derive(Debug, Clone)]
pub struct LogSink {
    testfiles_dir: PathBuf,
}

impl LogSink {
    pub fn new(testfiles_dir: impl Into<PathBuf>) -> Self {
        Self {
            testfiles_dir: testfiles_dir.into(),
        }
    }

    /// Full path of the password file.
    pub fn password_file(&self) -> PathBuf {
        self.testfiles_dir.join(PASSWORD_FILE)
    }

    /// Base64-encode the ciphertext and append one `secret_value=` line.
    /// Returns the encoded form for callers that also log or display it.
    pub async fn append_secret(&self, ciphertext: &[u8]) -> std::io::Result<String> {
        let encoded = STANDARD.encode(ciphertext);
        tokio::fs::create_dir_all(&self.testfiles_dir).await?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.password_file())
            .await?;
        file.write_all(format!("secret_value={encoded}\n").as_bytes())
            .await?;
        debug!(bytes = ciphertext.len(), file = %self.password_file().display(), "secret appended");
        Ok(encoded)
    }

    /// Count `secret_value=` lines currently in the password file without
    /// blocking the runtime. A missing file counts as zero.
    pub async fn secret_line_count(&self) -> std::io::Result<usize> {
        match tokio::fs::read_to_string(self.password_file()).await {
            Ok(text) => Ok(text
                .lines()
                .filter(|line| line.starts_with("secret_value="))
                .count()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(err) => Err(err),
        }
    }
}

/// Response line confirming what was encrypted. The display form is the
/// HTML-escaped plaintext input, not the ciphertext.
pub fn sensitive_value_line(input: &[u8]) -> String {
    let display = String::from_utf8_lossy(input);
    format!(
        "Sensitive value: '{}' encrypted and stored<br/>",
        encode_for_html(&display)
    )
}

/// Minimal HTML escaping covering the characters that matter for attribute
/// and element contexts. Plays the role of the external encoder collaborator
/// the original delegates to.
pub fn encode_for_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Count `secret_value=` lines currently in a password file. Test support,
/// but also handy for the index page.
pub fn count_secret_lines(path: &Path) -> std::io::Result<usize> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text
            .lines()
            .filter(|line| line.starts_with("secret_value="))
            .count()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(0),
        Err(err) => Err(err),
    }
}
