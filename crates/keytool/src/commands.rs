//! Subcommand implementations over generic readers and writers.

use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};
use credvault::keys::strength::{MIN_CHAR_CLASSES, MIN_ENTROPY_BITS, MIN_SECRET_LEN};
use credvault::{encryption_version, generate_secure_secret, CredentialCipher, KeyStrength};
use tracing::{info, warn};
use zeroize::Zeroizing;

/// Write one freshly generated secret.
pub fn generate(length: usize, out: &mut impl Write) -> Result<()> {
    if length < MIN_SECRET_LEN {
        bail!("length must be at least {MIN_SECRET_LEN} to pass strength validation");
    }
    writeln!(out, "{}", generate_secure_secret(length))?;
    Ok(())
}

/// Measure the secret on the first input line and report the verdict.
///
/// Returns whether the secret is acceptable.
pub fn check(input: &mut impl BufRead, out: &mut impl Write) -> Result<bool> {
    let mut line = Zeroizing::new(String::new());
    input.read_line(&mut line).context("failed to read secret from stdin")?;
    let strength = KeyStrength::measure(line.trim_end_matches(['\r', '\n']));
    drop(line);

    writeln!(out, "length:     {} (min {MIN_SECRET_LEN})", strength.length)?;
    writeln!(out, "entropy:    {:.2} bits/char (min > {MIN_ENTROPY_BITS})", strength.entropy)?;
    writeln!(out, "classes:    {} (min {MIN_CHAR_CLASSES})", strength.char_classes)?;
    let ok = strength.is_acceptable();
    writeln!(out, "verdict:    {}", if ok { "acceptable" } else { "weak" })?;
    Ok(ok)
}

/// Print each envelope's key version, or `invalid`.
pub fn inspect(input: impl BufRead, out: &mut impl Write) -> Result<()> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match encryption_version(&line) {
            Some(version) => writeln!(out, "{version}")?,
            None => writeln!(out, "invalid")?,
        }
    }
    Ok(())
}

/// Outcome of a rotation run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RotateSummary {
    pub rotated: usize,
    pub unchanged: usize,
    pub failed: usize,
}

/// Re-encrypt every envelope under `target`, one output line per input line.
///
/// Envelopes already at `target` are copied through and blank lines stay blank.
/// A failed line produces an empty output line so positions still match, and is
/// reported by number.
pub async fn rotate(
    cipher: &CredentialCipher,
    target: u32,
    input: impl BufRead,
    out: &mut impl Write,
) -> Result<RotateSummary> {
    let mut summary = RotateSummary::default();
    for (idx, line) in input.lines().enumerate() {
        let line = line?;
        let envelope = line.trim();
        let line_no = idx + 1;

        if envelope.is_empty() {
            writeln!(out)?;
            continue;
        }
        if encryption_version(envelope) == Some(target) {
            writeln!(out, "{envelope}")?;
            summary.unchanged += 1;
            continue;
        }
        match cipher.rotate(envelope, target).await {
            Ok(rotated) => {
                writeln!(out, "{rotated}")?;
                summary.rotated += 1;
            }
            Err(e) => {
                warn!(line = line_no, error = %e, root = %e.root_cause(), "rotation failed");
                writeln!(out)?;
                summary.failed += 1;
            }
        }
    }
    info!(
        rotated = summary.rotated,
        unchanged = summary.unchanged,
        failed = summary.failed,
        target,
        "rotation finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use credvault::KeyRing;
    use std::io::Cursor;

    const STRONG_V1: &str = "kP9#vX2$mQ7!tR4&wZ8*yB3@nH6^jL5%";
    const STRONG_V2: &str = "Gf4)Ud8(Ks1_Ya0+Ce7=Xi2~Wo9-Tn3<";

    fn cipher() -> CredentialCipher {
        CredentialCipher::new(
            KeyRing::new(2)
                .with_secret(1, STRONG_V1)
                .with_secret(2, STRONG_V2),
        )
    }

    #[test]
    fn generate_writes_one_line() {
        let mut out = Vec::new();
        generate(48, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.trim_end().len(), 48);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn generate_rejects_short_length() {
        assert!(generate(16, &mut Vec::new()).is_err());
    }

    #[test]
    fn check_reports_verdict() {
        let mut out = Vec::new();
        let ok = check(&mut Cursor::new(format!("{STRONG_V1}\n")), &mut out).unwrap();
        assert!(ok);
        assert!(String::from_utf8(out).unwrap().contains("acceptable"));

        let mut out = Vec::new();
        let ok = check(&mut Cursor::new("abcdefghijklmnopqrstuvwxyzabcdefghijklmn\n"), &mut out).unwrap();
        assert!(!ok);
        let report = String::from_utf8(out).unwrap();
        assert!(report.contains("weak"));
        assert!(report.contains("classes:    1"));
    }

    #[tokio::test]
    async fn inspect_prints_versions() {
        let c = cipher();
        let v1 = c.encrypt_with_version("sk-a", 1).await.unwrap();
        let input = format!("{v1}\ngarbage\n\n");
        let mut out = Vec::new();
        inspect(Cursor::new(input), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1\ninvalid\n");
    }

    #[tokio::test]
    async fn rotate_migrates_and_reports() {
        let c = cipher();
        let old = c.encrypt_with_version("sk-old", 1).await.unwrap();
        let current = c.encrypt_with_version("sk-new", 2).await.unwrap();
        let input = format!("{old}\n{current}\nnot-an-envelope\n");

        let mut out = Vec::new();
        let summary = rotate(&c, 2, Cursor::new(input), &mut out).await.unwrap();
        assert_eq!(
            summary,
            RotateSummary {
                rotated: 1,
                unchanged: 1,
                failed: 1
            }
        );

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(encryption_version(lines[0]), Some(2));
        assert_eq!(c.decrypt(lines[0]).await.unwrap(), "sk-old");
        assert_eq!(lines[1], current);
        assert_eq!(lines[2], "");
    }

    #[tokio::test]
    async fn rotate_passes_blank_lines_through() {
        let c = cipher();
        let old = c.encrypt_with_version("sk-old", 1).await.unwrap();
        let input = format!("\n{old}\n   \n");

        let mut out = Vec::new();
        let summary = rotate(&c, 2, Cursor::new(input), &mut out).await.unwrap();
        assert_eq!(
            summary,
            RotateSummary {
                rotated: 1,
                unchanged: 0,
                failed: 0
            }
        );

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "");
        assert_eq!(c.decrypt(lines[1]).await.unwrap(), "sk-old");
        assert_eq!(lines[2], "");
    }

    #[test]
    fn check_reads_secret_without_trailing_newline() {
        let mut out = Vec::new();
        assert!(check(&mut Cursor::new(STRONG_V2), &mut out).unwrap());
    }
}
