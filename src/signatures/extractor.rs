//! Locating embedded signature blocks.
//!
//! A signed document is the original bytes followed by
//!
//! ```text
//! \n%DigiSign-Signature-Start\n{...package JSON...}\n%DigiSign-Signature-End\n
//! ```
//!
//! The search runs over raw bytes, so binary documents need not be valid
//! UTF-8. The block is the last start sentinel that has an end sentinel
//! after it: the JSON serializer escapes newlines, so a sentinel can never
//! appear inside the appended package. Earlier occurrences belong to the
//! original content, and a dangling start sentinel after the block (a
//! trailer appended later) is skipped.

use super::types::{SignaturePackage, SIGNATURE_END, SIGNATURE_START};

/// Extracts signature packages from signed documents.
pub struct SignatureExtractor;

impl SignatureExtractor {
    /// Find and parse the embedded signature package.
    ///
    /// Returns `None` when either sentinel is missing or the block is not a
    /// valid package. Never fails.
    pub fn extract(document: &[u8]) -> Option<SignaturePackage> {
        let (block_start, block_end) = Self::locate(document)?;
        let body = &document[block_start + SIGNATURE_START.len()..block_end];
        let body = trim_ascii_whitespace(body);

        match serde_json::from_slice::<SignaturePackage>(body) {
            Ok(package) => Some(package),
            Err(e) => {
                log::debug!(
                    "Signature block at byte {} is not a valid package: {}",
                    block_start,
                    e
                );
                None
            },
        }
    }

    /// Check whether a document carries a parseable signature block.
    pub fn is_signed(document: &[u8]) -> bool {
        Self::extract(document).is_some()
    }

    /// Return the content preceding the signature block, or the whole
    /// document when there is none.
    pub fn strip(document: &[u8]) -> &[u8] {
        match Self::locate(document) {
            Some((block_start, _)) => &document[..block_start],
            None => document,
        }
    }

    /// Byte offsets of the last start sentinel that is followed by an end
    /// sentinel, and of that end sentinel.
    fn locate(document: &[u8]) -> Option<(usize, usize)> {
        let located = document
            .windows(SIGNATURE_START.len())
            .enumerate()
            .rev()
            .filter(|(_, window)| *window == SIGNATURE_START.as_bytes())
            .find_map(|(start, _)| {
                let body_start = start + SIGNATURE_START.len();
                find(&document[body_start..], SIGNATURE_END.as_bytes())
                    .map(|pos| (start, body_start + pos))
            });

        if located.is_none() {
            log::debug!("No complete signature block in {} bytes", document.len());
        }
        located
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn trim_ascii_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |pos| pos + 1);
    &bytes[start..end]
}
