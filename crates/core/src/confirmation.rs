//! Stateless, single-use confirmation codes.
//!
//! A code is `"{issued_at}-{signature}"`, where `issued_at` is a base-36 Unix
//! timestamp and `signature` is a truncated HMAC-SHA256 over the account id,
//! email, last login time and `issued_at`. Nothing is stored: a code
//! verifies only while the account state it was signed over is unchanged.
//! Recording a login after a successful exchange therefore burns every code
//! issued before it.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::types::{DbId, Timestamp};

type HmacSha256 = Hmac<Sha256>;

/// Number of hex characters kept from the HMAC digest.
const SIGNATURE_LENGTH: usize = 20;

/// Default code lifetime in days.
pub const DEFAULT_CODE_TTL_DAYS: i64 = 3;

/// The account state a code is bound to.
#[derive(Debug, Clone, Copy)]
pub struct CodeSubject<'a> {
    pub user_id: DbId,
    pub email: &'a str,
    pub last_login_at: Option<Timestamp>,
}

#[derive(Debug, Clone)]
pub struct ConfirmationCodes {
    secret: String,
    ttl: chrono::Duration,
}

impl ConfirmationCodes {
    pub fn new(secret: impl Into<String>, ttl_days: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl: chrono::Duration::days(ttl_days),
        }
    }

    /// Issue a code for `subject` at `now`.
    pub fn issue(&self, subject: &CodeSubject<'_>, now: Timestamp) -> String {
        let issued_at = now.timestamp().max(0) as u64;
        format!(
            "{}-{}",
            to_base36(issued_at),
            self.signature(subject, issued_at)
        )
    }

    /// Check `code` against the current account state.
    pub fn verify(&self, subject: &CodeSubject<'_>, code: &str, now: Timestamp) -> bool {
        let Some((stamp, signature)) = code.split_once('-') else {
            return false;
        };
        let Some(issued_at) = from_base36(stamp) else {
            return false;
        };

        let expected = self.signature(subject, issued_at);
        if !bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            return false;
        }

        let age_secs = now.timestamp() - issued_at as i64;
        (0..=self.ttl.num_seconds()).contains(&age_secs)
    }

    fn signature(&self, subject: &CodeSubject<'_>, issued_at: u64) -> String {
        let last_login = subject
            .last_login_at
            .map(|t| t.timestamp_micros().to_string())
            .unwrap_or_default();

        let mut mac =
            HmacSha256::new_from_slice(self.secret.as_bytes()).expect("HMAC accepts any key length");
        mac.update(
            format!(
                "{}|{}|{}|{}",
                subject.user_id, subject.email, last_login, issued_at
            )
            .as_bytes(),
        );
        let digest = mac.finalize().into_bytes();
        let mut hex = format!("{digest:x}");
        hex.truncate(SIGNATURE_LENGTH);
        hex
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".into();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

fn from_base36(s: &str) -> Option<u64> {
    if s.is_empty() || s.len() > 13 {
        return None;
    }
    u64::from_str_radix(s, 36).ok()
}
