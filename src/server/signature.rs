//! Slack request signing (`v0` scheme).
//!
//! `X-Slack-Signature` is `v0=` followed by the hex HMAC-SHA256 of
//! `v0:{timestamp}:{body}`, keyed with the app's signing secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::base::errors::SignatureError;

type HmacSha256 = Hmac<Sha256>;

pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
pub const SIGNATURE_HEADER: &str = "x-slack-signature";

/// How far into the future a timestamp may be before it is rejected.
const MAX_CLOCK_SKEW_SECS: i64 = 60;

const VERSION_PREFIX: &str = "v0=";

fn mac_for(signing_secret: &str, timestamp: &str, body: &[u8]) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(b"v0:");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    mac
}

/// Compute the `X-Slack-Signature` value for a request.
pub fn compute_signature(signing_secret: &str, timestamp: &str, body: &[u8]) -> String {
    let mac = mac_for(signing_secret, timestamp, body);
    format!("{VERSION_PREFIX}{}", hex::encode(mac.finalize().into_bytes()))
}

/// Verify a signed request against the signing secret.
///
/// `now` is the current unix time in seconds. Requests older than `max_age_secs`,
/// or more than a minute in the future, are rejected before the signature is checked.
pub fn verify_signature(signing_secret: &str, timestamp: Option<&str>, signature: Option<&str>, body: &[u8], now: i64, max_age_secs: u64) -> Result<(), SignatureError> {
    let timestamp = timestamp.ok_or(SignatureError::MissingHeader(TIMESTAMP_HEADER))?;
    let signature = signature.ok_or(SignatureError::MissingHeader(SIGNATURE_HEADER))?;

    let ts = timestamp.trim().parse::<i64>().map_err(|_| SignatureError::MalformedTimestamp(timestamp.to_string()))?;

    // The header is caller-controlled, so extreme values must saturate rather than overflow.
    let age_secs = now.saturating_sub(ts);
    let max_age_secs = i64::try_from(max_age_secs).unwrap_or(i64::MAX);

    if age_secs > max_age_secs || age_secs < -MAX_CLOCK_SKEW_SECS {
        return Err(SignatureError::Stale { age_secs });
    }

    let provided = signature
        .strip_prefix(VERSION_PREFIX)
        .and_then(|hex_sig| hex::decode(hex_sig).ok())
        .ok_or(SignatureError::Mismatch)?;

    mac_for(signing_secret, timestamp, body).verify_slice(&provided).map_err(|_| SignatureError::Mismatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";
    const NOW: i64 = 1_531_420_618;

    #[test]
    fn test_compute_signature_matches_slack_docs() {
        let body = b"token=xyzz0WbapA4vBCDEFasx0q6G&team_id=T1DC2JH3J&team_domain=testteamnow&channel_id=G8PSS9T3V&channel_name=foobar&user_id=U2CERLKJA&user_name=roadrunner&command=%2Fwebhook-collect&text=&response_url=https%3A%2F%2Fhooks.slack.com%2Fcommands%2FT1DC2JH3J%2F397700885554%2F96rGlfmibIGlgcZRskXaIFfN&trigger_id=398738663015.47445629121.803a0bc887a14d10d2c447fce8b6703c";

        let signature = compute_signature(SECRET, "1531420618", body);

        assert_eq!(signature, "v0=a2114d57b48eac39b9ad189dd8316235a7b4a8d21a10bd27519666489c69b503");
    }

    #[test]
    fn test_verify_accepts_valid_signature() {
        let body = br#"{"type":"event_callback"}"#;
        let signature = compute_signature(SECRET, "1531420618", body);

        assert_eq!(verify_signature(SECRET, Some("1531420618"), Some(&signature), body, NOW, 300), Ok(()));
    }

    #[test]
    fn test_verify_rejects_tampered_body() {
        let signature = compute_signature(SECRET, "1531420618", b"original");

        assert_eq!(verify_signature(SECRET, Some("1531420618"), Some(&signature), b"tampered", NOW, 300), Err(SignatureError::Mismatch));
    }

    #[test]
    fn test_verify_rejects_wrong_secret_and_garbage() {
        let body = b"{}";
        let signature = compute_signature("other-secret", "1531420618", body);

        assert_eq!(verify_signature(SECRET, Some("1531420618"), Some(&signature), body, NOW, 300), Err(SignatureError::Mismatch));
        assert_eq!(verify_signature(SECRET, Some("1531420618"), Some("v0=zzzz"), body, NOW, 300), Err(SignatureError::Mismatch));
        assert_eq!(verify_signature(SECRET, Some("1531420618"), Some("v1=abcd"), body, NOW, 300), Err(SignatureError::Mismatch));
    }

    #[test]
    fn test_verify_rejects_stale_and_future_timestamps() {
        let body = b"{}";

        let old = (NOW - 301).to_string();
        let signature = compute_signature(SECRET, &old, body);
        assert_eq!(verify_signature(SECRET, Some(&old), Some(&signature), body, NOW, 300), Err(SignatureError::Stale { age_secs: 301 }));

        let future = (NOW + 61).to_string();
        let signature = compute_signature(SECRET, &future, body);
        assert_eq!(verify_signature(SECRET, Some(&future), Some(&signature), body, NOW, 300), Err(SignatureError::Stale { age_secs: -61 }));

        let recent = (NOW - 299).to_string();
        let signature = compute_signature(SECRET, &recent, body);
        assert_eq!(verify_signature(SECRET, Some(&recent), Some(&signature), body, NOW, 300), Ok(()));
    }

    #[test]
    fn test_verify_rejects_extreme_timestamps_without_overflow() {
        let body = b"{}";

        let min = i64::MIN.to_string();
        assert_eq!(
            verify_signature(SECRET, Some(&min), Some("v0=00"), body, 1_700_000_000, 300),
            Err(SignatureError::Stale { age_secs: i64::MAX })
        );

        let max = i64::MAX.to_string();
        assert_eq!(
            verify_signature(SECRET, Some(&max), Some("v0=00"), body, 1_700_000_000, 300),
            Err(SignatureError::Stale { age_secs: 1_700_000_000 - i64::MAX })
        );
    }

    #[test]
    fn test_verify_handles_huge_replay_window() {
        let body = b"{}";
        let signature = compute_signature(SECRET, "1531420618", body);

        assert_eq!(verify_signature(SECRET, Some("1531420618"), Some(&signature), body, NOW, u64::MAX), Ok(()));

        let future = (NOW + 61).to_string();
        let signature = compute_signature(SECRET, &future, body);
        assert_eq!(verify_signature(SECRET, Some(&future), Some(&signature), body, NOW, u64::MAX), Err(SignatureError::Stale { age_secs: -61 }));
    }

    #[test]
    fn test_verify_rejects_missing_or_malformed_headers() {
        assert_eq!(verify_signature(SECRET, None, Some("v0=00"), b"", NOW, 300), Err(SignatureError::MissingHeader(TIMESTAMP_HEADER)));
        assert_eq!(verify_signature(SECRET, Some("1531420618"), None, b"", NOW, 300), Err(SignatureError::MissingHeader(SIGNATURE_HEADER)));
        assert_eq!(
            verify_signature(SECRET, Some("yesterday"), Some("v0=00"), b"", NOW, 300),
            Err(SignatureError::MalformedTimestamp("yesterday".to_string()))
        );
    }
}
