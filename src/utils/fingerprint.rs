use serde::{Deserialize, Serialize};

/// Browser/device signals reported by the client when it has no remembered
/// guest identity. The canvas field is a rendered-canvas data URL prefix,
/// already truncated client-side; it is re-truncated here so an oversized
/// payload cannot blow up the hashed string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FingerprintSignals {
    pub user_agent: String,
    pub language: String,
    pub platform: String,
    pub screen_resolution: String,
    pub color_depth: i32,
    pub timezone: String,
    #[serde(default)]
    pub canvas: String,
}

const CANVAS_PREFIX_LEN: usize = 100;

/// Derive a guest fingerprint of the form `fp_<hash36>_<millis36>`.
///
/// The hash is the classic 32-bit shift-add fold (`h = h*31 + c`) over the
/// JSON-serialized signal set including the timestamp. Non-cryptographic and
/// spoofable by design; this is pseudo-identity, not authentication.
pub fn generate_fingerprint(signals: &FingerprintSignals, now_millis: i64) -> String {
    let mut truncated = signals.clone();
    truncated.canvas = truncated.canvas.chars().take(CANVAS_PREFIX_LEN).collect();

    let mut payload = serde_json::to_value(&truncated).unwrap_or_default();
    if let Some(map) = payload.as_object_mut() {
        map.insert("timestamp".to_string(), now_millis.into());
    }

    let hash = shift_add_hash(&payload.to_string());
    format!(
        "fp_{}_{}",
        to_base36(hash.unsigned_abs() as u64),
        to_base36(now_millis.unsigned_abs())
    )
}

/// `hash = (hash << 5) - hash + code_unit`, wrapped to 32 bits, folded over
/// UTF-16 code units so multi-byte input hashes the same way the original
/// client did.
fn shift_add_hash(input: &str) -> i32 {
    let mut hash: i32 = 0;
    for unit in input.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(unit as i32);
    }
    hash
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals() -> FingerprintSignals {
        FingerprintSignals {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64)".to_string(),
            language: "en-US".to_string(),
            platform: "Linux x86_64".to_string(),
            screen_resolution: "1920x1080".to_string(),
            color_depth: 24,
            timezone: "Africa/Lagos".to_string(),
            canvas: "data:image/png;base64,iVBORw0KGgo".to_string(),
        }
    }

    #[test]
    fn test_fingerprint_deterministic() {
        let a = generate_fingerprint(&signals(), 1_700_000_000_000);
        let b = generate_fingerprint(&signals(), 1_700_000_000_000);
        assert_eq!(a, b);
        assert!(a.starts_with("fp_"));
    }

    #[test]
    fn test_fingerprint_varies_with_signals() {
        let mut other = signals();
        other.screen_resolution = "2560x1440".to_string();

        let a = generate_fingerprint(&signals(), 1_700_000_000_000);
        let b = generate_fingerprint(&other, 1_700_000_000_000);
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_varies_with_time() {
        let a = generate_fingerprint(&signals(), 1_700_000_000_000);
        let b = generate_fingerprint(&signals(), 1_700_000_060_000);
        assert_ne!(a, b);
    }

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }

    #[test]
    fn test_hash_handles_non_ascii() {
        // Must not panic or differ between runs on multi-byte input
        let h1 = shift_add_hash("Ṣayẹwo pada laipẹ");
        let h2 = shift_add_hash("Ṣayẹwo pada laipẹ");
        assert_eq!(h1, h2);
    }
}
