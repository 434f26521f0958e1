//! Shopify App Proxy request signature verification.
//!
//! Shopify signs every request it forwards through an App Proxy by attaching
//! a `signature` query parameter: the lowercase hex HMAC-SHA256 of the
//! remaining query parameters, sorted by key and concatenated as `key=value`
//! pairs with no separator. Recomputing that digest with the shared proxy
//! secret and comparing it to the supplied value proves the request came
//! through Shopify and was not tampered with.

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Query parameter carrying the digest; never part of the signed payload.
pub const SIGNATURE_PARAM: &str = "signature";

/// Verifier for App Proxy query-string signatures.
///
/// Holds the shared proxy secret; construct once at startup and share via
/// application state.
#[derive(Clone)]
pub struct ProxySignature {
    secret: SecretString,
}

impl ProxySignature {
    #[must_use]
    pub const fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Build the canonical message for a set of query parameters.
    ///
    /// The `signature` parameter is excluded. Keys are compared byte-wise and
    /// emitted in ascending order. When a key appears more than once, the
    /// last occurrence wins. Values pass through literally, including any
    /// `=` or `&` characters.
    #[must_use]
    pub fn canonical_message(params: &[(String, String)]) -> String {
        let mut signed: BTreeMap<&str, &str> = BTreeMap::new();
        for (key, value) in params {
            if key == SIGNATURE_PARAM {
                continue;
            }
            signed.insert(key.as_str(), value.as_str());
        }

        let mut message = String::new();
        for (key, value) in &signed {
            message.push_str(key);
            message.push('=');
            message.push_str(value);
        }
        message
    }

    /// Compute the lowercase hex digest for a set of query parameters.
    ///
    /// An empty parameter set is still signed: the digest of the empty
    /// message.
    #[must_use]
    pub fn sign(&self, params: &[(String, String)]) -> String {
        let message = Self::canonical_message(params);
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(message.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Verify a supplied digest against the recomputed one.
    ///
    /// The comparison is constant-time (`Mac::verify_slice`). A digest that
    /// is not valid hex can never match and is rejected outright.
    #[must_use]
    pub fn verify(&self, params: &[(String, String)], provided: &str) -> bool {
        let Ok(expected) = hex::decode(provided) else {
            return false;
        };

        let message = Self::canonical_message(params);
        let Ok(mut mac) = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
        else {
            return false;
        };
        mac.update(message.as_bytes());
        mac.verify_slice(&expected).is_ok()
    }

    /// Verify a full query-parameter set that carries its own `signature`.
    ///
    /// Returns `false` when no `signature` parameter is present. If it
    /// appears more than once, the last occurrence is checked, consistent
    /// with the duplicate-key rule used for the signed parameters.
    #[must_use]
    pub fn verify_query(&self, params: &[(String, String)]) -> bool {
        let Some(provided) = params
            .iter()
            .rev()
            .find(|(key, _)| key == SIGNATURE_PARAM)
            .map(|(_, value)| value.as_str())
        else {
            return false;
        };
        self.verify(params, provided)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pairs(input: &[(&str, &str)]) -> Vec<(String, String)> {
        input
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn verifier() -> ProxySignature {
        ProxySignature::new(SecretString::from("hush"))
    }

    #[test]
    fn canonical_message_sorts_keys_ascending() {
        let message = ProxySignature::canonical_message(&pairs(&[("b", "2"), ("a", "1")]));
        assert_eq!(message, "a=1b=2");
    }

    #[test]
    fn canonical_message_has_no_pair_separator() {
        let message = ProxySignature::canonical_message(&pairs(&[
            ("shop", "demo.myshopify.com"),
            ("path_prefix", "/apps/ext"),
            ("timestamp", "1700000000"),
        ]));
        assert_eq!(
            message,
            "path_prefix=/apps/extshop=demo.myshopify.comtimestamp=1700000000"
        );
    }

    #[test]
    fn canonical_message_excludes_signature_param() {
        let message = ProxySignature::canonical_message(&pairs(&[
            ("a", "1"),
            ("signature", "deadbeef"),
        ]));
        assert_eq!(message, "a=1");
    }

    #[test]
    fn canonical_message_last_duplicate_wins() {
        let message = ProxySignature::canonical_message(&pairs(&[
            ("a", "first"),
            ("b", "2"),
            ("a", "second"),
        ]));
        assert_eq!(message, "a=secondb=2");
    }

    #[test]
    fn canonical_message_passes_reserved_characters_through() {
        let message = ProxySignature::canonical_message(&pairs(&[("k", "a=b&c")]));
        assert_eq!(message, "k=a=b&c");
    }

    #[test]
    fn signing_is_deterministic() {
        let v = verifier();
        let params = pairs(&[("shop", "demo.myshopify.com"), ("timestamp", "1700000000")]);
        assert_eq!(v.sign(&params), v.sign(&params));
    }

    #[test]
    fn signature_is_independent_of_parameter_order() {
        let v = verifier();
        let forward = pairs(&[("a", "1"), ("b", "2")]);
        let reversed = pairs(&[("b", "2"), ("a", "1")]);
        assert_eq!(v.sign(&forward), v.sign(&reversed));
        assert!(v.verify(&reversed, &v.sign(&forward)));
    }

    #[test]
    fn tampered_value_fails_verification() {
        let v = verifier();
        let original = pairs(&[("shop", "demo.myshopify.com"), ("customer", "42")]);
        let signature = v.sign(&original);

        let tampered = pairs(&[("shop", "demo.myshopify.com"), ("customer", "43")]);
        assert!(!v.verify(&tampered, &signature));
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let params = pairs(&[("shop", "demo.myshopify.com")]);
        let signature = verifier().sign(&params);

        let other = ProxySignature::new(SecretString::from("different"));
        assert!(!other.verify(&params, &signature));
    }

    #[test]
    fn empty_parameter_set_still_signs_and_verifies() {
        let v = verifier();
        let signature = v.sign(&[]);
        // HMAC of the empty message, not a trivial accept-anything value.
        assert_eq!(signature.len(), 64);
        assert!(v.verify(&[], &signature));
        assert!(!v.verify(&[], "00000000"));
    }

    #[test]
    fn digest_is_lowercase_hex() {
        let signature = verifier().sign(&pairs(&[("a", "1")]));
        assert!(
            signature
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        );
    }

    #[test]
    fn truncated_digest_is_rejected() {
        let v = verifier();
        let params = pairs(&[("a", "1")]);
        let mut signature = v.sign(&params);
        signature.truncate(32);
        assert!(!v.verify(&params, &signature));
    }

    #[test]
    fn non_hex_digest_is_rejected() {
        assert!(!verifier().verify(&pairs(&[("a", "1")]), "not-valid-hex!"));
    }

    #[test]
    fn verify_query_uses_embedded_signature() {
        let v = verifier();
        let signed = pairs(&[("shop", "demo.myshopify.com"), ("timestamp", "1700000000")]);
        let signature = v.sign(&signed);

        let mut query = signed;
        query.push((SIGNATURE_PARAM.to_string(), signature));
        assert!(v.verify_query(&query));
    }

    #[test]
    fn verify_query_rejects_missing_signature() {
        assert!(!verifier().verify_query(&pairs(&[("shop", "demo.myshopify.com")])));
    }

    #[test]
    fn verify_query_rejects_forged_signature() {
        let v = verifier();
        let mut query = pairs(&[("shop", "demo.myshopify.com")]);
        query.push((SIGNATURE_PARAM.to_string(), "ab".repeat(32)));
        assert!(!v.verify_query(&query));
    }
}
