use crate::core::errors::ExchangeError;
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use url::form_urlencoded;

/// Result type for signing operations: (headers, `signed_params`)
pub type SignatureResult = Result<(HashMap<String, String>, Vec<(String, String)>), ExchangeError>;

/// Signer trait for request authentication
///
/// Implementations take the caller's parameter set, add whatever
/// credential fields the venue requires, and return the headers and the
/// final parameter list to put on the request.
pub trait Signer: Send + Sync {
    /// Sign a parameter set
    ///
    /// # Arguments
    /// * `params` - Request parameters (unsigned)
    /// * `timestamp` - Request timestamp in milliseconds
    fn sign_request(&self, params: &SignParams, timestamp: u64) -> SignatureResult;
}

/// Hash profile used for a signature.
///
/// The two venue endpoint groups disagree on digest casing: md5 digests are
/// sent as uppercase hex, sha256 digests as lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignAlgorithm {
    Md5,
    Sha256,
}

impl SignAlgorithm {
    pub fn digest_hex(self, payload: &[u8]) -> String {
        match self {
            Self::Md5 => hex::encode_upper(Md5::digest(payload)),
            Self::Sha256 => hex::encode(Sha256::digest(payload)),
        }
    }
}

impl fmt::Display for SignAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Md5 => write!(f, "md5"),
            Self::Sha256 => write!(f, "sha256"),
        }
    }
}

/// Primitive parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Bool(bool),
}

// Renders numbers the way a JS query-string serializer does: integral floats
// lose their fraction (`2.0` -> `2`).
impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::UInt(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Str(v) => f.write_str(v),
            Self::Bool(v) => write!(f, "{}", v),
        }
    }
}

macro_rules! param_value_from {
    ($variant:ident: $($ty:ty),+) => {
        $(impl From<$ty> for ParamValue {
            fn from(value: $ty) -> Self {
                Self::$variant(value.into())
            }
        })+
    };
}

param_value_from!(Int: i64, i32, i16, i8);
param_value_from!(UInt: u64, u32, u16, u8);
param_value_from!(Float: f64);
param_value_from!(Bool: bool);
param_value_from!(Str: String, &str);

/// Parameter set to sign, keyed and ordered lexicographically.
///
/// Keys whose value is absent are kept as `None` and dropped at
/// canonicalization, so they never show up as `key=`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignParams {
    entries: BTreeMap<String, Option<ParamValue>>,
}

impl SignParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, Some(value.into()));
        self
    }

    pub fn with_opt<V: Into<ParamValue>>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.insert(key, value.map(Into::into));
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Option<ParamValue>) {
        self.entries.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.entries.remove(key).flatten()
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key).and_then(Option::as_ref)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Present `(key, value)` pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.as_str(), v)))
    }

    /// Sorted, form-encoded `key=value&...` string of the present entries
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.iter() {
            serializer.append_pair(key, &value.to_string());
        }
        serializer.finish()
    }
}

/// Sign a parameter set.
///
/// Canonical string: present keys sorted, form-encoded, followed by the
/// literal `&secret_key=<secret>`. With [`SignAlgorithm::Sha256`] a `tonce`
/// entry is renamed to `timestamp`, unless `timestamp` is already present
/// (then `tonce` is just dropped).
pub fn sign_params(secret: &str, params: &SignParams, algorithm: SignAlgorithm) -> String {
    let canonical = canonical_string(secret, params, algorithm);
    algorithm.digest_hex(canonical.as_bytes())
}

pub(crate) fn canonical_string(secret: &str, params: &SignParams, algorithm: SignAlgorithm) -> String {
    let query = if algorithm == SignAlgorithm::Sha256 && params.contains("tonce") {
        let mut params = params.clone();
        let tonce = params.remove("tonce");
        if !params.contains("timestamp") {
            params.insert("timestamp", tonce);
        }
        params.to_query_string()
    } else {
        params.to_query_string()
    };

    format!("{}&secret_key={}", query, secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "B51068CF10B34E7789C374AB932696A05E0A629BE7BFC62F";

    #[test]
    fn test_canonical_string_sorted_and_suffixed() {
        let params = SignParams::new()
            .with("tonce", 1_513_746_038_205_u64)
            .with("access_id", "4DA36FFC61334695A66F8D29020EB589")
            .with("market", "BTCUSDT");

        assert_eq!(
            canonical_string(SECRET, &params, SignAlgorithm::Md5),
            format!(
                "access_id=4DA36FFC61334695A66F8D29020EB589&market=BTCUSDT&tonce=1513746038205&secret_key={}",
                SECRET
            )
        );
    }

    #[test]
    fn test_absent_values_are_dropped() {
        let with_none = SignParams::new()
            .with("market", "BTCUSDT")
            .with_opt::<u32>("limit", None);
        let without = SignParams::new().with("market", "BTCUSDT");

        assert_eq!(
            canonical_string(SECRET, &with_none, SignAlgorithm::Md5),
            "market=BTCUSDT&secret_key=".to_string() + SECRET
        );
        assert_eq!(
            sign_params(SECRET, &with_none, SignAlgorithm::Md5),
            sign_params(SECRET, &without, SignAlgorithm::Md5)
        );
    }

    #[test]
    fn test_query_string_encoding_matches_form_serializer() {
        let params = SignParams::new()
            .with("note", "a b&c=d")
            .with("sym", "BTC/USDT*")
            .with("price", 2.0_f64)
            .with("amount", 0.5_f64);

        assert_eq!(
            params.to_query_string(),
            "amount=0.5&note=a+b%26c%3Dd&price=2&sym=BTC%2FUSDT*"
        );
    }

    #[test]
    fn test_empty_params_keep_leading_separator() {
        assert_eq!(
            canonical_string("s", &SignParams::new(), SignAlgorithm::Md5),
            "&secret_key=s"
        );
    }

    #[test]
    fn test_digest_casing() {
        let params = SignParams::new().with("access_id", "abc").with("tonce", 1_u64);

        let md5 = sign_params(SECRET, &params, SignAlgorithm::Md5);
        assert_eq!(md5.len(), 32);
        assert!(md5.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));

        let sha = sign_params(SECRET, &params, SignAlgorithm::Sha256);
        assert_eq!(sha.len(), 64);
        assert!(sha.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_known_digests() {
        assert_eq!(
            SignAlgorithm::Md5.digest_hex(b"abc"),
            "900150983CD24FB0D6963F7D28E17F72"
        );
        assert_eq!(
            SignAlgorithm::Sha256.digest_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_sha256_renames_tonce() {
        let with_tonce = SignParams::new().with("tonce", 123_u64).with("foo", "bar");
        let with_timestamp = SignParams::new().with("timestamp", 123_u64).with("foo", "bar");

        assert_eq!(
            sign_params(SECRET, &with_tonce, SignAlgorithm::Sha256),
            sign_params(SECRET, &with_timestamp, SignAlgorithm::Sha256)
        );
        assert_eq!(
            canonical_string(SECRET, &with_tonce, SignAlgorithm::Sha256),
            format!("foo=bar&timestamp=123&secret_key={}", SECRET)
        );
    }

    #[test]
    fn test_sha256_keeps_existing_timestamp() {
        let params = SignParams::new()
            .with("tonce", 1_u64)
            .with("timestamp", 2_u64);

        assert_eq!(
            canonical_string("s", &params, SignAlgorithm::Sha256),
            "timestamp=2&secret_key=s"
        );
    }

    #[test]
    fn test_md5_leaves_tonce_alone() {
        let params = SignParams::new().with("tonce", 5_u64);
        assert_eq!(
            canonical_string("s", &params, SignAlgorithm::Md5),
            "tonce=5&secret_key=s"
        );
    }

    #[test]
    fn test_signing_is_deterministic() {
        let params = SignParams::new().with("b", 1_i64).with("a", "x").with("c", true);
        let first = sign_params(SECRET, &params, SignAlgorithm::Sha256);
        for _ in 0..5 {
            assert_eq!(sign_params(SECRET, &params, SignAlgorithm::Sha256), first);
        }
    }
}
