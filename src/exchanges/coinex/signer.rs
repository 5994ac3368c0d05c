use crate::core::config::ExchangeConfig;
use crate::core::kernel::{sign_params, SignAlgorithm, SignParams, SignatureResult, Signer};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Credential signer shared by the stream handshake and REST requests.
///
/// The algorithm is chosen by whoever builds the signer: the perpetual
/// (futures) endpoints verify sha256, the spot endpoints md5.
#[derive(Clone)]
pub struct CoinexSigner {
    api_key: String,
    secret_key: String,
    algorithm: SignAlgorithm,
}

impl std::fmt::Debug for CoinexSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoinexSigner")
            .field("api_key", &self.api_key)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl CoinexSigner {
    pub fn new(api_key: String, secret_key: String, algorithm: SignAlgorithm) -> Self {
        Self {
            api_key,
            secret_key,
            algorithm,
        }
    }

    /// Signer from configured credentials; `None` for a read-only config
    pub fn from_config(config: &ExchangeConfig, algorithm: SignAlgorithm) -> Option<Self> {
        config.has_credentials().then(|| {
            Self::new(
                config.api_key().to_string(),
                config.secret_key().to_string(),
                algorithm,
            )
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub const fn algorithm(&self) -> SignAlgorithm {
        self.algorithm
    }

    pub fn sign(&self, params: &SignParams) -> String {
        sign_params(&self.secret_key, params, self.algorithm)
    }

    /// Params of the `server.sign` handshake: `[access_id, signature, tonce]`
    pub fn handshake_params(&self, tonce: u64) -> Vec<Value> {
        let params = SignParams::new()
            .with("access_id", self.api_key.as_str())
            .with("tonce", tonce);
        vec![json!(self.api_key), json!(self.sign(&params)), json!(tonce)]
    }
}

impl Signer for CoinexSigner {
    fn sign_request(&self, params: &SignParams, timestamp: u64) -> SignatureResult {
        let mut headers = HashMap::new();

        let signed = match self.algorithm {
            SignAlgorithm::Md5 => {
                let signed = params
                    .clone()
                    .with("access_id", self.api_key.as_str())
                    .with("tonce", timestamp);
                headers.insert("authorization".to_string(), self.sign(&signed));
                signed
            }
            SignAlgorithm::Sha256 => {
                let signed = params.clone().with("timestamp", timestamp);
                headers.insert("Authorization".to_string(), self.sign(&signed));
                headers.insert("AccessId".to_string(), self.api_key.clone());
                signed
            }
        };

        let signed_params = signed
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Ok((headers, signed_params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::kernel::signer::canonical_string;

    fn signer(algorithm: SignAlgorithm) -> CoinexSigner {
        CoinexSigner::new("ACCESS".to_string(), "SECRET".to_string(), algorithm)
    }

    #[test]
    fn test_handshake_params_md5() {
        let params = signer(SignAlgorithm::Md5).handshake_params(1_700_000_000_000);
        assert_eq!(params[0], json!("ACCESS"));
        assert_eq!(params[2], json!(1_700_000_000_000_u64));

        let expected = SignAlgorithm::Md5
            .digest_hex(b"access_id=ACCESS&tonce=1700000000000&secret_key=SECRET");
        assert_eq!(params[1], json!(expected));
    }

    #[test]
    fn test_handshake_params_sha256_uses_timestamp_key() {
        let params = signer(SignAlgorithm::Sha256).handshake_params(42);
        let expected =
            SignAlgorithm::Sha256.digest_hex(b"access_id=ACCESS&timestamp=42&secret_key=SECRET");
        assert_eq!(params[1], json!(expected));
    }

    #[test]
    fn test_rest_signing_spot_profile() {
        let params = SignParams::new().with("market", "BTCUSDT");
        let (headers, signed) = signer(SignAlgorithm::Md5).sign_request(&params, 7).unwrap();

        assert_eq!(
            signed,
            vec![
                ("access_id".to_string(), "ACCESS".to_string()),
                ("market".to_string(), "BTCUSDT".to_string()),
                ("tonce".to_string(), "7".to_string()),
            ]
        );
        let expected = SignAlgorithm::Md5.digest_hex(
            canonical_string(
                "SECRET",
                &params.clone().with("access_id", "ACCESS").with("tonce", 7_u64),
                SignAlgorithm::Md5,
            )
            .as_bytes(),
        );
        assert_eq!(headers.get("authorization"), Some(&expected));
    }

    #[test]
    fn test_rest_signing_futures_profile() {
        let params = SignParams::new().with("market", "BTCUSDT");
        let (headers, signed) = signer(SignAlgorithm::Sha256).sign_request(&params, 7).unwrap();

        assert_eq!(headers.get("AccessId").map(String::as_str), Some("ACCESS"));
        assert!(signed.contains(&("timestamp".to_string(), "7".to_string())));
        let signature = headers.get("Authorization").unwrap();
        assert_eq!(signature, &signature.to_lowercase());
        assert_eq!(signature.len(), 64);
    }

    #[test]
    fn test_from_read_only_config() {
        assert!(CoinexSigner::from_config(&ExchangeConfig::read_only(), SignAlgorithm::Md5).is_none());
    }

    #[test]
    fn test_debug_hides_secret() {
        let debug = format!("{:?}", signer(SignAlgorithm::Md5));
        assert!(!debug.contains("SECRET"));
    }
}
