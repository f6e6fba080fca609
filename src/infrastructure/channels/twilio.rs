//! Twilio request validation: base64 HMAC-SHA1 of the full callback URL
//! followed by every POST parameter as `key` + `value`, sorted by key.

use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::application::ports::channel_adapter::ChannelError;

type HmacSha1 = Hmac<Sha1>;

pub const SIGNATURE_HEADER: &str = "x-twilio-signature";

#[derive(Clone)]
pub struct TwilioSignatureValidator {
    auth_token: Option<String>,
}

impl TwilioSignatureValidator {
    pub fn new(auth_token: Option<String>) -> Self {
        Self { auth_token }
    }

    pub fn is_enabled(&self) -> bool {
        self.auth_token.is_some()
    }

    pub fn validate(
        &self,
        url: &str,
        params: &[(String, String)],
        signature: Option<&str>,
    ) -> Result<(), ChannelError> {
        let Some(token) = &self.auth_token else {
            return Ok(());
        };

        let signature = signature.ok_or(ChannelError::SignatureInvalid)?;
        let expected = STANDARD
            .decode(signature.trim())
            .map_err(|_| ChannelError::SignatureInvalid)?;

        mac_for(token, url, params)?
            .verify_slice(&expected)
            .map_err(|_| ChannelError::SignatureInvalid)
    }
}

fn mac_for(token: &str, url: &str, params: &[(String, String)]) -> Result<HmacSha1, ChannelError> {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let mut mac = HmacSha1::new_from_slice(token.as_bytes()).map_err(|_| ChannelError::SignatureInvalid)?;
    mac.update(url.as_bytes());
    for (key, value) in sorted {
        mac.update(key.as_bytes());
        mac.update(value.as_bytes());
    }
    Ok(mac)
}

/// Signature Twilio would send for this request.
#[cfg(test)]
pub fn sign(token: &str, url: &str, params: &[(String, String)]) -> Result<String, ChannelError> {
    let mac = mac_for(token, url, params)?;
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> Vec<(String, String)> {
        vec![
            ("To".to_string(), "+8809600000000".to_string()),
            ("CallSid".to_string(), "CA123".to_string()),
            ("Digits".to_string(), "1".to_string()),
            ("From".to_string(), "+8801711111111".to_string()),
        ]
    }

    #[test]
    fn test_accepts_valid_signature_regardless_of_param_order() {
        let url = "https://desk.example.com/ivr/gather?menu=main";
        let mut shuffled = params();
        shuffled.reverse();
        let signature = sign("token", url, &params()).unwrap();

        let validator = TwilioSignatureValidator::new(Some("token".to_string()));
        assert!(validator.validate(url, &shuffled, Some(&signature)).is_ok());
    }

    #[test]
    fn test_rejects_changed_params_or_url() {
        let url = "https://desk.example.com/ivr/gather";
        let signature = sign("token", url, &params()).unwrap();
        let validator = TwilioSignatureValidator::new(Some("token".to_string()));

        let mut changed = params();
        changed[2].1 = "2".to_string();
        assert!(validator.validate(url, &changed, Some(&signature)).is_err());
        assert!(validator.validate("https://evil.example.com/ivr/gather", &params(), Some(&signature)).is_err());
        assert!(validator.validate(url, &params(), None).is_err());
        assert!(validator.validate(url, &params(), Some("not base64!")).is_err());
    }

    #[test]
    fn test_disabled_without_token() {
        let validator = TwilioSignatureValidator::new(None);
        assert!(!validator.is_enabled());
        assert!(validator.validate("https://x", &[], None).is_ok());
    }
}
