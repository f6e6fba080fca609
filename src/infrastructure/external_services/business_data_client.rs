use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use uuid::Uuid;

use crate::application::ports::business_data::{BusinessDataError, BusinessDataSource};
use crate::config::BusinessDataConfig;
use crate::domain::value_objects::Intent;

/// Looks up live order, inventory and catalogue data from the business
/// backend at `GET {base}/organizations/{id}/{intent}?q=`.
pub struct HttpBusinessDataClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpBusinessDataClient {
    /// `None` when no business backend is configured.
    pub fn from_config(config: &BusinessDataConfig) -> Result<Option<Self>, reqwest::Error> {
        let Some(base_url) = &config.base_url else {
            return Ok(None);
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Some(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }))
    }

    fn lookup_url(&self, organization_id: Uuid, intent: Intent) -> String {
        format!("{}/organizations/{}/{}", self.base_url, organization_id, intent.as_str())
    }
}

#[async_trait]
impl BusinessDataSource for HttpBusinessDataClient {
    async fn lookup(
        &self,
        organization_id: Uuid,
        intent: Intent,
        user_text: &str,
    ) -> Result<Option<String>, BusinessDataError> {
        let mut request = self
            .client
            .get(self.lookup_url(organization_id, intent))
            .query(&[("q", user_text)]);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BusinessDataError::NetworkError(e.without_url().to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::NO_CONTENT => Ok(None),
            status if status.is_success() => {
                let body = response
                    .text()
                    .await
                    .map_err(|e| BusinessDataError::NetworkError(e.to_string()))?;
                let body = body.trim();
                Ok((!body.is_empty()).then(|| body.to_string()))
            }
            status => Err(BusinessDataError::ApiError(format!("HTTP {}", status.as_u16()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_without_base_url() {
        let config = BusinessDataConfig {
            base_url: None,
            api_key: None,
            timeout_secs: 5,
        };
        assert!(HttpBusinessDataClient::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_lookup_url() {
        let config = BusinessDataConfig {
            base_url: Some("https://shop.example.com/api/".to_string()),
            api_key: None,
            timeout_secs: 5,
        };
        let client = HttpBusinessDataClient::from_config(&config).unwrap().unwrap();
        let org = Uuid::nil();

        assert_eq!(
            client.lookup_url(org, Intent::Inventory),
            format!("https://shop.example.com/api/organizations/{}/inventory", org)
        );
    }
}
