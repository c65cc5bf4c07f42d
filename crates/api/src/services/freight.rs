//! Freight quote client.
//!
//! Talks to the internal freight service. Unlike CEP lookups, failures here
//! matter to the checkout flow, so they come back as typed errors and the
//! checkout session records them as an inline message.

use std::sync::Arc;
use std::time::Duration;

use helpnet_core::{Cep, Money, ProductId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One quoted delivery option.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreightOption {
    pub service: String,
    pub price: Money,
    pub deadline_days: u32,
}

/// Freight client errors.
#[derive(Debug, Error)]
pub enum FreightError {
    #[error("freight quote request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("freight service returned no options")]
    NoOptions,
}

#[derive(Debug, Serialize)]
struct QuoteRequest<'a> {
    cep: &'a str,
    items: Vec<QuoteItem>,
}

#[derive(Debug, Serialize)]
struct QuoteItem {
    product_id: ProductId,
    quantity: u32,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    options: Vec<FreightOption>,
}

struct FreightClientInner {
    http: reqwest::Client,
    base_url: String,
}

/// Cheap-to-clone freight quote client.
#[derive(Clone)]
pub struct FreightClient {
    inner: Arc<FreightClientInner>,
}

impl FreightClient {
    /// Create a client against the freight service base URL.
    ///
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialized. This only happens at
    /// startup with a broken local setup.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build HTTP client");
        Self {
            inner: Arc::new(FreightClientInner {
                http,
                base_url: base_url.trim_end_matches('/').to_string(),
            }),
        }
    }

    /// Quote delivery options for a cart going to `cep`.
    #[tracing::instrument(skip(self, items), fields(cep = %cep, items = items.len()))]
    pub async fn quote(
        &self,
        cep: &Cep,
        items: &[(ProductId, u32)],
    ) -> Result<Vec<FreightOption>, FreightError> {
        let request = QuoteRequest {
            cep: cep.as_str(),
            items: items
                .iter()
                .map(|&(product_id, quantity)| QuoteItem {
                    product_id,
                    quantity,
                })
                .collect(),
        };

        let response: QuoteResponse = self
            .inner
            .http
            .post(format!("{}/quotes", self.inner.base_url))
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.options.is_empty() {
            return Err(FreightError::NoOptions);
        }
        Ok(response.options)
    }
}

/// Index of the cheapest option. The checkout session uses it as the
/// default selection.
#[must_use]
pub fn cheapest_index(options: &[FreightOption]) -> usize {
    options
        .iter()
        .enumerate()
        .min_by_key(|(_, option)| option.price)
        .map_or(0, |(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(service: &str, reais: i64) -> FreightOption {
        FreightOption {
            service: service.to_string(),
            price: Money::from_reais(reais),
            deadline_days: 5,
        }
    }

    #[test]
    fn test_cheapest_index_picks_lowest_price() {
        let options = vec![option("Sedex", 42), option("PAC", 19), option("Expresso", 65)];
        assert_eq!(cheapest_index(&options), 1);
    }

    #[test]
    fn test_cheapest_index_ties_keep_first() {
        let options = vec![option("PAC", 19), option("Econômico", 19)];
        assert_eq!(cheapest_index(&options), 0);
    }
}
