//! Postal-code (CEP) lookup client.
//!
//! Wraps a ViaCEP-compatible service. Lookups are best-effort: any network
//! or decode failure is logged and surfaces as `None`, so callers keep
//! whatever address fields they already have.

use std::sync::Arc;
use std::time::Duration;

use helpnet_core::Cep;
use serde::{Deserialize, Serialize};

/// Address fields resolved from a CEP.
#[derive(Debug, Clone, Serialize)]
pub struct CepInfo {
    pub cep: String,
    pub street: String,
    pub district: String,
    pub city: String,
    pub state: String,
}

/// Raw ViaCEP response. Unknown CEPs come back as `{"erro": true}`.
#[derive(Debug, Deserialize)]
struct ViaCepResponse {
    #[serde(default)]
    erro: bool,
    #[serde(default)]
    logradouro: String,
    #[serde(default)]
    bairro: String,
    #[serde(default)]
    localidade: String,
    #[serde(default)]
    uf: String,
}

struct CepClientInner {
    http: reqwest::Client,
    base_url: String,
}

/// Cheap-to-clone CEP lookup client.
#[derive(Clone)]
pub struct CepClient {
    inner: Arc<CepClientInner>,
}

impl CepClient {
    /// Create a client against a ViaCEP-compatible base URL.
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
            inner: Arc::new(CepClientInner {
                http,
                base_url: base_url.trim_end_matches('/').to_string(),
            }),
        }
    }

    /// Resolve a CEP to address fields. `None` on unknown CEP or any failure.
    #[tracing::instrument(skip(self), fields(cep = %cep))]
    pub async fn lookup(&self, cep: &Cep) -> Option<CepInfo> {
        let url = format!("{}/{}/json/", self.inner.base_url, cep.as_str());

        let response = match self.inner.http.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "CEP lookup request failed");
                return None;
            }
        };
        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "CEP lookup returned error status");
            return None;
        }

        let body: ViaCepResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(error = %e, "CEP lookup returned malformed body");
                return None;
            }
        };
        if body.erro {
            tracing::debug!("CEP not found");
            return None;
        }

        Some(CepInfo {
            cep: cep.to_string(),
            street: body.logradouro,
            district: body.bairro,
            city: body.localidade,
            state: body.uf,
        })
    }
}
