// 🔍 CNPJ Registry Lookup - public registration data to auto-fill the form
//
// Providers disagree on key casing (razao_social vs razaoSocial) and the CEP
// may arrive as a string or a number. RegistryRecord::from_value maps every
// accepted variant into one shape, so nothing past this module sees it.
//
// CnpjLookup is the backend seam:
// - HttpCnpjLookup: live registry API (server feature)
// - StaticCnpjLookup: in-memory answers for development and tests

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::cnpj::{strip_non_digits, Cnpj};
use crate::entities::Address;

/// Errors from registry lookups.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The registry has no record for this CNPJ.
    #[error("CNPJ {0} não encontrado")]
    NotFound(String),

    /// The registry answered with a non-success status.
    #[error("registry returned {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The request never got an answer.
    #[error("registry unreachable: {0}")]
    Http(String),

    /// The request took longer than the configured timeout.
    #[error("registry request timed out after {0}s")]
    Timeout(u64),

    /// The registry answered with a body we could not read.
    #[error("unexpected registry response: {0}")]
    Decode(String),

    /// The lookup client could not be built from its configuration.
    #[error("registry lookup not configured: {0}")]
    NotConfigured(String),
}

// ============================================================================
// CANONICAL RECORD
// ============================================================================

/// Registration data for one CNPJ, as the rest of the crate sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryRecord {
    /// Canonical 14 digits
    pub cnpj: String,
    pub legal_name: String,
    pub trade_name: Option<String>,
    /// Registration status ("ATIVA", "BAIXADA", ...)
    pub status: Option<String>,
    pub address: Address,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl RegistryRecord {
    /// Normalize a raw registry payload (either key casing) into a record.
    pub fn from_value(value: serde_json::Value) -> Result<Self, LookupError> {
        let raw: RawRegistryRecord =
            serde_json::from_value(value).map_err(|e| LookupError::Decode(e.to_string()))?;
        raw.normalize()
    }

    /// Whether the registration is active ("ATIVA"). Unknown status counts as active.
    pub fn is_active(&self) -> bool {
        match &self.status {
            Some(status) => status.eq_ignore_ascii_case("ativa"),
            None => true,
        }
    }
}

/// Wire shape accepted from registry providers.
#[derive(Debug, Deserialize)]
struct RawRegistryRecord {
    #[serde(default)]
    cnpj: Option<serde_json::Value>,

    #[serde(default, alias = "razaoSocial")]
    razao_social: Option<String>,

    #[serde(default, alias = "nomeFantasia")]
    nome_fantasia: Option<String>,

    #[serde(default, alias = "descricaoSituacaoCadastral")]
    descricao_situacao_cadastral: Option<String>,

    #[serde(default)]
    cep: Option<serde_json::Value>,

    #[serde(default)]
    logradouro: Option<String>,

    #[serde(default)]
    numero: Option<String>,

    #[serde(default)]
    complemento: Option<String>,

    #[serde(default)]
    bairro: Option<String>,

    #[serde(default)]
    municipio: Option<String>,

    #[serde(default)]
    uf: Option<String>,

    #[serde(default)]
    email: Option<String>,

    #[serde(default, alias = "dddTelefone1")]
    ddd_telefone_1: Option<String>,
}

impl RawRegistryRecord {
    fn normalize(self) -> Result<RegistryRecord, LookupError> {
        let cnpj = self
            .cnpj
            .as_ref()
            .map(value_digits)
            .unwrap_or_default();

        let legal_name = non_empty(self.razao_social)
            .ok_or_else(|| LookupError::Decode("missing razao_social".to_string()))?;

        let address = Address {
            cep: self.cep.as_ref().map(value_digits).unwrap_or_default(),
            street: non_empty(self.logradouro).unwrap_or_default(),
            number: non_empty(self.numero).unwrap_or_default(),
            complement: non_empty(self.complemento).unwrap_or_default(),
            district: non_empty(self.bairro).unwrap_or_default(),
            city: non_empty(self.municipio).unwrap_or_default(),
            state: non_empty(self.uf).map(|uf| uf.to_uppercase()).unwrap_or_default(),
        };

        Ok(RegistryRecord {
            cnpj,
            legal_name,
            trade_name: non_empty(self.nome_fantasia),
            status: non_empty(self.descricao_situacao_cadastral),
            address,
            email: non_empty(self.email).map(|e| e.to_lowercase()),
            phone: non_empty(self.ddd_telefone_1),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Digits of a string or numeric JSON value. Numeric CEPs lose their leading
/// zero on the wire, so they are left-padded back to 8 digits.
fn value_digits(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => strip_non_digits(s),
        serde_json::Value::Number(n) => {
            let digits = strip_non_digits(&n.to_string());
            if digits.len() < 8 {
                format!("{:0>8}", digits)
            } else {
                digits
            }
        }
        _ => String::new(),
    }
}

// ============================================================================
// LOOKUP ADAPTERS
// ============================================================================

/// Source of CNPJ registrations.
#[async_trait]
pub trait CnpjLookup: Send + Sync {
    async fn lookup(&self, cnpj: &Cnpj) -> Result<RegistryRecord, LookupError>;
}

/// In-memory registry answers, keyed by CNPJ digits.
#[derive(Debug, Clone, Default)]
pub struct StaticCnpjLookup {
    records: HashMap<String, RegistryRecord>,
}

impl StaticCnpjLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a record (keyed by its own CNPJ)
    pub fn with_record(mut self, record: RegistryRecord) -> Self {
        self.insert(record);
        self
    }

    pub fn insert(&mut self, record: RegistryRecord) {
        self.records.insert(record.cnpj.clone(), record);
    }
}

#[async_trait]
impl CnpjLookup for StaticCnpjLookup {
    async fn lookup(&self, cnpj: &Cnpj) -> Result<RegistryRecord, LookupError> {
        self.records
            .get(cnpj.as_str())
            .cloned()
            .ok_or_else(|| LookupError::NotFound(cnpj.formatted()))
    }
}

#[cfg(feature = "server")]
pub use remote::HttpCnpjLookup;

#[cfg(feature = "server")]
mod remote {
    use super::{CnpjLookup, LookupError, RegistryRecord};
    use crate::cnpj::Cnpj;
    use crate::config::LookupConfig;
    use async_trait::async_trait;
    use std::time::Duration;

    /// Registry client over HTTP: `GET {base_url}/{cnpj digits}`.
    #[derive(Debug, Clone)]
    pub struct HttpCnpjLookup {
        client: reqwest::Client,
        base_url: String,
        timeout_secs: u64,
    }

    impl HttpCnpjLookup {
        pub fn new(config: &LookupConfig) -> Result<Self, LookupError> {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert(
                reqwest::header::ACCEPT,
                reqwest::header::HeaderValue::from_static("application/json"),
            );
            if let Some(token) = &config.token {
                let value = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|_| LookupError::NotConfigured("invalid API token characters".into()))?;
                headers.insert(reqwest::header::AUTHORIZATION, value);
            }

            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .default_headers(headers)
                .build()
                .map_err(|e| LookupError::NotConfigured(format!("failed to build HTTP client: {e}")))?;

            Ok(Self {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                timeout_secs: config.timeout_secs,
            })
        }

        pub fn endpoint(&self, cnpj: &Cnpj) -> String {
            format!("{}/{}", self.base_url, cnpj.as_str())
        }
    }

    #[async_trait]
    impl CnpjLookup for HttpCnpjLookup {
        async fn lookup(&self, cnpj: &Cnpj) -> Result<RegistryRecord, LookupError> {
            let url = self.endpoint(cnpj);
            tracing::info!(%url, "looking up CNPJ");

            let resp = self.client.get(&url).send().await.map_err(|e| {
                if e.is_timeout() {
                    LookupError::Timeout(self.timeout_secs)
                } else {
                    LookupError::Http(e.to_string())
                }
            })?;

            let status = resp.status();
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(LookupError::NotFound(cnpj.formatted()));
            }
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                tracing::warn!(%url, status = status.as_u16(), "registry lookup failed");
                return Err(LookupError::Upstream {
                    status: status.as_u16(),
                    body,
                });
            }

            let value: serde_json::Value = resp
                .json()
                .await
                .map_err(|e| LookupError::Decode(e.to_string()))?;

            let mut record = RegistryRecord::from_value(value)?;
            if record.cnpj.is_empty() {
                record.cnpj = cnpj.as_str().to_string();
            }
            Ok(record)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snake_case_payload() -> serde_json::Value {
        json!({
            "cnpj": "11222333000181",
            "razao_social": "PREMIUM CAFES DO BRASIL LTDA",
            "nome_fantasia": "Café Premium",
            "descricao_situacao_cadastral": "ATIVA",
            "cep": "01310100",
            "logradouro": "AVENIDA PAULISTA",
            "numero": "1000",
            "complemento": "",
            "bairro": "BELA VISTA",
            "municipio": "SAO PAULO",
            "uf": "sp",
            "email": "Contato@CafePremium.com.br",
            "ddd_telefone_1": "1133334444"
        })
    }

    #[test]
    fn test_snake_case_payload() {
        let record = RegistryRecord::from_value(snake_case_payload()).unwrap();

        assert_eq!(record.cnpj, "11222333000181");
        assert_eq!(record.legal_name, "PREMIUM CAFES DO BRASIL LTDA");
        assert_eq!(record.trade_name, Some("Café Premium".to_string()));
        assert_eq!(record.address.cep, "01310100");
        assert_eq!(record.address.complement, "");
        assert_eq!(record.address.state, "SP");
        assert_eq!(record.email, Some("contato@cafepremium.com.br".to_string()));
        assert_eq!(record.phone, Some("1133334444".to_string()));
        assert!(record.is_active());
    }

    #[test]
    fn test_camel_case_payload_normalizes_to_same_record() {
        let camel = json!({
            "cnpj": "11.222.333/0001-81",
            "razaoSocial": "PREMIUM CAFES DO BRASIL LTDA",
            "nomeFantasia": "Café Premium",
            "descricaoSituacaoCadastral": "ATIVA",
            "cep": "01310-100",
            "logradouro": "AVENIDA PAULISTA",
            "numero": "1000",
            "complemento": "",
            "bairro": "BELA VISTA",
            "municipio": "SAO PAULO",
            "uf": "SP",
            "email": "contato@cafepremium.com.br",
            "dddTelefone1": "1133334444"
        });

        assert_eq!(
            RegistryRecord::from_value(camel).unwrap(),
            RegistryRecord::from_value(snake_case_payload()).unwrap()
        );
    }

    #[test]
    fn test_numeric_cep_and_blank_fields() {
        let record = RegistryRecord::from_value(json!({
            "cnpj": 11222333000181u64,
            "razao_social": "ACME LTDA",
            "nome_fantasia": "   ",
            "cep": 1310100,
            "descricao_situacao_cadastral": "BAIXADA"
        }))
        .unwrap();

        assert_eq!(record.address.cep, "01310100");
        assert_eq!(record.trade_name, None);
        assert!(!record.is_active());
    }

    #[test]
    fn test_missing_legal_name_is_decode_error() {
        let err = RegistryRecord::from_value(json!({ "cnpj": "11222333000181" })).unwrap_err();
        assert!(matches!(err, LookupError::Decode(_)));
    }

    #[tokio::test]
    async fn test_static_lookup() {
        let record = RegistryRecord::from_value(snake_case_payload()).unwrap();
        let lookup = StaticCnpjLookup::new().with_record(record.clone());

        let cnpj = Cnpj::new("11.222.333/0001-81").unwrap();
        assert_eq!(lookup.lookup(&cnpj).await.unwrap(), record);

        let missing = Cnpj::new("33000167000101").unwrap();
        assert!(matches!(
            lookup.lookup(&missing).await,
            Err(LookupError::NotFound(_))
        ));
    }

    #[cfg(feature = "server")]
    mod http_client {
        use super::*;
        use crate::config::LookupConfig;
        use wiremock::matchers::{header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        fn config(server: &MockServer, token: Option<&str>) -> LookupConfig {
            LookupConfig {
                base_url: format!("{}/api/cnpj/v1/", server.uri()),
                token: token.map(|t| t.to_string()),
                timeout_secs: 5,
            }
        }

        #[tokio::test]
        async fn test_http_lookup_success() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/api/cnpj/v1/11222333000181"))
                .and(header("authorization", "Bearer secret"))
                .respond_with(ResponseTemplate::new(200).set_body_json(snake_case_payload()))
                .mount(&server)
                .await;

            let lookup = HttpCnpjLookup::new(&config(&server, Some("secret"))).unwrap();
            let cnpj = Cnpj::new("11222333000181").unwrap();
            let record = lookup.lookup(&cnpj).await.unwrap();

            assert_eq!(record.legal_name, "PREMIUM CAFES DO BRASIL LTDA");
            assert_eq!(record.address.city, "SAO PAULO");
        }

        #[tokio::test]
        async fn test_http_lookup_not_found() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(404))
                .mount(&server)
                .await;

            let lookup = HttpCnpjLookup::new(&config(&server, None)).unwrap();
            let cnpj = Cnpj::new("11222333000181").unwrap();

            assert!(matches!(
                lookup.lookup(&cnpj).await,
                Err(LookupError::NotFound(_))
            ));
        }

        #[tokio::test]
        async fn test_http_lookup_upstream_error() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
                .mount(&server)
                .await;

            let lookup = HttpCnpjLookup::new(&config(&server, None)).unwrap();
            let cnpj = Cnpj::new("11222333000181").unwrap();

            match lookup.lookup(&cnpj).await {
                Err(LookupError::Upstream { status, body }) => {
                    assert_eq!(status, 503);
                    assert_eq!(body, "maintenance");
                }
                other => panic!("expected upstream error, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_http_lookup_fills_missing_cnpj() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(json!({ "razaoSocial": "ACME LTDA" })),
                )
                .mount(&server)
                .await;

            let lookup = HttpCnpjLookup::new(&config(&server, None)).unwrap();
            let cnpj = Cnpj::new("33000167000101").unwrap();
            let record = lookup.lookup(&cnpj).await.unwrap();

            assert_eq!(record.cnpj, "33000167000101");
        }
    }
}
