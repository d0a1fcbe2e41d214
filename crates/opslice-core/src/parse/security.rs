use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SecuritySchemeType {
    ApiKey,
    Http,
    #[serde(rename = "oauth2")]
    OAuth2,
    OpenIdConnect,
}

/// The OAuth2 grant flows a scheme supports.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlows {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_code: Option<OAuthFlow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implicit: Option<OAuthFlow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<OAuthFlow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_credentials: Option<OAuthFlow>,
}

/// OAuth2 grant kinds, named as in OpenAPI 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    AuthorizationCode,
    Implicit,
    Password,
    ClientCredentials,
}

impl OAuthFlows {
    /// Declared flows, authorization code first.
    pub fn iter(&self) -> impl Iterator<Item = (Grant, &OAuthFlow)> {
        [
            (Grant::AuthorizationCode, self.authorization_code.as_ref()),
            (Grant::Implicit, self.implicit.as_ref()),
            (Grant::Password, self.password.as_ref()),
            (Grant::ClientCredentials, self.client_credentials.as_ref()),
        ]
        .into_iter()
        .filter_map(|(grant, flow)| flow.map(|f| (grant, f)))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    #[serde(default)]
    pub scopes: IndexMap<String, String>,
    /// `refreshUrl` and extensions.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: SecuritySchemeType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Header, query or cookie parameter name of an `apiKey` scheme.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// HTTP authorization scheme, e.g. `basic` or `bearer`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub flows: Option<OAuthFlows>,

    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl SecurityScheme {
    /// An OAuth2 scheme with a single authorization-code flow and no scopes.
    pub fn authorization_code(authorization_url: &str, token_url: &str) -> Self {
        Self {
            scheme_type: SecuritySchemeType::OAuth2,
            description: None,
            name: None,
            location: None,
            scheme: None,
            flows: Some(OAuthFlows {
                authorization_code: Some(OAuthFlow {
                    authorization_url: Some(authorization_url.to_string()),
                    token_url: Some(token_url.to_string()),
                    ..OAuthFlow::default()
                }),
                ..OAuthFlows::default()
            }),
            extra: IndexMap::new(),
        }
    }
}

/// Scheme id to required scopes.
pub type SecurityRequirement = IndexMap<String, Vec<String>>;
