use std::io::Write;

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, SecondsFormat, Utc};
use flate2::{Compression, write::DeflateEncoder};
use portal_core::AssertionError;
use url::Url;

use super::{ASSERTION_NS, BINDING_HTTP_POST, NAME_ID_FORMAT_EMAIL, PROTOCOL_NS, escape_xml};

/// An `AuthnRequest` ready to be sent over the HTTP-Redirect binding.
#[derive(Debug, Clone)]
pub struct AuthnRequest {
    pub id: String,
    pub issue_instant: DateTime<Utc>,
    pub destination: String,
    pub issuer: String,
    pub acs_url: String,
}

impl AuthnRequest {
    pub fn new(
        destination: impl Into<String>,
        issuer: impl Into<String>,
        acs_url: impl Into<String>,
        issue_instant: DateTime<Utc>,
    ) -> Self {
        Self {
            id: format!("_{}", uuid::Uuid::new_v4().simple()),
            issue_instant,
            destination: destination.into(),
            issuer: issuer.into(),
            acs_url: acs_url.into(),
        }
    }

    pub fn to_xml(&self) -> String {
        format!(
            concat!(
                r#"<samlp:AuthnRequest xmlns:samlp="{protocol}" xmlns:saml="{assertion}" "#,
                r#"ID="{id}" Version="2.0" IssueInstant="{instant}" Destination="{destination}" "#,
                r#"ProtocolBinding="{binding}" AssertionConsumerServiceURL="{acs}">"#,
                r#"<saml:Issuer>{issuer}</saml:Issuer>"#,
                r#"<samlp:NameIDPolicy Format="{name_id_format}" AllowCreate="true"/>"#,
                r#"</samlp:AuthnRequest>"#
            ),
            protocol = PROTOCOL_NS,
            assertion = ASSERTION_NS,
            id = self.id,
            instant = self.issue_instant.to_rfc3339_opts(SecondsFormat::Secs, true),
            destination = escape_xml(&self.destination),
            binding = BINDING_HTTP_POST,
            acs = escape_xml(&self.acs_url),
            issuer = escape_xml(&self.issuer),
            name_id_format = NAME_ID_FORMAT_EMAIL,
        )
    }

    /// Deflate, base64 and attach the request (and relay state) to the
    /// identity provider's SSO URL.
    pub fn redirect_url(&self, relay_state: Option<&str>) -> Result<String, AssertionError> {
        let mut url = Url::parse(&self.destination).map_err(|e| {
            AssertionError::Configuration(format!("invalid identity provider SSO URL: {e}"))
        })?;

        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(self.to_xml().as_bytes())
            .map_err(|e| AssertionError::Configuration(format!("could not encode request: {e}")))?;
        let deflated = encoder
            .finish()
            .map_err(|e| AssertionError::Configuration(format!("could not encode request: {e}")))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("SAMLRequest", &STANDARD.encode(deflated));
            if let Some(relay_state) = relay_state.filter(|r| !r.is_empty()) {
                query.append_pair("RelayState", relay_state);
            }
        }

        Ok(url.to_string())
    }
}
