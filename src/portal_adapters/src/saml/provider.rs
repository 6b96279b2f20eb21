use std::sync::Arc;

use async_trait::async_trait;
use portal_core::{AssertionError, Clock, IdentityProvider, ValidatedAssertion};

use super::{
    authn_request::AuthnRequest,
    metadata::{sp_metadata, validate_metadata, validate_settings},
    response::{ResponseExpectations, validate_response},
    signature::{SignatureVerifier, UnusableCertificate, XmlDsigVerifier},
};
use crate::config::SamlConfig;

/// SAML 2.0 service provider speaking to a single configured identity
/// provider. Requests go out over HTTP-Redirect, responses come back over
/// HTTP-POST.
#[derive(Clone)]
pub struct Saml2IdentityProvider {
    config: SamlConfig,
    clock: Arc<dyn Clock>,
    verifier: Arc<dyn SignatureVerifier>,
}

impl Saml2IdentityProvider {
    /// Signatures are checked against `idp_x509_cert`. Without a usable
    /// certificate every response is refused with a configuration error.
    pub fn new(config: SamlConfig, clock: Arc<dyn Clock>) -> Self {
        let certificate = config.idp_x509_cert.as_deref().filter(|c| !c.trim().is_empty());
        let verifier: Arc<dyn SignatureVerifier> =
            match certificate.map(XmlDsigVerifier::from_certificate) {
                Some(Ok(verifier)) => Arc::new(verifier),
                Some(Err(e)) => {
                    tracing::error!(error = %e, "Identity provider certificate is unusable");
                    Arc::new(UnusableCertificate::new(e.to_string()))
                }
                None => Arc::new(UnusableCertificate::new("idp_x509_cert is not configured")),
            };
        Self {
            config,
            clock,
            verifier,
        }
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn SignatureVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn config(&self) -> &SamlConfig {
        &self.config
    }

    fn idp_entity_id(&self) -> Result<&str, AssertionError> {
        self.config
            .idp_entity_id
            .as_deref()
            .ok_or_else(|| AssertionError::Configuration("idp_entity_id is not configured".into()))
    }
}

#[async_trait]
impl IdentityProvider for Saml2IdentityProvider {
    #[tracing::instrument(name = "Building SAML login redirect", skip(self))]
    fn login_url(&self, relay_state: Option<&str>) -> Result<String, AssertionError> {
        let sso_url = self
            .config
            .idp_sso_url
            .as_deref()
            .ok_or_else(|| AssertionError::Configuration("idp_sso_url is not configured".into()))?;

        AuthnRequest::new(
            sso_url,
            self.config.sp_entity_id(),
            self.config.acs_url(),
            self.clock.now(),
        )
        .redirect_url(relay_state)
    }

    #[tracing::instrument(name = "Validating SAML response", skip_all)]
    async fn validate_assertion(
        &self,
        saml_response: &str,
    ) -> Result<ValidatedAssertion, AssertionError> {
        let idp_entity_id = self.idp_entity_id()?;
        let sp_entity_id = self.config.sp_entity_id();
        let acs_url = self.config.acs_url();
        let expected = ResponseExpectations {
            idp_entity_id,
            sp_entity_id: &sp_entity_id,
            acs_url: &acs_url,
            want_assertions_signed: self.config.want_assertions_signed,
            now: self.clock.now(),
        };

        let result = validate_response(saml_response, &expected, self.verifier.as_ref());
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Rejected SAML response");
        }
        result
    }

    fn metadata(&self) -> Result<String, Vec<String>> {
        let mut errors = validate_settings(&self.config);
        let xml = sp_metadata(&self.config);
        errors.extend(validate_metadata(&xml));

        if errors.is_empty() { Ok(xml) } else { Err(errors) }
    }
}
