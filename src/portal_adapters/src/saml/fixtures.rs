use std::sync::LazyLock;

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use roxmltree::Document;
use rsa::{
    RsaPrivateKey,
    pkcs1v15::SigningKey,
    pkcs8::DecodePrivateKey,
    signature::{SignatureEncoding, Signer},
};
use sha2::{Digest, Sha256};

use super::{
    ASSERTION_NS, DSIG_NS, PROTOCOL_NS, STATUS_SUCCESS,
    c14n::{EXCLUSIVE_C14N, canonicalize},
    normalize_certificate,
    signature::{ENVELOPED_SIGNATURE, RSA_SHA256, SHA256},
};
use crate::config::SamlConfig;

pub(crate) const IDP_ENTITY_ID: &str = "https://idp.example.com/metadata";
pub(crate) const IDP_SSO_URL: &str = "https://idp.example.com/sso";
pub(crate) const IDP_CERT: &str = include_str!("../../testdata/saml/idp_cert.pem");
pub(crate) const OTHER_CERT: &str = include_str!("../../testdata/saml/other_cert.pem");
const IDP_KEY: &str = include_str!("../../testdata/saml/idp_key.pem");

/// A response signed by [`IDP_CERT`]'s key with independent tooling, valid
/// for [`saml_config`] at 2025-06-01T12:00:00Z.
pub(crate) const SIGNED_RESPONSE: &str = include_str!("../../testdata/saml/signed_response.xml");

static SIGNING_KEY: LazyLock<SigningKey<Sha256>> = LazyLock::new(|| {
    SigningKey::new(RsaPrivateKey::from_pkcs8_pem(IDP_KEY).expect("test key is valid PKCS#8"))
});

/// Adds an enveloped signature to the element with `ID="{id}"`, placed
/// right after its `Issuer` as SAML requires.
pub(crate) fn sign_element(xml: &str, id: &str) -> String {
    let doc = Document::parse(xml).unwrap();
    let element = doc
        .descendants()
        .find(|n| n.attribute("ID") == Some(id))
        .unwrap();
    let digest = STANDARD.encode(Sha256::digest(canonicalize(element, None, &[]).as_bytes()));

    let signed_info = format!(
        concat!(
            r#"<ds:SignedInfo xmlns:ds="{ds}">"#,
            r#"<ds:CanonicalizationMethod Algorithm="{c14n}"/>"#,
            r#"<ds:SignatureMethod Algorithm="{rsa_sha256}"/>"#,
            r##"<ds:Reference URI="#{id}"><ds:Transforms>"##,
            r#"<ds:Transform Algorithm="{enveloped}"/><ds:Transform Algorithm="{c14n}"/>"#,
            r#"</ds:Transforms><ds:DigestMethod Algorithm="{sha256}"/>"#,
            r#"<ds:DigestValue>{digest}</ds:DigestValue></ds:Reference></ds:SignedInfo>"#
        ),
        ds = DSIG_NS,
        c14n = EXCLUSIVE_C14N,
        rsa_sha256 = RSA_SHA256,
        id = id,
        enveloped = ENVELOPED_SIGNATURE,
        sha256 = SHA256,
        digest = digest,
    );
    let info_doc = Document::parse(&signed_info).unwrap();
    let canonical_info = canonicalize(info_doc.root_element(), None, &[]);
    let value = STANDARD.encode(SIGNING_KEY.sign(canonical_info.as_bytes()).to_bytes());

    let signature = format!(
        concat!(
            r#"<ds:Signature xmlns:ds="{ds}">{signed_info}"#,
            r#"<ds:SignatureValue>{value}</ds:SignatureValue>"#,
            r#"<ds:KeyInfo><ds:X509Data><ds:X509Certificate>{cert}</ds:X509Certificate>"#,
            r#"</ds:X509Data></ds:KeyInfo></ds:Signature>"#
        ),
        ds = DSIG_NS,
        signed_info = signed_info,
        value = value,
        cert = normalize_certificate(IDP_CERT),
    );

    let at = element
        .children()
        .find(|n| n.has_tag_name((ASSERTION_NS, "Issuer")))
        .map(|issuer| issuer.range().end)
        .unwrap_or_else(|| {
            element
                .first_child()
                .map_or(element.range().end, |c| c.range().start)
        });
    format!("{}{}{}", &xml[..at], signature, &xml[at..])
}

pub(crate) fn saml_config() -> SamlConfig {
    SamlConfig {
        sp_hostname: "portal.example.com".to_string(),
        idp_entity_id: Some(IDP_ENTITY_ID.to_string()),
        idp_sso_url: Some(IDP_SSO_URL.to_string()),
        idp_slo_url: Some("https://idp.example.com/slo".to_string()),
        idp_x509_cert: Some(IDP_CERT.to_string()),
        want_assertions_signed: false,
    }
}

/// Builder for identity provider responses. Starts out valid for
/// [`saml_config`] at `now`; tests break one field at a time.
#[derive(Debug, Clone)]
pub(crate) struct ResponseFixture {
    pub destination: Option<String>,
    pub status: String,
    pub issuer: String,
    pub audience: Option<String>,
    pub not_before: DateTime<Utc>,
    pub not_on_or_after: DateTime<Utc>,
    pub recipient: String,
    pub name_id: String,
    pub email: Option<String>,
    pub sign_assertion: bool,
    pub sign_response: bool,
    pub encrypted: bool,
    pub assertions: usize,
}

fn instant(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl ResponseFixture {
    pub fn valid(config: &SamlConfig, now: DateTime<Utc>) -> Self {
        Self {
            destination: Some(config.acs_url()),
            status: STATUS_SUCCESS.to_string(),
            issuer: IDP_ENTITY_ID.to_string(),
            audience: Some(config.sp_entity_id()),
            not_before: now - Duration::minutes(1),
            not_on_or_after: now + Duration::minutes(5),
            recipient: config.acs_url(),
            name_id: "user@example.com".to_string(),
            email: Some("user@example.com".to_string()),
            sign_assertion: true,
            sign_response: false,
            encrypted: false,
            assertions: 1,
        }
    }

    fn assertion(&self, index: usize) -> String {
        let id = format!("_assertion{index}");
        let audience = self
            .audience
            .as_ref()
            .map(|a| {
                format!(
                    concat!(
                        "<saml:AudienceRestriction><saml:Audience>{}</saml:Audience>",
                        "</saml:AudienceRestriction>"
                    ),
                    a
                )
            })
            .unwrap_or_default();
        let attributes = self
            .email
            .as_ref()
            .map(|email| {
                format!(
                    concat!(
                        r#"<saml:AttributeStatement><saml:Attribute Name="email">"#,
                        r#"<saml:AttributeValue>{}</saml:AttributeValue></saml:Attribute>"#,
                        r#"<saml:Attribute Name="groups">"#,
                        r#"<saml:AttributeValue>staff</saml:AttributeValue>"#,
                        r#"<saml:AttributeValue>admins</saml:AttributeValue>"#,
                        r#"</saml:Attribute></saml:AttributeStatement>"#
                    ),
                    email
                )
            })
            .unwrap_or_default();

        format!(
            concat!(
                r#"<saml:Assertion ID="{id}" Version="2.0" IssueInstant="{issued}">"#,
                r#"<saml:Issuer>{issuer}</saml:Issuer>"#,
                r#"<saml:Subject><saml:NameID "#,
                r#"Format="urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress">"#,
                r#"{name_id}</saml:NameID>"#,
                r#"<saml:SubjectConfirmation Method="urn:oasis:names:tc:SAML:2.0:cm:bearer">"#,
                r#"<saml:SubjectConfirmationData NotOnOrAfter="{not_on_or_after}" "#,
                r#"Recipient="{recipient}"/>"#,
                r#"</saml:SubjectConfirmation></saml:Subject>"#,
                r#"<saml:Conditions NotBefore="{not_before}" NotOnOrAfter="{not_on_or_after}">"#,
                r#"{audience}</saml:Conditions>"#,
                r#"<saml:AuthnStatement AuthnInstant="{issued}" SessionIndex="_session{index}"/>"#,
                r#"{attributes}</saml:Assertion>"#
            ),
            id = id,
            index = index,
            issued = instant(self.not_before),
            issuer = self.issuer,
            name_id = self.name_id,
            not_on_or_after = instant(self.not_on_or_after),
            not_before = instant(self.not_before),
            recipient = self.recipient,
            audience = audience,
            attributes = attributes,
        )
    }

    pub fn xml(&self) -> String {
        let destination = self
            .destination
            .as_ref()
            .map(|d| format!(r#" Destination="{d}""#))
            .unwrap_or_default();
        let mut assertions: String = (0..self.assertions).map(|i| self.assertion(i)).collect();
        if self.encrypted {
            assertions = concat!(
                r#"<saml:EncryptedAssertion><xenc:EncryptedData "#,
                r#"xmlns:xenc="http://www.w3.org/2001/04/xmlenc#"/></saml:EncryptedAssertion>"#
            )
            .to_string();
        }

        let mut xml = format!(
            concat!(
                r#"<samlp:Response xmlns:samlp="{protocol}" xmlns:saml="{assertion_ns}" "#,
                r#"ID="_response" Version="2.0"{destination}>"#,
                r#"<saml:Issuer>{issuer}</saml:Issuer>"#,
                r#"<samlp:Status><samlp:StatusCode Value="{status}"/></samlp:Status>"#,
                r#"{assertions}</samlp:Response>"#
            ),
            protocol = PROTOCOL_NS,
            assertion_ns = ASSERTION_NS,
            destination = destination,
            issuer = self.issuer,
            status = self.status,
            assertions = assertions,
        );

        if self.sign_assertion && !self.encrypted {
            for index in 0..self.assertions {
                xml = sign_element(&xml, &format!("_assertion{index}"));
            }
        }
        if self.sign_response {
            xml = sign_element(&xml, "_response");
        }
        xml
    }

    pub fn encoded(&self) -> String {
        STANDARD.encode(self.xml())
    }
}
