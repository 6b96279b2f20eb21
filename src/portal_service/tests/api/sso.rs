use std::sync::LazyLock;

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{Duration, SecondsFormat, Utc};
use portal_adapters::saml::{
    c14n::{EXCLUSIVE_C14N, canonicalize},
    signature::{ENVELOPED_SIGNATURE, RSA_SHA256, SHA256},
};
use reqwest::cookie::CookieStore;
use roxmltree::Document;
use rsa::{
    RsaPrivateKey,
    pkcs1v15::SigningKey,
    pkcs8::DecodePrivateKey,
    signature::{SignatureEncoding, Signer},
};
use sha2::{Digest, Sha256};

use crate::helpers::{IDP_ENTITY_ID, IDP_KEY, IDP_SSO_URL, SP_HOSTNAME, TestApp};

const DSIG_NS: &str = "http://www.w3.org/2000/09/xmldsig#";

static SIGNING_KEY: LazyLock<SigningKey<Sha256>> = LazyLock::new(|| {
    SigningKey::new(RsaPrivateKey::from_pkcs8_pem(IDP_KEY).expect("Failed to read IdP key"))
});

/// Signs the assertion the way the identity provider does: an enveloped
/// RSA-SHA256 signature over its exclusive canonical form, after `Issuer`.
fn sign_assertion(xml: &str) -> String {
    let doc = Document::parse(xml).expect("Fixture is not XML");
    let assertion = doc
        .descendants()
        .find(|n| n.attribute("ID") == Some("_a1"))
        .expect("Fixture has no assertion");
    let digest = STANDARD.encode(Sha256::digest(canonicalize(assertion, None, &[]).as_bytes()));

    let signed_info = format!(
        concat!(
            r#"<ds:SignedInfo xmlns:ds="{DSIG_NS}">"#,
            r#"<ds:CanonicalizationMethod Algorithm="{EXCLUSIVE_C14N}"/>"#,
            r#"<ds:SignatureMethod Algorithm="{RSA_SHA256}"/>"#,
            r##"<ds:Reference URI="#_a1"><ds:Transforms>"##,
            r#"<ds:Transform Algorithm="{ENVELOPED_SIGNATURE}"/>"#,
            r#"<ds:Transform Algorithm="{EXCLUSIVE_C14N}"/></ds:Transforms>"#,
            r#"<ds:DigestMethod Algorithm="{SHA256}"/><ds:DigestValue>{digest}</ds:DigestValue>"#,
            r#"</ds:Reference></ds:SignedInfo>"#
        ),
        DSIG_NS = DSIG_NS,
        EXCLUSIVE_C14N = EXCLUSIVE_C14N,
        RSA_SHA256 = RSA_SHA256,
        ENVELOPED_SIGNATURE = ENVELOPED_SIGNATURE,
        SHA256 = SHA256,
        digest = digest,
    );
    let info = Document::parse(&signed_info).expect("SignedInfo is not XML");
    let canonical_info = canonicalize(info.root_element(), None, &[]);
    let value = STANDARD.encode(SIGNING_KEY.sign(canonical_info.as_bytes()).to_bytes());
    let signature = format!(
        concat!(
            r#"<ds:Signature xmlns:ds="{ds}">{signed_info}"#,
            r#"<ds:SignatureValue>{value}</ds:SignatureValue></ds:Signature>"#
        ),
        ds = DSIG_NS,
        signed_info = signed_info,
        value = value,
    );

    let at = assertion
        .first_element_child()
        .expect("Assertion has no Issuer")
        .range()
        .end;
    format!("{}{}{}", &xml[..at], signature, &xml[at..])
}

/// An identity provider response addressed to the test service provider.
fn unsigned_response(email: Option<&str>, issuer: &str) -> String {
    let now = Utc::now();
    let not_before = (now - Duration::minutes(1)).to_rfc3339_opts(SecondsFormat::Secs, true);
    let not_after = (now + Duration::minutes(5)).to_rfc3339_opts(SecondsFormat::Secs, true);
    let acs_url = format!("https://{SP_HOSTNAME}/sso/acs");
    let audience = format!("https://{SP_HOSTNAME}/sso/metadata");
    let attributes = email
        .map(|e| {
            format!(
                concat!(
                    r#"<saml:AttributeStatement><saml:Attribute Name="email">"#,
                    r#"<saml:AttributeValue>{e}</saml:AttributeValue>"#,
                    r#"</saml:Attribute></saml:AttributeStatement>"#
                ),
                e = e
            )
        })
        .unwrap_or_default();

    format!(
        concat!(
            r#"<samlp:Response xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" "#,
            r#"xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion" "#,
            r#"ID="_r1" Version="2.0" Destination="{acs}">"#,
            r#"<saml:Issuer>{issuer}</saml:Issuer>"#,
            r#"<samlp:Status>"#,
            r#"<samlp:StatusCode Value="urn:oasis:names:tc:SAML:2.0:status:Success"/>"#,
            r#"</samlp:Status>"#,
            r#"<saml:Assertion ID="_a1" Version="2.0" IssueInstant="{nb}">"#,
            r#"<saml:Issuer>{issuer}</saml:Issuer>"#,
            r#"<saml:Subject><saml:NameID>subject-1</saml:NameID>"#,
            r#"<saml:SubjectConfirmation Method="urn:oasis:names:tc:SAML:2.0:cm:bearer">"#,
            r#"<saml:SubjectConfirmationData NotOnOrAfter="{na}" Recipient="{acs}"/>"#,
            r#"</saml:SubjectConfirmation></saml:Subject>"#,
            r#"<saml:Conditions NotBefore="{nb}" NotOnOrAfter="{na}">"#,
            r#"<saml:AudienceRestriction><saml:Audience>{aud}</saml:Audience>"#,
            r#"</saml:AudienceRestriction></saml:Conditions>"#,
            r#"<saml:AuthnStatement AuthnInstant="{nb}" SessionIndex="_s1"/>"#,
            r#"{attributes}</saml:Assertion></samlp:Response>"#
        ),
        acs = acs_url,
        issuer = issuer,
        nb = not_before,
        na = not_after,
        aud = audience,
        attributes = attributes,
    )
}

fn identity_provider_response(email: Option<&str>, issuer: &str) -> String {
    STANDARD.encode(sign_assertion(&unsigned_response(email, issuer)))
}

#[tokio::test]
async fn sso_login_redirects_to_identity_provider() {
    let app = TestApp::new().await;

    for path in ["/sso/login", "/login?next=/attachments"] {
        let response = app.get(path).await;
        assert_eq!(response.status().as_u16(), 302);
        let location = response.headers()["location"].to_str().unwrap();
        assert!(location.starts_with(IDP_SSO_URL), "{location}");
        assert!(location.contains("SAMLRequest="));
    }
}

#[tokio::test]
async fn valid_assertion_creates_session_and_redirects_home() {
    let app = TestApp::new().await;
    let encoded = identity_provider_response(Some("federated@example.com"), IDP_ENTITY_ID);

    let response = app.post_sso_response(Some(&encoded)).await;

    assert_eq!(response.status().as_u16(), 303);
    assert_eq!(response.headers()["location"], "/");
    let url = reqwest::Url::parse(&app.address).unwrap();
    assert!(app.cookie_jar.cookies(&url).is_some());

    let me: serde_json::Value = app.get("/users/me").await.json().await.unwrap();
    assert_eq!(me["email"], "federated@example.com");
}

#[tokio::test]
async fn repeat_federated_login_reuses_the_same_identity() {
    let app = TestApp::new().await;
    let encoded = identity_provider_response(Some("repeat@example.com"), IDP_ENTITY_ID);

    app.post_sso_response(Some(&encoded)).await;
    let first: serde_json::Value = app.get("/users/me").await.json().await.unwrap();

    let other = app.fresh_client();
    other.post_sso_response(Some(&encoded)).await;
    let second: serde_json::Value = other.get("/users/me").await.json().await.unwrap();

    assert_eq!(first["id"], second["id"]);
}

#[tokio::test]
async fn invalid_or_missing_assertions_answer_400_without_detail() {
    let app = TestApp::new().await;
    let no_email = identity_provider_response(None, IDP_ENTITY_ID);
    let wrong_issuer =
        identity_provider_response(Some("x@example.com"), "https://evil.example.com");
    let forged = STANDARD.encode(
        sign_assertion(&unsigned_response(Some("x@example.com"), IDP_ENTITY_ID))
            .replacen("x@example.com", "admin@example.com", 1),
    );

    let test_cases = [
        (None, "missing response"),
        (Some("%%%not-base64%%%"), "garbage"),
        (Some(no_email.as_str()), "no email attribute"),
        (Some(wrong_issuer.as_str()), "wrong issuer"),
        (Some(forged.as_str()), "forged signature"),
    ];

    for (encoded, description) in test_cases {
        let response = app.post_sso_response(encoded).await;
        assert_eq!(response.status().as_u16(), 400, "{description}");
        if encoded.is_some() {
            assert_eq!(response.text().await.unwrap(), "Single sign-on failed");
        }
    }

    assert_eq!(app.get("/users/me").await.status().as_u16(), 401);
}

#[tokio::test]
async fn unsigned_response_is_refused_without_creating_a_session() {
    let app = TestApp::new().await;
    let unsigned = STANDARD.encode(unsigned_response(
        Some("victim-admin@example.com"),
        IDP_ENTITY_ID,
    ));

    let response = app.post_sso_response(Some(&unsigned)).await;

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(response.text().await.unwrap(), "Single sign-on failed");
    let url = reqwest::Url::parse(&app.address).unwrap();
    assert!(app.cookie_jar.cookies(&url).is_none());
    assert_eq!(app.get("/users/me").await.status().as_u16(), 401);
}

#[tokio::test]
async fn metadata_describes_the_service_provider() {
    let app = TestApp::new().await;

    let response = app.get("/sso/metadata").await;

    assert_eq!(response.status().as_u16(), 200);
    assert!(
        response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("application/xml")
    );
    let body = response.text().await.unwrap();
    assert!(body.contains("SPSSODescriptor"));
    assert!(body.contains(&format!("https://{SP_HOSTNAME}/sso/acs")));
}
