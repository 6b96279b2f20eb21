pub mod authn_request;
pub mod c14n;
pub mod metadata;
pub mod provider;
pub mod response;
pub mod signature;

#[cfg(test)]
pub(crate) mod fixtures;

pub use provider::Saml2IdentityProvider;
pub use signature::{SignatureVerifier, UnusableCertificate, XmlDsigVerifier};

pub(crate) const PROTOCOL_NS: &str = "urn:oasis:names:tc:SAML:2.0:protocol";
pub(crate) const ASSERTION_NS: &str = "urn:oasis:names:tc:SAML:2.0:assertion";
pub(crate) const METADATA_NS: &str = "urn:oasis:names:tc:SAML:2.0:metadata";
pub(crate) const DSIG_NS: &str = "http://www.w3.org/2000/09/xmldsig#";

pub(crate) const STATUS_SUCCESS: &str = "urn:oasis:names:tc:SAML:2.0:status:Success";
pub(crate) const NAME_ID_FORMAT_EMAIL: &str =
    "urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress";
pub(crate) const BINDING_HTTP_POST: &str = "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST";
pub(crate) const BINDING_HTTP_REDIRECT: &str =
    "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect";

pub(crate) fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Certificates arrive with PEM armour, line breaks or neither.
pub(crate) fn normalize_certificate(raw: &str) -> String {
    raw.replace("-----BEGIN CERTIFICATE-----", "")
        .replace("-----END CERTIFICATE-----", "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}
