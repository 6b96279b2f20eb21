use roxmltree::Document;

use super::{
    BINDING_HTTP_POST, BINDING_HTTP_REDIRECT, METADATA_NS, NAME_ID_FORMAT_EMAIL, escape_xml,
    signature::XmlDsigVerifier,
};
use crate::config::SamlConfig;

/// Render the service provider `EntityDescriptor`.
pub fn sp_metadata(config: &SamlConfig) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<md:EntityDescriptor xmlns:md="{md}" entityID="{entity_id}">"#,
            r#"<md:SPSSODescriptor AuthnRequestsSigned="false" "#,
            r#"WantAssertionsSigned="{want_signed}" "#,
            r#"protocolSupportEnumeration="urn:oasis:names:tc:SAML:2.0:protocol">"#,
            r#"<md:SingleLogoutService Binding="{redirect}" Location="{sls}"/>"#,
            r#"<md:NameIDFormat>{name_id_format}</md:NameIDFormat>"#,
            r#"<md:AssertionConsumerService Binding="{post}" Location="{acs}" index="1"/>"#,
            r#"</md:SPSSODescriptor></md:EntityDescriptor>"#
        ),
        md = METADATA_NS,
        entity_id = escape_xml(&config.sp_entity_id()),
        want_signed = config.want_assertions_signed,
        redirect = BINDING_HTTP_REDIRECT,
        sls = escape_xml(&config.sls_url()),
        name_id_format = NAME_ID_FORMAT_EMAIL,
        post = BINDING_HTTP_POST,
        acs = escape_xml(&config.acs_url()),
    )
}

/// Problems with the settings that would make published metadata unusable.
pub fn validate_settings(config: &SamlConfig) -> Vec<String> {
    let mut errors = Vec::new();

    if config.sp_hostname.trim().is_empty() {
        errors.push("sp_hostname is not configured".to_string());
    }
    if config.idp_entity_id.as_deref().is_none_or(|v| v.trim().is_empty()) {
        errors.push("idp_entity_id is not configured".to_string());
    }
    if config.idp_sso_url.as_deref().is_none_or(|v| v.trim().is_empty()) {
        errors.push("idp_sso_url is not configured".to_string());
    }
    match config.idp_x509_cert.as_deref().filter(|v| !v.trim().is_empty()) {
        None => errors.push("idp_x509_cert is not configured".to_string()),
        Some(certificate) => {
            if let Err(e) = XmlDsigVerifier::from_certificate(certificate) {
                errors.push(e.to_string());
            }
        }
    }

    errors
}

/// Structural checks on a metadata document.
pub fn validate_metadata(xml: &str) -> Vec<String> {
    let doc = match Document::parse(xml) {
        Ok(doc) => doc,
        Err(e) => return vec![format!("metadata is not well-formed XML: {e}")],
    };

    let root = doc.root_element();
    if !root.has_tag_name((METADATA_NS, "EntityDescriptor")) {
        return vec!["metadata root is not an EntityDescriptor".to_string()];
    }

    let mut errors = Vec::new();
    if root.attribute("entityID").is_none_or(|v| v.trim().is_empty()) {
        errors.push("EntityDescriptor has no entityID".to_string());
    }

    let descriptors: Vec<_> = root
        .children()
        .filter(|n| n.is_element())
        .filter(|n| n.tag_name().namespace() == Some(METADATA_NS))
        .filter(|n| n.tag_name().name().ends_with("SSODescriptor"))
        .collect();
    let sp_descriptors: Vec<_> = descriptors
        .iter()
        .filter(|n| n.tag_name().name() == "SPSSODescriptor")
        .collect();
    if sp_descriptors.len() != descriptors.len() {
        errors.push("only SPSSODescriptor is allowed".to_string());
    }

    match sp_descriptors.as_slice() {
        [descriptor] => {
            let has_acs = descriptor
                .children()
                .filter(|n| n.has_tag_name((METADATA_NS, "AssertionConsumerService")))
                .any(|n| n.attribute("Location").is_some_and(|l| !l.is_empty()));
            if !has_acs {
                errors.push("SPSSODescriptor has no AssertionConsumerService".to_string());
            }
        }
        [] => errors.push("metadata has no SPSSODescriptor".to_string()),
        _ => errors.push("metadata has more than one SPSSODescriptor".to_string()),
    }

    errors
}
