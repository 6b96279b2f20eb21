use base64::{Engine, engine::general_purpose::STANDARD};
use portal_core::AssertionError;
use roxmltree::Node;
use rsa::{
    RsaPublicKey,
    pkcs1v15::{Signature, VerifyingKey},
    pkcs8::DecodePublicKey,
    signature::Verifier,
};
use sha2::{Digest, Sha256};
use x509_cert::{
    Certificate,
    der::{Decode, Encode},
};

use super::{
    DSIG_NS,
    c14n::{EXCLUSIVE_C14N, canonicalize},
    normalize_certificate,
};

pub const RSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";
pub const SHA256: &str = "http://www.w3.org/2001/04/xmlenc#sha256";
pub const ENVELOPED_SIGNATURE: &str = "http://www.w3.org/2000/09/xmldsig#enveloped-signature";

/// Checks the enveloped XML signature of a response or assertion element.
pub trait SignatureVerifier: Send + Sync {
    /// `signed` is the element carrying the `ds:Signature` child.
    fn verify(&self, signed: Node<'_, '_>) -> Result<(), AssertionError>;
}

/// XML-DSig verification against the identity provider certificate configured
/// for this deployment. Certificates embedded in `KeyInfo` are ignored.
///
/// Only the profile identity providers use for SAML is accepted: exclusive
/// canonicalization, RSA-SHA256 and a single SHA-256 reference to the signed
/// element with the enveloped-signature transform. The digest is computed
/// over the element handed in, never over an element looked up by ID.
#[derive(Clone)]
pub struct XmlDsigVerifier {
    key: VerifyingKey<Sha256>,
}

impl XmlDsigVerifier {
    /// Accepts a base64 DER certificate with or without PEM armour.
    pub fn from_certificate(certificate: &str) -> Result<Self, AssertionError> {
        let unusable =
            |reason: String| AssertionError::Configuration(format!("idp_x509_cert {reason}"));

        let der = STANDARD
            .decode(normalize_certificate(certificate))
            .map_err(|_| unusable("is not valid base64".to_string()))?;
        let certificate = Certificate::from_der(&der)
            .map_err(|e| unusable(format!("is not an X.509 certificate: {e}")))?;
        let public_key = certificate
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .map_err(|e| unusable(format!("has an unreadable public key: {e}")))
            .and_then(|spki| {
                RsaPublicKey::from_public_key_der(&spki)
                    .map_err(|e| unusable(format!("does not hold an RSA public key: {e}")))
            })?;

        Ok(Self {
            key: VerifyingKey::new(public_key),
        })
    }
}

fn rejected(reason: &str) -> AssertionError {
    tracing::debug!(reason, "XML signature rejected");
    AssertionError::InvalidSignature
}

fn ds_child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name((DSIG_NS, name)))
}

fn algorithm<'a>(node: Option<Node<'a, '_>>) -> Option<&'a str> {
    node.and_then(|n| n.attribute("Algorithm"))
}

fn decode_base64(node: Option<Node<'_, '_>>) -> Option<Vec<u8>> {
    let compact: String = node?.text()?.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(compact).ok()
}

/// `PrefixList` of an `InclusiveNamespaces` child of a canonicalization
/// algorithm element.
fn inclusive_prefixes<'a>(method: Node<'a, '_>) -> Vec<&'a str> {
    method
        .children()
        .find(|n| n.has_tag_name((EXCLUSIVE_C14N, "InclusiveNamespaces")))
        .and_then(|n| n.attribute("PrefixList"))
        .map(|list| list.split_whitespace().collect())
        .unwrap_or_default()
}

pub(crate) fn signature_of<'a, 'input>(signed: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    ds_child(signed, "Signature")
}

impl SignatureVerifier for XmlDsigVerifier {
    fn verify(&self, signed: Node<'_, '_>) -> Result<(), AssertionError> {
        let mut signatures = signed
            .children()
            .filter(|n| n.has_tag_name((DSIG_NS, "Signature")));
        let signature = match (signatures.next(), signatures.next()) {
            (Some(signature), None) => signature,
            (None, _) => return Err(rejected("element is not signed")),
            _ => return Err(rejected("element carries more than one signature")),
        };
        let signed_info =
            ds_child(signature, "SignedInfo").ok_or_else(|| rejected("no SignedInfo"))?;

        let c14n_method = ds_child(signed_info, "CanonicalizationMethod")
            .filter(|m| m.attribute("Algorithm") == Some(EXCLUSIVE_C14N))
            .ok_or_else(|| rejected("unsupported canonicalization method"))?;
        if algorithm(ds_child(signed_info, "SignatureMethod")) != Some(RSA_SHA256) {
            return Err(rejected("unsupported signature method"));
        }

        let mut references = signed_info
            .children()
            .filter(|n| n.has_tag_name((DSIG_NS, "Reference")));
        let reference = match (references.next(), references.next()) {
            (Some(reference), None) => reference,
            _ => return Err(rejected("exactly one reference is supported")),
        };
        let id = signed
            .attribute("ID")
            .filter(|id| !id.is_empty())
            .ok_or_else(|| rejected("signed element has no ID"))?;
        if reference.attribute("URI").and_then(|uri| uri.strip_prefix('#')) != Some(id) {
            return Err(rejected("reference does not point at the signed element"));
        }

        let mut enveloped = false;
        let mut prefixes = Vec::new();
        for transform in ds_child(reference, "Transforms")
            .into_iter()
            .flat_map(|t| t.children())
            .filter(|n| n.has_tag_name((DSIG_NS, "Transform")))
        {
            match transform.attribute("Algorithm") {
                Some(ENVELOPED_SIGNATURE) => enveloped = true,
                Some(EXCLUSIVE_C14N) => prefixes = inclusive_prefixes(transform),
                _ => return Err(rejected("unsupported transform")),
            }
        }
        if !enveloped {
            return Err(rejected("signature is not enveloped"));
        }

        if algorithm(ds_child(reference, "DigestMethod")) != Some(SHA256) {
            return Err(rejected("unsupported digest method"));
        }
        let expected_digest = decode_base64(ds_child(reference, "DigestValue"))
            .ok_or_else(|| rejected("unreadable DigestValue"))?;
        let digest = Sha256::digest(canonicalize(signed, Some(signature), &prefixes).as_bytes());
        if digest.as_slice() != expected_digest.as_slice() {
            return Err(rejected("digest does not match the signed element"));
        }

        let value = decode_base64(ds_child(signature, "SignatureValue"))
            .ok_or_else(|| rejected("unreadable SignatureValue"))?;
        let value = Signature::try_from(value.as_slice())
            .map_err(|_| rejected("malformed SignatureValue"))?;
        let canonical_info = canonicalize(signed_info, None, &inclusive_prefixes(c14n_method));
        self.key
            .verify(canonical_info.as_bytes(), &value)
            .map_err(|_| rejected("SignatureValue does not verify"))
    }
}

/// Stands in when no usable certificate is configured, so every signed
/// response fails with the configuration problem rather than being trusted.
#[derive(Debug, Clone)]
pub struct UnusableCertificate {
    reason: String,
}

impl UnusableCertificate {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl SignatureVerifier for UnusableCertificate {
    fn verify(&self, _signed: Node<'_, '_>) -> Result<(), AssertionError> {
        Err(AssertionError::Configuration(self.reason.clone()))
    }
}
