use std::collections::HashMap;

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Duration, Utc};
use portal_core::{AssertionError, ValidatedAssertion};
use roxmltree::{Document, Node};

use super::{
    ASSERTION_NS, PROTOCOL_NS, STATUS_SUCCESS,
    signature::{SignatureVerifier, signature_of},
};

const ALLOWED_CLOCK_DRIFT_SECONDS: i64 = 300;

/// What a response must match to be accepted.
pub struct ResponseExpectations<'a> {
    pub idp_entity_id: &'a str,
    pub sp_entity_id: &'a str,
    pub acs_url: &'a str,
    pub want_assertions_signed: bool,
    pub now: DateTime<Utc>,
}

fn malformed(reason: impl Into<String>) -> AssertionError {
    AssertionError::Malformed(reason.into())
}

fn child<'a, 'input>(node: Node<'a, 'input>, ns: &str, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name((ns, name)))
}

fn parse_instant(
    node: Node<'_, '_>,
    attribute: &str,
) -> Result<Option<DateTime<Utc>>, AssertionError> {
    node.attribute(attribute)
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw.trim())
                .map(|t| t.with_timezone(&Utc))
                .map_err(|_| malformed(format!("invalid {attribute} timestamp")))
        })
        .transpose()
}

/// Decode a posted `SAMLResponse` and run every check against `expected`.
pub fn validate_response(
    encoded: &str,
    expected: &ResponseExpectations<'_>,
    verifier: &dyn SignatureVerifier,
) -> Result<ValidatedAssertion, AssertionError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(AssertionError::Missing);
    }

    let bytes = STANDARD
        .decode(compact)
        .map_err(|_| malformed("SAMLResponse is not valid base64"))?;
    let xml = String::from_utf8(bytes).map_err(|_| malformed("SAMLResponse is not UTF-8"))?;
    let doc = Document::parse(&xml).map_err(|e| malformed(e.to_string()))?;

    validate_document(&doc, expected, verifier)
}

fn validate_document(
    doc: &Document<'_>,
    expected: &ResponseExpectations<'_>,
    verifier: &dyn SignatureVerifier,
) -> Result<ValidatedAssertion, AssertionError> {
    let response = doc.root_element();
    if !response.has_tag_name((PROTOCOL_NS, "Response")) {
        return Err(malformed("document is not a samlp:Response"));
    }

    if let Some(destination) = response.attribute("Destination") {
        if destination != expected.acs_url {
            return Err(AssertionError::DestinationMismatch);
        }
    }

    let status = child(response, PROTOCOL_NS, "Status")
        .and_then(|s| child(s, PROTOCOL_NS, "StatusCode"))
        .and_then(|c| c.attribute("Value"))
        .ok_or_else(|| malformed("response has no status code"))?;
    if status != STATUS_SUCCESS {
        return Err(AssertionError::StatusNotSuccess(status.to_string()));
    }

    if response
        .descendants()
        .any(|n| n.has_tag_name((ASSERTION_NS, "EncryptedAssertion")))
    {
        return Err(malformed("encrypted assertions are not supported"));
    }

    let mut assertions = response
        .children()
        .filter(|n| n.has_tag_name((ASSERTION_NS, "Assertion")));
    let assertion = match (assertions.next(), assertions.next()) {
        (Some(assertion), None) => assertion,
        _ => return Err(malformed("response must contain exactly one assertion")),
    };

    if let Some(issuer) = child(response, ASSERTION_NS, "Issuer") {
        if issuer.text().map(str::trim) != Some(expected.idp_entity_id) {
            return Err(AssertionError::IssuerMismatch);
        }
    }
    let issuer = child(assertion, ASSERTION_NS, "Issuer").and_then(|n| n.text());
    if issuer.map(str::trim) != Some(expected.idp_entity_id) {
        return Err(AssertionError::IssuerMismatch);
    }

    check_signatures(response, assertion, expected.want_assertions_signed, verifier)?;
    check_conditions(assertion, expected)?;

    let subject = child(assertion, ASSERTION_NS, "Subject");
    if let Some(subject) = subject {
        check_subject_confirmation(subject, expected)?;
    }
    let name_id = subject
        .and_then(|s| child(s, ASSERTION_NS, "NameID"))
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string());

    let authn_statement = child(assertion, ASSERTION_NS, "AuthnStatement");
    if let Some(statement) = authn_statement {
        if let Some(session_end) = parse_instant(statement, "SessionNotOnOrAfter")? {
            if session_end <= expected.now - Duration::seconds(ALLOWED_CLOCK_DRIFT_SECONDS) {
                return Err(AssertionError::Expired);
            }
        }
    }
    let session_index = authn_statement
        .and_then(|s| s.attribute("SessionIndex"))
        .map(str::to_string);

    Ok(ValidatedAssertion {
        name_id,
        session_index,
        attributes: collect_attributes(assertion),
    })
}

/// At least one of the response and the assertion must carry a signature
/// that verifies; `assertion_must_be_signed` narrows that to the assertion.
/// Every signature present is verified.
fn check_signatures(
    response: Node<'_, '_>,
    assertion: Node<'_, '_>,
    assertion_must_be_signed: bool,
    verifier: &dyn SignatureVerifier,
) -> Result<(), AssertionError> {
    let response_signed = signature_of(response).is_some();
    let assertion_signed = signature_of(assertion).is_some();

    if !response_signed && !assertion_signed {
        tracing::debug!("Neither the response nor the assertion is signed");
        return Err(AssertionError::InvalidSignature);
    }
    if assertion_must_be_signed && !assertion_signed {
        tracing::debug!("Assertion is not signed");
        return Err(AssertionError::InvalidSignature);
    }

    if response_signed {
        verifier.verify(response)?;
    }
    if assertion_signed {
        verifier.verify(assertion)?;
    }
    Ok(())
}

fn check_conditions(
    assertion: Node<'_, '_>,
    expected: &ResponseExpectations<'_>,
) -> Result<(), AssertionError> {
    let Some(conditions) = child(assertion, ASSERTION_NS, "Conditions") else {
        return Ok(());
    };
    let drift = Duration::seconds(ALLOWED_CLOCK_DRIFT_SECONDS);

    if let Some(not_before) = parse_instant(conditions, "NotBefore")? {
        if not_before > expected.now + drift {
            return Err(AssertionError::Expired);
        }
    }
    if let Some(not_on_or_after) = parse_instant(conditions, "NotOnOrAfter")? {
        if not_on_or_after <= expected.now - drift {
            return Err(AssertionError::Expired);
        }
    }

    for restriction in conditions
        .children()
        .filter(|n| n.has_tag_name((ASSERTION_NS, "AudienceRestriction")))
    {
        let admitted = restriction
            .children()
            .filter(|n| n.has_tag_name((ASSERTION_NS, "Audience")))
            .filter_map(|n| n.text())
            .any(|audience| audience.trim() == expected.sp_entity_id);
        if !admitted {
            return Err(AssertionError::AudienceMismatch);
        }
    }

    Ok(())
}

fn check_subject_confirmation(
    subject: Node<'_, '_>,
    expected: &ResponseExpectations<'_>,
) -> Result<(), AssertionError> {
    let drift = Duration::seconds(ALLOWED_CLOCK_DRIFT_SECONDS);

    for data in subject
        .children()
        .filter(|n| n.has_tag_name((ASSERTION_NS, "SubjectConfirmation")))
        .filter_map(|n| child(n, ASSERTION_NS, "SubjectConfirmationData"))
    {
        if let Some(recipient) = data.attribute("Recipient") {
            if recipient != expected.acs_url {
                return Err(AssertionError::DestinationMismatch);
            }
        }
        if let Some(not_on_or_after) = parse_instant(data, "NotOnOrAfter")? {
            if not_on_or_after <= expected.now - drift {
                return Err(AssertionError::Expired);
            }
        }
    }

    Ok(())
}

fn collect_attributes(assertion: Node<'_, '_>) -> HashMap<String, Vec<String>> {
    let mut attributes: HashMap<String, Vec<String>> = HashMap::new();

    for attribute in assertion
        .children()
        .filter(|n| n.has_tag_name((ASSERTION_NS, "AttributeStatement")))
        .flat_map(|s| s.children())
        .filter(|n| n.has_tag_name((ASSERTION_NS, "Attribute")))
    {
        let Some(name) = attribute.attribute("Name") else {
            continue;
        };
        let values = attribute
            .children()
            .filter(|n| n.has_tag_name((ASSERTION_NS, "AttributeValue")))
            .map(|n| n.text().unwrap_or_default().trim().to_string());
        attributes.entry(name.to_string()).or_default().extend(values);
    }

    attributes
}
