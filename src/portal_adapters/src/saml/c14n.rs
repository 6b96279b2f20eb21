//! Exclusive XML Canonicalization 1.0, without comments, over a subtree of a
//! parsed document.

use roxmltree::Node;

pub const EXCLUSIVE_C14N: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";

/// Canonical form of `apex` and its descendants. `omit` names one element
/// whose whole subtree is left out, which is how the enveloped-signature
/// transform drops the signature from the content it signs.
///
/// `inclusive_prefixes` is the `InclusiveNamespaces PrefixList`, with
/// `#default` standing for the default namespace.
pub fn canonicalize<'a, 'input: 'a>(
    apex: Node<'a, 'input>,
    omit: Option<Node<'a, 'input>>,
    inclusive_prefixes: &[&'a str],
) -> String {
    let mut canonicalizer = Canonicalizer {
        out: String::new(),
        rendered: Vec::new(),
        omit,
        inclusive_prefixes: inclusive_prefixes
            .iter()
            .map(|p| if *p == "#default" { "" } else { *p })
            .collect(),
    };
    canonicalizer.node(apex);
    canonicalizer.out
}

struct Canonicalizer<'a, 'input> {
    out: String,
    /// Namespace declarations rendered on output ancestors, innermost last.
    rendered: Vec<(&'a str, &'a str)>,
    omit: Option<Node<'a, 'input>>,
    inclusive_prefixes: Vec<&'a str>,
}

struct CanonicalAttribute<'a> {
    namespace: &'a str,
    local: &'a str,
    qname: &'a str,
    value: &'a str,
}

impl<'a, 'input: 'a> Canonicalizer<'a, 'input> {
    fn node(&mut self, node: Node<'a, 'input>) {
        if self.omit == Some(node) {
            return;
        }

        if node.is_element() {
            self.element(node);
        } else if node.is_text() {
            escape_text(&mut self.out, node.text().unwrap_or_default());
        } else if let Some(pi) = node.pi() {
            self.out.push_str("<?");
            self.out.push_str(pi.target);
            if let Some(value) = pi.value {
                self.out.push(' ');
                self.out.push_str(value);
            }
            self.out.push_str("?>");
        }
    }

    fn element(&mut self, node: Node<'a, 'input>) {
        let input: &'a str = node.document().input_text();
        let qname = element_qname(input, node);

        let mut attributes: Vec<CanonicalAttribute<'a>> = node
            .attributes()
            .map(|a| CanonicalAttribute {
                namespace: a.namespace().unwrap_or_default(),
                local: a.name(),
                qname: input.get(a.range_qname()).unwrap_or(a.name()),
                value: a.value(),
            })
            .collect();
        attributes.sort_unstable_by(|a, b| (a.namespace, a.local).cmp(&(b.namespace, b.local)));

        let mut prefixes = vec![prefix_of(qname)];
        prefixes.extend(
            attributes
                .iter()
                .map(|a| prefix_of(a.qname))
                .filter(|p| !p.is_empty() && *p != "xml"),
        );
        prefixes.extend(
            self.inclusive_prefixes
                .iter()
                .copied()
                .filter(|p| namespace_in_scope(node, p).is_some()),
        );
        prefixes.sort_unstable();
        prefixes.dedup();

        let declarations: Vec<(&'a str, &'a str)> = prefixes
            .into_iter()
            .map(|prefix| (prefix, namespace_in_scope(node, prefix).unwrap_or_default()))
            .filter(|(prefix, uri)| self.rendered_uri(prefix) != *uri)
            .collect();

        self.out.push('<');
        self.out.push_str(qname);
        for (prefix, uri) in &declarations {
            if prefix.is_empty() {
                self.out.push_str(" xmlns=\"");
            } else {
                self.out.push_str(" xmlns:");
                self.out.push_str(prefix);
                self.out.push_str("=\"");
            }
            escape_attribute(&mut self.out, uri);
            self.out.push('"');
        }
        for attribute in &attributes {
            self.out.push(' ');
            self.out.push_str(attribute.qname);
            self.out.push_str("=\"");
            escape_attribute(&mut self.out, attribute.value);
            self.out.push('"');
        }
        self.out.push('>');

        let depth = self.rendered.len();
        self.rendered.extend(declarations);
        for child in node.children() {
            self.node(child);
        }
        self.rendered.truncate(depth);

        self.out.push_str("</");
        self.out.push_str(qname);
        self.out.push('>');
    }

    fn rendered_uri(&self, prefix: &str) -> &'a str {
        self.rendered
            .iter()
            .rev()
            .find(|(rendered, _)| *rendered == prefix)
            .map(|(_, uri)| *uri)
            .unwrap_or_default()
    }
}

fn namespace_in_scope<'a>(node: Node<'a, '_>, prefix: &str) -> Option<&'a str> {
    node.lookup_namespace_uri((!prefix.is_empty()).then_some(prefix))
        .filter(|uri| !uri.is_empty())
}

/// The element name as written, prefix included.
fn element_qname<'a>(input: &'a str, node: Node<'_, '_>) -> &'a str {
    let start = node.range().start + 1;
    let tail = input.get(start..).unwrap_or_default();
    let end = tail
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(tail.len());
    &tail[..end]
}

fn prefix_of(qname: &str) -> &str {
    qname.split_once(':').map(|(prefix, _)| prefix).unwrap_or_default()
}

fn escape_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#xD;"),
            other => out.push(other),
        }
    }
}

fn escape_attribute(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            other => out.push(other),
        }
    }
}
