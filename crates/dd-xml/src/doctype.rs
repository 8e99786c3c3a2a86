//! Extraction of external references: DOCTYPE identifiers and schema locations.

/// The parts of a `<!DOCTYPE ...>` declaration that matter for entity resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocTypeDecl {
    pub root: String,
    pub public_id: Option<String>,
    pub system_id: Option<String>,
}

impl DocTypeDecl {
    /// A `PUBLIC` declaration.
    pub fn public(
        root: impl Into<String>,
        public_id: impl Into<String>,
        system_id: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            public_id: Some(public_id.into()),
            system_id: Some(system_id.into()),
        }
    }

    /// The declaration body as written after `<!DOCTYPE `.
    pub fn to_declaration(&self) -> String {
        match (&self.public_id, &self.system_id) {
            (Some(public_id), Some(system_id)) => {
                format!("{} PUBLIC \"{}\" \"{}\"", self.root, public_id, system_id)
            }
            (None, Some(system_id)) => format!("{} SYSTEM \"{}\"", self.root, system_id),
            _ => self.root.clone(),
        }
    }
}

/// Parse the body of a DOCTYPE declaration (the text after `<!DOCTYPE`).
///
/// Any internal subset (`[...]`) is ignored. Returns `None` if there is no
/// root name.
///
/// ```
/// use dd_xml::parse_doctype;
///
/// let decl = parse_doctype(
///     r#" sun-ejb-jar PUBLIC "-//Sun Microsystems, Inc.//DTD EJB 3.0//EN" "http://www.sun.com/sun-ejb-jar_3_0-0.dtd""#,
/// ).unwrap();
/// assert_eq!(decl.root, "sun-ejb-jar");
/// assert_eq!(decl.public_id.as_deref(), Some("-//Sun Microsystems, Inc.//DTD EJB 3.0//EN"));
/// assert_eq!(decl.system_id.as_deref(), Some("http://www.sun.com/sun-ejb-jar_3_0-0.dtd"));
/// ```
pub fn parse_doctype(body: &str) -> Option<DocTypeDecl> {
    let body = body.trim_start();
    let root_end = body
        .find(|c: char| c.is_whitespace() || c == '[')
        .unwrap_or(body.len());
    let root = &body[..root_end];
    if root.is_empty() {
        return None;
    }

    let rest = body[root_end..].trim_start();
    let (public_id, system_id) = if let Some(rest) = rest.strip_prefix("PUBLIC") {
        let (public_id, rest) = quoted_literal(rest);
        let (system_id, _) = quoted_literal(rest);
        (public_id, system_id)
    } else if let Some(rest) = rest.strip_prefix("SYSTEM") {
        let (system_id, _) = quoted_literal(rest);
        (None, system_id)
    } else {
        (None, None)
    };

    Some(DocTypeDecl {
        root: root.to_string(),
        public_id,
        system_id,
    })
}

/// Read one `"..."` or `'...'` literal, returning it and the remaining input.
fn quoted_literal(input: &str) -> (Option<String>, &str) {
    let input = input.trim_start();
    let Some(quote) = input.chars().next().filter(|c| *c == '"' || *c == '\'') else {
        return (None, input);
    };
    let body = &input[1..];
    match body.find(quote) {
        Some(end) => (Some(body[..end].to_string()), &body[end + 1..]),
        None => (None, input),
    }
}

/// Split an `xsi:schemaLocation` value into `(namespace, location)` pairs.
///
/// A trailing namespace with no location is dropped.
///
/// ```
/// use dd_xml::parse_schema_location;
///
/// let pairs = parse_schema_location(
///     "http://xmlns.jcp.org/xml/ns/javaee\n    http://xmlns.jcp.org/xml/ns/javaee/ejb-jar_3_2.xsd",
/// );
/// assert_eq!(pairs, vec![(
///     "http://xmlns.jcp.org/xml/ns/javaee".to_string(),
///     "http://xmlns.jcp.org/xml/ns/javaee/ejb-jar_3_2.xsd".to_string(),
/// )]);
/// ```
pub fn parse_schema_location(value: &str) -> Vec<(String, String)> {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    tokens
        .chunks_exact(2)
        .map(|pair| (pair[0].to_string(), pair[1].to_string()))
        .collect()
}
