//! Reading a descriptor into a tree and writing it back out.

use dd_xml::{
    EventSink, Location, NamespaceStack, QName, WriteOptions, XmlChildren, XmlDocument, XmlElement,
    XmlEvent, XmlReader, parse_doctype, write_to_string,
};

/// Builds an output tree from reader events, trimming text.
#[derive(Default)]
struct TreeBuilder {
    open: Vec<(XmlElement, String)>,
    root: Option<XmlElement>,
    scopes: NamespaceStack,
    pending: Vec<(Option<String>, String)>,
    namespaces: Vec<Option<String>>,
}

impl EventSink for TreeBuilder {
    type Error = dd_xml::Error;

    fn handle_event(&mut self, event: XmlEvent, _location: &Location) -> dd_xml::Result<()> {
        match event {
            XmlEvent::StartPrefixMapping { prefix, uri } => self.pending.push((prefix, uri)),
            XmlEvent::StartElement { name, attributes } => {
                self.scopes.push(std::mem::take(&mut self.pending));
                self.namespaces
                    .push(QName::element(&name, &self.scopes).namespace().map(str::to_string));
                let mut element = XmlElement::new(name);
                element.attributes = attributes;
                self.open.push((element, String::new()));
            }
            XmlEvent::Characters(text) => {
                if let Some((_, buffer)) = self.open.last_mut() {
                    buffer.push_str(&text);
                }
            }
            XmlEvent::EndElement { .. } => {
                self.scopes.pop();
                if let Some((mut element, text)) = self.open.pop() {
                    let text = text.trim();
                    if element.is_empty() && !text.is_empty() {
                        element.children = XmlChildren::Text(text.to_string());
                    }
                    match self.open.last_mut() {
                        Some((parent, _)) => parent.push_child(element),
                        None => self.root = Some(element),
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }
}

const RESOURCES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<resources xmlns="http://xmlns.jcp.org/xml/ns/javaee">
  <jdbc-resource pool-name="FooPool" jndi-name="jdbc/Foo"/>
  <jdbc-connection-pool name="FooPool">
    <description>  Orders  </description>
    <property name="user" value="app"/>
  </jdbc-connection-pool>
</resources>
"#;

#[test]
fn test_read_then_write() {
    let mut builder = TreeBuilder::default();
    XmlReader::new("resources.xml", RESOURCES)
        .read(&mut builder)
        .unwrap();

    assert_eq!(builder.scopes.push_count(), builder.scopes.pop_count());
    assert!(
        builder
            .namespaces
            .iter()
            .all(|ns| ns.as_deref() == Some("http://xmlns.jcp.org/xml/ns/javaee"))
    );

    let root = builder.root.unwrap();
    assert_eq!(root.get_children("jdbc-connection-pool").len(), 1);

    let output = write_to_string(&XmlDocument::new(root), &WriteOptions::default()).unwrap();
    insta::assert_snapshot!(output.trim_end(), @r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <resources>
      <jdbc-resource pool-name="FooPool" jndi-name="jdbc/Foo"/>
      <jdbc-connection-pool name="FooPool">
        <description>Orders</description>
        <property name="user" value="app"/>
      </jdbc-connection-pool>
    </resources>
    "#);
}

#[test]
fn test_doctype_survives_write() {
    let decl = parse_doctype(
        r#" sun-ejb-jar PUBLIC "-//Sun Microsystems, Inc.//DTD Application Server 9.0 EJB 3.0//EN" "http://www.sun.com/software/appserver/dtds/sun-ejb-jar_3_0-0.dtd""#,
    )
    .unwrap();
    let document = XmlDocument::new(XmlElement::new("sun-ejb-jar")).with_doctype(decl.clone());
    let output = write_to_string(&document, &WriteOptions::default()).unwrap();

    let mut builder = TreeBuilder::default();
    let mut entities = Vec::new();
    struct Entities<'a>(&'a mut TreeBuilder, &'a mut Vec<(Option<String>, String)>);
    impl EventSink for Entities<'_> {
        type Error = dd_xml::Error;
        fn handle_event(&mut self, event: XmlEvent, location: &Location) -> dd_xml::Result<()> {
            if let XmlEvent::ResolveEntity {
                public_id,
                system_id,
            } = &event
            {
                self.1.push((public_id.clone(), system_id.clone()));
            }
            self.0.handle_event(event, location)
        }
    }
    XmlReader::new("ejb.xml", &output)
        .read(&mut Entities(&mut builder, &mut entities))
        .unwrap();

    assert_eq!(entities, vec![(decl.public_id, decl.system_id.unwrap())]);
    assert_eq!(builder.root.map(|r| r.name), Some("sun-ejb-jar".to_string()));
}
