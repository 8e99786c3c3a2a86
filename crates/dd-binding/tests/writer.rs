mod common;

use common::{Ejb, EnvEntry, Pool, Property, TestRoot};
use dd_binding::{DocumentType, DocumentWriter, Error, Registry, RootKind, parse_file, parse_str};

fn sample() -> TestRoot {
    TestRoot {
        version: Some("2".into()),
        description: Some("Test descriptor".into()),
        script: None,
        marker: Some(String::new()),
        timeout: Some(30),
        ejbs: vec![Ejb {
            ejb_name: Some("Foo".into()),
            description: None,
            steady_pool_size: Some(8),
            pass_by_reference: Some(true),
            method_names: vec!["create".into(), "remove".into()],
        }],
        pools: vec![Pool {
            name: Some("FooPool".into()),
            data_source_jndi_name: Some("jdbc/Foo".into()),
            init_sql: Some(String::new()),
            properties: vec![Property {
                name: Some("user".into()),
                value: Some("app".into()),
            }],
            ..Default::default()
        }],
        env_entries: vec![EnvEntry {
            name: Some("retries".into()),
            value: Some("3".into()),
        }],
    }
}

#[test]
fn test_write_document() {
    let registry = common::registry();
    let output = DocumentWriter::new(&registry, &common::config())
        .write_to_string("root", &sample())
        .unwrap();

    insta::assert_snapshot!(output.trim_end(), @r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <root version="2">
      <description>Test descriptor</description>
      <marker/>
      <settings>
        <timeout>30</timeout>
      </settings>
      <ejb>
        <ejb-name>Foo</ejb-name>
        <bean-pool>
          <steady-pool-size>8</steady-pool-size>
        </bean-pool>
        <pass-by-reference>true</pass-by-reference>
        <method-name>create</method-name>
        <method-name>remove</method-name>
      </ejb>
      <jdbc-connection-pool name="FooPool">
        <data-source-jndi-name>jdbc/Foo</data-source-jndi-name>
        <init-sql/>
        <property name="user" value="app"/>
      </jdbc-connection-pool>
      <env-entry-name>retries</env-entry-name>
      <env-entry-value>3</env-entry-value>
    </root>
    "#);
}

#[test]
fn test_dtd_kind_writes_doctype() {
    let registry = common::dtd_registry();
    let output = DocumentWriter::new(&registry, &common::config())
        .write_to_string("root", &TestRoot::default())
        .unwrap();

    let mut lines = output.lines();
    assert_eq!(lines.next(), Some(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    assert_eq!(
        lines.next(),
        Some(
            r#"<!DOCTYPE root PUBLIC "-//Test//DTD Root 1.0//EN" "http://example.org/dtds/root_1_0.dtd">"#
        )
    );
    assert_eq!(lines.next(), Some("<root/>"));
}

fn schema_registry() -> Registry {
    let registry = Registry::new();
    registry.register_if_absent(RootKind::new(
        common::root_kind(),
        DocumentType::Schema {
            namespace: "http://xmlns.jcp.org/xml/ns/javaee".into(),
            location: "http://xmlns.jcp.org/xml/ns/javaee/root_1_0.xsd".into(),
            version: Some("1.0".into()),
        },
    ));
    registry
}

#[test]
fn test_schema_kind_writes_namespace_and_version() {
    let registry = schema_registry();
    let writer = DocumentWriter::new(&registry, &common::config());

    let document = writer.to_document("root", &TestRoot::default()).unwrap();
    let names: Vec<_> = document
        .root
        .attributes
        .iter()
        .map(|a| (a.name.as_str(), a.value.as_str()))
        .collect();
    assert_eq!(
        names,
        vec![
            ("xmlns", "http://xmlns.jcp.org/xml/ns/javaee"),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
            (
                "xsi:schemaLocation",
                "http://xmlns.jcp.org/xml/ns/javaee http://xmlns.jcp.org/xml/ns/javaee/root_1_0.xsd"
            ),
            ("version", "1.0"),
        ]
    );
    assert!(document.doctype.is_none());

    // A version carried by the descriptor wins.
    let document = writer.to_document("root", &sample()).unwrap();
    let versions: Vec<_> = document
        .root
        .attributes
        .iter()
        .filter(|a| a.name == "version")
        .map(|a| a.value.as_str())
        .collect();
    assert_eq!(versions, vec!["2"]);
}

#[test]
fn test_schema_output_parses_back() {
    let registry = schema_registry();
    let config = common::config();
    let text = DocumentWriter::new(&registry, &config)
        .write_to_string("root", &sample())
        .unwrap();

    let parsed = parse_str(&registry, &config, "written.xml", &text).unwrap();
    assert_eq!(parsed.resolved_entities.len(), 1);
    assert_eq!(parsed.descriptor::<TestRoot>(), Some(&sample()));
}

#[test]
fn test_round_trip_through_dtd_document() {
    let registry = common::dtd_registry();
    let config = common::config();
    let parsed = parse_file(&registry, &config, &common::fixtures().join("full.xml")).unwrap();

    let mut buffer = Vec::new();
    DocumentWriter::new(&registry, &config)
        .write_parsed(&parsed, &mut buffer)
        .unwrap();
    let text = String::from_utf8(buffer).unwrap();

    let reparsed = parse_str(&registry, &config, "written.xml", &text).unwrap();
    assert_eq!(reparsed.resolved_entities.len(), 1);
    // Upgrades were applied by the first parse; the output is already current.
    assert_eq!(reparsed.applied_upgrades, 0);
    assert_eq!(
        reparsed.descriptor::<TestRoot>(),
        parsed.descriptor::<TestRoot>()
    );
}

#[test]
fn test_unknown_kind() {
    let registry = common::registry();
    let err = DocumentWriter::new(&registry, &common::config())
        .write_to_string("ejb-jar", &sample())
        .unwrap_err();
    assert!(matches!(err, Error::UnknownKind(ref tag) if tag == "ejb-jar"));
}

#[test]
fn test_wrong_descriptor_type() {
    let registry = common::registry();
    let err = DocumentWriter::new(&registry, &common::config())
        .write_to_string("root", &Ejb::default())
        .unwrap_err();
    assert!(matches!(err, Error::Write(_)));
}

#[test]
fn test_unindented_output() {
    let registry = common::registry();
    let mut config = common::config();
    config.writer.indent = 0;
    let output = DocumentWriter::new(&registry, &config)
        .write_to_string("root", &TestRoot {
            timeout: Some(5),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(
        output,
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><root><settings><timeout>5</timeout></settings></root>\n"
    );
}
