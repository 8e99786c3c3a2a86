//! ddtool - parse, check and upgrade deployment descriptors

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod session;

use session::Session;

#[derive(Parser, Debug)]
#[command(name = "ddtool")]
#[command(version, about = "Parse, check and upgrade deployment descriptors", long_about = None)]
struct Cli {
    /// Engine config file (JSON). Defaults to the bundled DTDs and schemas.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log and skip unknown elements and bad values instead of failing
    #[arg(long, global = true)]
    lenient: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the registered document kinds
    Kinds,

    /// Parse a descriptor and print what was bound
    Parse {
        file: PathBuf,

        /// Print a JSON summary instead of the descriptor
        #[arg(long)]
        json: bool,
    },

    /// Rewrite a descriptor in the current version of its kind
    Upgrade {
        file: PathBuf,

        /// Write output to FILE instead of stdout
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Print the effective engine configuration
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ddtool=info,dd_binding=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let session = Session::new(cli.config.as_deref(), cli.lenient)?;
    let mut out = io::stdout().lock();

    match cli.command {
        Commands::Kinds => commands::kinds::execute(&session, &mut out),
        Commands::Parse { file, json } => commands::parse::execute(&session, &file, json, &mut out),
        Commands::Upgrade { file, output } => {
            commands::upgrade::execute(&session, &file, output.as_deref(), &mut out)
        }
        Commands::Config => commands::config::execute(&session, &mut out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../dd-bundles/tests/fixtures")
            .join(name)
    }

    fn run(command: impl FnOnce(&Session, &mut Vec<u8>) -> Result<()>) -> String {
        let session = Session::new(None, false).unwrap();
        let mut out = Vec::new();
        command(&session, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_cli_arguments() {
        let cli = Cli::try_parse_from(["ddtool", "upgrade", "a.xml", "-o", "b.xml", "--lenient"])
            .unwrap();
        assert!(cli.lenient);
        match cli.command {
            Commands::Upgrade { file, output } => {
                assert_eq!(file, PathBuf::from("a.xml"));
                assert_eq!(output, Some(PathBuf::from("b.xml")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(Cli::try_parse_from(["ddtool", "parse"]).is_err());
    }

    #[test]
    fn test_kinds() {
        let output = run(|session, out| commands::kinds::execute(session, out));
        insta::assert_snapshot!(output.trim_end(), @r#"
        resources	schema http://xmlns.jcp.org/xml/ns/javaee (version 1.0)
          upgrade data-source-name (Replace)
          upgrade max-wait-time (Replace)
        sun-ejb-jar	DTD "-//Sun Microsystems, Inc.//DTD Application Server 9.0 EJB 3.0//EN"
          -//Sun Microsystems, Inc.//DTD Application Server 9.0 EJB 3.0//EN -> sun-ejb-jar_3_0-0.dtd
          -//Sun Microsystems, Inc.//DTD Application Server 8.1 EJB 2.1//EN -> sun-ejb-jar_2_1-1.dtd
          upgrade start-mdbs-with-application (Remove)
          upgrade is-cache-overflow-allowed (Remove)
        "#);
    }

    #[test]
    fn test_parse_prints_descriptor() {
        let path = fixture("sun-ejb-jar.xml");
        let output = run(|session, out| commands::parse::execute(session, &path, false, out));
        assert!(output.starts_with("SunEjbJar {"));
        assert!(output.contains("OrderListener"));
    }

    #[test]
    fn test_parse_json_summary() {
        let path = fixture("resources-legacy.xml");
        let session = Session::new(None, false).unwrap();
        let mut out = Vec::new();
        commands::parse::execute(&session, &path, true, &mut out).unwrap();

        let summary: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(summary["root"], "resources");
        assert_eq!(summary["applied_upgrades"], 2);
        assert_eq!(summary["diagnostics"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_upgrade_writes_current_doctype() {
        let path = fixture("sun-ejb-jar-2_1.xml");
        let output = run(|session, out| commands::upgrade::execute(session, &path, None, out));
        assert!(output.contains("DTD Application Server 9.0 EJB 3.0"));
        assert!(!output.contains("start-mdbs-with-application"));
    }

    #[test]
    fn test_parse_failure_is_an_error() {
        let session = Session::new(None, false).unwrap();
        let mut out = Vec::new();
        let err = commands::parse::execute(&session, &fixture("missing.xml"), false, &mut out)
            .unwrap_err();
        assert!(err.to_string().contains("missing.xml"));
        assert!(out.is_empty());
    }

    #[test]
    fn test_config_round_trips() {
        let output = run(|session, out| commands::config::execute(session, out));
        let config = dd_binding::EngineConfig::from_json_str(&output).unwrap();
        assert!(config.strict);
        assert!(config.dtd_dir.ends_with("dtds"));
    }
}
