use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use apollo_compiler::Name;
use apollo_compiler::Schema;
use apollo_compiler::validation::Valid;
use clap::Parser;
use graphql_replaces::BindingHint;
use graphql_replaces::ReplacesOptions;
use tracing::debug;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// CLI arguments. See <https://docs.rs/clap/latest/clap/_derive/index.html>
#[derive(Parser)]
struct Args {
    /// Log level (off|error|warn|info|debug|trace). `RUST_LOG` takes precedence.
    #[arg(long = "log", default_value = "warn", global = true)]
    log_level: String,

    #[command(flatten)]
    directives: DirectiveArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct DirectiveArgs {
    /// The rename marker directive. Its definition is added unless a schema file declares it
    #[arg(long, default_value = "replaces", value_parser = parse_name, global = true)]
    marker_directive: Name,

    /// The federation key directive, whose `fields` are rewritten for renamed fields
    #[arg(long, default_value = "key", value_parser = parse_name, global = true)]
    key_directive: Name,

    /// Prefix of the `@goField(name:)` hint added to old fields
    #[arg(long, default_value = "Deprecated", global = true)]
    binding_hint_prefix: String,

    /// Don't add `@goField(name:)` hints to old fields
    #[arg(long, global = true)]
    no_binding_hint: bool,
}

impl DirectiveArgs {
    fn options(&self) -> ReplacesOptions {
        ReplacesOptions {
            marker_directive: self.marker_directive.clone(),
            key_directive: self.key_directive.clone(),
            binding_hint: (!self.no_binding_hint).then(|| BindingHint {
                prefix: self.binding_hint_prefix.clone(),
                ..BindingHint::default()
            }),
        }
    }
}

#[derive(clap::Subcommand)]
enum Command {
    /// Checks every @replaces usage, printing all problems
    Validate {
        /// Paths to the schema files, or `-` for stdin
        #[arg(required = true)]
        schemas: Vec<PathBuf>,
    },
    /// Prints the SDL adding the old names back as deprecated elements
    Overlay {
        /// Paths to the schema files, or `-` for stdin
        #[arg(required = true)]
        schemas: Vec<PathBuf>,
        /// Write the overlay to this file instead of stdout. An existing file is removed when
        /// nothing is renamed.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Prints renamed object and input object types and fields as JSON
    Renames {
        /// Paths to the schema files, or `-` for stdin
        #[arg(required = true)]
        schemas: Vec<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;
    let options = args.directives.options();
    match args.command {
        Command::Validate { schemas } => validate(&schemas, options),
        Command::Overlay { schemas, output } => overlay(&schemas, output.as_deref(), options),
        Command::Renames { schemas } => renames(&schemas, options),
    }
}

fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_owned());
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_new(&env_filter).context("could not parse log level")?)
        .init();
    Ok(())
}

fn parse_name(name: &str) -> Result<Name, String> {
    Name::new(name).map_err(|_| format!("\"{name}\" is not a valid GraphQL name"))
}

fn validate(schemas: &[PathBuf], options: ReplacesOptions) -> anyhow::Result<()> {
    let schema = read_schema(schemas, &options)?;
    graphql_replaces::validate(&schema, options)?;
    info!("no @replaces errors");
    Ok(())
}

fn overlay(
    schemas: &[PathBuf],
    output: Option<&Path>,
    options: ReplacesOptions,
) -> anyhow::Result<()> {
    let schema = read_schema(schemas, &options)?;
    let overlay = graphql_replaces::compute_overlay(&schema, options)?;
    match output {
        Some(output) => write_overlay(&overlay, output),
        None => {
            print!("{overlay}");
            Ok(())
        }
    }
}

fn write_overlay(overlay: &str, output: &Path) -> anyhow::Result<()> {
    if overlay.is_empty() {
        return match fs::remove_file(output) {
            Ok(()) => {
                info!(path = %output.display(), "nothing is renamed, removed stale overlay");
                Ok(())
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error)
                .with_context(|| format!("could not remove {}", output.display())),
        };
    }
    fs::write(output, overlay).with_context(|| format!("could not write {}", output.display()))?;
    info!(path = %output.display(), "wrote overlay");
    Ok(())
}

fn renames(schemas: &[PathBuf], options: ReplacesOptions) -> anyhow::Result<()> {
    let schema = read_schema(schemas, &options)?;
    let table = graphql_replaces::rename_table(&schema, options)?;
    println!("{}", serde_json::to_string_pretty(&table)?);
    Ok(())
}

fn read_schema(paths: &[PathBuf], options: &ReplacesOptions) -> anyhow::Result<Valid<Schema>> {
    let sources = paths
        .iter()
        .map(|path| -> anyhow::Result<(String, PathBuf)> {
            debug!(path = %path.display(), "reading schema");
            let source = if path == Path::new("-") {
                io::read_to_string(io::stdin()).context("could not read stdin")?
            } else {
                fs::read_to_string(path)
                    .with_context(|| format!("could not read {}", path.display()))?
            };
            Ok((source, path.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(graphql_replaces::parse_schema(&sources, options)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"
        type Query { course: Course }
        type Course { kaLocale: String @replaces(name: "locale") }
    "#;

    fn write_schema(dir: &tempfile::TempDir, sdl: &str) -> PathBuf {
        let path = dir.path().join("schema.graphql");
        fs::write(&path, sdl).expect("writes schema");
        path
    }

    #[test]
    fn writes_the_overlay() {
        let dir = tempfile::tempdir().expect("creates temp dir");
        let schema = write_schema(&dir, SCHEMA);
        let output = dir.path().join("deprecated.graphql");
        overlay(&[schema], Some(output.as_path()), ReplacesOptions::default()).expect("overlay");
        insta::assert_snapshot!(fs::read_to_string(&output).expect("reads overlay"), @r###"
        extend type Course {
            locale: String @deprecated(reason: "Replaced by kaLocale.") @goField(name: "DeprecatedLocale")
        }
        "###);
    }

    #[test]
    fn removes_a_stale_overlay_when_nothing_is_renamed() {
        let dir = tempfile::tempdir().expect("creates temp dir");
        let schema = write_schema(&dir, "type Query { ok: Boolean }");
        let output = dir.path().join("deprecated.graphql");
        fs::write(&output, "extend type Course { locale: String }").expect("writes overlay");
        overlay(&[schema.clone()], Some(output.as_path()), ReplacesOptions::default())
            .expect("overlay");
        assert!(!output.exists());

        // Nothing to remove the second time around.
        overlay(&[schema], Some(output.as_path()), ReplacesOptions::default()).expect("overlay");
        assert!(!output.exists());
    }

    #[test]
    fn refuses_to_write_when_there_are_errors() {
        let dir = tempfile::tempdir().expect("creates temp dir");
        let schema = write_schema(
            &dir,
            r#"
            type Query { ok: Boolean }
            input SomeInput { newArg: String! @replaces(name: "oldArg") }
            "#,
        );
        let output = dir.path().join("deprecated.graphql");
        let error = overlay(&[schema], Some(output.as_path()), ReplacesOptions::default())
            .expect_err("invalid markers");
        assert!(!output.exists());
        insta::assert_snapshot!(error, @r###"
        The following errors occurred:
          - input fields using the @replaces directive must be nullable (field "SomeInput.newArg")
          - @replaces directive on non-list input fields must include treatZeroAsUnset:true or treatZeroAsUnset:false (field "SomeInput.newArg")
        "###);
    }

    #[test]
    fn maps_flags_onto_options() {
        let args = Args::parse_from([
            "graphql-replaces-cli",
            "overlay",
            "schema.graphql",
            "--marker-directive",
            "renamedFrom",
            "--no-binding-hint",
        ]);
        let options = args.directives.options();
        assert_eq!(options.marker_directive.as_str(), "renamedFrom");
        assert_eq!(options.key_directive.as_str(), "key");
        assert_eq!(options.binding_hint, None);

        let args = Args::parse_from([
            "graphql-replaces-cli",
            "validate",
            "schema.graphql",
            "--binding-hint-prefix",
            "Old",
        ]);
        let hint = args.directives.options().binding_hint.expect("hint");
        assert_eq!(hint.prefix, "Old");
        assert_eq!(hint.directive.as_str(), "goField");
    }

    #[test]
    fn declares_a_configured_marker_directive() {
        let dir = tempfile::tempdir().expect("creates temp dir");
        let schema = write_schema(
            &dir,
            r#"
            type Query { course: Course }
            type Course { kaLocale: String @renamedFrom(name: "locale") }
            "#,
        );
        let output = dir.path().join("deprecated.graphql");
        let args = Args::parse_from([
            "graphql-replaces-cli",
            "overlay",
            "schema.graphql",
            "--marker-directive",
            "renamedFrom",
            "--no-binding-hint",
        ]);
        overlay(&[schema], Some(output.as_path()), args.directives.options()).expect("overlay");
        insta::assert_snapshot!(fs::read_to_string(&output).expect("reads overlay"), @r###"
        extend type Course {
            locale: String @deprecated(reason: "Replaced by kaLocale.")
        }
        "###);
    }

    #[test]
    fn rejects_invalid_directive_names() {
        assert!(
            Args::try_parse_from([
                "graphql-replaces-cli",
                "validate",
                "schema.graphql",
                "--marker-directive",
                "not a name",
            ])
            .is_err()
        );
    }
}
