//! springconf CLI - Command-line interface for springconf configuration
//!
//! Usage:
//!   springconf get spring.application.name --dir config --profile development
//!   springconf dump --dir config --profile development,local --format json
//!   springconf check config/application.yml
//!   springconf docs config/application.yml --profile development

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use springconf_core::document::fetch_docs;
use springconf_core::profile::{directive, should_include};
use springconf_core::{Config, Loader, ProfileSet, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// springconf - Spring-style layered YAML configuration
#[derive(Parser)]
#[command(name = "springconf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where to load configuration from
#[derive(Args)]
struct LoadArgs {
    /// Directory holding bootstrap.yml and application*.yml
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// Active profile(s); repeat or separate with commas
    #[arg(short, long = "profile", value_delimiter = ',')]
    profiles: Vec<String>,

    /// Never contact the remote config server
    #[arg(long)]
    no_remote: bool,
}

impl LoadArgs {
    fn profile_set(&self) -> ProfileSet {
        ProfileSet::new(&self.profiles)
    }

    fn load(&self) -> Result<Config, String> {
        let mut loader = Loader::new(&self.dir).with_profiles(self.profile_set());
        if self.no_remote {
            loader = loader.without_remote_source();
        }
        loader
            .load()
            .map_err(|e| format!("Failed to load {}: {}", self.dir.display(), e))
    }
}

/// Output format of `get`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ValueFormat {
    Text,
    Json,
    Yaml,
}

/// Output format of `dump`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DumpFormat {
    Yaml,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Get a specific value from the configuration
    Get {
        /// Path to the value (e.g., spring.application.name)
        path: String,

        #[command(flatten)]
        load: LoadArgs,

        /// Show the stored value without resolving placeholders
        #[arg(long)]
        raw: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ValueFormat::Text)]
        format: ValueFormat,

        /// Default value if key not found
        #[arg(long)]
        default: Option<String>,
    },

    /// Export the merged configuration
    Dump {
        #[command(flatten)]
        load: LoadArgs,

        /// Show stored values without resolving placeholders
        #[arg(long)]
        raw: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = DumpFormat::Yaml)]
        format: DumpFormat,

        /// Write to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse files and report their document counts
    Check {
        /// Configuration file(s) to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List the documents of a file and whether the profiles select them
    Docs {
        /// Configuration file
        #[arg(required = true)]
        file: PathBuf,

        /// Active profile(s); repeat or separate with commas
        #[arg(short, long = "profile", value_delimiter = ',')]
        profiles: Vec<String>,
    },
}

/// Run the CLI with the process arguments
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Get {
            path,
            load,
            raw,
            format,
            default,
        } => cmd_get(&load, &path, raw, format, default),

        Commands::Dump {
            load,
            raw,
            format,
            output,
        } => cmd_dump(&load, raw, format, output),

        Commands::Check { files } => cmd_check(files),

        Commands::Docs { file, profiles } => cmd_docs(&file, &ProfileSet::new(&profiles)),
    }
}

fn cmd_get(
    load: &LoadArgs,
    path: &str,
    raw: bool,
    format: ValueFormat,
    default: Option<String>,
) -> ExitCode {
    let config = match load.load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e.red());
            return ExitCode::from(2);
        }
    };

    let result = if raw {
        // the root has no stored value of its own
        Ok(config
            .get_raw(path)
            .cloned()
            .or_else(|| config.has(path).then(|| Value::Mapping(config.mapping().clone()))))
    } else {
        config.try_get(path)
    };

    let value = match result {
        Ok(Some(value)) => value,
        Ok(None) => {
            return match default {
                Some(default_val) => {
                    println!("{}", default_val);
                    ExitCode::SUCCESS
                }
                None => {
                    eprintln!("{}: Path '{}' not found", "Error".red(), path);
                    ExitCode::from(1)
                }
            };
        }
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            return ExitCode::from(1);
        }
    };

    match render_value(&value, format) {
        Ok(text) => {
            print!("{}", text);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

/// Format a single value for `get`, always ending in a newline
fn render_value(value: &Value, format: ValueFormat) -> Result<String, String> {
    match format {
        ValueFormat::Json => serde_json::to_string_pretty(value)
            .map(|s| s + "\n")
            .map_err(|e| e.to_string()),
        ValueFormat::Yaml => serde_yaml::to_string(value).map_err(|e| e.to_string()),
        ValueFormat::Text => match value {
            Value::Null => Ok("null\n".to_string()),
            Value::Sequence(_) | Value::Mapping(_) => {
                serde_yaml::to_string(value).map_err(|e| e.to_string())
            }
            scalar => Ok(format!("{}\n", scalar)),
        },
    }
}

fn cmd_dump(load: &LoadArgs, raw: bool, format: DumpFormat, output: Option<PathBuf>) -> ExitCode {
    let config = match load.load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e.red());
            return ExitCode::from(2);
        }
    };

    let result = match format {
        DumpFormat::Json => config.to_json(!raw).map(|s| s + "\n"),
        DumpFormat::Yaml => config.to_yaml(!raw),
    };

    match result {
        Ok(content) => {
            if let Some(output_path) = output {
                if let Err(e) = std::fs::write(&output_path, &content) {
                    eprintln!("{}: {}", "Error writing file".red(), e);
                    return ExitCode::from(2);
                }
                eprintln!("{} Wrote to {}", "✓".green(), output_path.display());
            } else {
                print!("{}", content);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

fn read_docs(file: &Path) -> Result<Vec<springconf_core::Mapping>, String> {
    let display = file.display().to_string();
    let handle = File::open(file).map_err(|e| e.to_string())?;
    fetch_docs(BufReader::new(handle)).map_err(|e| e.in_file(&display).to_string())
}

fn cmd_check(files: Vec<PathBuf>) -> ExitCode {
    let mut all_valid = true;

    for file in files {
        match read_docs(&file) {
            Ok(docs) => {
                println!(
                    "{} {}: {} document(s)",
                    "✓".green(),
                    file.display(),
                    docs.len()
                );
            }
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red(), file.display(), e);
                all_valid = false;
            }
        }
    }

    if all_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

fn cmd_docs(file: &Path, profiles: &ProfileSet) -> ExitCode {
    let docs = match read_docs(file) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("{} {}: {}", "✗".red(), file.display(), e);
            return ExitCode::from(2);
        }
    };

    let mut included = 0;
    for (idx, doc) in docs.iter().enumerate() {
        let rule = directive(doc);
        let rule = if rule.trim().is_empty() {
            "(all profiles)".to_string()
        } else {
            rule
        };
        if should_include(doc, profiles) {
            included += 1;
            println!("{} [{}] {} ({} keys)", "✓".green(), idx, rule, doc.len());
        } else {
            println!("{} [{}] {}", "✗".dimmed(), idx, rule.dimmed());
        }
    }

    println!(
        "{} of {} document(s) apply to profiles [{}]",
        included,
        docs.len(),
        profiles
    );
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_profiles_split_on_commas() {
        let cli = Cli::parse_from([
            "springconf",
            "get",
            "a.b",
            "--profile",
            "development,local",
            "-p",
            "qa",
        ]);
        match cli.command {
            Commands::Get { load, path, .. } => {
                assert_eq!(path, "a.b");
                assert_eq!(load.profiles, vec!["development", "local", "qa"]);
                assert_eq!(load.dir, PathBuf::from("."));
            }
            _ => panic!("expected get"),
        }
    }

    #[test]
    fn test_format_defaults() {
        match Cli::parse_from(["springconf", "get", "a"]).command {
            Commands::Get { format, .. } => assert_eq!(format, ValueFormat::Text),
            _ => panic!("expected get"),
        }
        match Cli::parse_from(["springconf", "dump", "--format", "json"]).command {
            Commands::Dump { format, .. } => assert_eq!(format, DumpFormat::Json),
            _ => panic!("expected dump"),
        }
    }

    #[test]
    fn test_unknown_format_rejected() {
        let err = Cli::try_parse_from(["springconf", "get", "a", "--format", "xml"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);

        assert!(Cli::try_parse_from(["springconf", "dump", "-f", "text"]).is_err());
    }

    #[test]
    fn test_render_value_text() {
        assert_eq!(render_value(&Value::from("x"), ValueFormat::Text).unwrap(), "x\n");
        assert_eq!(render_value(&Value::Integer(3), ValueFormat::Text).unwrap(), "3\n");
        assert_eq!(render_value(&Value::Null, ValueFormat::Text).unwrap(), "null\n");
        assert_eq!(
            render_value(&Value::from(vec![1, 2]), ValueFormat::Text).unwrap(),
            "- 1\n- 2\n"
        );
    }

    #[test]
    fn test_render_value_json() {
        assert_eq!(render_value(&Value::from("x"), ValueFormat::Json).unwrap(), "\"x\"\n");
    }
}
