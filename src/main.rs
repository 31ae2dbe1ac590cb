use anyhow::Result;
use clap::Parser;
use pkgscope::commands::{self, config::Config};
use std::path::PathBuf;

/// pkgscope - find the package a file belongs to
///
/// Locates the nearest package.json above a file (checking that packages
/// inside node_modules declare the name their location implies) and reports
/// the package identity, main entry and exported paths.
///
/// Examples:
///   pkgscope info node_modules/foo/lib/a.js
///   pkgscope check node_modules/foo/lib/a.js
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Do not search for package.json above this directory (also via PKGSCOPE_BASEDIR)
    #[arg(
        long = "basedir",
        short = 'b',
        env = "PKGSCOPE_BASEDIR",
        value_name = "PATH",
        global = true
    )]
    pub basedir: Option<PathBuf>,

    /// Print diagnostic messages
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Show package metadata for a file as JSON
    Info(PathArgs),

    /// List the export patterns of the package containing a file
    Exports(PathArgs),

    /// Check whether a file is exported by its package
    Check(PathArgs),
}

#[derive(clap::Args, Debug)]
pub struct PathArgs {
    /// File or directory inside the package
    #[arg(value_name = "PATH")]
    pub path: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = Config::new(pkgscope::runtime::RealRuntime, cli.basedir)?;

    match cli.command {
        Commands::Info(args) => commands::info(&config, &args.path)?,
        Commands::Exports(args) => commands::exports(&config, &args.path)?,
        Commands::Check(args) => {
            commands::check(&config, &args.path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_info_parsing() {
        let cli = Cli::try_parse_from(["pkgscope", "info", "lib/a.js"]).unwrap();
        match cli.command {
            Commands::Info(args) => {
                assert_eq!(args.path, PathBuf::from("lib/a.js"));
            }
            _ => panic!("Expected Info command"),
        }
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_check_parsing() {
        let cli = Cli::try_parse_from(["pkgscope", "check", "lib/a.js", "-v"]).unwrap();
        match cli.command {
            Commands::Check(args) => {
                assert_eq!(args.path, PathBuf::from("lib/a.js"));
            }
            _ => panic!("Expected Check command"),
        }
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_basedir_parsing() {
        let cli =
            Cli::try_parse_from(["pkgscope", "exports", "lib/a.js", "--basedir", "/tmp"]).unwrap();
        assert!(matches!(cli.command, Commands::Exports(_)));
        assert_eq!(cli.basedir, Some(PathBuf::from("/tmp")));
    }

    #[test]
    fn test_cli_global_basedir_parsing() {
        let cli = Cli::try_parse_from(["pkgscope", "--basedir", "/tmp", "info", "a.js"]).unwrap();
        assert_eq!(cli.basedir, Some(PathBuf::from("/tmp")));
    }

    #[test]
    fn test_cli_missing_path_fails() {
        assert!(Cli::try_parse_from(["pkgscope", "info"]).is_err());
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        assert!(Cli::try_parse_from(["pkgscope", "lib/a.js"]).is_err());
    }
}
