use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

use tsdoctor::{
    fix_diagnostics, generate_types, DiagnosticsSource, FixOptions, GenTypesOptions,
};

#[derive(Parser)]
#[command(name = "tsdoctor")]
#[command(author, version, about = "Maintenance tools for TypeScript codebases over SQL migrations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the typed data-access interface from migration files
    GenTypes {
        /// Directory containing the ordered migration files
        #[arg(short, long, default_value = "supabase/migrations")]
        migrations: PathBuf,

        /// Output path for the generated declaration file
        #[arg(short, long, default_value = "lib/database.types.ts")]
        output: PathBuf,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Rewrite source lines implicated by known type-checker diagnostics
    Fix {
        /// Read diagnostics from this file instead of running the type
        /// checker ("-" for stdin)
        #[arg(short, long)]
        diagnostics: Option<PathBuf>,

        /// Directory the type checker runs in
        #[arg(short, long, default_value = ".")]
        project_dir: PathBuf,

        /// Only patch files whose diagnostic path starts with this prefix
        #[arg(short, long)]
        scope: Option<PathBuf>,

        /// Module specifier for the helper-type import
        #[arg(long, default_value = "@/lib/database.types")]
        import_from: String,

        /// Re-run the type checker afterwards and report the remaining count
        #[arg(long)]
        recheck: bool,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::GenTypes {
            migrations,
            output,
            verbose,
        } => {
            let options = GenTypesOptions {
                migrations_dir: migrations,
                output_path: output.clone(),
                verbose,
            };

            let summary = generate_types(&options)?;
            println!(
                "Generated {} table type(s) and {} enum(s) from {} document(s) into {}",
                summary.tables,
                summary.enums,
                summary.documents,
                output.display()
            );
        }

        Commands::Fix {
            diagnostics,
            project_dir,
            scope,
            import_from,
            recheck,
            verbose,
        } => {
            let source = match diagnostics {
                Some(path) if path.as_os_str() == "-" => DiagnosticsSource::Stdin,
                Some(path) => DiagnosticsSource::File(path),
                None => DiagnosticsSource::TypeChecker,
            };

            let options = FixOptions {
                project_dir,
                source,
                scope,
                import_from,
                recheck,
                verbose,
            };

            let summary = fix_diagnostics(&options)?;
            println!(
                "Patched {} file(s): {} assertion(s), {} error cast(s), {} parameter annotation(s), {} suppression(s), {} import(s)",
                summary.files_patched,
                summary.counts.assertions,
                summary.counts.error_casts,
                summary.counts.param_annotations,
                summary.counts.suppressions,
                summary.counts.imports
            );
            println!(
                "Skipped {} unsupported diagnostic(s), {} unmatched site(s), {} unreadable file(s)",
                summary.unsupported, summary.counts.skipped, summary.files_skipped
            );
            if let Some(remaining) = summary.remaining_errors {
                println!("{} diagnostic(s) remaining after recheck", remaining);
            }
        }
    }

    Ok(())
}
