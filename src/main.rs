//! HSA XML to LaTeX converter CLI

use clap::Parser;
use colored::Colorize;
use std::io::Write;
use std::path::PathBuf;
use std::process;

use hsa_xml2tex::{convert, ConvertConfig, ConvertError, Escaping, Progress};

#[derive(Parser)]
#[command(name = "hsa-xml2tex")]
#[command(about = "Convert Doxygen XML of the HSA runtime headers into LaTeX")]
#[command(version)]
struct Cli {
    /// Directory holding the Doxygen XML output [default: xml]
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory [default: altlatex]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit underscores as-is instead of adding hyphenation hints
    #[arg(long)]
    literal_underscores: bool,

    /// Quiet mode (suppress progress output)
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn into_config(self) -> Result<ConvertConfig, ConvertError> {
        let mut config = match &self.config {
            Some(path) => ConvertConfig::from_file(path)?,
            None => ConvertConfig::default(),
        };
        if let Some(input) = self.input {
            config.input_dir = input;
        }
        if let Some(output) = self.output {
            config.output_dir = output;
        }
        if self.literal_underscores {
            config.escaping = Escaping::Literal;
        }
        Ok(config)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let quiet = cli.quiet;

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            process::exit(1);
        }
    };

    let result = convert(&config, |progress| {
        if quiet {
            return;
        }
        match progress {
            Progress::Started(path) => {
                let name = path.file_name().unwrap_or_default().to_string_lossy();
                print!("Processing {}...", name);
                let _ = std::io::stdout().flush();
            }
            Progress::Finished(_) => println!("{}", "OK".green()),
        }
    });

    match result {
        Ok(summary) => {
            if !quiet {
                println!("\n{} Conversion complete\n", "✓".green().bold());
                println!("  {} Groups:       {}", "•".dimmed(), summary.groups);
                println!("  {} Typedefs:     {}", "•".dimmed(), summary.counts.typedefs);
                println!("  {} Structs:      {}", "•".dimmed(), summary.counts.structs);
                println!("  {} Enums:        {}", "•".dimmed(), summary.counts.enums);
                println!("  {} Functions:    {}", "•".dimmed(), summary.counts.functions);
                println!("  {} Identifiers:  {}", "•".dimmed(), summary.identifiers);
                println!("  {} Deprecated:   {}", "•".dimmed(), summary.deprecated);
                println!();
                println!("  Output: {}", summary.output_dir.display().to_string().cyan());
            }
        }
        Err(e) => {
            if !quiet {
                println!("{}", "FAILED".red());
            }
            let label = if e.is_validation() { "Validation error" } else { "Error" };
            eprintln!("{}: {}", label.red().bold(), e);
            process::exit(1);
        }
    }
}
