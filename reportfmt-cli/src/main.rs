use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};

use reportfmt_core::{
    ProcessOptions, ProcessOutcome, ReportProcessor, StyleConfig, ValidationMode,
};

#[derive(Parser)]
#[command(name = "reportfmt")]
#[command(about = "Normalize financial report documents against the house style guide")]
struct Args {
    /// Path to the report to process (.docx)
    #[arg(short, long)]
    input: String,

    /// Output file path (if not specified, auto-generated next to the input)
    #[arg(short, long)]
    output: Option<String>,

    /// Path to custom style config file (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Validate the processed document and report deviations
    #[arg(long)]
    validate: bool,

    /// Refuse to write the output when validation fails (implies --validate)
    #[arg(long)]
    strict: bool,

    /// Print the resolved style targets before processing
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("🦀 Reportfmt Document Formatter");

    // Check if input file exists
    let input = Path::new(&args.input);
    if !input.exists() {
        println!("⚠️  Input report not found at: {}", args.input);
        println!("   Please check the file path.");
        std::process::exit(1);
    }

    // Load config using functional pattern
    let config = StyleConfig::load_with_fallback(args.config.as_deref());

    if let Some(config_path) = &args.config {
        println!("📋 Loaded config from: {config_path}");
    } else {
        println!("📋 Using default config");
    }

    if args.verbose {
        print_targets(&config);
    }

    // Generate output path
    let output = match &args.output {
        Some(path) => PathBuf::from(path),
        None => default_output_path(input),
    };

    let options = ProcessOptions {
        validate: args.validate || args.strict,
        mode: if args.strict {
            ValidationMode::Strict
        } else {
            ValidationMode::Diagnostic
        },
    };

    let processor = ReportProcessor::new(config);
    match processor.process_path(input, &output, &options) {
        Ok(ProcessOutcome::Clean { output }) => {
            println!("✅ Successfully processed report");
            println!("💾 Formatted report saved to: {}", output.display());
        }
        Ok(ProcessOutcome::Issues { output, report_path, report }) => {
            println!(
                "⚠️  {} issue(s) remain — diagnostic copy saved to: {}",
                report.issues.len(),
                output.display()
            );
            println!("   Issue log: {}", report_path.display());
        }
        Ok(ProcessOutcome::Rejected { report }) => {
            eprintln!(
                "❌ Report rejected in strict mode: {} issue(s), no artifact written",
                report.issues.len()
            );
            std::process::exit(2);
        }
        Err(e) => {
            eprintln!("❌ Processing failed: {e}");
            std::process::exit(1);
        }
    }

    Ok(())
}

fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    input.with_file_name(format!("{stem}_processed.docx"))
}

fn print_targets(config: &StyleConfig) {
    println!("\n📐 Style targets:");
    println!(
        "   Font: {} {}pt (title {}pt)",
        config.typography.font_name, config.typography.body_size_pt, config.cover.title_size_pt
    );
    println!("   Cover start row: {}", config.cover.start_row);
    println!("   Column widths: {:?} cm", config.table.column_widths_cm);
    println!(
        "   Row height: {} cm, hanging indent: {} cm",
        config.table.row_height_cm, config.table.hanging_indent_cm
    );
    println!(
        "   Cell margins: {}/{} twips (side / top-bottom)",
        config.table.cell_margin_side_twips, config.table.cell_margin_tb_twips
    );
}
