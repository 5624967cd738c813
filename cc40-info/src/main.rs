/// cc40-info
///
/// Companion tool for the CC40 cartridge reader.  The reader speaks a plain
/// serial protocol; log a session with any terminal program (banner plus a
/// hex-format dump) and point this tool at the log to:
/// - report what the reader detected (`info`)
/// - decode the hex dump back into a binary image (`extract`)

// Copyright (C) 2025 RETRO Innovations
//
// GPL-2.0 License

mod args;
mod capture;

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::fs;
use std::path::Path;

use args::{Cli, Commands};
use capture::Capture;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Info { capture } => info(&capture),
        Commands::Extract {
            capture,
            output,
            expect_size,
        } => extract(&capture, &output, expect_size),
    }
}

fn load_capture(path: &Path) -> Result<Capture> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read capture: {}", path.display()))?;
    Capture::parse(&text)
        .with_context(|| format!("Failed to parse capture: {}", path.display()))
}

fn info(path: &Path) -> Result<()> {
    let capture = load_capture(path)?;

    println!("CC40 Cartridge Reader - Session Capture");
    println!("=======================================");
    println!();
    println!("Reader version: {}", capture.version.as_deref().unwrap_or("<unknown>"));
    print_size("ROM size:      ", capture.rom_size);
    print_size("RAM size:      ", capture.ram_size);
    println!();
    println!("Bank-select lines");
    println!("-----------------");
    if capture.findings.is_empty() {
        println!("<no bank-line report in capture>");
    }
    for finding in &capture.findings {
        let verdict = if finding.affects {
            "affects"
        } else {
            "does not affect"
        };
        println!("{} {} {} contents", finding.line, verdict, finding.chip);
    }
    println!();
    println!("Dump data:      {} byte(s)", capture.data.len());

    Ok(())
}

fn print_size(label: &str, size: Option<u32>) {
    match size {
        Some(size) => println!("{}{} bytes (${:04X})", label, size, size),
        None => println!("{}<not reported>", label),
    }
}

fn extract(path: &Path, output: &Path, expect_size: Option<u32>) -> Result<()> {
    let capture = load_capture(path)?;

    if capture.data.is_empty() {
        bail!(
            "No hex dump data in {} - was the session captured in binary format?",
            path.display()
        );
    }
    if let Some(expected) = expect_size {
        if capture.data.len() != expected as usize {
            bail!(
                "Decoded {} byte(s) but expected {}",
                capture.data.len(),
                expected
            );
        }
    }

    fs::write(output, &capture.data)
        .with_context(|| format!("Failed to write image: {}", output.display()))?;
    println!(
        "Wrote {} byte(s) to {}",
        capture.data.len(),
        output.display()
    );

    Ok(())
}
