use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};

use wasmspy::decompile::{decompile_module, CallGraph};
use wasmspy::wasm::ImportDesc;
use wasmspy::ResolvedModule;

#[derive(Parser)]
#[command(name = "wasmspy")]
#[command(about = "WebAssembly inspector and decompiler")]
#[command(after_help = "\
examples:
  wasmspy wat module.wasm
  wasmspy decompile module.wasm
  wasmspy decompile module.wasm main
  wasmspy callgraph module.wasm
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Output WAT format (default)
    Wat {
        /// Path to the input .wasm file
        file: PathBuf,
    },
    /// Decompile to pseudocode
    Decompile {
        /// Path to the input .wasm file
        file: PathBuf,
        /// Decompile only this function (by display name)
        func: Option<String>,
    },
    /// Show the function call graph
    Callgraph {
        /// Path to the input .wasm file
        file: PathBuf,
    },
    /// Show module information
    Info {
        /// Path to the input .wasm file
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    // A bare existing file is shorthand for `wat <file>`.
    let args: Vec<String> = std::env::args().collect();
    if args.len() == 2 && !args[1].starts_with('-') && Path::new(&args[1]).is_file() {
        return run_or_report(cmd_wat(Path::new(&args[1])));
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version are successful outcomes; everything else
            // (missing argument, unknown command) exits 1.
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
            let _ = err.print();
            return code;
        }
    };

    let result = match cli.command {
        Commands::Wat { file } => cmd_wat(&file),
        Commands::Decompile { file, func } => cmd_decompile(&file, func.as_deref()),
        Commands::Callgraph { file } => cmd_callgraph(&file),
        Commands::Info { file } => cmd_info(&file),
    };
    run_or_report(result)
}

fn run_or_report(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn load(path: &Path) -> Result<ResolvedModule> {
    wasmspy::load(path).with_context(|| format!("failed to load {}", path.display()))
}

fn cmd_wat(path: &Path) -> Result<()> {
    let module = load(path)?;
    println!("{}", module.to_wat());
    Ok(())
}

fn cmd_decompile(path: &Path, func: Option<&str>) -> Result<()> {
    let module = load(path)?;

    match func {
        Some(name) => {
            let Some(function) = module.function_by_name(name) else {
                bail!("function not found: {name}");
            };
            let result = wasmspy::decompile(&module, function.index)?;
            println!("{}", result.code);
        }
        None => println!("{}", decompile_module(&module)),
    }
    Ok(())
}

fn cmd_callgraph(path: &Path) -> Result<()> {
    let module = load(path)?;
    let graph = CallGraph::build(&module);

    let rendered = graph.render(&module);
    if rendered.is_empty() {
        println!("(no calls between functions)");
    } else {
        print!("{rendered}");
    }

    let roots = graph.roots(&module);
    if !roots.is_empty() {
        let names: Vec<String> = roots
            .iter()
            .map(|&idx| match module.function(idx) {
                Some(f) if !f.name.is_empty() => f.name.clone(),
                _ => format!("func_{idx}"),
            })
            .collect();
        println!("\nentry points: {}", names.join(", "));
    }
    Ok(())
}

fn cmd_info(path: &Path) -> Result<()> {
    let module = load(path)?;

    println!("version: {}", module.version);
    println!("functions: {}", module.functions.len());
    println!("types: {}", module.types.len());
    println!("tables: {}", module.tables.len());
    println!("memories: {}", module.memories.len());
    println!("globals: {}", module.globals.len());
    println!("imports: {}", module.imported_function_count());
    println!("exports: {}", module.exports.len());

    if !module.exports.is_empty() {
        println!("\nexports:");
        for export in &module.exports {
            println!("  {} ({})", export.name, export.kind.name());
        }
    }

    if !module.imports.is_empty() {
        println!("\nimports:");
        for import in &module.imports {
            let kind = match import.desc {
                ImportDesc::Func { .. } => "func",
                ImportDesc::Table { .. } => "table",
                ImportDesc::Memory { .. } => "memory",
                ImportDesc::Global(_) => "global",
            };
            println!("  {}.{} ({kind})", import.module, import.name);
        }
    }
    Ok(())
}
