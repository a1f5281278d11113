//! gasket: compile and call metered WASM programs from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Check that a program compiles under the given params
//! gasket compile program.wasm --params params.toml
//!
//! # Compile into an in-memory store, then call it
//! gasket call program.wasm --calldata 0xdeadbeef --gas 1000000
//! ```

use clap::{Parser, Subcommand};
use env_logger::Env;
use gasket_host::{Bridge, Error, ExecutionParams, MemoryStore, ProgramId};
use log::{debug, error, info};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process;

/// Compile and call metered WASM programs.
#[derive(Parser, Debug)]
#[command(name = "gasket")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// TOML file with execution params (defaults apply to missing keys)
    #[arg(short, long, global = true, value_name = "FILE")]
    params: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a program and report the module size
    Compile {
        /// Path to the .wasm or .wat program
        #[arg(value_name = "PROGRAM")]
        program: PathBuf,
    },
    /// Compile a program, then call it once
    Call {
        /// Path to the .wasm or .wat program
        #[arg(value_name = "PROGRAM")]
        program: PathBuf,

        /// Call input as hex
        #[arg(short, long, default_value = "")]
        calldata: String,

        /// Gas available to the call
        #[arg(short, long, default_value = "1000000")]
        gas: u64,
    },
}

/// JSON report printed after a call.
#[derive(Serialize, Debug)]
struct CallReport {
    program: String,
    status: &'static str,
    output: String,
    gas_before: u64,
    gas_left: u64,
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    let params = match &args.params {
        Some(path) => match ExecutionParams::load(path) {
            Ok(p) => p,
            Err(e) => {
                error!("Failed to load params {}: {}", path.display(), e);
                process::exit(1);
            }
        },
        None => ExecutionParams::default(),
    };
    debug!("Params: {:?}", params);

    let bridge = Bridge::native();
    match args.command {
        Command::Compile { program } => {
            let wasm = read_program(&program);
            match bridge.compile(&wasm, &params) {
                Ok(module) => info!(
                    "Compiled {} ({} bytes) into a {} byte module",
                    program.display(),
                    wasm.len(),
                    module.len()
                ),
                Err(e) => {
                    error!("Compile failed: {}", e);
                    process::exit(1);
                }
            }
        }
        Command::Call {
            program,
            calldata,
            gas,
        } => {
            let wasm = read_program(&program);
            let calldata = match hex::decode(calldata.trim_start_matches("0x")) {
                Ok(data) => data,
                Err(e) => {
                    error!("Invalid calldata: {}", e);
                    process::exit(1);
                }
            };

            let id = ProgramId::from_code(&wasm);
            let mut db = MemoryStore::new();
            if let Err(e) = bridge.compile_user_wasm(&mut db, id, &wasm, &params) {
                error!("Compile failed: {}", e);
                process::exit(1);
            }
            info!("Deployed {} as {}", program.display(), id);

            let mut gas_left = gas;
            let result = bridge.call_user_wasm(&mut db, id, &calldata, &mut gas_left, &params);
            let (status, output) = match &result {
                Ok(data) => ("success", hex::encode(data)),
                Err(Error::Reverted(data)) => ("revert", hex::encode(data)),
                Err(e) => ("failure", e.to_string()),
            };

            let report = CallReport {
                program: id.to_string(),
                status,
                output,
                gas_before: gas,
                gas_left,
            };
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    error!("Failed to encode report: {}", e);
                    process::exit(1);
                }
            }

            if let Err(e) = result {
                if e.is_fatal() {
                    error!("Fatal: {}", e);
                }
                process::exit(1);
            }
        }
    }
}

fn read_program(path: &Path) -> Vec<u8> {
    if !path.is_file() {
        error!("Program not found: {}", path.display());
        process::exit(1);
    }
    match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            error!("Failed to read {}: {}", path.display(), e);
            process::exit(1);
        }
    }
}
