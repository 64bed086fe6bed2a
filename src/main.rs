use clap::Parser;
use std::collections::HashMap;
use std::io::Read;

use just_cmake::cmake::{Cmake, CmakeOptions};

#[derive(Parser)]
#[command(name = "just-cmake")]
#[command(about = "A simulated CMake script environment")]
#[command(version)]
struct Cli {
    /// Execute the script from command line argument
    #[arg(short = 'c')]
    script: Option<String>,

    /// Define a variable before the script runs
    #[arg(short = 'D', value_name = "VAR=VALUE")]
    defines: Vec<String>,

    /// Output results as JSON (stdout, stderr, exitCode)
    #[arg(long = "json")]
    json: bool,

    /// Script file to execute
    #[arg()]
    script_file: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    // Determine script source: -c, file, or stdin
    let script = if let Some(s) = cli.script {
        s
    } else if let Some(ref file) = cli.script_file {
        match std::fs::read_to_string(file) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error: Cannot read script file: {}: {}", file, e);
                std::process::exit(1);
            }
        }
    } else {
        use std::io::IsTerminal;
        if std::io::stdin().is_terminal() {
            eprintln!(
                "Error: No script provided. Use -c 'script', provide a script file, or pipe via stdin."
            );
            std::process::exit(1);
        }
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).unwrap_or_default();
        buf
    };

    let mut vars = HashMap::new();
    for define in &cli.defines {
        match define.split_once('=') {
            Some((name, value)) => {
                vars.insert(name.to_string(), value.to_string());
            }
            None => {
                vars.insert(define.clone(), "1".to_string());
            }
        }
    }

    let script_name = cli.script_file.clone();
    let mut cmake = Cmake::new(CmakeOptions {
        vars: Some(vars),
        script_name,
        ..Default::default()
    });

    let result = cmake.exec(&script);

    if cli.json {
        println!(
            "{}",
            serde_json::json!({
                "stdout": result.stdout,
                "stderr": result.stderr,
                "exitCode": result.exit_code,
            })
        );
    } else {
        if !result.stdout.is_empty() {
            print!("{}", result.stdout);
        }
        if !result.stderr.is_empty() {
            eprint!("{}", result.stderr);
        }
    }

    std::process::exit(result.exit_code);
}
