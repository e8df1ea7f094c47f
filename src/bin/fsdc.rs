extern crate log;
extern crate simplelog;

use std::fs::File;
use std::path::Path;
use std::process::exit;

use fsdc::compiler::ast::Decl;
use fsdc::compiler::semantics::{self, Diagnostics};
use fsdc::compiler::CompilerDisplay;
use fsdc::project::Manifest;
use fsdc::*;

fn main() {
    let config = configure_cli().get_matches();

    if let Some(level) = get_log_level(&config) {
        configure_logging(level).expect("Failed to configure logger.")
    }

    let string_table = StringTable::new();

    let input = config
        .value_of("input")
        .expect("Expected an input annotation tree");
    let file = match File::open(input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error, cannot open {}: {}", input, e);
            exit(ERR_INPUT_ERROR);
        }
    };
    let tree: Vec<Decl> = match serde_json::from_reader(file) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error, cannot parse {}: {}", input, e);
            exit(ERR_INPUT_ERROR);
        }
    };

    let name = match config.value_of("name") {
        Some(n) => n.to_string(),
        None => Path::new(input)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("filesystem")
            .to_string(),
    };
    let name_id = string_table.insert(name);

    let mut diag = Diagnostics::new();
    let fs = match semantics::resolve(name_id, &tree, &string_table, &mut diag) {
        Ok(fs) => fs,
        Err(err) => {
            match err.fmt(&string_table) {
                Ok(msg) => eprintln!("{}", msg),
                Err(e) => eprintln!("Error, {}", e),
            }
            exit(ERR_SEMANTIC_ERROR);
        }
    };

    // Warnings never stop the passes, but a compilation that produced any
    // must still fail after everything has been checked.
    if !diag.is_clean() {
        eprintln!(
            "Error, compilation failed with {} warning(s)",
            diag.warnings().len()
        );
        exit(ERR_SEMANTIC_WARNING);
    }

    let manifest = match Manifest::extract(&fs, &string_table) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error, {}", e);
            exit(ERR_MANIFEST_WRITE_ERROR);
        }
    };

    match config.value_of("output") {
        Some(output) => {
            let mut file = match File::create(output) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Error, cannot create {}: {}", output, e);
                    exit(ERR_MANIFEST_WRITE_ERROR);
                }
            };
            let written = match config.value_of("emit") {
                Some("json") => manifest.write_json(&mut file).map_err(|e| e.to_string()),
                _ => manifest.write(&mut file).map_err(|e| e.to_string()),
            };
            if let Err(e) = written {
                eprintln!("Error, cannot write manifest: {}", e);
                exit(ERR_MANIFEST_WRITE_ERROR);
            }
        }
        None => {
            let rendered = match config.value_of("emit") {
                Some("json") => serde_json::to_string_pretty(&manifest).map_err(|e| e.to_string()),
                _ => serde_yaml::to_string(&manifest).map_err(|e| e.to_string()),
            };
            match rendered {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("Error, cannot write manifest: {}", e);
                    exit(ERR_MANIFEST_WRITE_ERROR);
                }
            }
        }
    }
}
