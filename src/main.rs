use std::{env, fs, process};

use anyhow::{bail, Context};

use treep::interpreter::Value;

enum Mode {
    Run,
    Expand,
    Json,
    Check,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let (mode, path) = match args.iter().map(String::as_str).collect::<Vec<_>>()[..] {
        [path] => (Mode::Run, path),
        ["--expand", path] => (Mode::Expand, path),
        ["--json", path] => (Mode::Json, path),
        ["--check", path] => (Mode::Check, path),
        _ => bail!("usage: treep [--expand | --json | --check] <file.tp>"),
    };

    let source = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;

    match mode {
        Mode::Expand => {
            let tree = treep::expand_source(&source)?;
            println!("{tree}");
        }
        Mode::Json => {
            let tree = treep::expand_source(&source)?;
            println!("{}", serde_json::to_string_pretty(&treep::element::to_json(&tree))?);
        }
        Mode::Check => {
            let (_tree, env) = treep::check_source(&source)?;
            let mut bindings: Vec<_> = env
                .local_bindings()
                .map(|(name, scheme)| (name.clone(), scheme.pretty()))
                .collect();
            bindings.sort();
            for (name, ty) in bindings {
                println!("{name} : {ty}");
            }
        }
        Mode::Run => {
            let value = treep::run_source(&source)?;
            if let Value::Int(code) = value {
                process::exit(code as i32);
            }
        }
    }

    Ok(())
}
