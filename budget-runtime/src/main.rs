use anyhow::{anyhow, Context, Result};
use budget_puzzles::{Answer, GeneratorConfig, Instance, Puzzle};
use budget_utils::{dejsonify, jsonify, jsonify_pretty, seed_from_str};
use clap::{arg, ArgAction, Command};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::{fs, io::Read, path::PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("budget-runtime")
        .about("Generates, solves and verifies budget allocation puzzles")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("generate_instance")
                .about("Generates a puzzle instance and its expected solution")
                .arg(
                    arg!(<CONFIG> "Generator config json string or path to json file")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(<SEED> "Integer seed, or any string to be hashed into one")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--output [OUTPUT_FILE] "If set, the puzzle will be saved to this file path")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(arg!(--pretty "Pretty print the json output").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("compute_solution")
                .about("Solves an instance exactly and counts its optimal selections")
                .arg(
                    arg!(<INSTANCE> "Instance json string, path to json file, or '-' for stdin")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--output [OUTPUT_FILE] "If set, the solution will be saved to this file path")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(arg!(--pretty "Pretty print the json output").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("verify_solution")
                .about("Regenerates a puzzle from its seed and verifies an answer against it")
                .arg(
                    arg!(<CONFIG> "Generator config json string or path to json file")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(<SEED> "Integer seed, or any string to be hashed into one")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(<ANSWER> "Answer json string, path to json file, or '-' for stdin")
                        .value_parser(clap::value_parser!(String)),
                ),
        )
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();

    if let Err(e) = match matches.subcommand() {
        Some(("generate_instance", sub_m)) => generate_instance(
            sub_m.get_one::<String>("CONFIG").unwrap(),
            sub_m.get_one::<String>("SEED").unwrap(),
            sub_m.get_one::<PathBuf>("output").cloned(),
            sub_m.get_flag("pretty"),
        ),
        Some(("compute_solution", sub_m)) => compute_solution(
            sub_m.get_one::<String>("INSTANCE").unwrap(),
            sub_m.get_one::<PathBuf>("output").cloned(),
            sub_m.get_flag("pretty"),
        ),
        Some(("verify_solution", sub_m)) => verify_solution(
            sub_m.get_one::<String>("CONFIG").unwrap(),
            sub_m.get_one::<String>("SEED").unwrap(),
            sub_m.get_one::<String>("ANSWER").unwrap(),
        ),
        _ => Err(anyhow!("Invalid subcommand")),
    } {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

pub fn generate_instance(
    config: &str,
    seed: &str,
    output_file: Option<PathBuf>,
    pretty: bool,
) -> Result<()> {
    let config: GeneratorConfig = load_json(config, "config")?;
    let seed = parse_seed(seed);
    debug!(seed, mode = %config.mode, "generating instance");
    let puzzle = Puzzle::generate_instance(seed, &config)?;
    write_output(&puzzle, output_file, pretty)
}

pub fn compute_solution(instance: &str, output_file: Option<PathBuf>, pretty: bool) -> Result<()> {
    let instance: Instance = load_json(instance, "instance")?;
    instance.validate()?;
    let optimum = instance.solve();
    info!(
        max_return = optimum.max_return,
        solution_count = optimum.solution_count,
        "solved instance"
    );
    write_output(&optimum, output_file, pretty)
}

pub fn verify_solution(config: &str, seed: &str, answer: &str) -> Result<()> {
    let config: GeneratorConfig = load_json(config, "config")?;
    let puzzle = Puzzle::generate_instance(parse_seed(seed), &config)?;
    let answer: Map<String, Value> = load_json(answer, "answer")?;
    let answer = Answer::try_from(answer).context("Invalid answer. Cannot convert to Answer")?;
    puzzle.verify_answer(&answer).context("Invalid answer")?;
    println!("Answer is valid");
    Ok(())
}

/// Integer seeds are used as is; anything else goes through blake3.
fn parse_seed(seed: &str) -> u64 {
    seed.parse::<u64>().unwrap_or_else(|_| seed_from_str(seed))
}

fn load_json<T: DeserializeOwned>(input: &str, what: &str) -> Result<T> {
    let input = if input == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .with_context(|| format!("Failed to read {} from stdin", what))?;
        buffer
    } else if input.ends_with(".json") {
        fs::read_to_string(input).with_context(|| format!("Failed to read {} file: {}", what, input))?
    } else {
        input.to_string()
    };
    dejsonify::<T>(&input).with_context(|| format!("Failed to parse {}", what))
}

fn write_output<T: Serialize>(obj: &T, output_file: Option<PathBuf>, pretty: bool) -> Result<()> {
    let json = if pretty {
        jsonify_pretty(obj)?
    } else {
        jsonify(obj)?
    };
    match output_file {
        Some(path) => {
            fs::write(&path, json)?;
            eprintln!("output written to: {:?}", path);
        }
        None => println!("{}", json),
    }
    Ok(())
}
