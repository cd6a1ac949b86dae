use clap::Parser;
use log::{Level, Log, Metadata, Record};
use std::path::Path;
use std::process;
use tmsim::loader::ProgramLoader;
use tmsim::machine::{Configuration, TuringMachine};
use tmsim::{BlankWrites, Outcome, TransitionTable, DEFAULT_MAX_STEPS};

#[derive(Parser)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    /// The Turing machine program file to execute
    #[clap(short, long)]
    program: String,

    /// Replaces the program's initial tape, one symbol per character
    #[clap(short, long)]
    input: Option<String>,

    /// Maximum number of steps before giving up
    #[clap(short, long, default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: usize,

    /// Let rules that write the blank symbol erase the cell
    #[clap(short, long)]
    erase_blanks: bool,

    /// Print each step of the execution
    #[clap(short = 'd', long)]
    debug: bool,

    /// Print configurations as JSON
    #[clap(short, long)]
    json: bool,
}

/// Writes log records to stderr.
struct StderrLogger {
    level: Level,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

fn init_logger(debug: bool) {
    let level = if debug { Level::Debug } else { Level::Warn };
    let logger = Box::new(StderrLogger { level });

    if log::set_boxed_logger(logger).is_ok() {
        log::set_max_level(level.to_level_filter());
    }
}

fn print_configuration(config: &Configuration, blank: &str, json: bool) {
    if json {
        match serde_json::to_string(config) {
            Ok(line) => println!("{}", line),
            Err(e) => log::error!("Failed to serialize configuration: {}", e),
        }
        return;
    }

    println!(
        "Step: {}, State: {}, Tape: {}, Head: {}",
        config.step_count,
        config.state,
        config.tape_string(blank),
        config.head
    );
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.debug);

    let program = match ProgramLoader::load_program(Path::new(&cli.program)) {
        Ok(program) => program,
        Err(e) => {
            log::error!("{}", e);
            process::exit(1);
        }
    };

    for warning in &program.warnings {
        log::warn!("{}", warning);
    }

    let blank_writes = if cli.erase_blanks {
        BlankWrites::Overwrite
    } else {
        BlankWrites::Skip
    };
    let table = match TransitionTable::new(&program) {
        Ok(table) => table.with_blank_writes(blank_writes),
        Err(e) => {
            log::error!("{}", e);
            process::exit(1);
        }
    };

    let mut machine = TuringMachine::with_table(table, tmsim::initialize(&program));
    if let Some(input) = &cli.input {
        machine.set_tape(input.chars().map(String::from).collect());
    }

    let blank = program.blank.clone();
    let outcome = if cli.debug {
        print_configuration(machine.configuration(), &blank, cli.json);
        machine.run_with(cli.max_steps, |config| {
            print_configuration(config, &blank, cli.json)
        })
    } else {
        machine.run(cli.max_steps)
    };

    if !cli.debug && cli.json {
        print_configuration(machine.configuration(), &blank, true);
    }

    match &outcome {
        Outcome::Halted => {
            println!("{}", machine.tape_string());
        }
        Outcome::Errored(rejection) => {
            println!("{}", machine.tape_string());
            log::error!("{}", rejection);
            process::exit(1);
        }
        Outcome::StepLimit(limit) => {
            println!("{}", machine.tape_string());
            log::error!("Machine did not halt within {} steps", limit);
            process::exit(1);
        }
    }
}
