use sloth::{
    config::Config,
    runtime::{error::Unwind, vm::VirtualMachine},
};
use std::{
    env::{args, current_exe, var_os},
    fs::read_to_string,
    io::{Write, stdin, stdout},
    path::PathBuf,
    process::ExitCode,
};

/// Get the packaged library directory.  This is either a directory specified by the environment
/// variable SLOTH_LIB_PATH or the `lib` directory next to the executable.
fn packaged_lib_directory() -> Option<PathBuf> {
    if let Some(path) = var_os("SLOTH_LIB_PATH") {
        return Some(PathBuf::from(path));
    }

    Some(current_exe().ok()?.parent()?.join("lib"))
}

/// Create a machine over the given source with the module search paths wired up: the working
/// directory is implicit, then the configured library, then the packaged one.
fn new_machine(source: &str, config: &Config) -> VirtualMachine {
    let mut vm = VirtualMachine::new(source);

    vm.add_search_path(config.library_path());

    if let Some(packaged) = packaged_lib_directory() {
        vm.add_search_path(packaged);
    }

    vm
}

/// Run a source file to completion.
fn run_script(path: &str, config: &Config) -> ExitCode {
    let text = match read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("Error: could not read {}: {}", path, err);
            return ExitCode::FAILURE;
        }
    };

    let mut vm = new_machine(&text, config);

    match vm.run() {
        Ok(()) | Err(Unwind::Bye) => ExitCode::SUCCESS,

        Err(error) => {
            eprintln!("Error: {}", error);
            ExitCode::FAILURE
        }
    }
}

/// The transactional line REPL.  Each line is appended to the long-lived machine's stream after
/// a backup is taken; a failing line is reported and rolled back so the next one sees the state
/// that existed before it.
fn repl(config: &Config) -> ExitCode {
    println!("Sloth 0.1, type \"help <word>\" for help.");
    println!("Hit CTRL+D or type \"bye\" to quit.");

    let mut vm = new_machine("", config);

    if let Err(error) = vm.import_module("std") {
        eprintln!("Warning: standard module not loaded: {}", error);
        vm.revert();
    }

    loop {
        print!("sloth> ");

        if stdout().flush().is_err() {
            return ExitCode::FAILURE;
        }

        let mut line = String::new();

        match stdin().read_line(&mut line) {
            // End of input.
            Ok(0) => return ExitCode::SUCCESS,
            Ok(_) => {}
            Err(err) => {
                eprintln!("Error: {}", err);
                return ExitCode::FAILURE;
            }
        }

        vm.read_input(line.trim_end());

        match vm.run() {
            Ok(()) => println!("stack: {}", vm.stack()),

            Err(Unwind::Bye) => return ExitCode::SUCCESS,

            Err(error) => {
                println!("Error: {}", error);
                println!("State reverted");
                vm.revert();
            }
        }
    }
}

fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let arguments: Vec<String> = args().collect();

    if arguments.len() >= 2 {
        run_script(&arguments[1], &config)
    } else {
        repl(&config)
    }
}
