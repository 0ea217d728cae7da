#![allow(non_snake_case)]
use RustedRoots::Utils::logger::{init_logger, level_from_str, timestamped_log_name};
use RustedRoots::Utils::solver_task::SolverTask;
use RustedRoots::numerical::scalar_root_finding::{
    MethodParams, RootFindingConfig, RootFindingMethod,
};
use RustedRoots::symbolic::function::Function;
use log::{LevelFilter, error};
use std::io::{self, BufRead, Write};

const HELP: &str = "\
RustedRoots: roots of f(x) = 0 for sums of polynomial and trigonometric terms

USAGE:
    RustedRoots [--task <file>] [--loglevel <level>] [--log-file]

OPTIONS:
    --task <file>        solve the task described in <file> and exit
    --loglevel <level>   debug, info, warn, error or off (default warn)
    --log-file           also write the log to log_<date>_<time>.txt
    -h, --help           print this message

Without --task an interactive menu is shown. Functions are written like
    3x^2 - 2sin(x^3) + 0.5cos(x) - 1
Task files hold one `key: value` per line, `#` starts a comment:
    function: x^3 - x - 1
    method: false_position      # bisection, fixed_point, false_position, newton_raphson, secant
    a: 1
    b: 2
    tolerance: 1e-10            # optional, default 1e-6
    max_iterations: 200         # optional, default 100
    loglevel: info              # optional
";

#[derive(Debug, Default)]
struct CliOptions {
    task: Option<String>,
    loglevel: Option<LevelFilter>,
    log_file: bool,
    help: bool,
}

fn parse_args(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => options.help = true,
            "--log-file" => options.log_file = true,
            "--task" => {
                let path = iter.next().ok_or("--task needs a file name")?;
                options.task = Some(path.clone());
            }
            "--loglevel" => {
                let level = iter.next().ok_or("--loglevel needs a level")?;
                options.loglevel = Some(level_from_str(level).map_err(|e| e.to_string())?);
            }
            other => return Err(format!("unknown argument `{}`", other)),
        }
    }
    Ok(options)
}

fn start_logging(level: LevelFilter, to_file: bool) {
    let log_name = timestamped_log_name();
    let file = if to_file { Some(log_name.as_str()) } else { None };
    if let Err(e) = init_logger(level, file) {
        eprintln!("logging disabled: {}", e);
    }
}

/// prints `prompt` and reads one trimmed line; None at end of input
fn read_line<R: BufRead>(input: &mut R, prompt: &str) -> Option<String> {
    print!("{}", prompt);
    io::stdout().flush().ok()?;
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

/// asks again until the answer is a number; an empty answer takes `default` when there is one
fn read_number<R: BufRead>(input: &mut R, prompt: &str, default: Option<f64>) -> Option<f64> {
    loop {
        let answer = read_line(input, prompt)?;
        if answer.is_empty() {
            if let Some(value) = default {
                return Some(value);
            }
        }
        match answer.parse::<f64>() {
            Ok(value) if value.is_finite() => return Some(value),
            _ => println!("please enter a number"),
        }
    }
}

fn read_function<R: BufRead>(input: &mut R) -> Option<Function> {
    loop {
        let answer = read_line(input, "f(x) = ")?;
        match Function::parse(&answer) {
            Ok(function) => return Some(function),
            Err(e) => println!("cannot parse the function: {}", e),
        }
    }
}

fn read_config<R: BufRead>(input: &mut R) -> Option<RootFindingConfig> {
    let defaults = RootFindingConfig::default();
    loop {
        let tolerance = read_number(
            input,
            &format!("tolerance [{:e}]: ", defaults.tolerance),
            Some(defaults.tolerance),
        )?;
        let max_iterations = read_number(
            input,
            &format!("max iterations [{}]: ", defaults.max_iterations),
            Some(defaults.max_iterations as f64),
        )?;
        if max_iterations.fract() != 0.0 || max_iterations < 1.0 {
            println!("max iterations must be a positive whole number");
            continue;
        }
        match RootFindingConfig::new(tolerance, max_iterations as usize) {
            Ok(config) => return Some(config),
            Err(e) => println!("{}", e),
        }
    }
}

fn read_params<R: BufRead>(input: &mut R, method: RootFindingMethod) -> Option<MethodParams> {
    let params = match method {
        RootFindingMethod::Bisection | RootFindingMethod::FalsePosition => MethodParams::Bracket {
            a: read_number(input, "a = ", None)?,
            b: read_number(input, "b = ", None)?,
        },
        RootFindingMethod::FixedPoint | RootFindingMethod::NewtonRaphson => {
            MethodParams::Initial {
                x0: read_number(input, "x0 = ", None)?,
            }
        }
        RootFindingMethod::Secant => loop {
            let x0 = read_number(input, "x0 = ", None)?;
            let x1 = read_number(input, "x1 = ", None)?;
            if x0 != x1 {
                break MethodParams::TwoPoint { x0, x1 };
            }
            println!("the two starting points must be distinct");
        },
    };
    Some(params)
}

fn menu_choice(choice: &str) -> Option<RootFindingMethod> {
    match choice {
        "1" => Some(RootFindingMethod::Bisection),
        "2" => Some(RootFindingMethod::FixedPoint),
        "3" => Some(RootFindingMethod::FalsePosition),
        "4" => Some(RootFindingMethod::NewtonRaphson),
        "5" => Some(RootFindingMethod::Secant),
        _ => None,
    }
}

fn run_task(task: &SolverTask) {
    match task.run() {
        Ok(outcome) => println!("{}", task.summary_table(&outcome)),
        Err(e) => {
            error!("{}", e);
            println!("error: {}", e);
        }
    }
}

fn interactive<R: BufRead>(input: &mut R) {
    loop {
        println!();
        println!("1) bisection");
        println!("2) fixed point iteration (solves x = g(x), enter g)");
        println!("3) false position");
        println!("4) Newton-Raphson");
        println!("5) secant");
        println!("0) exit");
        let Some(choice) = read_line(input, "> ") else {
            return;
        };
        if choice == "0" {
            return;
        }
        let Some(method) = menu_choice(&choice) else {
            println!("choose 0-5");
            continue;
        };
        let Some(function) = read_function(input) else {
            return;
        };
        let Some(params) = read_params(input, method) else {
            return;
        };
        let Some(config) = read_config(input) else {
            return;
        };
        let task = SolverTask {
            function,
            method,
            params,
            config,
            loglevel: None,
        };
        run_task(&task);
    }
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}\n\n{}", message, HELP);
            std::process::exit(2);
        }
    };
    if options.help {
        print!("{}", HELP);
        return;
    }

    match options.task {
        Some(path) => {
            let task = match SolverTask::from_file(&path) {
                Ok(task) => task,
                Err(e) => {
                    eprintln!("{}: {}", path, e);
                    std::process::exit(1);
                }
            };
            // the command line wins over the task file
            let level = options
                .loglevel
                .or(task.loglevel)
                .unwrap_or(LevelFilter::Warn);
            start_logging(level, options.log_file);
            run_task(&task);
        }
        None => {
            start_logging(options.loglevel.unwrap_or(LevelFilter::Warn), options.log_file);
            let stdin = io::stdin();
            interactive(&mut stdin.lock());
        }
    }
}
