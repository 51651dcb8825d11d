use std::{env, fs::read_to_string, process::ExitCode, time::Instant};

use log::info;
use zipc::{
    analyze,
    compiler::target::{Target, TargetAbi, TargetArchitecture},
    errors::{diagnostics::ConsoleSink, errors::CompileError},
    generate,
};

const USAGE: &str = "usage: zipc [--arch x86_64|aarch64] [--abi sysv|ms-x64|aarch64-eabi] [--dump-ast] <file>";

struct Options {
    architecture: TargetArchitecture,
    abi: TargetAbi,
    dump_ast: bool,
    file: String,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Options, String> {
    let mut architecture = TargetArchitecture::X86_64;
    let mut abi = TargetAbi::SystemV;
    let mut dump_ast = false;
    let mut file = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--arch" => {
                let value = args.next().ok_or("`--arch` needs a value")?;
                architecture = value.parse()?;
            }
            "--abi" => {
                let value = args.next().ok_or("`--abi` needs a value")?;
                abi = value.parse()?;
            }
            "--dump-ast" => dump_ast = true,
            flag if flag.starts_with("--") => return Err(format!("unknown option `{}`", flag)),
            _ => {
                if file.replace(arg).is_some() {
                    return Err(String::from("only one source file can be compiled at a time"));
                }
            }
        }
    }

    Ok(Options {
        architecture,
        abi,
        dump_ast,
        file: file.ok_or("no source file given")?,
    })
}

fn run(options: &Options, source: &str, sink: &mut ConsoleSink) -> Result<String, CompileError> {
    let target = Target::new(options.architecture, options.abi)?;

    let unit = analyze(source, &options.file, sink)?;
    if options.dump_ast {
        eprintln!("{:#?}", unit);
    }

    Ok(generate(&unit, target)?)
}

fn main() -> ExitCode {
    env_logger::init();

    let options = match parse_args(env::args().skip(1)) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!("{}", USAGE);
            return ExitCode::FAILURE;
        }
    };

    let source = match read_to_string(&options.file) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("Error: cannot read `{}`: {}", options.file, error);
            return ExitCode::FAILURE;
        }
    };

    let start = Instant::now();
    let mut sink = ConsoleSink::new(Some(source.clone()));

    match run(&options, &source, &mut sink) {
        Ok(assembly) => {
            println!("{}", assembly);
            info!(
                "compiled {} in {:?} with {} warning(s)",
                options.file,
                start.elapsed(),
                sink.warning_count()
            );
            ExitCode::SUCCESS
        }
        Err(CompileError::Located(error)) => {
            sink.report_error(&error);
            ExitCode::FAILURE
        }
        Err(CompileError::Codegen(error)) => {
            eprintln!("Error: {}", error);
            ExitCode::FAILURE
        }
    }
}
