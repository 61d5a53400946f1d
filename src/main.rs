use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use miette::{IntoDiagnostic, Result};
use simple_logger::SimpleLogger;

use lc3::output::format_registers;
use lc3::{Console, Image, Instruction, Machine, Ram, Terminal};

/// Run programs for the LC3 educational computer.
#[derive(Parser)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Quickly provide an image file to run
    path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a binary image, loaded and started at address 0x3000
    Run {
        /// Image of little-endian 16-bit words
        name: PathBuf,
        /// Produce minimal output, suited for blackbox tests
        #[arg(short, long)]
        minimal: bool,
        /// Print registers to stderr once the machine stops
        #[arg(short, long)]
        registers: bool,
    },
    /// Print every word of an image with its address and disassembly
    Dump {
        /// Image of little-endian 16-bit words
        name: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    lc3::env::init();

    if let Some(level) = lc3::env::log_level() {
        SimpleLogger::new().with_level(level).init().into_diagnostic()?;
    }

    match args.command {
        Some(Command::Run {
            name,
            minimal,
            registers,
        }) => run(&name, minimal || lc3::env::is_minimal(), registers),
        Some(Command::Dump { name }) => dump(&name),
        None => {
            if let Some(path) = args.path {
                run(&path, lc3::env::is_minimal(), false)
            } else {
                println!("\n~ lc3 v{VERSION} ~");
                println!("{SHORT_INFO}");
                Ok(())
            }
        }
    }
}

enum MsgColor {
    Green,
    Cyan,
    Red,
}

fn file_message(color: MsgColor, left: &str, right: &PathBuf) {
    let right = format!("target {}", right.display());
    message(color, left, &right);
}

fn message<S>(color: MsgColor, left: S, right: S)
where
    S: Colorize + std::fmt::Display,
{
    let left = match color {
        MsgColor::Green => left.green(),
        MsgColor::Cyan => left.cyan(),
        MsgColor::Red => left.red(),
    };
    println!("{left:>12} {right}");
}

fn run(name: &PathBuf, minimal: bool, show_registers: bool) -> Result<()> {
    if !minimal {
        file_message(MsgColor::Green, "Loading", name);
    }
    let image = Image::read(name).into_diagnostic()?;
    let mut ram = Ram::new();
    image.load_into(&mut ram);

    let mut machine = Machine::new(ram, Terminal::new());
    if !minimal {
        message(MsgColor::Green, "Running", "loaded image");
    }
    let result = machine.run();
    machine.console_mut().flush();

    if show_registers {
        eprint!("{}", format_registers(machine.registers(), minimal));
    }

    match result {
        Ok(()) => {
            if !minimal {
                file_message(MsgColor::Cyan, "Halted", name);
            }
            Ok(())
        }
        // Already reported by the machine
        Err(_) => {
            if !minimal {
                file_message(MsgColor::Red, "Aborted", name);
            }
            std::process::exit(1)
        }
    }
}

fn dump(name: &PathBuf) -> Result<()> {
    let image = Image::read(name).into_diagnostic()?;
    for (addr, word) in image.iter() {
        match Instruction::decode(word) {
            Some(instruction) => println!("0x{addr:04x}  0x{word:04x}  {instruction}"),
            None => println!("0x{addr:04x}  0x{word:04x}"),
        }
    }
    Ok(())
}

const SHORT_INFO: &str = r"
Welcome to lc3, an interpreter for images built for the LC3 educational computer.
Please use `-h` or `--help` to access the usage instructions and documentation.
";

const VERSION: &str = env!("CARGO_PKG_VERSION");
