mod config;
mod display;
mod error;
mod msg;
mod rom;

use color_print::cprintln;
use config::{Config, Format};
use error::Error;
use rom::FileRom;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;
use xse::ast::Resolver;
use xse::Options;

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {author}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(author, version, about, help_template = HELP_TEMPLATE)]
struct Args {
    #[clap(subcommand)]
    command: Command,

    /// YAML config file
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,

    /// One of `TRACE`, `DEBUG`, `INFO`, `WARN`, or `ERROR`
    #[clap(short, long, global = true, default_value_t = Level::INFO)]
    log_level: Level,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    /// Compile a script against a ROM image
    Compile {
        /// Script file
        script: PathBuf,

        /// ROM image searched for free space
        #[clap(short, long)]
        rom: PathBuf,

        /// Write blocks and erase directives into the ROM
        #[clap(short, long)]
        write: bool,

        /// Dump the placed blocks
        #[clap(short, long)]
        dump: bool,

        /// Print the compile result as JSON
        #[clap(long)]
        json: bool,

        /// Dynamic base for scripts without `#dynamic`
        #[clap(long, value_parser = parse_address)]
        dynamic: Option<u32>,

        /// Do not add the bank bias to pointers
        #[clap(long)]
        no_autobank: bool,
    },

    /// Decompile the script at an address
    Decompile {
        /// ROM image
        rom: PathBuf,

        /// Script offset, hex with or without `0x`
        #[clap(value_parser = parse_address)]
        address: u32,

        /// Output file (default: stdout)
        #[clap(short, long)]
        output: Option<PathBuf>,

        /// Print the decompiled blocks as JSON
        #[clap(long)]
        json: bool,
    },
}

fn parse_address(text: &str) -> Result<u32, String> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u32::from_str_radix(digits, 16).map_err(|e| format!("`{text}` is not a hex address: {e}"))
}

fn main() -> ExitCode {
    use clap::Parser;

    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_writer(io::stderr)
        .init();

    match main_real(args) {
        Ok(code) => code,
        Err(e) => {
            cprintln!("<red,bold>error</>: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn main_real(args: Args) -> Result<ExitCode, Error> {
    let config = Config::load(args.config.as_deref())?;
    match args.command {
        Command::Compile {
            script,
            rom,
            write,
            dump,
            json,
            dynamic,
            no_autobank,
        } => {
            let config = Config {
                autobank: config.autobank && !no_autobank,
                dynamic: dynamic.or(config.dynamic),
                format: if json { Format::Json } else { config.format },
                ..config
            };
            compile(&config, &script, &rom, write, dump)
        }
        Command::Decompile {
            rom,
            address,
            output,
            json,
        } => {
            let format = if json { Format::Json } else { config.format };
            decompile(format, &rom, address, output.as_deref())
        }
    }
}

fn compile(
    config: &Config,
    script: &Path,
    rom_path: &Path,
    write: bool,
    dump: bool,
) -> Result<ExitCode, Error> {
    let name = script.display().to_string();
    let source = fs::read_to_string(script).map_err(|e| Error::Open(name.clone(), e))?;
    let mut rom = FileRom::load(rom_path)?;

    // 1. Parse and resolve
    tracing::info!("compiling {name}");
    let resolver = Resolver::new()
        .with_base(config.dynamic)
        .with_fill(config.fill);
    let program = xse::build(&source, resolver);
    msg::dump(&program.diagnostics, &name, &source);
    let errors = program.errors();
    if errors > 0 {
        cprintln!(
            "<red,bold>error</>: could not compile `{}` due to {} previous error(s)",
            name,
            errors
        );
        return Ok(ExitCode::FAILURE);
    }

    // 2. Place and encode
    let options = Options {
        autobank: config.autobank,
        ..Options::default()
    };
    let compiled = xse::compile(&program, &rom, &options)?;
    for block in &compiled.blocks {
        match &block.label {
            Some(label) => tracing::info!("@{label} -> 0x{:X} ({} bytes)", block.address, block.bytes.len()),
            None => tracing::info!("0x{:X} ({} bytes)", block.address, block.bytes.len()),
        }
    }

    if dump {
        display::print_dump(&compiled);
    }
    if config.format == Format::Json {
        println!("{}", serde_json::to_string_pretty(&compiled)?);
    }

    // 3. Erase, then write
    if write {
        for directive in &compiled.directives {
            let erased = xse::rom::apply(&mut rom, directive, compiled.fill)?;
            tracing::info!("{directive:?}: erased {} range(s)", erased.len());
        }
        compiled.write(&mut rom)?;
        rom.save()?;
        tracing::info!("wrote {}", rom_path.display());
    }
    Ok(ExitCode::SUCCESS)
}

fn decompile(
    format: Format,
    rom_path: &Path,
    address: u32,
    output: Option<&Path>,
) -> Result<ExitCode, Error> {
    let rom = FileRom::load(rom_path)?;
    let decompiled = xse::decompile(&rom, address);
    tracing::info!("decompiled {} block(s) from 0x{address:X}", decompiled.blocks.len());

    let text = match format {
        Format::Json => serde_json::to_string_pretty(&decompiled)?,
        Format::Text => decompiled.text,
    };
    match output {
        Some(path) => {
            fs::write(path, text).map_err(|e| Error::Write(path.display().to_string(), e))?
        }
        None => print!("{text}"),
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses() {
        assert_eq!(parse_address("0x800000"), Ok(0x800000));
        assert_eq!(parse_address("08800000"), Ok(0x08800000));
        assert_eq!(parse_address("0XAbC"), Ok(0xABC));
        assert!(parse_address("0x").is_err());
        assert!(parse_address("zz").is_err());
    }

    #[test]
    fn cli_shape() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
