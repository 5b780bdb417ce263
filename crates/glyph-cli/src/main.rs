#![forbid(unsafe_code)]

// Native-only tool. The wasm32 stub keeps `--workspace` builds for wasm targets compiling.
#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod console;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::io::{self, Write};
    use std::path::PathBuf;

    use anyhow::{bail, Context, Result};
    use clap::{Args, Parser, Subcommand};
    use glyph_vm::config::MAX_MEMORY_SIZE;
    use glyph_vm::{disasm, listing, Machine, MachineConfig, PortHooks, RunExit};
    use tracing::{debug, warn};
    use tracing_subscriber::EnvFilter;

    use crate::console::Console;

    const MAX_LISTING_LEN: usize = 0x1_0000;

    #[derive(Debug, Parser)]
    #[command(
        name = "glyph",
        about = "Runner, disassembler and address listing for Glyph text-opcode programs"
    )]
    pub struct Cli {
        #[command(subcommand)]
        command: Command,
    }

    #[derive(Debug, Subcommand)]
    enum Command {
        /// Execute a program with the console device attached.
        ///
        /// Port `c` is stdin/stdout, `e` is stderr and writing port `X` exits with that code.
        Run(RunArgs),
        /// Print an annotated disassembly.
        Dis(ToolArgs),
        /// Print the load address of every byte, for computing jump and call targets.
        Addr(ToolArgs),
    }

    #[derive(Debug, Args)]
    #[group(required = true, multiple = false)]
    struct Source {
        /// Program file.
        file: Option<PathBuf>,

        /// Program text given inline instead of a file.
        #[arg(short = 'e', long = "expr")]
        expr: Option<String>,
    }

    #[derive(Debug, Args)]
    struct RunArgs {
        #[command(flatten)]
        source: Source,

        /// Memory size in bytes (power of two, at most 256).
        #[arg(long, default_value_t = MAX_MEMORY_SIZE)]
        memory_size: usize,

        /// Load address of the program; execution starts here.
        #[arg(long, default_value_t = 0, value_parser = parse_address::<u8>)]
        origin: u8,

        /// Fail if the program has not halted after N instructions.
        #[arg(long)]
        max_steps: Option<u64>,

        /// Print the machine registers to stderr after the run.
        #[arg(long)]
        dump_registers: bool,
    }

    #[derive(Debug, Args)]
    struct ToolArgs {
        #[command(flatten)]
        source: Source,

        /// Address shown for the first byte (decimal or 0x-prefixed hex).
        #[arg(long, default_value_t = 0, value_parser = parse_address::<u16>)]
        base: u16,
    }

    fn parse_address<T>(s: &str) -> std::result::Result<T, String>
    where
        T: TryFrom<u32>,
    {
        let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => s.parse::<u32>(),
        }
        .map_err(|e| format!("invalid address {s:?}: {e}"))?;
        T::try_from(value).map_err(|_| format!("address {s} is out of range"))
    }

    pub fn main() -> Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_writer(io::stderr)
            .init();

        let cli = Cli::parse();
        match cli.command {
            Command::Run(args) => run(args),
            Command::Dis(args) => {
                let image = load_listing_source(&args.source)?;
                print_text(&disasm::render(&image, args.base))
            }
            Command::Addr(args) => {
                let image = load_listing_source(&args.source)?;
                print_text(&listing::render(&image, args.base))
            }
        }
    }

    fn load_source(source: &Source) -> Result<Vec<u8>> {
        let (image, origin) = match (&source.file, &source.expr) {
            (_, Some(expr)) => (expr.as_bytes().to_vec(), "inline program".to_string()),
            (Some(path), None) => (
                std::fs::read(path)
                    .with_context(|| format!("failed to read program: {}", path.display()))?,
                path.display().to_string(),
            ),
            (None, None) => bail!("no program given"),
        };
        if image.is_empty() {
            bail!("program is empty: {origin}");
        }
        Ok(image)
    }

    /// Listings print 16-bit addresses, so larger inputs would show wrapped addresses.
    fn load_listing_source(source: &Source) -> Result<Vec<u8>> {
        let image = load_source(source)?;
        if image.len() > MAX_LISTING_LEN {
            bail!(
                "program of {} bytes is too large to list (at most {MAX_LISTING_LEN} bytes)",
                image.len()
            );
        }
        Ok(image)
    }

    fn print_text(text: &str) -> Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(text.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    fn run(args: RunArgs) -> Result<()> {
        let mut image = load_source(&args.source)?;

        let mut config = MachineConfig::default()
            .with_memory_size(args.memory_size)
            .with_origin(args.origin);
        if let Some(max_steps) = args.max_steps {
            config = config.with_max_steps(max_steps);
        }
        config.validate().context("invalid machine configuration")?;

        let capacity = config.image_capacity();
        if image.len() > capacity {
            warn!(
                len = image.len(),
                capacity,
                origin = args.origin,
                "program does not fit in memory; truncating"
            );
            image.truncate(capacity);
        }

        let console = Console::new(io::stdin().lock(), io::stdout().lock(), io::stderr(), |code| {
            std::process::exit(i32::from(code))
        });
        let mut machine = Machine::new(config, &image, console)?;
        let exit = machine.run();
        machine
            .hooks_mut()
            .finish()
            .context("console I/O failed")?;

        if args.dump_registers {
            dump_registers(&machine, &mut io::stderr().lock())?;
        }

        match exit {
            RunExit::Halted { reason, executed } => {
                debug!(?reason, executed, "program halted");
                Ok(())
            }
            RunExit::StepLimit { executed } | RunExit::Completed { executed } => {
                bail!("program did not halt within {executed} instructions")
            }
        }
    }

    fn dump_registers<H: PortHooks>(machine: &Machine<H>, out: &mut impl Write) -> Result<()> {
        writeln!(
            out,
            "pc={} acc={} flag={} stack={:?}",
            machine.pc(),
            machine.accumulator(),
            machine.flag(),
            machine.stack().as_slice()
        )?;
        for (name, value) in machine.registers().non_zero() {
            if name.is_ascii_graphic() {
                writeln!(out, "{}={value}", char::from(name))?;
            } else {
                writeln!(out, "r{name:02X}={value}")?;
            }
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::main()
}
