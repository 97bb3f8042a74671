use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::WrapErr;

use cc_bounds::matrix::Matrix;
use cc_bounds::protocol::Protocol;
use cc_bounds::randomized::{max_success, min_bits_with, trivial_upper_bound, BoundConfig};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Matrix file (one row per line, cells 0, 1, or * for don't-care), or `-` for stdin.
    #[arg(value_name = "FILE")]
    matrix: PathBuf,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the optimal deterministic protocol.
    Protocol {
        /// Print the tree in DOT format instead of text.
        #[arg(long)]
        dot: bool,
    },

    /// Print the best success probability with a fixed number of bits.
    Success {
        /// Number of bits.
        #[arg(long, value_name = "INT")]
        steps: usize,

        /// Require 0-inputs to be answered with certainty.
        #[arg(long)]
        one_sided: bool,
    },

    /// Print the fewest bits reaching a target success probability.
    Bits {
        /// Target success probability.
        #[arg(long, value_name = "FLOAT", default_value = "1.0")]
        prob: f64,

        /// Require 0-inputs to be answered with certainty.
        #[arg(long)]
        one_sided: bool,

        /// Slack subtracted from the target to absorb solver noise.
        #[arg(long, value_name = "FLOAT", default_value = "0.01")]
        tolerance: f64,

        /// Largest number of bits to try (default: the trivial upper bound).
        #[arg(long, value_name = "INT")]
        max_rounds: Option<usize>,
    },
}

fn read_matrix(path: &PathBuf) -> color_eyre::Result<Matrix> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path).wrap_err_with(|| format!("cannot read {}", path.display()))?
    };
    let matrix = text.parse::<Matrix>()?;
    Ok(matrix)
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    let level = if args.verbose {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };
    simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let matrix = read_matrix(&args.matrix)?;
    log::info!("matrix of size {}x{}", matrix.rows(), matrix.cols());

    let time_total = std::time::Instant::now();

    match args.command {
        Command::Protocol { dot } => {
            let protocol = Protocol::synthesize(&matrix);
            if dot {
                print!("{}", protocol.root().to_dot(matrix.rows(), matrix.cols())?);
            } else {
                print!("{}", protocol);
                println!("Cost: {}", protocol.cost());
            }
        }
        Command::Success { steps, one_sided } => {
            let p = max_success(&matrix, steps, one_sided)?;
            println!("{}", p);
        }
        Command::Bits {
            prob,
            one_sided,
            tolerance,
            max_rounds,
        } => {
            let config = BoundConfig { tolerance, max_rounds };
            log::info!("searching up to {} bits", max_rounds.unwrap_or_else(|| trivial_upper_bound(&matrix)));
            let bits = min_bits_with(&matrix, prob, one_sided, &config, &cc_bounds::lp::MicroLp)?;
            println!("{}", bits);
        }
    }

    log::info!("done in {:.3}s", time_total.elapsed().as_secs_f64());

    Ok(())
}
