mod filter;
mod libsize;
mod mask;
pub mod utils;
mod validate;

use clap::{
    Parser,
    Subcommand,
};
use filter::FilterArgs;
use libsize::LibsizeArgs;
use mask::MaskArgs;
use utils::UtilsArgs;
use validate::ValidateArgs;
use wild::ArgsOs;

#[derive(Parser, Debug)]
#[command(
    author = env!("CARGO_PKG_AUTHORS"),
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
    long_about = None,)]
struct Cli {
    #[command(subcommand)]
    command: MainMenu,
}

#[derive(Subcommand, Debug)]
enum MainMenu {
    /// Compute per-batch log library size mean and variance.
    Libsize {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  LibsizeArgs,
    },

    /// Check that a matrix holds non-negative integer counts.
    Validate {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  ValidateArgs,
    },

    /// Compute which columns of a cell measurement were observed per batch.
    Mask {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  MaskArgs,
    },

    /// Remove cells with a total count below a threshold.
    Filter {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  FilterArgs,
    },
}

fn main() -> anyhow::Result<()> {
    let args: ArgsOs = wild::args_os();
    let cli = Cli::parse_from(args);

    match cli.command {
        MainMenu::Libsize { utils, args } => {
            utils.setup()?;
            args.run(&utils)?;
        },
        MainMenu::Validate { utils, args } => {
            utils.setup()?;
            args.run(&utils)?
        },
        MainMenu::Mask { utils, args } => {
            utils.setup()?;
            args.run(&utils)?;
        },
        MainMenu::Filter { utils, args } => {
            utils.setup()?;
            args.run(&utils)?;
        },
    }
    Ok(())
}
