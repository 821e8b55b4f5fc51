use std::path::PathBuf;
use std::process::exit;

use clap::Args;
use console::style;
use scprep::check_nonnegative_integers;
use scprep::io::read_counts_csv;

use crate::utils::{
    check_input,
    separator,
    UtilsArgs,
};

#[derive(Args, Debug, Clone)]
pub(crate) struct ValidateArgs {
    #[arg(value_parser, required = true, help = "Path to the cell-by-feature counts CSV.")]
    counts: PathBuf,
    #[arg(long, default_value_t = ',', help = "Field separator of the input file.")]
    sep:    char,
}

impl ValidateArgs {
    pub fn run(
        &self,
        utils: &UtilsArgs,
    ) -> anyhow::Result<()> {
        check_input(&self.counts);
        let spinner = utils.spinner("Reading counts...")?;
        let (matrix, _) = read_counts_csv(&self.counts, separator(self.sep)?)?;
        spinner.finish_and_clear();

        let (n_rows, n_cols) = matrix.shape();
        if check_nonnegative_integers(&matrix) {
            println!(
                "[{}] {} holds count data ({} cells x {} features)",
                style("V").green(),
                self.counts.display(),
                style(n_rows).green(),
                style(n_cols).green()
            );
            Ok(())
        }
        else {
            eprintln!(
                "[{}] {} contains {}",
                style("X").red(),
                self.counts.display(),
                style("negative or non-integer values").red()
            );
            exit(1)
        }
    }
}
