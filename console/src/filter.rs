use std::path::PathBuf;

use clap::Args;
use console::style;
use scprep::filter_cells_by_count;
use scprep::io::{
    read_dataset,
    write_counts_csv,
    write_obs_csv,
};

use crate::utils::{
    check_input,
    check_output,
    separator,
    UtilsArgs,
};

#[derive(Args, Debug, Clone)]
pub(crate) struct FilterArgs {
    #[arg(value_parser, required = true, help = "Path to the cell-by-feature counts CSV.")]
    counts:    PathBuf,
    #[arg(
        short = 'o',
        long,
        required = true,
        help = "Path of the filtered counts CSV to write."
    )]
    output:    PathBuf,
    #[arg(long, requires = "obs_out", help = "Row annotations CSV to filter along.")]
    obs:       Option<PathBuf>,
    #[arg(long, requires = "obs", help = "Path of the filtered row annotations CSV.")]
    obs_out:   Option<PathBuf>,
    #[arg(
        short = 'm',
        long,
        default_value_t = 1.0,
        help = "Cells with a total count below this value are removed."
    )]
    min_count: f64,
    #[arg(long, default_value_t = ',', help = "Field separator of input and output files.")]
    sep:       char,
}

impl FilterArgs {
    pub fn run(
        &self,
        utils: &UtilsArgs,
    ) -> anyhow::Result<()> {
        check_input(&self.counts);
        check_output(&self.output);
        if let (Some(obs), Some(obs_out)) = (&self.obs, &self.obs_out) {
            check_input(obs);
            check_output(obs_out);
        }
        let sep = separator(self.sep)?;

        let spinner = utils.spinner("Reading counts...")?;
        let adata = read_dataset(&self.counts, self.obs.as_deref(), sep)?;

        spinner.set_message("Filtering cells...");
        let filtered = filter_cells_by_count(&adata, self.min_count)?;

        spinner.set_message("Writing output...");
        write_counts_csv(filtered.x(), filtered.var_names(), &self.output, sep)?;
        if let Some(obs_out) = &self.obs_out {
            write_obs_csv(filtered.obs(), obs_out, sep)?;
        }
        spinner.finish_and_clear();

        println!(
            "[{}] kept {} of {} cells, removed {}",
            style("V").green(),
            style(filtered.n_obs()).green(),
            adata.n_obs(),
            style(adata.n_obs() - filtered.n_obs()).red()
        );
        Ok(())
    }
}
