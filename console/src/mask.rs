use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use console::style;
use indexmap::IndexMap;
use scprep::io::{
    read_counts_csv,
    read_obs_csv,
};
use scprep::{
    batch_mask_cell_measurement,
    AnnotatedData,
};

use crate::utils::{
    check_input,
    check_output,
    separator,
    UtilsArgs,
};

/// Name the measurement file is registered under.
const MEASUREMENT: &str = "measurement";

#[derive(Args, Debug, Clone)]
pub(crate) struct MaskArgs {
    #[arg(
        value_parser,
        required = true,
        help = "Path to the cell measurement CSV, one row per cell."
    )]
    measurement: PathBuf,
    #[arg(long, required = true, help = "Row annotations CSV.")]
    obs:         PathBuf,
    #[arg(
        short = 'b',
        long,
        default_value = "batch",
        help = "Row-annotation column holding batch labels."
    )]
    batch_key:   String,
    #[arg(
        short = 'o',
        long,
        required = true,
        help = "Path of the JSON file mapping each batch to its column mask."
    )]
    output:      PathBuf,
    #[arg(long, default_value_t = ',', help = "Field separator of the input files.")]
    sep:         char,
}

impl MaskArgs {
    pub fn run(
        &self,
        utils: &UtilsArgs,
    ) -> anyhow::Result<()> {
        check_input(&self.measurement);
        check_input(&self.obs);
        check_output(&self.output);
        let sep = separator(self.sep)?;

        let spinner = utils.spinner("Reading measurement...")?;
        let (matrix, var_names) = read_counts_csv(&self.measurement, sep)?;
        let obs = read_obs_csv(&self.obs, sep)?;
        let values = matrix.to_dense();
        let mut adata = AnnotatedData::new(matrix, obs)?.with_var_names(var_names)?;
        adata.add_cell_measurement(MEASUREMENT, values)?;

        spinner.set_message("Computing masks...");
        let masks = batch_mask_cell_measurement(&adata, MEASUREMENT, &self.batch_key)?;
        spinner.finish_and_clear();

        let json = masks
            .iter()
            .map(|mask| (mask.label.clone(), mask.mask.to_vec()))
            .collect::<IndexMap<_, _>>();
        let file = File::create(&self.output)
            .with_context(|| format!("Could not create {}", self.output.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &json)?;

        for mask in masks.iter() {
            let observed = mask.mask.iter().filter(|&&seen| seen).count();
            println!(
                "[{}] batch {}: {}/{} columns observed",
                style("V").green(),
                style(&mask.label).bold(),
                observed,
                adata.n_vars()
            );
        }
        println!("Written masks to {}", style(self.output.display()).green());
        Ok(())
    }
}
