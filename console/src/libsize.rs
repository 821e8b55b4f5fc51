use std::path::PathBuf;

use clap::{
    Args,
    ValueEnum,
};
use console::style;
use itertools::Itertools;
use polars::prelude::*;
use scprep::io::{
    read_counts_csv,
    read_obs_csv,
    write_obs_csv,
};
use scprep::prelude::{
    compute_library_size_batch,
    AnnotatedData,
    BatchAssignment,
    EmptyRowPolicy,
    LibrarySizeConfig,
    CELL_ID_COLUMN,
};

use crate::utils::{
    check_input,
    check_output,
    separator,
    UtilsArgs,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum EmptyRows {
    Exclude,
    FillZero,
}

impl From<EmptyRows> for EmptyRowPolicy {
    fn from(value: EmptyRows) -> Self {
        match value {
            EmptyRows::Exclude => EmptyRowPolicy::Exclude,
            EmptyRows::FillZero => EmptyRowPolicy::FillZero,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub(crate) struct LibsizeArgs {
    #[arg(value_parser, required = true, help = "Path to the cell-by-feature counts CSV.")]
    counts:     PathBuf,
    #[arg(
        short = 'o',
        long,
        required = true,
        help = "Path of the annotated row-annotation CSV to write."
    )]
    output:     PathBuf,
    #[arg(
        long,
        help = "Row annotations CSV. Without it every cell is placed in one batch."
    )]
    obs:        Option<PathBuf>,
    #[arg(
        short = 'b',
        long,
        default_value = "batch",
        help = "Row-annotation column holding batch labels."
    )]
    batch_key:  String,
    #[arg(
        long,
        help_heading = "OUTPUT ARGS",
        help = "Column receiving the log library size mean. [default: _scvi_local_l_mean]"
    )]
    mean_key:   Option<String>,
    #[arg(
        long,
        help_heading = "OUTPUT ARGS",
        help = "Column receiving the log library size variance. [default: _scvi_local_l_var]"
    )]
    var_key:    Option<String>,
    #[arg(
        long,
        value_enum,
        default_value_t = EmptyRows::Exclude,
        help = "How cells with zero total count enter the statistics."
    )]
    empty_rows: EmptyRows,
    #[arg(long, default_value_t = ',', help = "Field separator of input and output files.")]
    sep:        char,
}

impl LibsizeArgs {
    pub fn run(
        &self,
        utils: &UtilsArgs,
    ) -> anyhow::Result<()> {
        check_input(&self.counts);
        if let Some(obs) = &self.obs {
            check_input(obs);
        }
        check_output(&self.output);
        let sep = separator(self.sep)?;

        let spinner = utils.spinner("Reading counts...")?;
        let (matrix, var_names) = read_counts_csv(&self.counts, sep)?;
        let obs = match &self.obs {
            Some(path) => read_obs_csv(path, sep)?,
            None => single_batch_obs(matrix.n_rows(), &self.batch_key)?,
        };
        let mut adata = AnnotatedData::new(matrix, obs)?.with_var_names(var_names)?;

        spinner.set_message("Computing library size...");
        let config = LibrarySizeConfig::new(&self.batch_key)
            .with_local_l_mean_key(self.mean_key.clone())
            .with_local_l_var_key(self.var_key.clone())
            .with_empty_rows(self.empty_rows.into());
        compute_library_size_batch(&mut adata, &config)?;

        spinner.set_message("Writing row annotations...");
        write_obs_csv(adata.obs(), &self.output, sep)?;
        spinner.finish_and_clear();

        let batches = BatchAssignment::from_obs(adata.obs(), &self.batch_key)?;
        let means = adata.obs_f32(config.mean_key())?;
        let vars = adata.obs_f32(config.var_key())?;
        for (label, rows) in batches.groups() {
            println!(
                "[{}] batch {}: {} cells, mean {:.4}, var {:.4}",
                style("V").green(),
                style(label).bold(),
                rows.len(),
                means[rows[0]],
                vars[rows[0]]
            );
        }
        println!(
            "Written {} to {}",
            [config.mean_key(), config.var_key()].iter().join(", "),
            style(self.output.display()).green()
        );
        Ok(())
    }
}

fn single_batch_obs(
    n_rows: usize,
    batch_key: &str,
) -> anyhow::Result<DataFrame> {
    let ids = (0..n_rows).map(|i| format!("cell_{}", i)).collect_vec();
    let labels = BatchAssignment::uniform(n_rows, "0").labels().to_vec();
    let obs = DataFrame::new(vec![
        Column::new(CELL_ID_COLUMN.into(), ids),
        Column::new(batch_key.into(), labels),
    ])?;
    Ok(obs)
}
