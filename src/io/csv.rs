use std::fs::File;
use std::path::Path;

use anyhow::Context as AnyhowContext;
use itertools::Itertools;
use log::{
    debug,
    info,
};
use polars::prelude::*;

use crate::data_structs::{
    AnnotatedData,
    CountMatrix,
};

/// `infer_schema_length` of `None` scans every row, `Some(0)` reads every
/// column as strings.
fn read_csv(
    path: &Path,
    separator: u8,
    infer_schema_length: Option<usize>,
) -> anyhow::Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(infer_schema_length)
        .with_parse_options(CsvParseOptions::default().with_separator(separator))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("Could not open {}", path.display()))?
        .finish()
        .with_context(|| format!("Could not parse {}", path.display()))?;
    debug!(
        "Read {} rows and {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

fn write_csv(
    df: &mut DataFrame,
    path: &Path,
    separator: u8,
) -> anyhow::Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("Could not create {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(separator)
        .finish(df)
        .with_context(|| format!("Could not write {}", path.display()))?;
    info!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

/// Reads a dense count matrix and its feature names.
pub fn read_counts_csv(
    path: &Path,
    separator: u8,
) -> anyhow::Result<(CountMatrix, Vec<String>)> {
    let df = read_csv(path, separator, Some(0))?;
    let var_names = df
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect_vec();
    let columns = df
        .get_columns()
        .iter()
        .map(|column| {
            column
                .as_materialized_series()
                .strict_cast(&DataType::Float64)
                .map(Column::from)
                .with_context(|| {
                    format!(
                        "Non-numeric values in column '{}' of {}",
                        column.name(),
                        path.display()
                    )
                })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    let values = DataFrame::new(columns)?.to_ndarray::<Float64Type>(IndexOrder::C)?;
    Ok((CountMatrix::dense(values), var_names))
}

/// Reads row annotations.
pub fn read_obs_csv(
    path: &Path,
    separator: u8,
) -> anyhow::Result<DataFrame> {
    read_csv(path, separator, None)
}

/// Reads counts and, when given, their row annotations into one dataset.
pub fn read_dataset(
    counts: &Path,
    obs: Option<&Path>,
    separator: u8,
) -> anyhow::Result<AnnotatedData> {
    let (matrix, var_names) = read_counts_csv(counts, separator)?;
    let adata = match obs {
        Some(obs) => AnnotatedData::new(matrix, read_obs_csv(obs, separator)?)?,
        None => AnnotatedData::from_matrix(matrix)?,
    };
    adata.with_var_names(var_names)
}

pub fn write_obs_csv(
    obs: &DataFrame,
    path: &Path,
    separator: u8,
) -> anyhow::Result<()> {
    write_csv(&mut obs.clone(), path, separator)
}

/// Writes a count matrix with a header of feature names.
pub fn write_counts_csv(
    matrix: &CountMatrix,
    var_names: &[String],
    path: &Path,
    separator: u8,
) -> anyhow::Result<()> {
    let values = matrix.to_dense();
    anyhow::ensure!(
        values.ncols() == var_names.len(),
        "{} feature names for {} columns",
        var_names.len(),
        values.ncols()
    );
    let columns = var_names
        .iter()
        .zip(values.columns())
        .map(|(name, column)| Column::new(name.as_str().into(), column.to_vec()))
        .collect_vec();
    let mut df = DataFrame::new(columns)?;
    write_csv(&mut df, path, separator)
}
