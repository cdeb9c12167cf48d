//! The benchmark query: count rows per `original_language`, then order the
//! groups by count, largest first.

use datafusion::arrow::array::{Array, Int64Array, RecordBatch, StringArray};
use datafusion::arrow::util::pretty::pretty_format_batches;
use datafusion::dataframe::DataFrame;
use datafusion::functions_aggregate::expr_fn::count;
use datafusion::arrow::datatypes::DataType;
use datafusion::logical_expr::{try_cast, Expr, Partitioning};
use datafusion::prelude::{col, lit, CsvReadOptions, SessionContext};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::schema::{movies_schema, raw_movies_schema, COUNT_COLUMN, GROUP_COLUMN};

/// Open the movies CSV (header row, fixed schema) as a lazy DataFrame.
///
/// Cells that do not parse as their column's type become null instead of
/// failing the query.
pub async fn load_dataset(ctx: &SessionContext, path: &Path) -> Result<DataFrame> {
    let location = path
        .to_str()
        .ok_or_else(|| Error::Config(format!("Dataset path is not valid UTF-8: {:?}", path)))?;

    // Listing filters files by suffix, so match whatever the dataset uses
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();

    let raw = raw_movies_schema();
    let options = CsvReadOptions::new()
        .has_header(true)
        .schema(raw.as_ref())
        .file_extension(&extension);

    debug!(location, "registering dataset");
    let df = ctx.read_csv(location, options).await?;
    Ok(df.select(typed_columns())?)
}

/// Projection from the all-text read to the typed movies schema
fn typed_columns() -> Vec<Expr> {
    movies_schema()
        .fields()
        .iter()
        .map(|field| match field.data_type() {
            DataType::Utf8 => col(field.name()),
            data_type => try_cast(col(field.name()), data_type.clone()).alias(field.name()),
        })
        .collect()
}

/// Redistribute round-robin into `partitions` and materialize the result in memory.
///
/// Returns the cached DataFrame and its row count.
pub async fn repartition_and_cache(df: DataFrame, partitions: usize) -> Result<(DataFrame, usize)> {
    let cached = df
        .repartition(Partitioning::RoundRobinBatch(partitions))?
        .cache()
        .await?;
    let rows = cached.clone().count().await?;
    info!(partitions, rows, "dataset repartitioned and cached");
    Ok((cached, rows))
}

/// Group by [`GROUP_COLUMN`] with a per-group row count in [`COUNT_COLUMN`]
pub fn aggregate(df: DataFrame) -> Result<DataFrame> {
    Ok(df.aggregate(
        vec![col(GROUP_COLUMN)],
        vec![count(lit(1)).alias(COUNT_COLUMN)],
    )?)
}

/// Order grouped rows by [`COUNT_COLUMN`], descending
pub fn sort_by_count(df: DataFrame) -> Result<DataFrame> {
    Ok(df.sort(vec![col(COUNT_COLUMN).sort(false, false)])?)
}

/// The first `n` rows across `batches`
pub fn head(batches: &[RecordBatch], n: usize) -> Vec<RecordBatch> {
    let mut remaining = n;
    let mut out = Vec::new();
    for batch in batches {
        if remaining == 0 {
            break;
        }
        let take = remaining.min(batch.num_rows());
        if take > 0 {
            out.push(batch.slice(0, take));
            remaining -= take;
        }
    }
    out
}

pub fn total_rows(batches: &[RecordBatch]) -> usize {
    batches.iter().map(|b| b.num_rows()).sum()
}

/// Render batches as an ASCII table
pub fn format_batches(batches: &[RecordBatch]) -> Result<String> {
    pretty_format_batches(batches)
        .map(|table| table.to_string())
        .map_err(|e| Error::DataFusion(e.to_string()))
}

/// Extract `(group, count)` pairs from aggregated batches, in row order
pub fn group_counts(batches: &[RecordBatch]) -> Result<Vec<(Option<String>, i64)>> {
    let mut pairs = Vec::with_capacity(total_rows(batches));
    for batch in batches {
        let groups = batch
            .column_by_name(GROUP_COLUMN)
            .and_then(|c| c.as_any().downcast_ref::<StringArray>())
            .ok_or_else(|| Error::Internal(format!("Missing string column {}", GROUP_COLUMN)))?;
        let counts = batch
            .column_by_name(COUNT_COLUMN)
            .and_then(|c| c.as_any().downcast_ref::<Int64Array>())
            .ok_or_else(|| Error::Internal(format!("Missing count column {}", COUNT_COLUMN)))?;

        for row in 0..batch.num_rows() {
            let group = if groups.is_null(row) {
                None
            } else {
                Some(groups.value(row).to_string())
            };
            pairs.push((group, counts.value(row)));
        }
    }
    Ok(pairs)
}
