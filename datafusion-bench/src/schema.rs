use datafusion::arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use std::sync::Arc;

/// Column the benchmark groups on
pub const GROUP_COLUMN: &str = "original_language";

/// Name of the per-group row count produced by the aggregation
pub const COUNT_COLUMN: &str = "count";

/// Column layout of the movies CSV, in file order
///
/// The first column is an unnamed row index in the source file; the header row
/// is skipped so it gets a usable name here.
const MOVIE_COLUMNS: [(&str, DataType); 22] = [
    ("row_index", DataType::Int64),
    ("id", DataType::Int64),
    ("title", DataType::Utf8),
    ("target", DataType::Int64),
    ("vote_count", DataType::Int64),
    ("status", DataType::Utf8),
    ("release_date", DataType::Utf8),
    ("revenue", DataType::Int64),
    ("runtime", DataType::Int64),
    ("adult", DataType::Boolean),
    ("budget", DataType::Int64),
    ("imdb_id", DataType::Utf8),
    ("original_language", DataType::Utf8),
    ("original_title", DataType::Utf8),
    ("overview", DataType::Utf8),
    ("popularity", DataType::Float64),
    ("tagline", DataType::Utf8),
    ("genres", DataType::Utf8),
    ("production_companies", DataType::Utf8),
    ("production_countries", DataType::Utf8),
    ("spoken_languages", DataType::Utf8),
    ("keywords", DataType::Utf8),
];

/// Arrow schema for the movies dataset (all columns nullable)
pub fn movies_schema() -> SchemaRef {
    let fields: Vec<Field> = MOVIE_COLUMNS
        .iter()
        .map(|(name, data_type)| Field::new(*name, data_type.clone(), true))
        .collect();

    Arc::new(Schema::new(fields))
}

/// The same columns with every one read as text.
///
/// The CSV reader fails a whole query on a single unparsable cell, so typed
/// columns are read as strings and cast afterwards.
pub fn raw_movies_schema() -> SchemaRef {
    let fields: Vec<Field> = MOVIE_COLUMNS
        .iter()
        .map(|(name, _)| Field::new(*name, DataType::Utf8, true))
        .collect();

    Arc::new(Schema::new(fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movies_schema_layout() {
        let schema = movies_schema();
        assert_eq!(schema.fields().len(), 22);
        assert_eq!(schema.field(0).name(), "row_index");
        assert_eq!(schema.field(21).name(), "keywords");
        assert!(schema.fields().iter().all(|f| f.is_nullable()));
    }

    #[test]
    fn test_movies_schema_types() {
        let schema = movies_schema();
        let type_of = |name: &str| schema.field_with_name(name).unwrap().data_type().clone();

        assert_eq!(type_of("id"), DataType::Int64);
        assert_eq!(type_of("revenue"), DataType::Int64);
        assert_eq!(type_of("popularity"), DataType::Float64);
        assert_eq!(type_of("adult"), DataType::Boolean);
        assert_eq!(type_of(GROUP_COLUMN), DataType::Utf8);
        assert_eq!(type_of("keywords"), DataType::Utf8);
    }

    #[test]
    fn test_raw_schema_is_all_text() {
        let typed = movies_schema();
        let raw = raw_movies_schema();

        let names = |s: &SchemaRef| -> Vec<String> {
            s.fields().iter().map(|f| f.name().clone()).collect()
        };
        assert_eq!(names(&raw), names(&typed));
        assert!(raw
            .fields()
            .iter()
            .all(|f| f.data_type() == &DataType::Utf8 && f.is_nullable()));
    }
}
