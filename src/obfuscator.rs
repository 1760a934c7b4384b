//! The per-table aggregator: one model per column, driven together.
//!
//! The obfuscator owns the fixed train -> finalize -> generate lifecycle
//! across all columns, derives each column's seed from the root seed and the
//! column name (so identical columns of different tables stay
//! JOIN-compatible), and reads/writes the versioned persisted-model stream.

use std::io::{Read, Write};

use arrow::array::ArrayRef;
use chrono_tz::Tz;
use log::{debug, info};

use crate::config::SamarConfig;
use crate::error::SamarError;
use crate::kernels::sip::hash_seeded_bytes;
use crate::markov::MarkovModelParameters;
use crate::models::{ModelFactory, ModelPtr};
use crate::persist::{
    read_prefixed_string, read_u64, read_u8, write_prefixed_string, write_u64, write_u8,
};
use crate::types::SamarDataType;

/// Version byte of the persisted model stream. Readers refuse anything else.
pub const MODEL_FORMAT_VERSION: u8 = 0;

/// One column of the declared table structure.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSchema {
    pub name: String,
    pub dtype: SamarDataType,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, dtype: SamarDataType) -> Self {
        Self {
            name: name.into(),
            dtype,
        }
    }

    /// Derives the declared structure from an Arrow schema.
    pub fn from_arrow_schema(
        schema: &arrow::datatypes::Schema,
    ) -> Result<Vec<Self>, SamarError> {
        schema
            .fields()
            .iter()
            .map(|field| {
                Ok(Self::new(
                    field.name().clone(),
                    SamarDataType::from_arrow_field(field)?,
                ))
            })
            .collect()
    }
}

pub struct Obfuscator {
    schema: Vec<ColumnSchema>,
    models: Vec<ModelPtr>,
    source_rows: u64,
}

impl Obfuscator {
    /// Builds one model per column. Each column's seed is the keyed hash of
    /// the root seed and the column name: two tables obfuscated with the
    /// same root seed transform equally-named non-text columns identically,
    /// so the outputs can still be JOINed.
    pub fn new(
        schema: &[ColumnSchema],
        root_seed: u64,
        markov_params: MarkovModelParameters,
        calendar: Tz,
    ) -> Self {
        let models = schema
            .iter()
            .map(|column| {
                let column_seed = hash_seeded_bytes(root_seed, column.name.as_bytes());
                ModelFactory::build(&column.dtype, column_seed, &markov_params, calendar)
            })
            .collect();

        Self {
            schema: schema.to_vec(),
            models,
            source_rows: 0,
        }
    }

    pub fn from_config(schema: &[ColumnSchema], config: &SamarConfig) -> Self {
        Self::new(
            schema,
            config.root_seed(),
            config.markov.clone(),
            config.timezone,
        )
    }

    pub fn schema(&self) -> &[ColumnSchema] {
        &self.schema
    }

    /// Rows seen by `train` so far. Drivers use this to default the output
    /// size to the input size; it also round-trips through the persisted
    /// stream.
    pub fn source_rows(&self) -> u64 {
        self.source_rows
    }

    fn check_column_count(&self, columns: &[ArrayRef]) -> Result<(), SamarError> {
        if columns.len() != self.models.len() {
            return Err(SamarError::SchemaMismatch(format!(
                "block has {} columns, schema declares {}",
                columns.len(),
                self.models.len()
            )));
        }
        Ok(())
    }

    /// Feeds one block of source columns into the models' statistics.
    pub fn train(&mut self, columns: &[ArrayRef]) -> Result<(), SamarError> {
        self.check_column_count(columns)?;
        for (model, column) in self.models.iter_mut().zip(columns) {
            model.train(column.as_ref())?;
        }
        self.source_rows += columns.first().map_or(0, |c| c.len() as u64);
        debug!("trained on block; {} rows seen so far", self.source_rows);
        Ok(())
    }

    /// Call exactly once between the last `train` and the first `generate`.
    pub fn finalize(&mut self) {
        for model in &mut self.models {
            model.finalize();
        }
        info!(
            "models finalized after {} source rows across {} columns",
            self.source_rows,
            self.models.len()
        );
    }

    /// Transforms one block of source columns into anonymized output columns
    /// of the same types and row counts.
    pub fn generate(&mut self, columns: &[ArrayRef]) -> Result<Vec<ArrayRef>, SamarError> {
        self.check_column_count(columns)?;
        self.models
            .iter_mut()
            .zip(columns)
            .map(|(model, column)| model.generate(column.as_ref()))
            .collect()
    }

    /// Rotates every model's seed, for generating more rows than the source
    /// contains by looping over the input again.
    pub fn update_seed(&mut self) {
        for model in &mut self.models {
            model.update_seed();
        }
        debug!("rotated seeds for {} models", self.models.len());
    }

    /// Writes the versioned model stream: header (format version, source
    /// rows, declared type names) followed by the per-column payloads.
    /// The seed is deliberately not part of the stream.
    pub fn serialize<W: Write>(&self, out: &mut W) -> Result<(), SamarError> {
        write_u8(out, MODEL_FORMAT_VERSION)?;
        write_u64(out, self.source_rows)?;

        // The data types are written for validation, because the model
        // payloads depend on them.
        write_u64(out, self.schema.len() as u64)?;
        for column in &self.schema {
            write_prefixed_string(out, &column.dtype.to_string())?;
        }

        for model in &self.models {
            model.serialize(out)?;
        }
        Ok(())
    }

    /// Reads a model stream written by [`Obfuscator::serialize`], replacing
    /// the trained state of this obfuscator. The stream must have been
    /// written for the same declared table structure.
    pub fn deserialize<R: Read>(&mut self, input: &mut R) -> Result<(), SamarError> {
        let version = read_u8(input)?;
        if version != MODEL_FORMAT_VERSION {
            return Err(SamarError::FormatVersionMismatch {
                expected: MODEL_FORMAT_VERSION,
                found: version,
            });
        }

        self.source_rows = read_u64(input)?;

        let column_count = read_u64(input)?;
        if column_count != self.schema.len() as u64 {
            return Err(SamarError::SchemaMismatch(format!(
                "the saved model was created for {} columns, schema declares {}",
                column_count,
                self.schema.len()
            )));
        }
        for column in &self.schema {
            let saved_type = read_prefixed_string(input)?;
            let declared_type = column.dtype.to_string();
            if saved_type != declared_type {
                return Err(SamarError::SchemaMismatch(format!(
                    "the saved model was created for a column of type {}, schema declares {}",
                    saved_type, declared_type
                )));
            }
        }

        for model in &mut self.models {
            model.deserialize(input)?;
        }
        info!(
            "loaded models for {} columns ({} source rows at save time)",
            self.schema.len(),
            self.source_rows
        );
        Ok(())
    }
}
