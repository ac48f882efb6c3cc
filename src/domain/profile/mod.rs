//! Profile domain - the structured record collected in the first phase.

mod record;
mod schema;

pub use record::{ExtractionParseError, Gender, Hmo, ProfileRecord, Tier, MAX_AGE, MIN_AGE};
pub use schema::{
    profile_parameters_schema, COMPLETE_DATA_COLLECTION, COMPLETE_DATA_COLLECTION_DESCRIPTION,
};
