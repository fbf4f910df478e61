//! Column reshaping: rename, drop, and counter-column initialization

use tracing::debug;

use crate::error::TransformError;
use crate::model::RecordSet;

/// Columns removed from the record set before publishing. Names that are
/// already absent are skipped.
const DROPPED_COLUMNS: [&str; 15] = [
    "japanese_name",
    "percent_male",
    "percent_female",
    "capture_rate",
    "base_egg_steps",
    "evochain_0",
    "evochain_1",
    "evochain_2",
    "evochain_3",
    "evochain_4",
    "evochain_5",
    "evochain_6",
    "gigantamax",
    "mega_evolution",
    "mega_evolution_alt",
];

/// Battle counter columns appended to the record set.
const COUNTER_COLUMNS: [&str; 3] = ["wins", "losses", "times_chosen"];

/// Reshape the record set in place for the destination schema.
///
/// Renames `english_name` to `name` (failing if absent), drops the fixed
/// column list, then handles the battle counters: if any one of `wins`,
/// `losses`, `times_chosen` is missing, all three are re-added as integer 0
/// for every row. Existing counter values are discarded in that case; when
/// all three are present they are left untouched.
pub fn transform(records: &mut RecordSet) -> Result<(), TransformError> {
    records.rename_column("english_name", "name")?;

    records.drop_columns(&DROPPED_COLUMNS);
    debug!(columns = records.column_count(), "dropped fixed column list");

    let any_missing = COUNTER_COLUMNS.iter().any(|c| !records.has_column(c));
    if any_missing {
        for col in COUNTER_COLUMNS {
            records.remove_column(col);
        }
        for col in COUNTER_COLUMNS {
            records.push_int_column(col, 0);
        }
        debug!("reset battle counters to zero");
    }

    Ok(())
}
