//! Column mapping shared by the two target-carrying tables.

use strata_core::entities::Targets;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_enum, parse_json_list, to_json_text};

/// Target columns, in the order [`row_to_targets`] reads them.
pub(super) const TARGET_COLS: &str = "baseline, target_type, q1_target, q2_target, q3_target, \
                                      q4_target, annual_target, selected_months, selected_quarters";

/// Read the nine target columns starting at `start`.
pub(super) fn row_to_targets(row: &libsql::Row, start: i32) -> Result<Targets, DatabaseError> {
    Ok(Targets {
        baseline: get_opt_string(row, start)?,
        target_type: parse_enum(&row.get::<String>(start + 1)?)?,
        q1_target: row.get(start + 2)?,
        q2_target: row.get(start + 3)?,
        q3_target: row.get(start + 4)?,
        q4_target: row.get(start + 5)?,
        annual_target: row.get(start + 6)?,
        selected_months: parse_json_list(&row.get::<String>(start + 7)?)?,
        selected_quarters: parse_json_list(&row.get::<String>(start + 8)?)?,
    })
}

/// JSON text of the two period selection lists.
pub(super) fn period_texts(targets: &Targets) -> Result<(String, String), DatabaseError> {
    Ok((
        to_json_text(&targets.selected_months)?,
        to_json_text(&targets.selected_quarters)?,
    ))
}
