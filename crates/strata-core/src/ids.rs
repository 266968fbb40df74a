//! ID prefixes for every stored entity.
//!
//! IDs are generated by the store as `{prefix}-{8 hex chars}`, e.g. `obj-3f2a9c1b`.

pub const PREFIX_ORGANIZATION: &str = "org";
pub const PREFIX_MEMBERSHIP: &str = "mbr";
pub const PREFIX_OBJECTIVE: &str = "obj";
pub const PREFIX_PROGRAM: &str = "prg";
pub const PREFIX_INITIATIVE_FEED: &str = "fed";
pub const PREFIX_INITIATIVE: &str = "ini";
pub const PREFIX_MEASURE: &str = "pms";
pub const PREFIX_ACTIVITY: &str = "act";
pub const PREFIX_SUB_ACTIVITY: &str = "sac";
pub const PREFIX_BUDGET: &str = "bdg";
pub const PREFIX_PLAN: &str = "pln";
pub const PREFIX_REVIEW: &str = "rev";
pub const PREFIX_LOCATION: &str = "loc";
pub const PREFIX_LAND_TRANSPORT: &str = "ltr";
pub const PREFIX_AIR_TRANSPORT: &str = "atr";
pub const PREFIX_PER_DIEM: &str = "pdm";
pub const PREFIX_ACCOMMODATION: &str = "acm";
pub const PREFIX_PARTICIPANT_COST: &str = "pcs";
pub const PREFIX_SESSION_COST: &str = "scs";
pub const PREFIX_PRINTING_COST: &str = "prc";
pub const PREFIX_SUPERVISOR_COST: &str = "svc";
pub const PREFIX_PROCUREMENT_ITEM: &str = "pri";

/// Every prefix, for exhaustive ID-format tests.
pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_ORGANIZATION,
    PREFIX_MEMBERSHIP,
    PREFIX_OBJECTIVE,
    PREFIX_PROGRAM,
    PREFIX_INITIATIVE_FEED,
    PREFIX_INITIATIVE,
    PREFIX_MEASURE,
    PREFIX_ACTIVITY,
    PREFIX_SUB_ACTIVITY,
    PREFIX_BUDGET,
    PREFIX_PLAN,
    PREFIX_REVIEW,
    PREFIX_LOCATION,
    PREFIX_LAND_TRANSPORT,
    PREFIX_AIR_TRANSPORT,
    PREFIX_PER_DIEM,
    PREFIX_ACCOMMODATION,
    PREFIX_PARTICIPANT_COST,
    PREFIX_SESSION_COST,
    PREFIX_PRINTING_COST,
    PREFIX_SUPERVISOR_COST,
    PREFIX_PROCUREMENT_ITEM,
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn prefixes_are_unique_and_three_chars() {
        let unique: HashSet<_> = ALL_PREFIXES.iter().collect();
        assert_eq!(unique.len(), ALL_PREFIXES.len());
        for prefix in ALL_PREFIXES {
            assert_eq!(prefix.len(), 3, "prefix '{prefix}' should be 3 chars");
        }
    }
}
