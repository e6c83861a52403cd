use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// The three independently uploaded datasets.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SourceKind {
    /// Staff directory (one row per employee)
    Directory,
    /// Card swipe / building access log
    AccessLog,
    /// Approved official leave
    LeaveLog,
}

impl SourceKind {
    /// Table holding the current snapshot of this source.
    pub fn table(&self) -> &'static str {
        match self {
            SourceKind::Directory => "employees",
            SourceKind::AccessLog => "card_logins",
            SourceKind::LeaveLog => "official_leaves",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_source_kind_round_trips_through_its_name() {
        for kind in SourceKind::iter() {
            assert_eq!(SourceKind::from_str(kind.as_ref()).unwrap(), kind);
        }
        assert_eq!(SourceKind::AccessLog.to_string(), "access-log");
    }

    #[test]
    fn test_each_source_has_its_own_table() {
        let tables: std::collections::HashSet<_> = SourceKind::iter().map(|k| k.table()).collect();
        assert_eq!(tables.len(), 3);
    }
}
