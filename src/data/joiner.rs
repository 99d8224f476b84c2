//! Joiner Module
//! Inner join of the KPI and growth tables on `property`.

use super::schema::{GrowthRecord, PropertyKpi};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum JoinError {
    #[error("property '{0}' appears more than once in the KPI table")]
    DuplicateProperty(String),
}

/// A growth row paired with its property's KPI row.
///
/// The KPI side is borrowed, so per-property totals exist once no matter how
/// many months the property was held.
#[derive(Debug, Clone, Copy)]
pub struct JoinedRow<'a> {
    pub kpi: &'a PropertyKpi,
    pub growth: &'a GrowthRecord,
}

/// One-to-many inner join. Unmatched rows on either side are dropped.
pub fn inner_join<'a>(
    kpis: &'a [PropertyKpi],
    growth: &'a [GrowthRecord],
) -> Result<Vec<JoinedRow<'a>>, JoinError> {
    let mut by_property: HashMap<&str, &PropertyKpi> = HashMap::with_capacity(kpis.len());
    for kpi in kpis {
        if by_property.insert(kpi.property.as_str(), kpi).is_some() {
            return Err(JoinError::DuplicateProperty(kpi.property.clone()));
        }
    }

    let rows: Vec<JoinedRow<'a>> = growth
        .iter()
        .filter_map(|g| {
            by_property
                .get(g.property.as_str())
                .map(|&kpi| JoinedRow { kpi, growth: g })
        })
        .collect();

    let matched: HashSet<&str> = rows.iter().map(|r| r.kpi.property.as_str()).collect();
    debug!(
        joined = rows.len(),
        unmatched_growth = growth.len() - rows.len(),
        unmatched_kpi = kpis.len() - matched.len(),
        "inner join on property"
    );

    Ok(rows)
}
