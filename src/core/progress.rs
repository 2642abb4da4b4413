use chrono::NaiveDate;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{dates::parse_date, ApplicantProgress, FunnelStage};

#[derive(Error, Debug, PartialEq)]
pub enum ProgressError {
    #[error("Invalid date format for {0}. Use YYYY-MM-DD")]
    InvalidDate(&'static str),
}

/// One milestone assignment extracted from a progress update body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageUpdate {
    pub stage: FunnelStage,
    pub date: Option<NaiveDate>,
}

/// A milestone whose value actually changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageChange {
    pub stage: FunnelStage,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Extract milestone updates from a JSON body
///
/// Only keys naming a milestone are considered. `null` and `""` clear the
/// date; any other value must be a `YYYY-MM-DD` string.
pub fn parse_progress_update(body: &Map<String, Value>) -> Result<Vec<StageUpdate>, ProgressError> {
    FunnelStage::ALL
        .iter()
        .filter_map(|&stage| body.get(stage.field()).map(|value| (stage, value)))
        .map(|(stage, value)| {
            let date = match value {
                Value::Null => None,
                Value::String(s) if s.trim().is_empty() => None,
                Value::String(s) => {
                    Some(parse_date(s).ok_or(ProgressError::InvalidDate(stage.field()))?)
                }
                _ => return Err(ProgressError::InvalidDate(stage.field())),
            };
            Ok(StageUpdate { stage, date })
        })
        .collect()
}

/// Apply updates, returning only the milestones that changed
pub fn apply_updates(progress: &mut ApplicantProgress, updates: &[StageUpdate]) -> Vec<StageChange> {
    let mut changes = Vec::new();
    for update in updates {
        let from = progress.get(update.stage);
        if from != update.date {
            progress.set(update.stage, update.date);
            changes.push(StageChange {
                stage: update.stage,
                from,
                to: update.date,
            });
        }
    }
    changes
}

/// The furthest milestone that carries a date
///
/// Dates are not required to be ordered, so this is the last stage in funnel
/// order with a value, not the most recent date.
pub fn furthest_stage(progress: &ApplicantProgress) -> Option<FunnelStage> {
    FunnelStage::ALL
        .iter()
        .rev()
        .copied()
        .find(|&stage| progress.get(stage).is_some())
}
