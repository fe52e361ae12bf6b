//! Upsert plan building
//!
//! An import outcome carries run-scoped identifiers, so persistence has
//! to match on natural keys instead: the calendar slug, the day number
//! within a calendar, the field key within a day, and the metric key
//! within a calendar. This module projects an outcome onto exactly those
//! upserts, in the order the store applies them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::date_from_start;
use crate::error::ImportError;
use crate::types::{FieldType, ImportOutcome, MetricType};

/// Options for the calendar a plan seeds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanOptions {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub duration_days: u32,
    /// Program start; when unset and no day carries a date, day dates
    /// stay unresolved
    pub start_date: Option<NaiveDate>,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            slug: "default".to_string(),
            title: "Core 90".to_string(),
            description: "Seeded via CSV".to_string(),
            duration_days: 90,
            start_date: None,
        }
    }
}

/// Calendar-level upsert, keyed by slug
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarUpsert {
    pub slug: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    pub duration_days: u32,
    pub is_active: bool,
}

/// One field row, keyed by (day, field_key). A day's field set replaces
/// the previous one wholesale, in `order_index` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldUpsert {
    pub field_key: String,
    pub field_label: String,
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    pub is_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
    pub order_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_unit: Option<String>,
}

/// Day-level upsert, keyed by (calendar, day_number)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayUpsert {
    pub day_number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_date: Option<NaiveDate>,
    pub assignment_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracker_prompt: Option<String>,
    pub fields: Vec<FieldUpsert>,
}

/// Calendar-level behavior upsert, keyed by (calendar, metric_key). The
/// set replaces the calendar's previous metrics wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorUpsert {
    pub metric_key: String,
    pub metric_label: String,
    pub metric_type: MetricType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
}

/// Everything the store needs to seed one calendar from one import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportPlan {
    pub calendar: CalendarUpsert,
    pub days: Vec<DayUpsert>,
    pub behaviors: Vec<BehaviorUpsert>,
}

/// Builder projecting an import outcome onto store upserts
pub struct PlanBuilder;

impl PlanBuilder {
    /// Build the upsert plan for one import.
    ///
    /// An outcome with zero days is a rejected import. Day dates resolve
    /// from the day itself when it carries one, otherwise from the plan
    /// start date plus the day number offset.
    pub fn build(outcome: &ImportOutcome, options: &PlanOptions) -> Result<ImportPlan, ImportError> {
        if outcome.days.is_empty() {
            return Err(ImportError::EmptyImport);
        }

        let start_date = outcome
            .days
            .first()
            .and_then(|day| day.day_date)
            .or(options.start_date);

        let mut days = Vec::with_capacity(outcome.days.len());
        let mut behaviors = Vec::new();

        for day in &outcome.days {
            let day_date = day
                .day_date
                .or_else(|| start_date.and_then(|start| date_from_start(start, day.day_number)));

            let fields = day
                .fields
                .iter()
                .enumerate()
                .map(|(order_index, field)| {
                    let options = field
                        .options
                        .as_ref()
                        .map(serde_json::to_value)
                        .transpose()?;
                    Ok(FieldUpsert {
                        field_key: field.field_key.clone(),
                        field_label: field.field_label.clone(),
                        field_type: field.field_type,
                        help_text: field.help_text.clone(),
                        is_required: field.is_required,
                        options,
                        order_index,
                        data_unit: field.data_unit.clone(),
                    })
                })
                .collect::<Result<Vec<_>, ImportError>>()?;

            for metric in &day.behavior_metrics {
                behaviors.push(BehaviorUpsert {
                    metric_key: metric.metric_key.clone(),
                    metric_label: metric.metric_label.clone(),
                    metric_type: metric.metric_type,
                    unit_label: metric.unit_label.clone(),
                    min_value: metric.min_value,
                    max_value: metric.max_value,
                });
            }

            days.push(DayUpsert {
                day_number: day.day_number,
                day_date,
                assignment_title: day.assignment_title.clone(),
                assignment_summary: day.assignment_summary.clone(),
                tracker_prompt: day.tracker_prompt.clone(),
                fields,
            });
        }

        Ok(ImportPlan {
            calendar: CalendarUpsert {
                slug: options.slug.clone(),
                title: options.title.clone(),
                description: options.description.clone(),
                start_date,
                duration_days: options.duration_days,
                is_active: true,
            },
            days,
            behaviors,
        })
    }
}
