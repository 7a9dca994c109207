// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, ensure};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::format::{format_money, format_time_left, format_timestamp, format_value};

/// One goal as returned by the goal-list endpoint. Snapshots are replaced
/// wholesale on refresh, never patched in place.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GoalSummary {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    pub curval: Option<f64>,
    pub goalval: Option<f64>,
    pub rate: Option<f64>,
    pub losedate: Option<i64>,
    pub updated_at: Option<i64>,
    pub lost: Option<bool>,
    pub won: Option<bool>,
    pub frozen: Option<bool>,
}

impl GoalSummary {
    pub fn status(&self) -> GoalStatus {
        GoalStatus::derive(
            self.lost.unwrap_or(false),
            self.won.unwrap_or(false),
            self.frozen.unwrap_or(false),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalStatus {
    Lost,
    Won,
    Frozen,
    Active,
}

impl GoalStatus {
    /// The flags are not mutually exclusive in the data; display picks one
    /// with priority lost > won > frozen.
    pub const fn derive(lost: bool, won: bool, frozen: bool) -> Self {
        if lost {
            Self::Lost
        } else if won {
            Self::Won
        } else if frozen {
            Self::Frozen
        } else {
            Self::Active
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lost => "LOST",
            Self::Won => "WON",
            Self::Frozen => "FROZEN",
            Self::Active => "ACTIVE",
        }
    }
}

/// Expanded view of a single goal, fetched on demand by slug.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GoalDetail {
    #[serde(flatten)]
    pub summary: GoalSummary,
    pub description: Option<String>,
    pub fineprint: Option<String>,
    pub yaxis: Option<String>,
    pub runits: Option<String>,
    pub gunits: Option<String>,
    pub goal_type: Option<String>,
    pub pledge: Option<f64>,
    pub autodata: Option<String>,
    pub currate: Option<f64>,
    pub delta_text: Option<String>,
    pub safebuf: Option<i64>,
    pub deadline: Option<i64>,
    pub weekends_off: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub datapoints: Option<Vec<Datapoint>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Datapoint {
    pub id: Option<String>,
    pub timestamp: Option<i64>,
    pub daystamp: Option<String>,
    pub value: f64,
    pub comment: Option<String>,
    pub requestid: Option<String>,
    pub updated_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub goals: Vec<String>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub timezone: Option<String>,
    pub urgency_load: Option<f64>,
}

/// A new measurement to submit against a goal. Consumed exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct DatapointRequest {
    pub value: f64,
    pub comment: Option<String>,
}

impl DatapointRequest {
    pub fn new(value: f64, comment: Option<String>) -> Result<Self> {
        ensure!(value.is_finite(), "datapoint value must be a finite number");
        Ok(Self {
            value,
            comment: comment.filter(|comment| !comment.is_empty()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailField {
    pub label: &'static str,
    pub value: Option<String>,
}

/// Fixed-order field list behind the detail pane. Absent values render "N/A"
/// at the UI layer.
pub fn detail_fields(goal: &GoalDetail, now: OffsetDateTime) -> Vec<DetailField> {
    let summary = &goal.summary;
    vec![
        field("Slug", Some(summary.slug.clone())),
        field("Title", Some(summary.title.clone())),
        field("Description", text(&goal.description)),
        field("Current Value", Some(format_value(summary.curval))),
        field("Goal Value", Some(format_value(summary.goalval))),
        field("Rate", Some(format_value(summary.rate))),
        field("Run Units", text(&goal.runits)),
        field("Goal Units", text(&goal.gunits)),
        field("Goal Type", text(&goal.goal_type)),
        field("Pledge", Some(format_money(goal.pledge))),
        field("Lose Date", Some(format_timestamp(summary.losedate))),
        field(
            "Time Remaining",
            Some(format_time_left(summary.losedate, now)),
        ),
        field("Last Updated", Some(format_timestamp(summary.updated_at))),
        field("Status", Some(summary.status().as_str().to_owned())),
        field("Auto Data", text(&goal.autodata)),
        field("Fine Print", text(&goal.fineprint)),
        field("Y-Axis", text(&goal.yaxis)),
        field(
            "Current Rate",
            Some(format!("{:.2}", goal.currate.unwrap_or(0.0))),
        ),
        field("Delta", text(&goal.delta_text)),
        field(
            "Safe Buffer",
            Some(format!("{} days", goal.safebuf.unwrap_or(0))),
        ),
        field("Deadline", Some(format!("{}:00", goal.deadline.unwrap_or(0)))),
        field(
            "Weekends Off",
            Some(
                if goal.weekends_off.unwrap_or(false) {
                    "Yes"
                } else {
                    "No"
                }
                .to_owned(),
            ),
        ),
        field("Tags", tags_value(goal.tags.as_deref())),
    ]
}

fn field(label: &'static str, value: Option<String>) -> DetailField {
    DetailField { label, value }
}

fn text(value: &Option<String>) -> Option<String> {
    value.clone().filter(|text| !text.is_empty())
}

fn tags_value(tags: Option<&[String]>) -> Option<String> {
    let joined = tags.unwrap_or_default().join(", ");
    (!joined.is_empty()).then_some(joined)
}
