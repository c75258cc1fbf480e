//! Result rows returned by engine queries

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDto {
    pub id: String,
    pub job_definition_id: Option<String>,
    pub process_instance_id: Option<String>,
    pub process_definition_id: Option<String>,
    pub process_definition_key: Option<String>,
    pub execution_id: Option<String>,
    pub exception_message: Option<String>,
    pub retries: i32,
    pub due_date: Option<DateTime<FixedOffset>>,
    pub suspended: bool,
    pub priority: i64,
    pub tenant_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
    pub id: String,
    pub name: Option<String>,
    pub assignee: Option<String>,
    pub owner: Option<String>,
    pub created: Option<DateTime<FixedOffset>>,
    pub due: Option<DateTime<FixedOffset>>,
    pub description: Option<String>,
    pub priority: i32,
    pub process_instance_id: Option<String>,
    pub task_definition_key: Option<String>,
    pub suspended: bool,
    pub tenant_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInstanceDto {
    pub id: String,
    pub definition_id: Option<String>,
    pub business_key: Option<String>,
    pub suspended: bool,
    pub ended: bool,
    pub tenant_id: Option<String>,
}

/// Body of every `/count` endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountResultDto {
    pub count: i64,
}
