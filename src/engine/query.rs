//! Query families

use chrono::{DateTime, FixedOffset};

use super::Query;
use super::dto::{JobDto, ProcessInstanceDto, TaskDto};
use crate::compiler::coerce::{TypedValue, ValueType};
use crate::compiler::operator::Operator;

pub trait JobQuery: Query<Item = JobDto> {
    fn job_id(&mut self, id: &str);
    fn job_ids(&mut self, ids: &[String]);
    fn job_definition_id(&mut self, id: &str);
    fn process_instance_id(&mut self, id: &str);
    fn process_instance_ids(&mut self, ids: &[String]);
    fn execution_id(&mut self, id: &str);
    fn process_definition_id(&mut self, id: &str);
    fn process_definition_key(&mut self, key: &str);
    fn activity_id(&mut self, id: &str);
    fn with_retries_left(&mut self);
    fn no_retries_left(&mut self);
    fn executable(&mut self);
    fn timers(&mut self);
    fn messages(&mut self);
    /// Due date condition; only `gt` and `lt` reach the engine
    fn due_date(&mut self, operator: Operator, date: DateTime<FixedOffset>);
    /// Create time condition; only `gt` and `lt` reach the engine
    fn create_time(&mut self, operator: Operator, date: DateTime<FixedOffset>);
    fn with_exception(&mut self);
    fn exception_message(&mut self, message: &str);
    fn active(&mut self);
    fn suspended(&mut self);
    fn priority_higher_than_or_equals(&mut self, priority: i64);
    fn priority_lower_than_or_equals(&mut self, priority: i64);
    fn tenant_id_in(&mut self, ids: &[String]);
    fn without_tenant_id(&mut self);
    fn include_jobs_without_tenant_id(&mut self);

    fn order_by_job_id(&mut self);
    fn order_by_job_definition_id(&mut self);
    fn order_by_execution_id(&mut self);
    fn order_by_process_instance_id(&mut self);
    fn order_by_process_definition_id(&mut self);
    fn order_by_process_definition_key(&mut self);
    fn order_by_job_retries(&mut self);
    fn order_by_job_due_date(&mut self);
    fn order_by_job_priority(&mut self);
    fn order_by_tenant_id(&mut self);
}

pub trait TaskQuery: Query<Item = TaskDto> {
    fn task_id(&mut self, id: &str);
    fn name(&mut self, name: &str);
    fn name_like(&mut self, pattern: &str);
    fn assignee(&mut self, assignee: &str);
    fn assignee_like(&mut self, pattern: &str);
    fn owner(&mut self, owner: &str);
    fn candidate_group(&mut self, group: &str);
    fn candidate_user(&mut self, user: &str);
    fn process_instance_id(&mut self, id: &str);
    fn process_definition_key(&mut self, key: &str);
    fn process_definition_key_in(&mut self, keys: &[String]);
    fn task_definition_key(&mut self, key: &str);
    fn description(&mut self, description: &str);
    fn priority(&mut self, priority: i32);
    fn max_priority(&mut self, priority: i32);
    fn min_priority(&mut self, priority: i32);
    fn due_after(&mut self, date: DateTime<FixedOffset>);
    fn due_before(&mut self, date: DateTime<FixedOffset>);
    fn created_after(&mut self, date: DateTime<FixedOffset>);
    fn created_before(&mut self, date: DateTime<FixedOffset>);
    fn assigned(&mut self);
    fn unassigned(&mut self);
    fn active(&mut self);
    fn suspended(&mut self);
    fn tenant_id_in(&mut self, ids: &[String]);
    fn without_tenant_id(&mut self);

    fn task_variable_value(&mut self, name: &str, operator: Operator, value: &TypedValue);
    fn process_variable_value(&mut self, name: &str, operator: Operator, value: &TypedValue);
    fn case_instance_variable_value(&mut self, name: &str, operator: Operator, value: &TypedValue);
    fn match_variable_names_ignore_case(&mut self);
    fn match_variable_values_ignore_case(&mut self);

    fn order_by_process_instance_id(&mut self);
    fn order_by_case_instance_id(&mut self);
    fn order_by_due_date(&mut self);
    fn order_by_follow_up_date(&mut self);
    fn order_by_execution_id(&mut self);
    fn order_by_case_execution_id(&mut self);
    fn order_by_assignee(&mut self);
    fn order_by_create_time(&mut self);
    fn order_by_description(&mut self);
    fn order_by_task_id(&mut self);
    fn order_by_name(&mut self);
    fn order_by_name_case_insensitive(&mut self);
    fn order_by_priority(&mut self);
    fn order_by_tenant_id(&mut self);
    fn order_by_process_variable(&mut self, name: &str, value_type: ValueType);
    fn order_by_execution_variable(&mut self, name: &str, value_type: ValueType);
    fn order_by_task_variable(&mut self, name: &str, value_type: ValueType);
    fn order_by_case_instance_variable(&mut self, name: &str, value_type: ValueType);
    fn order_by_case_execution_variable(&mut self, name: &str, value_type: ValueType);
}

pub trait ProcessInstanceQuery: Query<Item = ProcessInstanceDto> {
    fn process_instance_ids(&mut self, ids: &[String]);
    fn business_key(&mut self, key: &str);
    fn business_key_like(&mut self, pattern: &str);
    fn process_definition_id(&mut self, id: &str);
    fn process_definition_key(&mut self, key: &str);
    fn process_definition_key_in(&mut self, keys: &[String]);
    fn super_process_instance(&mut self, id: &str);
    fn sub_process_instance(&mut self, id: &str);
    fn active(&mut self);
    fn suspended(&mut self);
    fn with_incident(&mut self);
    fn incident_id(&mut self, id: &str);
    fn tenant_id_in(&mut self, ids: &[String]);
    fn without_tenant_id(&mut self);
    fn activity_id_in(&mut self, ids: &[String]);

    fn variable_value(&mut self, name: &str, operator: Operator, value: &TypedValue);
    fn match_variable_names_ignore_case(&mut self);
    fn match_variable_values_ignore_case(&mut self);

    fn order_by_process_instance_id(&mut self);
    fn order_by_process_definition_key(&mut self);
    fn order_by_process_definition_id(&mut self);
    fn order_by_business_key(&mut self);
    fn order_by_tenant_id(&mut self);
}
