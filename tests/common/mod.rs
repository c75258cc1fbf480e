//! Recording fake engine shared by the HTTP tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use chrono::{DateTime, FixedOffset};
use parking_lot::Mutex;
use serde_json::Value;
use tower::ServiceExt;

use flowrest::compiler::coerce::{TypedValue, ValueType};
use flowrest::compiler::operator::Operator;
use flowrest::compiler::selector::TenantScoped;
use flowrest::engine::{
    EngineError, JobDefinitionSuspensionBuilder, JobDto, JobQuery, JobRetriesBuilder,
    JobSuspensionBuilder, MessageCorrelationBuilder, ProcessEngine, ProcessInstanceDto,
    ProcessInstanceQuery, ProcessInstanceSuspensionBuilder, Query, SuspensionTerminal, TaskDto,
    TaskQuery,
};
use flowrest::{AppState, Config, build_app};

/// Every call made on the engine, its queries and its builders, in order
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, call: String) {
        self.0.lock().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn contains(&self, call: &str) -> bool {
        self.0.lock().iter().any(|c| c == call)
    }
}

/// Implements trait methods that only record their name and arguments
macro_rules! record {
    ($($name:ident($($arg:ident: $ty:ty),*);)*) => {
        $(
            fn $name(&mut self, $($arg: $ty),*) {
                let args: Vec<String> = vec![$(format!("{:?}", $arg)),*];
                self.log.push(format!("{}({})", stringify!($name), args.join(", ")));
            }
        )*
    };
}

// ============================================================================
// Queries
// ============================================================================

pub struct FakeQuery<T> {
    log: CallLog,
    rows: Vec<T>,
    failure: Option<EngineError>,
}

impl<T: Clone> FakeQuery<T> {
    fn result<R>(&self, call: String, value: R) -> Result<R, EngineError> {
        self.log.push(call);
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(value),
        }
    }
}

impl<T: Clone> Query for FakeQuery<T> {
    type Item = T;

    fn asc(&mut self) {
        self.log.push("asc()".to_string());
    }

    fn desc(&mut self) {
        self.log.push("desc()".to_string());
    }

    fn list(&self) -> Result<Vec<T>, EngineError> {
        self.result("list()".to_string(), self.rows.clone())
    }

    fn list_page(&self, first: i32, max: i32) -> Result<Vec<T>, EngineError> {
        self.result(format!("list_page({first}, {max})"), self.rows.clone())
    }

    fn count(&self) -> Result<i64, EngineError> {
        self.result("count()".to_string(), self.rows.len() as i64)
    }
}

impl JobQuery for FakeQuery<JobDto> {
    record! {
        job_id(id: &str);
        job_ids(ids: &[String]);
        job_definition_id(id: &str);
        process_instance_id(id: &str);
        process_instance_ids(ids: &[String]);
        execution_id(id: &str);
        process_definition_id(id: &str);
        process_definition_key(key: &str);
        activity_id(id: &str);
        with_retries_left();
        no_retries_left();
        executable();
        timers();
        messages();
        due_date(operator: Operator, date: DateTime<FixedOffset>);
        create_time(operator: Operator, date: DateTime<FixedOffset>);
        with_exception();
        exception_message(message: &str);
        active();
        suspended();
        priority_higher_than_or_equals(priority: i64);
        priority_lower_than_or_equals(priority: i64);
        tenant_id_in(ids: &[String]);
        without_tenant_id();
        include_jobs_without_tenant_id();
        order_by_job_id();
        order_by_job_definition_id();
        order_by_execution_id();
        order_by_process_instance_id();
        order_by_process_definition_id();
        order_by_process_definition_key();
        order_by_job_retries();
        order_by_job_due_date();
        order_by_job_priority();
        order_by_tenant_id();
    }
}

impl TaskQuery for FakeQuery<TaskDto> {
    record! {
        task_id(id: &str);
        name(name: &str);
        name_like(pattern: &str);
        assignee(assignee: &str);
        assignee_like(pattern: &str);
        owner(owner: &str);
        candidate_group(group: &str);
        candidate_user(user: &str);
        process_instance_id(id: &str);
        process_definition_key(key: &str);
        process_definition_key_in(keys: &[String]);
        task_definition_key(key: &str);
        description(description: &str);
        priority(priority: i32);
        max_priority(priority: i32);
        min_priority(priority: i32);
        due_after(date: DateTime<FixedOffset>);
        due_before(date: DateTime<FixedOffset>);
        created_after(date: DateTime<FixedOffset>);
        created_before(date: DateTime<FixedOffset>);
        assigned();
        unassigned();
        active();
        suspended();
        tenant_id_in(ids: &[String]);
        without_tenant_id();
        task_variable_value(name: &str, operator: Operator, value: &TypedValue);
        process_variable_value(name: &str, operator: Operator, value: &TypedValue);
        case_instance_variable_value(name: &str, operator: Operator, value: &TypedValue);
        match_variable_names_ignore_case();
        match_variable_values_ignore_case();
        order_by_process_instance_id();
        order_by_case_instance_id();
        order_by_due_date();
        order_by_follow_up_date();
        order_by_execution_id();
        order_by_case_execution_id();
        order_by_assignee();
        order_by_create_time();
        order_by_description();
        order_by_task_id();
        order_by_name();
        order_by_name_case_insensitive();
        order_by_priority();
        order_by_tenant_id();
        order_by_process_variable(name: &str, value_type: ValueType);
        order_by_execution_variable(name: &str, value_type: ValueType);
        order_by_task_variable(name: &str, value_type: ValueType);
        order_by_case_instance_variable(name: &str, value_type: ValueType);
        order_by_case_execution_variable(name: &str, value_type: ValueType);
    }
}

impl ProcessInstanceQuery for FakeQuery<ProcessInstanceDto> {
    record! {
        process_instance_ids(ids: &[String]);
        business_key(key: &str);
        business_key_like(pattern: &str);
        process_definition_id(id: &str);
        process_definition_key(key: &str);
        process_definition_key_in(keys: &[String]);
        super_process_instance(id: &str);
        sub_process_instance(id: &str);
        active();
        suspended();
        with_incident();
        incident_id(id: &str);
        tenant_id_in(ids: &[String]);
        without_tenant_id();
        activity_id_in(ids: &[String]);
        variable_value(name: &str, operator: Operator, value: &TypedValue);
        match_variable_names_ignore_case();
        match_variable_values_ignore_case();
        order_by_process_instance_id();
        order_by_process_definition_key();
        order_by_process_definition_id();
        order_by_business_key();
        order_by_tenant_id();
    }
}

// ============================================================================
// Command builders
// ============================================================================

pub struct FakeBuilder {
    log: CallLog,
    failure: Option<EngineError>,
}

impl FakeBuilder {
    fn finish(self: Box<Self>, terminal: &str) -> Result<(), EngineError> {
        self.log.push(format!("{terminal}()"));
        match self.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl TenantScoped for FakeBuilder {
    record! {
        tenant_id(tenant_id: &str);
        without_tenant_id();
    }
}

impl SuspensionTerminal for FakeBuilder {
    fn activate(self: Box<Self>) -> Result<(), EngineError> {
        self.finish("activate")
    }

    fn suspend(self: Box<Self>) -> Result<(), EngineError> {
        self.finish("suspend")
    }
}

impl JobSuspensionBuilder for FakeBuilder {
    record! {
        by_job_id(job_id: &str);
        by_job_definition_id(job_definition_id: &str);
        by_process_instance_id(process_instance_id: &str);
        by_process_definition_id(process_definition_id: &str);
        by_process_definition_key(process_definition_key: &str);
    }
}

impl JobDefinitionSuspensionBuilder for FakeBuilder {
    record! {
        by_job_definition_id(job_definition_id: &str);
        by_process_definition_id(process_definition_id: &str);
        by_process_definition_key(process_definition_key: &str);
        include_jobs(include: bool);
        execution_date(date: DateTime<FixedOffset>);
    }
}

impl ProcessInstanceSuspensionBuilder for FakeBuilder {
    record! {
        by_process_instance_id(process_instance_id: &str);
        by_process_definition_id(process_definition_id: &str);
        by_process_definition_key(process_definition_key: &str);
    }
}

impl JobRetriesBuilder for FakeBuilder {
    record! {
        job_id(job_id: &str);
        job_ids(job_ids: &[String]);
        job_definition_id(job_definition_id: &str);
        due_date(date: DateTime<FixedOffset>);
    }

    fn execute(self: Box<Self>) -> Result<(), EngineError> {
        self.finish("execute")
    }
}

impl MessageCorrelationBuilder for FakeBuilder {
    record! {
        process_instance_business_key(business_key: &str);
        process_instance_id(process_instance_id: &str);
        process_instance_variable_equals(name: &str, value: &TypedValue);
        local_variable_equals(name: &str, value: &TypedValue);
        set_variable(name: &str, value: TypedValue);
    }

    fn correlate(self: Box<Self>) -> Result<(), EngineError> {
        self.finish("correlate")
    }

    fn correlate_all(self: Box<Self>) -> Result<(), EngineError> {
        self.finish("correlate_all")
    }
}

// ============================================================================
// Engine
// ============================================================================

#[derive(Default)]
pub struct FakeEngine {
    pub log: CallLog,
    pub jobs: Vec<JobDto>,
    pub tasks: Vec<TaskDto>,
    pub instances: Vec<ProcessInstanceDto>,
    /// Returned by every terminal call
    pub failure: Option<EngineError>,
}

impl FakeEngine {
    fn query<T: Clone>(&self, family: &str, rows: &[T]) -> Box<FakeQuery<T>> {
        self.log.push(format!("create_{family}_query()"));
        Box::new(FakeQuery {
            log: self.log.clone(),
            rows: rows.to_vec(),
            failure: self.failure.clone(),
        })
    }

    fn builder(&self, call: String) -> Box<FakeBuilder> {
        self.log.push(call);
        Box::new(FakeBuilder {
            log: self.log.clone(),
            failure: self.failure.clone(),
        })
    }
}

impl ProcessEngine for FakeEngine {
    fn create_job_query(&self) -> Box<dyn JobQuery> {
        self.query("job", &self.jobs)
    }

    fn create_task_query(&self) -> Box<dyn TaskQuery> {
        self.query("task", &self.tasks)
    }

    fn create_process_instance_query(&self) -> Box<dyn ProcessInstanceQuery> {
        self.query("process_instance", &self.instances)
    }

    fn update_job_suspension_state(&self) -> Box<dyn JobSuspensionBuilder> {
        self.builder("update_job_suspension_state()".to_string())
    }

    fn update_job_definition_suspension_state(&self) -> Box<dyn JobDefinitionSuspensionBuilder> {
        self.builder("update_job_definition_suspension_state()".to_string())
    }

    fn update_process_instance_suspension_state(
        &self,
    ) -> Box<dyn ProcessInstanceSuspensionBuilder> {
        self.builder("update_process_instance_suspension_state()".to_string())
    }

    fn set_job_retries(&self, retries: i32) -> Box<dyn JobRetriesBuilder> {
        self.builder(format!("set_job_retries({retries})"))
    }

    fn create_message_correlation(&self, message_name: &str) -> Box<dyn MessageCorrelationBuilder> {
        self.builder(format!("create_message_correlation({message_name:?})"))
    }

    fn set_task_variable(
        &self,
        task_id: &str,
        name: &str,
        value: TypedValue,
    ) -> Result<(), EngineError> {
        self.log
            .push(format!("set_task_variable({task_id:?}, {name:?}, {value:?})"));
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

// ============================================================================
// HTTP helpers
// ============================================================================

/// Router over `engine`, plus the log its calls are recorded in
pub fn app(engine: FakeEngine) -> (Router, CallLog) {
    app_with_config(engine, &Config::default())
}

pub fn app_with_config(engine: FakeEngine, config: &Config) -> (Router, CallLog) {
    let log = engine.log.clone();
    let state = AppState::new(config, Arc::new(engine));
    (build_app(state), log)
}

pub async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app.oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::PUT, uri, Some(body)).await
}

/// Calls made on the query object, without the factory call and the terminal
pub fn query_calls(log: &CallLog) -> Vec<String> {
    log.calls()
        .into_iter()
        .filter(|c| !c.starts_with("create_") && !c.starts_with("list") && c != "count()")
        .collect()
}
