//! # Request Dispatch
//!
//! Maps `{ "id", "channel", "args" }` invocations onto channel handlers.
//!
//! ```text
//! stdin line ──► Invocation ──► Request (serde, tag = channel) ──► commands::*
//!                                                                     │
//! stdout line ◄── Response { id, ok, data | error } ◄── Result<_, ApiError>
//! ```
//!
//! Every call is timed. Failures are logged with their channel and handed
//! back as `ApiError`; nothing is retried here.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, error};

use crate::commands::{
    self, category, costs, customer, dashboard, dates, employee, item, job, machine,
    machine_entry, report, IdArgs, UpdateArgs,
};
use crate::error::ApiError;
use crate::state::AppState;
use jobcost_core::{
    CategoryInput, CustomerInput, EmployeeInput, ItemInput, JobFilter, MachineTypeInput,
};

/// One call from the UI.
#[derive(Debug, Clone, Deserialize)]
pub struct Invocation {
    /// Echoed back so the caller can match responses to calls.
    #[serde(default)]
    pub id: Value,
    pub channel: String,
    #[serde(default)]
    pub args: Value,
}

/// `{"id", "ok": true, "data"}` or `{"id", "ok": false, "error"}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub id: Value,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl Response {
    fn success(id: Value, data: Value) -> Self {
        Response {
            id,
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    fn failure(id: Value, error: ApiError) -> Self {
        Response {
            id,
            ok: false,
            data: None,
            error: Some(error),
        }
    }
}

/// Every channel with its decoded arguments.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "channel", content = "args")]
pub enum Request {
    // Customers
    #[serde(rename = "customers:list")]
    CustomersList {},
    #[serde(rename = "customers:get")]
    CustomersGet(IdArgs),
    #[serde(rename = "customers:create")]
    CustomersCreate(CustomerInput),
    #[serde(rename = "customers:update")]
    CustomersUpdate(UpdateArgs<CustomerInput>),
    #[serde(rename = "customers:delete")]
    CustomersDelete(IdArgs),

    // Categories
    #[serde(rename = "categories:list")]
    CategoriesList {},
    #[serde(rename = "categories:create")]
    CategoriesCreate(CategoryInput),
    #[serde(rename = "categories:update")]
    CategoriesUpdate(UpdateArgs<CategoryInput>),
    #[serde(rename = "categories:delete")]
    CategoriesDelete(IdArgs),

    // Items
    #[serde(rename = "items:list")]
    ItemsList {},
    #[serde(rename = "items:get")]
    ItemsGet(IdArgs),
    #[serde(rename = "items:create")]
    ItemsCreate(ItemInput),
    #[serde(rename = "items:update")]
    ItemsUpdate(UpdateArgs<ItemInput>),
    #[serde(rename = "items:delete")]
    ItemsDelete(IdArgs),
    #[serde(rename = "items:byCategory", rename_all = "camelCase")]
    ItemsByCategory { category_id: i64 },

    // Machine types
    #[serde(rename = "machines:list")]
    MachinesList {},
    #[serde(rename = "machines:get")]
    MachinesGet(IdArgs),
    #[serde(rename = "machines:getSchema")]
    MachinesGetSchema(IdArgs),
    #[serde(rename = "machines:create")]
    MachinesCreate(MachineTypeInput),
    #[serde(rename = "machines:update")]
    MachinesUpdate(UpdateArgs<MachineTypeInput>),
    #[serde(rename = "machines:delete")]
    MachinesDelete(IdArgs),
    #[serde(rename = "machines:fieldSummary")]
    MachinesFieldSummary(job::OwnerArgs),

    // Employees
    #[serde(rename = "employees:list")]
    EmployeesList {},
    #[serde(rename = "employees:get")]
    EmployeesGet(IdArgs),
    #[serde(rename = "employees:create")]
    EmployeesCreate(EmployeeInput),
    #[serde(rename = "employees:update")]
    EmployeesUpdate(UpdateArgs<EmployeeInput>),
    #[serde(rename = "employees:delete")]
    EmployeesDelete(IdArgs),

    // Jobs
    #[serde(rename = "jobs:list")]
    JobsList(JobFilter),
    #[serde(rename = "jobs:get")]
    JobsGet(IdArgs),
    #[serde(rename = "jobs:create")]
    JobsCreate(job::CreateJobArgs),
    #[serde(rename = "jobs:update")]
    JobsUpdate(job::UpdateJobArgs),
    #[serde(rename = "jobs:delete")]
    JobsDelete(IdArgs),
    #[serde(rename = "jobs:getByCustomerItem")]
    JobsGetByCustomerItem(job::CustomerItemArgs),
    #[serde(rename = "jobs:getForReport")]
    JobsGetForReport(job::ReportQueryArgs),
    #[serde(rename = "jobs:getByCustomer")]
    JobsGetByCustomer(job::OwnerArgs),
    #[serde(rename = "jobs:getByEmployee")]
    JobsGetByEmployee(job::OwnerArgs),
    #[serde(rename = "jobs:getByMachine")]
    JobsGetByMachine(job::OwnerArgs),

    // Machine entries
    #[serde(rename = "jobMachineEntries:listByJob", rename_all = "camelCase")]
    EntriesListByJob { job_id: i64 },
    #[serde(rename = "jobMachineEntries:create")]
    EntriesCreate(machine_entry::CreateEntryArgs),
    #[serde(rename = "jobMachineEntries:delete")]
    EntriesDelete(IdArgs),

    // Everything else
    #[serde(rename = "dashboard:getStats")]
    DashboardGetStats(dashboard::StatsArgs),
    #[serde(rename = "reports:generatePdf")]
    ReportsGeneratePdf(report::GenerateArgs),
    #[serde(rename = "costs:calculate")]
    CostsCalculate(costs::CalculateArgs),
    #[serde(rename = "dates:resolveRange")]
    DatesResolveRange(dates::ResolveRangeArgs),
    #[serde(rename = "config:get")]
    ConfigGet {},
}

impl Request {
    /// Decodes a channel name and its arguments. Missing or null arguments
    /// read as `{}`.
    pub fn decode(channel: &str, args: Value) -> Result<Request, ApiError> {
        let args = if args.is_null() {
            Value::Object(Default::default())
        } else {
            args
        };
        let envelope = serde_json::json!({ "channel": channel, "args": args });

        serde_json::from_value(envelope).map_err(|e| {
            if e.to_string().starts_with(&format!("unknown variant `{channel}`")) {
                ApiError::validation(format!("Unknown channel: {channel}"))
            } else {
                ApiError::validation(format!("Invalid arguments for {channel}: {e}"))
            }
        })
    }
}

fn data<T: Serialize>(value: T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(format!("Serialization failed: {e}")))
}

/// Runs one request against the shared state.
pub async fn dispatch(state: &AppState, request: Request, today: NaiveDate) -> Result<Value, ApiError> {
    match request {
        Request::CustomersList {} => data(customer::list(state).await?),
        Request::CustomersGet(a) => data(customer::get(state, a.id).await?),
        Request::CustomersCreate(input) => data(customer::create(state, &input).await?),
        Request::CustomersUpdate(a) => data(customer::update(state, a.id, &a.input).await?),
        Request::CustomersDelete(a) => data(customer::delete(state, a.id).await?),

        Request::CategoriesList {} => data(category::list(state).await?),
        Request::CategoriesCreate(input) => data(category::create(state, &input).await?),
        Request::CategoriesUpdate(a) => data(category::update(state, a.id, &a.input).await?),
        Request::CategoriesDelete(a) => data(category::delete(state, a.id).await?),

        Request::ItemsList {} => data(item::list(state).await?),
        Request::ItemsGet(a) => data(item::get(state, a.id).await?),
        Request::ItemsCreate(input) => data(item::create(state, &input).await?),
        Request::ItemsUpdate(a) => data(item::update(state, a.id, &a.input).await?),
        Request::ItemsDelete(a) => data(item::delete(state, a.id).await?),
        Request::ItemsByCategory { category_id } => data(item::by_category(state, category_id).await?),

        Request::MachinesList {} => data(machine::list(state).await?),
        Request::MachinesGet(a) => data(machine::get(state, a.id).await?),
        Request::MachinesGetSchema(a) => data(machine::get_schema(state, a.id).await?),
        Request::MachinesCreate(input) => data(machine::create(state, &input).await?),
        Request::MachinesUpdate(a) => data(machine::update(state, a.id, &a.input).await?),
        Request::MachinesDelete(a) => data(machine::delete(state, a.id).await?),
        Request::MachinesFieldSummary(a) => data(machine::field_summary(state, a.id, a.period).await?),

        Request::EmployeesList {} => data(employee::list(state).await?),
        Request::EmployeesGet(a) => data(employee::get(state, a.id).await?),
        Request::EmployeesCreate(input) => data(employee::create(state, &input).await?),
        Request::EmployeesUpdate(a) => data(employee::update(state, a.id, &a.input).await?),
        Request::EmployeesDelete(a) => data(employee::delete(state, a.id).await?),

        Request::JobsList(filter) => data(job::list(state, &filter).await?),
        Request::JobsGet(a) => data(job::get(state, a.id).await?),
        Request::JobsCreate(a) => data(job::create(state, &a).await?),
        Request::JobsUpdate(a) => data(job::update(state, &a).await?),
        Request::JobsDelete(a) => data(job::delete(state, a.id).await?),
        Request::JobsGetByCustomerItem(a) => data(job::get_by_customer_item(state, a).await?),
        Request::JobsGetForReport(a) => data(job::get_for_report(state, a).await?),
        Request::JobsGetByCustomer(a) => data(job::get_by_customer(state, a).await?),
        Request::JobsGetByEmployee(a) => data(job::get_by_employee(state, a).await?),
        Request::JobsGetByMachine(a) => data(job::get_by_machine(state, a).await?),

        Request::EntriesListByJob { job_id } => data(machine_entry::list_by_job(state, job_id).await?),
        Request::EntriesCreate(a) => data(machine_entry::create(state, &a).await?),
        Request::EntriesDelete(a) => data(machine_entry::delete(state, a.id).await?),

        Request::DashboardGetStats(a) => data(dashboard::get_stats(state, a, today).await?),
        Request::ReportsGeneratePdf(a) => data(report::generate_pdf(state, &a, today).await?),
        Request::CostsCalculate(a) => data(costs::calculate(&a)?),
        Request::DatesResolveRange(a) => data(dates::resolve_range(a, today)),
        Request::ConfigGet {} => data(commands::config::get(state)),
    }
}

/// Decodes, dispatches and wraps one invocation.
pub async fn handle(state: &AppState, invocation: Invocation) -> Response {
    let start = Instant::now();
    let Invocation { id, channel, args } = invocation;
    let today = Local::now().date_naive();

    let result = match Request::decode(&channel, args) {
        Ok(request) => dispatch(state, request, today).await,
        Err(err) => Err(err),
    };
    let elapsed_ms = commands::elapsed_ms(start);

    match result {
        Ok(value) => {
            debug!(channel = %channel, elapsed_ms, "Channel ok");
            Response::success(id, value)
        }
        Err(err) => {
            error!(
                channel = %channel,
                code = ?err.code,
                message = %err.message,
                elapsed_ms,
                "Channel failed"
            );
            Response::failure(id, err)
        }
    }
}

/// Handles one raw stdin line.
pub async fn handle_line(state: &AppState, line: &str) -> Response {
    match serde_json::from_str::<Invocation>(line) {
        Ok(invocation) => handle(state, invocation).await,
        Err(e) => {
            error!(error = %e, "Malformed invocation");
            Response::failure(
                Value::Null,
                ApiError::validation(format!("Malformed request: {e}")),
            )
        }
    }
}
