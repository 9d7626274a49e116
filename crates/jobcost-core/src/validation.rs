//! # Validation Module
//!
//! Form validation for JobCost Pro.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend forms                                               │
//! │  ├── Required markers, numeric inputs                                  │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Request handler (Rust)                                       │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE constraints                                     │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use jobcost_core::validation::{validate_quantity, validate_rate};
//!
//! validate_quantity(1000).unwrap();
//! assert_eq!(
//!     validate_rate(0).unwrap_err().to_string(),
//!     "Rate must be greater than 0"
//! );
//! ```

use crate::error::{CoreResult, ValidationError};
use crate::fields::{self, FieldDescriptor};
use crate::money::Percentage;
use crate::types::{
    CategoryInput, CustomerInput, EmployeeInput, ItemInput, JobInput, MachineEntryInput,
    MachineTypeInput,
};
use crate::{MAX_NAME_LEN, MAX_NOTES_LEN, MAX_PHONE_LEN, MAX_SEARCH_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required display name (customer, item, machine, ...).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most [`MAX_NAME_LEN`] characters
pub fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    validate_required_text(field, value, MAX_NAME_LEN)
}

fn validate_required_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

fn validate_optional_text(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(v) if v.trim().chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

/// Validates an optional phone number.
///
/// ## Example
/// ```rust
/// use jobcost_core::validation::validate_phone;
///
/// assert!(validate_phone(Some("9876543210")).is_ok());
/// assert!(validate_phone(None).is_ok());
/// assert!(validate_phone(Some("98765 43210 ext. 4421")).is_err());
/// ```
pub fn validate_phone(phone: Option<&str>) -> ValidationResult<()> {
    validate_optional_text("Phone", phone, MAX_PHONE_LEN)
}

/// Validates a search query.
///
/// ## Returns
/// The trimmed query string. Empty means "no filter".
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_SEARCH_LEN {
        return Err(ValidationError::TooLong {
            field: "Search".to_string(),
            max: MAX_SEARCH_LEN,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a job quantity.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "Quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates a per-unit rate in paise.
pub fn validate_rate(rate_paise: i64) -> ValidationResult<()> {
    if rate_paise <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "Rate".to_string(),
        });
    }
    Ok(())
}

/// Validates an amount in paise that may be zero (cooly, machine cost).
pub fn validate_non_negative(field: &str, paise: i64) -> ValidationResult<()> {
    if paise < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a percentage in basis points.
///
/// ## Rules
/// - Between 0 and 10000 (0% to 100%)
pub fn validate_percentage_bps(field: &str, bps: u32) -> ValidationResult<()> {
    if bps > Percentage::FULL_BPS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: Percentage::FULL_BPS as i64,
        });
    }
    Ok(())
}

fn validate_selected(what: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::NotSelected {
            what: what.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Form Validators
// =============================================================================

pub fn validate_customer(input: &CustomerInput) -> ValidationResult<()> {
    validate_name("Name", &input.name)?;
    validate_phone(input.phone.as_deref())?;
    validate_optional_text("Address", input.address.as_deref(), MAX_NOTES_LEN)
}

pub fn validate_category(input: &CategoryInput) -> ValidationResult<()> {
    validate_name("Category name", &input.name)
}

pub fn validate_item(input: &ItemInput) -> ValidationResult<()> {
    validate_name("Item name", &input.name)?;
    validate_selected("a category", input.category_id)?;
    validate_required_text("Size", &input.size, MAX_NAME_LEN)
}

pub fn validate_employee(input: &EmployeeInput) -> ValidationResult<()> {
    validate_name("Name", &input.name)?;
    validate_phone(input.phone.as_deref())?;
    if let Some(id) = input.machine_type_id {
        validate_selected("a machine type", id)?;
    }
    Ok(())
}

/// Validates a machine type form, including its custom fields schema.
pub fn validate_machine_type(input: &MachineTypeInput) -> CoreResult<()> {
    validate_name("Machine name", &input.name)?;
    validate_optional_text("Model", input.model.as_deref(), MAX_NAME_LEN)?;
    fields::check_schema(&input.custom_fields)
}

/// Validates the job form.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Job form: Save                                                         │
/// │       │                                                                 │
/// │       ├── no customer?      → "Please select a customer"               │
/// │       ├── no item?          → "Please select an item"                  │
/// │       ├── quantity <= 0?    → "Quantity must be greater than 0"        │
/// │       ├── rate <= 0?        → "Rate must be greater than 0"            │
/// │       ├── waste > 100%?     → out of range                              │
/// │       ├── cooly < 0?        → "Cooly cannot be negative"               │
/// │       │                                                                 │
/// │       └── OK → cost calculator → insert                                │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_job(input: &JobInput) -> ValidationResult<()> {
    validate_selected("a customer", input.customer_id)?;
    validate_selected("an item", input.item_id)?;
    if let Some(id) = input.employee_id {
        validate_selected("an employee", id)?;
    }
    validate_quantity(input.quantity)?;
    validate_rate(input.rate_paise)?;
    validate_percentage_bps("Waste %", input.waste_percentage_bps)?;
    validate_non_negative("Cooly", input.cooly_paise)?;
    validate_optional_text("Notes", input.notes.as_deref(), MAX_NOTES_LEN)
}

/// Validates one machine entry against its machine type's custom fields.
pub fn validate_machine_entry(
    entry: &MachineEntryInput,
    schema: &[FieldDescriptor],
) -> CoreResult<()> {
    validate_selected("a machine", entry.machine_type_id)?;
    validate_non_negative("Machine cost", entry.cost_paise)?;
    validate_percentage_bps("Machine waste %", entry.waste_percentage_bps)?;
    if let Some(waste) = entry.waste_amount_paise {
        validate_non_negative("Machine waste", waste)?;
    }
    fields::validate_custom_data(schema, &entry.custom_data)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::fields::FieldType;
    use chrono::NaiveDate;
    use serde_json::json;

    fn job() -> JobInput {
        JobInput {
            date: NaiveDate::from_ymd_opt(2025, 1, 14).unwrap(),
            customer_id: 1,
            employee_id: None,
            item_id: 2,
            quantity: 1000,
            rate_paise: 500,
            waste_percentage_bps: 300,
            cooly_paise: 50_000,
            notes: None,
            status: None,
        }
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Name", "Lakshmi Traders").is_ok());
        assert!(validate_name("Name", "").is_err());
        assert!(validate_name("Name", "   ").is_err());
        assert!(validate_name("Name", &"A".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_job_messages() {
        assert!(validate_job(&job()).is_ok());

        let mut no_customer = job();
        no_customer.customer_id = 0;
        assert_eq!(
            validate_job(&no_customer).unwrap_err().to_string(),
            "Please select a customer"
        );

        let mut no_item = job();
        no_item.item_id = 0;
        assert_eq!(
            validate_job(&no_item).unwrap_err().to_string(),
            "Please select an item"
        );

        let mut zero_qty = job();
        zero_qty.quantity = 0;
        assert_eq!(
            validate_job(&zero_qty).unwrap_err().to_string(),
            "Quantity must be greater than 0"
        );

        let mut zero_rate = job();
        zero_rate.rate_paise = 0;
        assert_eq!(
            validate_job(&zero_rate).unwrap_err().to_string(),
            "Rate must be greater than 0"
        );
    }

    #[test]
    fn test_validate_job_ranges() {
        let mut waste = job();
        waste.waste_percentage_bps = 10_001;
        assert!(validate_job(&waste).is_err());
        waste.waste_percentage_bps = 10_000;
        assert!(validate_job(&waste).is_ok());

        let mut cooly = job();
        cooly.cooly_paise = -1;
        assert!(validate_job(&cooly).is_err());

        let mut notes = job();
        notes.notes = Some("x".repeat(MAX_NOTES_LEN + 1));
        assert!(validate_job(&notes).is_err());
    }

    #[test]
    fn test_validate_item_requires_category_and_size() {
        let item = ItemInput {
            name: "PP Carry Bag".to_string(),
            category_id: 1,
            size: "10x12".to_string(),
        };
        assert!(validate_item(&item).is_ok());

        let no_cat = ItemInput { category_id: 0, ..item.clone() };
        assert_eq!(
            validate_item(&no_cat).unwrap_err().to_string(),
            "Please select a category"
        );

        let no_size = ItemInput { size: " ".to_string(), ..item };
        assert!(validate_item(&no_size).is_err());
    }

    #[test]
    fn test_validate_customer_phone_length() {
        let mut customer = CustomerInput {
            name: "Murugan Stores".to_string(),
            phone: Some("9876543212".to_string()),
            address: None,
        };
        assert!(validate_customer(&customer).is_ok());

        customer.phone = Some("9".repeat(MAX_PHONE_LEN + 1));
        assert!(validate_customer(&customer).is_err());
    }

    #[test]
    fn test_validate_machine_type_checks_schema() {
        let mut input = MachineTypeInput {
            name: "Printing".to_string(),
            custom_fields: vec![FieldDescriptor::new("rollNo", "Roll No", FieldType::Text, true)],
            ..Default::default()
        };
        assert!(validate_machine_type(&input).is_ok());

        input
            .custom_fields
            .push(FieldDescriptor::new("rollNo", "Roll No again", FieldType::Text, false));
        assert!(matches!(
            validate_machine_type(&input),
            Err(CoreError::InvalidFieldSchema { .. })
        ));
    }

    #[test]
    fn test_validate_machine_entry() {
        let schema = vec![FieldDescriptor::new("size", "Size", FieldType::Text, true)];
        let mut entry = MachineEntryInput {
            machine_type_id: 2,
            cost_paise: 50_000,
            waste_percentage_bps: 300,
            ..Default::default()
        };

        // Required custom field missing
        assert!(matches!(
            validate_machine_entry(&entry, &schema),
            Err(CoreError::InvalidCustomData { .. })
        ));

        if let serde_json::Value::Object(map) = json!({"size": "23x36"}) {
            entry.custom_data = map;
        }
        assert!(validate_machine_entry(&entry, &schema).is_ok());

        entry.waste_amount_paise = Some(-5);
        assert!(validate_machine_entry(&entry, &schema).is_err());
    }

    #[test]
    fn test_validate_search_query_trims() {
        assert_eq!(validate_search_query("  JOB-2025 ").unwrap(), "JOB-2025");
        assert!(validate_search_query(&"a".repeat(MAX_SEARCH_LEN + 1)).is_err());
    }
}
