//! Shared fixtures for lifecycle unit tests.

use chrono::{DateTime, TimeZone, Utc};

use crate::entity::{
    Appointment, AppointmentType, AuditFields, Customer, CustomerRecord,
};

/// Install a test subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_test_writer()
        .try_init();
}

pub fn new_customer() -> Customer {
    Customer::new("Acme Corp", Some(2), "admin")
}

pub fn saved_customer(id: i32) -> Customer {
    Customer::from_record(CustomerRecord {
        id,
        name: "Acme Corp".into(),
        address_id: 2,
        active: true,
        audit: AuditFields::create("admin"),
    })
}

/// A customer that fails the name and address rules.
pub fn invalid_customer() -> Customer {
    Customer::new("", None, "admin")
}

pub fn hour(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, hour, 0, 0).unwrap()
}

pub fn phone_appointment(start: u32, end: u32) -> Appointment {
    let mut appointment = Appointment::new(
        Some(1),
        Some(2),
        "Quarterly review",
        AppointmentType::Phone,
        hour(start),
        hour(end),
        "admin",
    );
    appointment.location = "555-0100".into();
    appointment
}
