#![allow(dead_code)]

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use scheduler_core::entity::{
    violation_message, Appointment, AppointmentBinding, AppointmentRecord, AppointmentType,
    AuditFields, Customer, CustomerBinding, CustomerRecord, EntityBinding,
};
use scheduler_core::lifecycle::{BeginStage, MutationValidator, MutationWriter, ValidateStage};

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

pub fn appointment_record(id: i32, user_id: i32, start: u32, end: u32) -> AppointmentRecord {
    AppointmentRecord {
        id,
        customer_id: 1,
        user_id,
        title: format!("existing {id}"),
        description: String::new(),
        location: "555-0100".into(),
        contact: String::new(),
        kind: AppointmentType::Phone,
        url: String::new(),
        start: hour(start),
        end: hour(end),
        audit: AuditFields::create("admin"),
    }
}

/// Write succeeds immediately.
pub struct InstantWriter;

#[async_trait]
impl<B: EntityBinding> MutationWriter<B> for InstantWriter {
    async fn apply(&self, _stage: &BeginStage<B>) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Write sleeps before succeeding, to exercise timeouts and cancel races.
pub struct SlowWriter {
    pub delay: Duration,
}

#[async_trait]
impl<B: EntityBinding> MutationWriter<B> for SlowWriter {
    async fn apply(&self, _stage: &BeginStage<B>) -> anyhow::Result<()> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

/// Write fails with a fixed error.
pub struct FailingWriter {
    pub message: &'static str,
}

#[async_trait]
impl<B: EntityBinding> MutationWriter<B> for FailingWriter {
    async fn apply(&self, _stage: &BeginStage<B>) -> anyhow::Result<()> {
        Err(anyhow::anyhow!(self.message))
    }
}

/// Cancels the stage from a clone while the write is in flight, then
/// finishes normally; the cancel resolution must win.
pub struct SelfCancelingWriter {
    pub message: &'static str,
}

#[async_trait]
impl<B: EntityBinding> MutationWriter<B> for SelfCancelingWriter {
    async fn apply(&self, stage: &BeginStage<B>) -> anyhow::Result<()> {
        let clone = stage.clone();
        clone.cancel(Some(self.message))?;
        Ok(())
    }
}

/// Runs the customer field rules.
pub struct CustomerRuleValidator;

#[async_trait]
impl MutationValidator<CustomerBinding> for CustomerRuleValidator {
    async fn validate(&self, stage: &ValidateStage<CustomerBinding>) -> anyhow::Result<()> {
        let violations = stage.entity().check_rules();
        if violations.is_empty() {
            stage.mark_valid()?;
        } else {
            stage.mark_invalid(Some(&violation_message(&violations)))?;
        }
        Ok(())
    }
}

/// Runs the appointment field rules plus the busy-conflict check against a
/// fixed set of existing rows.
pub struct AppointmentRuleValidator {
    pub existing: Vec<AppointmentRecord>,
}

#[async_trait]
impl MutationValidator<AppointmentBinding> for AppointmentRuleValidator {
    async fn validate(&self, stage: &ValidateStage<AppointmentBinding>) -> anyhow::Result<()> {
        let mut violations = stage.entity().check_rules();
        violations.extend(stage.entity().check_conflicts(&self.existing));
        if violations.is_empty() {
            stage.mark_valid()?;
        } else {
            stage.mark_invalid(Some(&violation_message(&violations)))?;
        }
        Ok(())
    }
}
