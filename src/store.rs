//! In-memory lab store: the single owner of appointments and results.
//!
//! All mutation goes through the command methods; readers get slices or
//! references. Nothing is persisted: dropping the store loses every booking.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::catalog;
use crate::models::{Appointment, AppointmentStatus, TestParameter, TestResult, User};
use crate::submission::{validate_parameters, ReportDraft, ValidationError};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Appointment not found: {0}")]
    AppointmentNotFound(String),

    #[error("Unknown service: {0}")]
    UnknownService(String),

    #[error("Appointment {id} is {status}, expected PENDING")]
    InvalidTransition { id: String, status: AppointmentStatus },

    #[error("Result {result_id} belongs to appointment {result_appointment}, not {appointment_id}")]
    AppointmentMismatch {
        result_id: String,
        result_appointment: String,
        appointment_id: String,
    },

    #[error("Appointment {0} already has a result")]
    DuplicateResult(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Default)]
pub struct LabStore {
    appointments: Vec<Appointment>,
    results: Vec<TestResult>,
}

impl LabStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the demo patient's bookings: one pending thyroid
    /// profile and one completed blood count with its report.
    pub fn with_demo_data(today: NaiveDate) -> Self {
        let upcoming = today + chrono::Duration::days(2);
        let appointments = vec![
            Appointment {
                id: "APP-1029".into(),
                patient_id: "patient_01".into(),
                patient_name: "Rahul Sharma".into(),
                service_id: "h1".into(),
                service_name: "Thyroid Profile (T3, T4, TSH)".into(),
                date: upcoming.format("%Y-%m-%d").to_string(),
                time_slot: "09:30 AM".into(),
                status: AppointmentStatus::Pending,
            },
            Appointment {
                id: "APP-1010".into(),
                patient_id: "patient_01".into(),
                patient_name: "Rahul Sharma".into(),
                service_id: "b1".into(),
                service_name: "Complete Blood Picture (CBC)".into(),
                date: "2023-11-20".into(),
                time_slot: "10:00 AM".into(),
                status: AppointmentStatus::Completed,
            },
        ];

        let row = |name: &str, value: &str, unit: &str, range: &str| TestParameter {
            name: name.into(),
            value: value.into(),
            unit: unit.into(),
            reference_range: range.into(),
            method: None,
            section: None,
        };
        let results = vec![TestResult {
            id: "RES-XJ92L".into(),
            appointment_id: "APP-1010".into(),
            patient_id: "patient_01".into(),
            patient_name: "Rahul Sharma".into(),
            age: "34".into(),
            gender: "Male".into(),
            ref_doctor: "Self".into(),
            sample_type: "EDTA Whole Blood".into(),
            collected_at: "2023-11-20T09:15".into(),
            received_at: "2023-11-20T09:40".into(),
            test_name: "Complete Blood Picture (CBC)".into(),
            date: "2023-11-20".into(),
            parameters: vec![
                row("Hemoglobin", "11.5", "g/dL", "13.5 - 17.5"),
                row("White Blood Cell Count", "7200", "cells/mcL", "4500 - 11000"),
                row("Platelets", "240000", "cells/mcL", "150000 - 450000"),
            ],
            doctor_remarks: "Hemoglobin slightly below range. Suggest Iron-rich diet.".into(),
            analyzer_used: Some("Automated Hematology Analyzer".into()),
            internal_qc: Some("Within Acceptable Limits".into()),
            morphology: None,
        }];

        Self { appointments, results }
    }

    // ── Commands ────────────────────────────────────────────

    /// Books a catalog service for `patient`. New bookings are listed first.
    pub fn book_appointment(
        &mut self,
        patient: &User,
        service_id: &str,
        date: &str,
        time_slot: &str,
    ) -> Result<Appointment, StoreError> {
        let service = catalog::find_service(service_id)
            .ok_or_else(|| StoreError::UnknownService(service_id.to_string()))?;

        let appointment = Appointment {
            id: format!("APP-{}", &Uuid::new_v4().simple().to_string()[..8].to_uppercase()),
            patient_id: patient.id.clone(),
            patient_name: patient.name.clone(),
            service_id: service.id.clone(),
            service_name: service.name.clone(),
            date: date.to_string(),
            time_slot: time_slot.to_string(),
            status: AppointmentStatus::Pending,
        };
        self.appointments.insert(0, appointment.clone());
        tracing::info!(
            appointment_id = %appointment.id,
            service_id,
            patient_id = %patient.id,
            "Appointment booked"
        );
        Ok(appointment)
    }

    /// Marks a pending appointment completed and stores its result. Happens
    /// at most once per appointment, and only for a result with complete rows.
    pub fn complete_appointment(&mut self, appointment_id: &str, result: TestResult) -> Result<(), StoreError> {
        let index = self.index_of(appointment_id)?;
        let status = self.appointments[index].status;
        if status != AppointmentStatus::Pending {
            return Err(StoreError::InvalidTransition { id: appointment_id.to_string(), status });
        }
        if result.appointment_id != appointment_id {
            return Err(StoreError::AppointmentMismatch {
                result_id: result.id,
                result_appointment: result.appointment_id,
                appointment_id: appointment_id.to_string(),
            });
        }
        if self.result_for_appointment(appointment_id).is_some() {
            return Err(StoreError::DuplicateResult(appointment_id.to_string()));
        }
        validate_parameters(&result.parameters)?;

        self.appointments[index].status = AppointmentStatus::Completed;
        tracing::info!(appointment_id, result_id = %result.id, "Appointment completed");
        self.results.insert(0, result);
        Ok(())
    }

    /// Validates the draft, builds the result and completes the appointment.
    pub fn submit_report(
        &mut self,
        appointment_id: &str,
        draft: &ReportDraft,
        today: NaiveDate,
    ) -> Result<TestResult, StoreError> {
        let appointment = self
            .appointment(appointment_id)
            .ok_or_else(|| StoreError::AppointmentNotFound(appointment_id.to_string()))?;
        if appointment.status != AppointmentStatus::Pending {
            return Err(StoreError::InvalidTransition {
                id: appointment_id.to_string(),
                status: appointment.status,
            });
        }

        let mut result = draft.finalize(appointment, today)?;
        while self.results.iter().any(|r| r.id == result.id) {
            result.id = crate::submission::generate_result_id();
        }
        self.complete_appointment(appointment_id, result.clone())?;
        Ok(result)
    }

    /// Cancels a pending appointment. Cancelled is terminal.
    pub fn cancel_appointment(&mut self, appointment_id: &str) -> Result<(), StoreError> {
        let index = self.index_of(appointment_id)?;
        let appointment = &mut self.appointments[index];
        if appointment.status != AppointmentStatus::Pending {
            return Err(StoreError::InvalidTransition {
                id: appointment_id.to_string(),
                status: appointment.status,
            });
        }
        appointment.status = AppointmentStatus::Cancelled;
        tracing::info!(appointment_id, "Appointment cancelled");
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    pub fn appointment(&self, appointment_id: &str) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.id == appointment_id)
    }

    pub fn result(&self, result_id: &str) -> Option<&TestResult> {
        self.results.iter().find(|r| r.id == result_id)
    }

    pub fn result_for_appointment(&self, appointment_id: &str) -> Option<&TestResult> {
        self.results.iter().find(|r| r.appointment_id == appointment_id)
    }

    pub fn appointments_for_patient(&self, patient_id: &str) -> Vec<&Appointment> {
        self.appointments.iter().filter(|a| a.patient_id == patient_id).collect()
    }

    /// Pending bookings for the patient.
    pub fn upcoming_for_patient(&self, patient_id: &str) -> Vec<&Appointment> {
        self.appointments
            .iter()
            .filter(|a| a.patient_id == patient_id && a.status == AppointmentStatus::Pending)
            .collect()
    }

    /// Completed and cancelled bookings for the patient.
    pub fn past_for_patient(&self, patient_id: &str) -> Vec<&Appointment> {
        self.appointments
            .iter()
            .filter(|a| a.patient_id == patient_id && a.status != AppointmentStatus::Pending)
            .collect()
    }

    pub fn results_for_patient(&self, patient_id: &str) -> Vec<&TestResult> {
        self.results.iter().filter(|r| r.patient_id == patient_id).collect()
    }

    /// Owned copy of a patient's results, for handing to the insight requester.
    pub fn patient_history(&self, patient_id: &str) -> Vec<TestResult> {
        self.results_for_patient(patient_id).into_iter().cloned().collect()
    }

    /// Case-insensitive match on patient or service name, as the staff list
    /// search box does. An empty query returns everything.
    pub fn search_appointments(&self, query: &str) -> Vec<&Appointment> {
        let q = query.trim().to_lowercase();
        self.appointments
            .iter()
            .filter(|a| {
                q.is_empty()
                    || a.patient_name.to_lowercase().contains(&q)
                    || a.service_name.to_lowercase().contains(&q)
            })
            .collect()
    }

    fn index_of(&self, appointment_id: &str) -> Result<usize, StoreError> {
        self.appointments
            .iter()
            .position(|a| a.id == appointment_id)
            .ok_or_else(|| StoreError::AppointmentNotFound(appointment_id.to_string()))
    }
}
