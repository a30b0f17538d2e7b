//! Legacy value mapping
//!
//! Rows inherited from the predecessor system store Spanish enum tokens and
//! a handful of free-form labels that predate even those. All of them decode
//! here, at the persistence boundary, onto the closed domain enums; writes
//! always emit the canonical snake_case tokens (`as_str`). An unknown token
//! is a [`DatabaseError::Decode`], never a panic, so one corrupt row fails
//! loudly instead of poisoning a sweep.

use domain_incapacity::{DocumentKind, IncapacityState, LeaveType, Role};
use domain_notifications::{DeliveryState, NotificationCategory};
use domain_requests::RequestStatus;

use crate::error::DatabaseError;

/// Decodes an incapacity state token, canonical or legacy
pub fn decode_state(token: &str) -> Result<IncapacityState, DatabaseError> {
    match token {
        "pending_validation" => Ok(IncapacityState::PendingValidation),
        "documentation_incomplete" => Ok(IncapacityState::DocumentationIncomplete),
        "documentation_complete" => Ok(IncapacityState::DocumentationComplete),
        "approved_pending_transcription" => Ok(IncapacityState::ApprovedPendingTranscription),
        "transcribed" => Ok(IncapacityState::Transcribed),
        "billed" => Ok(IncapacityState::Billed),
        "rejected_by_payer" => Ok(IncapacityState::RejectedByPayer),
        "paid" => Ok(IncapacityState::Paid),
        "rejected" => Ok(IncapacityState::Rejected),
        // Predecessor enum tokens
        "PENDIENTE_VALIDACION" => Ok(IncapacityState::PendingValidation),
        "DOCUMENTACION_INCOMPLETA" => Ok(IncapacityState::DocumentationIncomplete),
        "DOCUMENTACION_COMPLETA" => Ok(IncapacityState::DocumentationComplete),
        "APROBADA_PENDIENTE_TRANSCRIPCION" => Ok(IncapacityState::ApprovedPendingTranscription),
        "TRANSCRITA" => Ok(IncapacityState::Transcribed),
        "COBRADA" => Ok(IncapacityState::Billed),
        "RECHAZADA_ENTIDAD" => Ok(IncapacityState::RejectedByPayer),
        "PAGADA" => Ok(IncapacityState::Paid),
        "RECHAZADA" => Ok(IncapacityState::Rejected),
        // Free-form labels that predate the predecessor's own enums
        "Pendiente" => Ok(IncapacityState::PendingValidation),
        "En revision" | "En revisión" | "En Revisión de Documentos" => {
            Ok(IncapacityState::DocumentationComplete)
        }
        "Aprobada" => Ok(IncapacityState::ApprovedPendingTranscription),
        "Rechazada" => Ok(IncapacityState::Rejected),
        _ => Err(DatabaseError::decode("state", token)),
    }
}

/// Every stored token that decodes to the given state
///
/// Query filters match on these so migrated rows that still carry a legacy
/// token are not invisible to state-scoped listings.
pub fn state_tokens(state: IncapacityState) -> Vec<&'static str> {
    let mut tokens = vec![state.as_str()];
    match state {
        IncapacityState::PendingValidation => {
            tokens.extend(["PENDIENTE_VALIDACION", "Pendiente"]);
        }
        IncapacityState::DocumentationIncomplete => {
            tokens.push("DOCUMENTACION_INCOMPLETA");
        }
        IncapacityState::DocumentationComplete => {
            tokens.extend([
                "DOCUMENTACION_COMPLETA",
                "En revision",
                "En revisión",
                "En Revisión de Documentos",
            ]);
        }
        IncapacityState::ApprovedPendingTranscription => {
            tokens.extend(["APROBADA_PENDIENTE_TRANSCRIPCION", "Aprobada"]);
        }
        IncapacityState::Transcribed => {
            tokens.push("TRANSCRITA");
        }
        IncapacityState::Billed => {
            tokens.push("COBRADA");
        }
        IncapacityState::RejectedByPayer => {
            tokens.push("RECHAZADA_ENTIDAD");
        }
        IncapacityState::Paid => {
            tokens.push("PAGADA");
        }
        IncapacityState::Rejected => {
            tokens.extend(["RECHAZADA", "Rechazada"]);
        }
    }
    tokens
}

/// Every stored token that decodes to the given request status
pub fn status_tokens(status: RequestStatus) -> Vec<&'static str> {
    let mut tokens = vec![status.as_str()];
    match status {
        RequestStatus::Pending => tokens.push("PENDIENTE"),
        RequestStatus::Fulfilled => tokens.push("ENTREGADO"),
        RequestStatus::RequiresEscalation => tokens.push("REQUIERE_CITACION"),
    }
    tokens
}

/// Every stored token that decodes to the given delivery state
pub fn delivery_tokens(state: DeliveryState) -> Vec<&'static str> {
    let mut tokens = vec![state.as_str()];
    match state {
        DeliveryState::Pending => tokens.push("PENDIENTE"),
        DeliveryState::Sent => tokens.push("ENVIADA"),
        DeliveryState::Delivered => tokens.push("ENTREGADA"),
        DeliveryState::Read => tokens.push("LEIDA"),
        DeliveryState::Failed => tokens.push("ERROR"),
    }
    tokens
}

/// Every stored token that decodes to the given role
pub fn role_tokens(role: Role) -> Vec<&'static str> {
    let mut tokens = vec![role.as_str()];
    match role {
        Role::Claimant => tokens.push("colaborador"),
        Role::Reviewer => tokens.push("auxiliar"),
        Role::Administrator => {}
    }
    tokens
}

/// Decodes a leave type token, canonical or legacy
pub fn decode_leave_type(token: &str) -> Result<LeaveType, DatabaseError> {
    match token {
        "general_illness" => Ok(LeaveType::GeneralIllness),
        "workplace_accident" => Ok(LeaveType::WorkplaceAccident),
        "traffic_accident" => Ok(LeaveType::TrafficAccident),
        "maternity_leave" => Ok(LeaveType::MaternityLeave),
        "paternity_leave" => Ok(LeaveType::PaternityLeave),
        "Enfermedad General" => Ok(LeaveType::GeneralIllness),
        "Accidente Laboral" => Ok(LeaveType::WorkplaceAccident),
        "Accidente de Tránsito" | "Accidente de Transito" => Ok(LeaveType::TrafficAccident),
        "Licencia de Maternidad" => Ok(LeaveType::MaternityLeave),
        "Licencia de Paternidad" => Ok(LeaveType::PaternityLeave),
        _ => Err(DatabaseError::decode("leave_type", token)),
    }
}

/// Decodes a document kind token, canonical or legacy
pub fn decode_document_kind(token: &str) -> Result<DocumentKind, DatabaseError> {
    match token {
        "medical_certificate" => Ok(DocumentKind::MedicalCertificate),
        "epicrisis" => Ok(DocumentKind::Epicrisis),
        "furips" => Ok(DocumentKind::Furips),
        "live_birth_certificate" => Ok(DocumentKind::LiveBirthCertificate),
        "civil_registry" => Ok(DocumentKind::CivilRegistry),
        "mother_identity_document" => Ok(DocumentKind::MotherIdentityDocument),
        "CERTIFICADO_INCAPACIDAD" => Ok(DocumentKind::MedicalCertificate),
        "EPICRISIS" => Ok(DocumentKind::Epicrisis),
        "FURIPS" => Ok(DocumentKind::Furips),
        "CERTIFICADO_NACIDO_VIVO" => Ok(DocumentKind::LiveBirthCertificate),
        "REGISTRO_CIVIL" => Ok(DocumentKind::CivilRegistry),
        "DOCUMENTO_IDENTIDAD" => Ok(DocumentKind::MotherIdentityDocument),
        _ => Err(DatabaseError::decode("kind", token)),
    }
}

/// Decodes a document request status token, canonical or legacy
pub fn decode_request_status(token: &str) -> Result<RequestStatus, DatabaseError> {
    match token {
        "pending" => Ok(RequestStatus::Pending),
        "fulfilled" => Ok(RequestStatus::Fulfilled),
        "requires_escalation" => Ok(RequestStatus::RequiresEscalation),
        "PENDIENTE" => Ok(RequestStatus::Pending),
        "ENTREGADO" => Ok(RequestStatus::Fulfilled),
        "REQUIERE_CITACION" => Ok(RequestStatus::RequiresEscalation),
        _ => Err(DatabaseError::decode("status", token)),
    }
}

/// Decodes a notification delivery state token, canonical or legacy
pub fn decode_delivery_state(token: &str) -> Result<DeliveryState, DatabaseError> {
    match token {
        "pending" => Ok(DeliveryState::Pending),
        "sent" => Ok(DeliveryState::Sent),
        "delivered" => Ok(DeliveryState::Delivered),
        "read" => Ok(DeliveryState::Read),
        "failed" => Ok(DeliveryState::Failed),
        "PENDIENTE" => Ok(DeliveryState::Pending),
        "ENVIADA" => Ok(DeliveryState::Sent),
        "ENTREGADA" => Ok(DeliveryState::Delivered),
        "LEIDA" => Ok(DeliveryState::Read),
        "ERROR" => Ok(DeliveryState::Failed),
        _ => Err(DatabaseError::decode("state", token)),
    }
}

/// Decodes a notification category token
///
/// The notifications table is new in this system; there are no legacy
/// category rows to translate, only the canonical tokens.
pub fn decode_category(token: &str) -> Result<NotificationCategory, DatabaseError> {
    match token {
        "request_created" => Ok(NotificationCategory::RequestCreated),
        "reminder" => Ok(NotificationCategory::Reminder),
        "urgent_reminder" => Ok(NotificationCategory::UrgentReminder),
        "escalation" => Ok(NotificationCategory::Escalation),
        "documents_complete" => Ok(NotificationCategory::DocumentsComplete),
        "operator_alert" => Ok(NotificationCategory::OperatorAlert),
        _ => Err(DatabaseError::decode("category", token)),
    }
}

/// Decodes an employee role token, canonical or legacy
pub fn decode_role(token: &str) -> Result<Role, DatabaseError> {
    match token {
        "claimant" => Ok(Role::Claimant),
        "reviewer" => Ok(Role::Reviewer),
        "administrator" => Ok(Role::Administrator),
        "colaborador" => Ok(Role::Claimant),
        "auxiliar" => Ok(Role::Reviewer),
        _ => Err(DatabaseError::decode("role", token)),
    }
}
