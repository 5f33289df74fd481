use actix_web::{HttpResponse, Result, web};
use validator::Validate;

use emergency_services::*;

/// Receives an emergency report, geocoding its location.
/// Returns a 201 Created response telling whether coordinates were found.
pub async fn report_emergency(
    emergencies: web::Data<EmergencyService>,
    request: web::Json<ReportEmergencyRequest>,
) -> Result<HttpResponse, EmergencyError> {
    request
        .validate()
        .map_err(|e| EmergencyError::Validation(format!("Validation error: {}", e)))?;

    let emergency = emergencies.report(&request).await?;

    Ok(HttpResponse::Created().json(ReportEmergencyResponse {
        message: "Emergency reported".to_string(),
        id: emergency.id,
        geocoded: emergency.coordinates.is_some(),
    }))
}

/// Lists every emergency in report order
pub async fn list_emergencies(
    emergencies: web::Data<EmergencyService>,
) -> Result<HttpResponse, EmergencyError> {
    let list = emergencies.list().await?;
    Ok(HttpResponse::Ok().json(list))
}
