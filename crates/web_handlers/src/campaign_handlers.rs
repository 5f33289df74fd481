use actix_web::{HttpResponse, Result, web};
use validator::Validate;

use auth_services::middleware::AuthenticatedVolunteer;
use ledger_services::*;

/// Lists every campaign with its goal and collected amount, in creation order
pub async fn list_campaigns(
    ledger: web::Data<LedgerService>,
) -> Result<HttpResponse, LedgerError> {
    let campaigns = ledger.list_campaigns().await?;
    Ok(HttpResponse::Ok().json(campaigns))
}

/// Creates a campaign with nothing collected yet.
/// Returns a 201 Created response with the campaign ID.
/// `volunteer` is present when the route runs behind the auth middleware.
pub async fn create_campaign(
    ledger: web::Data<LedgerService>,
    volunteer: Option<AuthenticatedVolunteer>,
    request: web::Json<CreateCampaignRequest>,
) -> Result<HttpResponse, LedgerError> {
    request
        .validate()
        .map_err(|e| LedgerError::Validation(format!("Validation error: {}", e)))?;

    let campaign = ledger.create_campaign(&request).await?;
    if let Some(AuthenticatedVolunteer(volunteer_id)) = volunteer {
        log::info!("🙋 Campaign {} opened by volunteer {}", campaign.id, volunteer_id);
    }

    Ok(HttpResponse::Created().json(CreateCampaignResponse {
        message: "Campaign created".to_string(),
        id: campaign.id,
    }))
}

/// Returns one campaign with its contributions
pub async fn get_campaign(
    ledger: web::Data<LedgerService>,
    path: web::Path<CampaignId>,
) -> Result<HttpResponse, LedgerError> {
    let detail = ledger.get_campaign(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// Records a contribution and raises the campaign's collected amount.
/// Returns a 201 Created response with the new balance.
pub async fn contribute(
    ledger: web::Data<LedgerService>,
    request: web::Json<ContributionRequest>,
) -> Result<HttpResponse, LedgerError> {
    request
        .validate()
        .map_err(|e| LedgerError::Validation(format!("Validation error: {}", e)))?;

    let recorded = ledger.contribute(&request).await?;

    Ok(HttpResponse::Created().json(ContributionResponse {
        message: "Contribution recorded".to_string(),
        id: recorded.contribution.id,
        collected: recorded.collected,
    }))
}
