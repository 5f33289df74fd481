use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Identifier of a campaign, assigned in creation order
pub type CampaignId = i64;

/// Identifier of a contribution, assigned in creation order
pub type ContributionId = i64;

/// Exclusive upper bound for goals, amounts and balances (10^12), the range of
/// a `NUMERIC(14, 2)` column
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Request structure for creating a campaign
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCampaignRequest {
    /// Name of the campaign
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,

    /// What the money is for
    pub description: String,

    /// Target amount, must be positive
    pub goal: Decimal,
}

/// Request structure for contributing to a campaign
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContributionRequest {
    /// Campaign receiving the money
    pub campaign_id: CampaignId,

    /// Name of the donor
    #[validate(length(min = 1, max = 100, message = "Donor name is required"))]
    pub donor_name: String,

    /// Donated amount, must be positive
    pub amount: Decimal,
}

/// A fundraising campaign as stored
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    /// Unique identifier for the campaign
    pub id: CampaignId,
    /// Name of the campaign
    pub name: String,
    /// What the money is for
    pub description: String,
    /// Target amount; never changes after creation
    pub goal: Decimal,
    /// Sum of all contributions
    pub collected: Decimal,
    /// When the campaign was created
    pub created_at: DateTime<Utc>,
}

/// Campaign fields exposed by the campaign list
#[derive(Debug, Clone, Serialize)]
pub struct CampaignSummary {
    /// Unique identifier for the campaign
    pub id: CampaignId,
    /// Name of the campaign
    pub name: String,
    /// Target amount
    pub goal: Decimal,
    /// Sum of all contributions
    pub collected: Decimal,
}

impl From<Campaign> for CampaignSummary {
    fn from(campaign: Campaign) -> Self {
        Self {
            id: campaign.id,
            name: campaign.name,
            goal: campaign.goal,
            collected: campaign.collected,
        }
    }
}

/// A single donation; immutable once stored
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    /// Unique identifier for the contribution
    pub id: ContributionId,
    /// Campaign that received the donation
    pub campaign_id: CampaignId,
    /// Name of the donor
    pub donor_name: String,
    /// Donated amount
    pub amount: Decimal,
    /// When the donation was recorded
    pub contributed_at: DateTime<Utc>,
}

/// A campaign together with its contributions
#[derive(Debug, Clone, Serialize)]
pub struct CampaignDetail {
    /// The campaign itself
    #[serde(flatten)]
    pub campaign: Campaign,
    /// Contributions in the order they were recorded
    pub contributions: Vec<Contribution>,
}

/// Validated campaign ready to be stored
#[derive(Debug, Clone)]
pub struct NewCampaign {
    /// Trimmed campaign name
    pub name: String,
    /// Campaign description
    pub description: String,
    /// Positive target amount
    pub goal: Decimal,
}

/// Validated contribution ready to be stored
#[derive(Debug, Clone)]
pub struct NewContribution {
    /// Campaign receiving the money
    pub campaign_id: CampaignId,
    /// Trimmed donor name
    pub donor_name: String,
    /// Positive amount, rounded to cents
    pub amount: Decimal,
}

/// Result of a committed contribution
#[derive(Debug, Clone)]
pub struct RecordedContribution {
    /// The stored contribution
    pub contribution: Contribution,
    /// Campaign balance right after this contribution
    pub collected: Decimal,
}

/// Response structure for campaign creation
#[derive(Debug, Serialize)]
pub struct CreateCampaignResponse {
    /// Human-readable outcome
    pub message: String,
    /// Identifier of the new campaign
    pub id: CampaignId,
}

/// Response structure for a recorded contribution
#[derive(Debug, Serialize)]
pub struct ContributionResponse {
    /// Human-readable outcome
    pub message: String,
    /// Identifier of the new contribution
    pub id: ContributionId,
    /// Campaign balance after the contribution
    pub collected: Decimal,
}

/// Custom error type for ledger operations
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A required field is missing or a numeric field is not positive
    #[error("Validation error: {0}")]
    Validation(String),

    /// The referenced campaign does not exist
    #[error("Campaign {0} not found")]
    CampaignNotFound(CampaignId),

    /// The backing store failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl actix_web::ResponseError for LedgerError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            LedgerError::Validation(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "validation_error",
                "message": msg
            })),
            LedgerError::CampaignNotFound(_) => HttpResponse::NotFound().json(serde_json::json!({
                "error": "campaign_not_found",
                "message": "Campaign not found"
            })),
            LedgerError::Database(_) => {
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "internal_error",
                    "message": "An internal error occurred"
                }))
            }
        }
    }
}
