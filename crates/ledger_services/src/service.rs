use std::sync::Arc;

use rust_decimal::Decimal;

use crate::repository::LedgerRepository;
use crate::types::*;

/// A service for campaign and contribution operations. Validates input before
/// anything reaches the repository.
#[derive(Clone)]
pub struct LedgerService {
    repository: Arc<dyn LedgerRepository>,
}

impl LedgerService {
    /// Creates a new instance of `LedgerService` on top of the given repository.
    pub fn new(repository: Arc<dyn LedgerRepository>) -> Self {
        Self { repository }
    }

    /// Creates a campaign with nothing collected yet.
    /// The goal is rounded to cents before being checked and stored.
    pub async fn create_campaign(
        &self,
        request: &CreateCampaignRequest,
    ) -> Result<Campaign, LedgerError> {
        let name = required(&request.name, "Name is required")?;
        let goal = cents(request.goal, "Goal")?;

        let campaign = self
            .repository
            .insert_campaign(NewCampaign {
                name,
                description: request.description.trim().to_string(),
                goal,
            })
            .await?;

        log::info!(
            "💰 Campaign {} created: {} (goal {})",
            campaign.id,
            campaign.name,
            campaign.goal
        );

        Ok(campaign)
    }

    /// Lists every campaign in creation order.
    pub async fn list_campaigns(&self) -> Result<Vec<CampaignSummary>, LedgerError> {
        let campaigns = self.repository.list_campaigns().await?;
        Ok(campaigns.into_iter().map(CampaignSummary::from).collect())
    }

    /// Retrieves a campaign with its contributions.
    pub async fn get_campaign(&self, id: CampaignId) -> Result<CampaignDetail, LedgerError> {
        let campaign = self
            .repository
            .find_campaign(id)
            .await?
            .ok_or(LedgerError::CampaignNotFound(id))?;

        let contributions = self.repository.list_contributions(id).await?;

        Ok(CampaignDetail {
            campaign,
            contributions,
        })
    }

    /// Records a contribution and applies it to the campaign balance.
    /// Amounts are rounded to cents before being checked and stored.
    pub async fn contribute(
        &self,
        request: &ContributionRequest,
    ) -> Result<RecordedContribution, LedgerError> {
        let donor_name = required(&request.donor_name, "Donor name is required")?;

        let amount = cents(request.amount, "Amount")?;

        let recorded = self
            .repository
            .record_contribution(NewContribution {
                campaign_id: request.campaign_id,
                donor_name,
                amount,
            })
            .await
            .inspect_err(|e| {
                if let LedgerError::CampaignNotFound(id) = e {
                    log::warn!("Contribution rejected: campaign {} does not exist", id);
                }
            })?;

        log::info!(
            "💶 Contribution {} of {} to campaign {} (collected {})",
            recorded.contribution.id,
            recorded.contribution.amount,
            recorded.contribution.campaign_id,
            recorded.collected
        );

        Ok(recorded)
    }
}

/// Rounds to cents, then requires `0 < value < MAX_AMOUNT`.
fn cents(value: Decimal, field: &str) -> Result<Decimal, LedgerError> {
    let rounded = value.round_dp(2);
    if rounded <= Decimal::ZERO {
        return Err(LedgerError::Validation(format!(
            "{} must be greater than zero",
            field
        )));
    }
    if rounded >= MAX_AMOUNT {
        return Err(LedgerError::Validation(format!(
            "{} must be less than {}",
            field, MAX_AMOUNT
        )));
    }
    Ok(rounded)
}

fn required(value: &str, message: &str) -> Result<String, LedgerError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::Validation(message.to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryLedgerRepository;

    fn service() -> LedgerService {
        LedgerService::new(Arc::new(InMemoryLedgerRepository::new()))
    }

    fn campaign_request(name: &str, goal: Decimal) -> CreateCampaignRequest {
        CreateCampaignRequest {
            name: name.to_string(),
            description: "Emergency vet care".to_string(),
            goal,
        }
    }

    fn contribution(campaign_id: CampaignId, donor: &str, amount: Decimal) -> ContributionRequest {
        ContributionRequest {
            campaign_id,
            donor_name: donor.to_string(),
            amount,
        }
    }

    #[tokio::test]
    async fn test_vet_fund_scenario() {
        let ledger = service();

        let campaign = ledger
            .create_campaign(&campaign_request("Vet Fund", Decimal::new(5000, 1)))
            .await
            .unwrap();
        assert_eq!(campaign.id, 1);
        assert_eq!(campaign.collected, Decimal::ZERO);

        let recorded = ledger
            .contribute(&contribution(1, "Alice", Decimal::new(500, 1)))
            .await
            .unwrap();
        assert_eq!(recorded.collected, Decimal::new(50, 0));

        let missing = ledger
            .contribute(&contribution(99, "Bob", Decimal::new(100, 1)))
            .await;
        assert!(matches!(missing, Err(LedgerError::CampaignNotFound(99))));

        let detail = ledger.get_campaign(1).await.unwrap();
        assert_eq!(detail.campaign.collected, Decimal::new(50, 0));
        assert_eq!(detail.contributions.len(), 1);
        assert_eq!(detail.contributions[0].donor_name, "Alice");
    }

    #[tokio::test]
    async fn test_campaign_validation() {
        let ledger = service();

        for request in [
            campaign_request("   ", Decimal::ONE),
            campaign_request("Shelter roof", Decimal::ZERO),
            campaign_request("Shelter roof", Decimal::NEGATIVE_ONE),
        ] {
            assert!(matches!(
                ledger.create_campaign(&request).await,
                Err(LedgerError::Validation(_))
            ));
        }

        assert!(ledger.list_campaigns().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_positive_amount_changes_nothing() {
        let ledger = service();
        ledger
            .create_campaign(&campaign_request("Vet Fund", Decimal::new(500, 0)))
            .await
            .unwrap();
        ledger
            .contribute(&contribution(1, "Alice", Decimal::new(20, 0)))
            .await
            .unwrap();

        for amount in [Decimal::ZERO, Decimal::new(-5, 0), Decimal::new(4, 3)] {
            let result = ledger.contribute(&contribution(1, "Mallory", amount)).await;
            assert!(matches!(result, Err(LedgerError::Validation(_))));
        }
        let blank_donor = ledger
            .contribute(&contribution(1, " ", Decimal::ONE))
            .await;
        assert!(matches!(blank_donor, Err(LedgerError::Validation(_))));

        let detail = ledger.get_campaign(1).await.unwrap();
        assert_eq!(detail.campaign.collected, Decimal::new(20, 0));
        assert_eq!(detail.contributions.len(), 1);
    }

    #[tokio::test]
    async fn test_collected_matches_sum_of_contributions() {
        let ledger = service();
        ledger
            .create_campaign(&campaign_request("Kennel", Decimal::new(100, 0)))
            .await
            .unwrap();
        ledger
            .create_campaign(&campaign_request("Food", Decimal::new(100, 0)))
            .await
            .unwrap();

        let amounts = [
            (1, Decimal::new(1005, 2)),
            (2, Decimal::new(1, 1)),
            (1, Decimal::new(2, 1)),
            (3, Decimal::new(999, 0)),
            (1, Decimal::new(15000, 2)),
        ];
        for (campaign_id, amount) in amounts {
            let _ = ledger
                .contribute(&contribution(campaign_id, "Donor", amount))
                .await;
        }

        for id in [1, 2] {
            let detail = ledger.get_campaign(id).await.unwrap();
            let sum: Decimal = detail.contributions.iter().map(|c| c.amount).sum();
            assert_eq!(detail.campaign.collected, sum);
        }
        assert_eq!(
            ledger.get_campaign(1).await.unwrap().campaign.collected,
            Decimal::new(16025, 2)
        );

        // Over-collecting past the goal is allowed
        let campaigns = ledger.list_campaigns().await.unwrap();
        assert!(campaigns[0].collected > campaigns[0].goal);
    }

    #[tokio::test]
    async fn test_concurrent_contributions_are_not_lost() {
        let ledger = service();
        ledger
            .create_campaign(&campaign_request("Vet Fund", Decimal::new(500, 0)))
            .await
            .unwrap();

        let amount = Decimal::new(125, 2);
        let handles: Vec<_> = (0..64)
            .map(|i| {
                let ledger = ledger.clone();
                tokio::spawn(async move {
                    ledger
                        .contribute(&contribution(1, &format!("Donor {}", i), amount))
                        .await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let detail = ledger.get_campaign(1).await.unwrap();
        assert_eq!(detail.contributions.len(), 64);
        assert_eq!(detail.campaign.collected, amount * Decimal::from(64));
    }

    #[tokio::test]
    async fn test_list_keeps_creation_order() {
        let ledger = service();
        for name in ["Zebra rescue", "Alpaca rescue", "Mule rescue"] {
            ledger
                .create_campaign(&campaign_request(name, Decimal::ONE))
                .await
                .unwrap();
        }

        let names: Vec<String> = ledger
            .list_campaigns()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();

        assert_eq!(names, ["Zebra rescue", "Alpaca rescue", "Mule rescue"]);
    }

    #[test]
    fn test_max_amount_is_ten_to_the_twelfth() {
        assert_eq!(MAX_AMOUNT, Decimal::new(1_000_000_000_000, 0));
    }

    #[tokio::test]
    async fn test_goal_is_rounded_to_cents() {
        let ledger = service();

        let sub_cent = ledger
            .create_campaign(&campaign_request("Tiny", Decimal::new(1, 3)))
            .await;
        assert!(matches!(sub_cent, Err(LedgerError::Validation(_))));

        let campaign = ledger
            .create_campaign(&campaign_request("Vet Fund", Decimal::new(12346, 3)))
            .await
            .unwrap();
        assert_eq!(campaign.goal, Decimal::new(1235, 2));
    }

    #[tokio::test]
    async fn test_oversized_values_are_rejected() {
        let ledger = service();

        let huge_goal = ledger
            .create_campaign(&campaign_request("Moon", MAX_AMOUNT))
            .await;
        assert!(matches!(huge_goal, Err(LedgerError::Validation(_))));

        ledger
            .create_campaign(&campaign_request("Vet Fund", Decimal::new(500, 0)))
            .await
            .unwrap();

        // 5e28, twice: neither call may panic or move the balance
        let huge = Decimal::from_i128_with_scale(5 * 10_i128.pow(28), 0);
        for _ in 0..2 {
            let result = ledger.contribute(&contribution(1, "Big", huge)).await;
            assert!(matches!(result, Err(LedgerError::Validation(_))));
        }

        let detail = ledger.get_campaign(1).await.unwrap();
        assert_eq!(detail.campaign.collected, Decimal::ZERO);
        assert!(detail.contributions.is_empty());
    }
}
