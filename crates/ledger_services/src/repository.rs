use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tokio::sync::Mutex;

use crate::types::*;

/// Storage for campaigns and contributions.
///
/// `record_contribution` must store the contribution and increment the
/// campaign's `collected` amount as one atomic unit, and must leave the store
/// untouched when the campaign does not exist.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Stores a new campaign with `collected = 0`.
    async fn insert_campaign(&self, campaign: NewCampaign) -> Result<Campaign, LedgerError>;

    /// Looks a campaign up by id.
    async fn find_campaign(&self, id: CampaignId) -> Result<Option<Campaign>, LedgerError>;

    /// All campaigns in creation order.
    async fn list_campaigns(&self) -> Result<Vec<Campaign>, LedgerError>;

    /// Contributions of one campaign in creation order.
    async fn list_contributions(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<Contribution>, LedgerError>;

    /// Stores a contribution and applies it to the campaign balance.
    async fn record_contribution(
        &self,
        contribution: NewContribution,
    ) -> Result<RecordedContribution, LedgerError>;
}

/// PostgreSQL-backed ledger.
pub struct PgLedgerRepository {
    pool: PgPool,
}

impl PgLedgerRepository {
    /// Creates a new instance of `PgLedgerRepository` with the provided database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerRepository for PgLedgerRepository {
    async fn insert_campaign(&self, campaign: NewCampaign) -> Result<Campaign, LedgerError> {
        let campaign = sqlx::query_as::<_, Campaign>(
            r#"
            INSERT INTO campaigns (name, description, goal)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, goal, collected, created_at
            "#,
        )
        .bind(&campaign.name)
        .bind(&campaign.description)
        .bind(campaign.goal)
        .fetch_one(&self.pool)
        .await?;

        Ok(campaign)
    }

    async fn find_campaign(&self, id: CampaignId) -> Result<Option<Campaign>, LedgerError> {
        let campaign = sqlx::query_as::<_, Campaign>(
            "SELECT id, name, description, goal, collected, created_at FROM campaigns WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(campaign)
    }

    async fn list_campaigns(&self) -> Result<Vec<Campaign>, LedgerError> {
        let campaigns = sqlx::query_as::<_, Campaign>(
            "SELECT id, name, description, goal, collected, created_at FROM campaigns ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(campaigns)
    }

    async fn list_contributions(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<Contribution>, LedgerError> {
        let contributions = sqlx::query_as::<_, Contribution>(
            r#"
            SELECT id, campaign_id, donor_name, amount, contributed_at
            FROM contributions
            WHERE campaign_id = $1
            ORDER BY id
            "#,
        )
        .bind(campaign_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(contributions)
    }

    async fn record_contribution(
        &self,
        contribution: NewContribution,
    ) -> Result<RecordedContribution, LedgerError> {
        let mut tx = self.pool.begin().await?;

        // The UPDATE takes the campaign row lock, so concurrent contributions
        // to the same campaign queue here until this transaction ends.
        let collected: Option<Decimal> = sqlx::query_scalar(
            "UPDATE campaigns SET collected = collected + $1 WHERE id = $2 RETURNING collected",
        )
        .bind(contribution.amount)
        .bind(contribution.campaign_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(balance_overflow)?;

        let Some(collected) = collected else {
            tx.rollback().await?;
            return Err(LedgerError::CampaignNotFound(contribution.campaign_id));
        };

        let stored = sqlx::query_as::<_, Contribution>(
            r#"
            INSERT INTO contributions (campaign_id, donor_name, amount)
            VALUES ($1, $2, $3)
            RETURNING id, campaign_id, donor_name, amount, contributed_at
            "#,
        )
        .bind(contribution.campaign_id)
        .bind(&contribution.donor_name)
        .bind(contribution.amount)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(RecordedContribution {
            contribution: stored,
            collected,
        })
    }
}

/// Maps a `collected` overflow (SQLSTATE 22003) to a validation error.
fn balance_overflow(e: sqlx::Error) -> LedgerError {
    match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("22003") => {
            LedgerError::Validation(TOTAL_TOO_LARGE.to_string())
        }
        _ => e.into(),
    }
}

const TOTAL_TOO_LARGE: &str = "Campaign total would exceed the maximum amount";

#[derive(Debug, Default)]
struct LedgerState {
    campaigns: Vec<Campaign>,
    contributions: Vec<Contribution>,
    last_campaign_id: CampaignId,
    last_contribution_id: ContributionId,
}

/// In-memory ledger. Every write holds one lock, which makes each
/// contribution a single critical section across all campaigns.
#[derive(Debug, Default)]
pub struct InMemoryLedgerRepository {
    state: Mutex<LedgerState>,
}

impl InMemoryLedgerRepository {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerRepository for InMemoryLedgerRepository {
    async fn insert_campaign(&self, campaign: NewCampaign) -> Result<Campaign, LedgerError> {
        let mut state = self.state.lock().await;
        state.last_campaign_id += 1;

        let campaign = Campaign {
            id: state.last_campaign_id,
            name: campaign.name,
            description: campaign.description,
            goal: campaign.goal,
            collected: Decimal::ZERO,
            created_at: Utc::now(),
        };
        state.campaigns.push(campaign.clone());

        Ok(campaign)
    }

    async fn find_campaign(&self, id: CampaignId) -> Result<Option<Campaign>, LedgerError> {
        let state = self.state.lock().await;
        Ok(state.campaigns.iter().find(|c| c.id == id).cloned())
    }

    async fn list_campaigns(&self) -> Result<Vec<Campaign>, LedgerError> {
        Ok(self.state.lock().await.campaigns.clone())
    }

    async fn list_contributions(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<Contribution>, LedgerError> {
        let state = self.state.lock().await;
        Ok(state
            .contributions
            .iter()
            .filter(|c| c.campaign_id == campaign_id)
            .cloned()
            .collect())
    }

    async fn record_contribution(
        &self,
        contribution: NewContribution,
    ) -> Result<RecordedContribution, LedgerError> {
        let mut state = self.state.lock().await;

        let index = state
            .campaigns
            .iter()
            .position(|c| c.id == contribution.campaign_id)
            .ok_or(LedgerError::CampaignNotFound(contribution.campaign_id))?;

        // Checked before any write so a rejected contribution leaves no trace
        let collected = state.campaigns[index]
            .collected
            .checked_add(contribution.amount)
            .filter(|total| *total < MAX_AMOUNT)
            .ok_or_else(|| LedgerError::Validation(TOTAL_TOO_LARGE.to_string()))?;

        state.last_contribution_id += 1;
        let stored = Contribution {
            id: state.last_contribution_id,
            campaign_id: contribution.campaign_id,
            donor_name: contribution.donor_name,
            amount: contribution.amount,
            contributed_at: Utc::now(),
        };

        state.campaigns[index].collected = collected;
        state.contributions.push(stored.clone());

        Ok(RecordedContribution {
            contribution: stored,
            collected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_campaign(name: &str) -> NewCampaign {
        NewCampaign {
            name: name.to_string(),
            description: String::new(),
            goal: Decimal::new(10000, 2),
        }
    }

    #[tokio::test]
    async fn test_ids_follow_creation_order() {
        let repository = InMemoryLedgerRepository::new();

        let first = repository.insert_campaign(new_campaign("a")).await.unwrap();
        let second = repository.insert_campaign(new_campaign("b")).await.unwrap();

        assert_eq!((first.id, second.id), (1, 2));
        assert_eq!(first.collected, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_missing_campaign_leaves_store_untouched() {
        let repository = InMemoryLedgerRepository::new();
        repository.insert_campaign(new_campaign("a")).await.unwrap();

        let result = repository
            .record_contribution(NewContribution {
                campaign_id: 42,
                donor_name: "Bob".to_string(),
                amount: Decimal::TEN,
            })
            .await;

        assert!(matches!(result, Err(LedgerError::CampaignNotFound(42))));
        assert!(repository.list_contributions(42).await.unwrap().is_empty());
        assert!(repository.list_contributions(1).await.unwrap().is_empty());

        // A failed contribution does not consume an id
        let recorded = repository
            .record_contribution(NewContribution {
                campaign_id: 1,
                donor_name: "Bob".to_string(),
                amount: Decimal::TEN,
            })
            .await
            .unwrap();
        assert_eq!(recorded.contribution.id, 1);
        assert_eq!(recorded.collected, Decimal::TEN);
    }

    #[tokio::test]
    async fn test_balance_overflow_is_rejected_without_writes() {
        let repository = InMemoryLedgerRepository::new();
        repository.insert_campaign(new_campaign("a")).await.unwrap();

        let big = |amount: Decimal| NewContribution {
            campaign_id: 1,
            donor_name: "Big".to_string(),
            amount,
        };
        let near_max = MAX_AMOUNT - Decimal::ONE;

        repository.record_contribution(big(near_max)).await.unwrap();

        let result = repository.record_contribution(big(Decimal::TEN)).await;
        assert!(matches!(result, Err(LedgerError::Validation(_))));

        // Past the range of Decimal itself
        let result = repository.record_contribution(big(Decimal::MAX)).await;
        assert!(matches!(result, Err(LedgerError::Validation(_))));

        let campaign = repository.find_campaign(1).await.unwrap().unwrap();
        assert_eq!(campaign.collected, near_max);
        assert_eq!(repository.list_contributions(1).await.unwrap().len(), 1);
    }
}
