use std::sync::Arc;

use geocoding::{GeocodeResolver, Resolution};

use crate::repository::EmergencyRepository;
use crate::types::*;

/// A service for receiving emergency reports and listing them.
#[derive(Clone)]
pub struct EmergencyService {
    repository: Arc<dyn EmergencyRepository>,
    resolver: Arc<dyn GeocodeResolver>,
    policy: GeocodePolicy,
}

impl EmergencyService {
    /// Creates a new instance of `EmergencyService`.
    pub fn new(
        repository: Arc<dyn EmergencyRepository>,
        resolver: Arc<dyn GeocodeResolver>,
        policy: GeocodePolicy,
    ) -> Self {
        Self {
            repository,
            resolver,
            policy,
        }
    }

    /// Policy applied to unresolved locations
    pub fn policy(&self) -> GeocodePolicy {
        self.policy
    }

    /// Validates a report, geocodes its location once and stores it.
    pub async fn report(&self, request: &ReportEmergencyRequest) -> Result<Emergency, EmergencyError> {
        let name = required(&request.name, "Name is required")?;
        let location = required(&request.location, "Location is required")?;
        let animal = required(&request.animal, "Animal is required")?;
        let description = required(&request.description, "Description is required")?;

        let coordinates = match self.resolver.resolve(&location).await {
            Resolution::Resolved(coordinates) => Some(coordinates),
            Resolution::Unresolved(reason) => match self.policy {
                GeocodePolicy::Strict => {
                    log::warn!("🚫 Rejecting report, location '{}': {}", location, reason);
                    return Err(EmergencyError::UnresolvedLocation {
                        location,
                        reason: reason.to_string(),
                    });
                }
                GeocodePolicy::Lenient => {
                    log::warn!(
                        "⚠️ Storing report without coordinates, location '{}': {}",
                        location,
                        reason
                    );
                    None
                }
            },
        };

        let emergency = self
            .repository
            .insert(NewEmergency {
                name,
                location,
                coordinates,
                animal,
                description,
            })
            .await?;

        log::info!(
            "🚨 Emergency {} reported at '{}' ({:?})",
            emergency.id,
            emergency.location,
            emergency.coordinates
        );

        Ok(emergency)
    }

    /// Lists every report in creation order.
    pub async fn list(&self) -> Result<Vec<Emergency>, EmergencyError> {
        self.repository.list().await
    }
}

fn required(value: &str, message: &str) -> Result<String, EmergencyError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EmergencyError::Validation(message.to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryEmergencyRepository;
    use geocoding::{Coordinates, FixedResolver};

    const NANTES: Coordinates = Coordinates {
        latitude: 47.2184,
        longitude: -1.5536,
    };

    fn resolver() -> Arc<FixedResolver> {
        Arc::new(FixedResolver::new().with_place("10 Rue de Nantes", NANTES))
    }

    fn request(location: &str) -> ReportEmergencyRequest {
        ReportEmergencyRequest {
            name: "Dog rescue".to_string(),
            location: location.to_string(),
            animal: "dog".to_string(),
            description: "stuck".to_string(),
        }
    }

    #[tokio::test]
    async fn test_resolved_location_is_stored_with_coordinates() {
        let resolver = resolver();
        let service = EmergencyService::new(
            Arc::new(InMemoryEmergencyRepository::new()),
            resolver.clone(),
            GeocodePolicy::Lenient,
        );

        let emergency = service.report(&request("10 Rue de Nantes")).await.unwrap();

        assert_eq!(emergency.coordinates, Some(NANTES));
        assert_eq!(emergency.status, EmergencyStatus::Pending);
        assert_eq!(resolver.lookups(), 1);
    }

    #[tokio::test]
    async fn test_lenient_policy_stores_without_coordinates() {
        let service = EmergencyService::new(
            Arc::new(InMemoryEmergencyRepository::new()),
            resolver(),
            GeocodePolicy::Lenient,
        );

        let emergency = service.report(&request("Middle of nowhere")).await.unwrap();
        assert_eq!(emergency.coordinates, None);

        let json = serde_json::to_value(&emergency).unwrap();
        assert!(json["lat"].is_null());
        assert!(json["lon"].is_null());
        assert_eq!(json["status"], "pending");
    }

    #[tokio::test]
    async fn test_strict_policy_rejects_without_storing() {
        let repository = Arc::new(InMemoryEmergencyRepository::new());
        let service = EmergencyService::new(repository.clone(), resolver(), GeocodePolicy::Strict);

        let result = service.report(&request("Middle of nowhere")).await;

        assert!(matches!(
            result,
            Err(EmergencyError::UnresolvedLocation { .. })
        ));
        assert!(repository.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_fields_are_rejected_before_geocoding() {
        let resolver = resolver();
        let service = EmergencyService::new(
            Arc::new(InMemoryEmergencyRepository::new()),
            resolver.clone(),
            GeocodePolicy::Lenient,
        );

        let mut blank_animal = request("10 Rue de Nantes");
        blank_animal.animal = "  ".to_string();

        assert!(matches!(
            service.report(&blank_animal).await,
            Err(EmergencyError::Validation(_))
        ));
        assert!(matches!(
            service.report(&request("")).await,
            Err(EmergencyError::Validation(_))
        ));
        assert_eq!(resolver.lookups(), 0);
    }

    #[tokio::test]
    async fn test_list_keeps_creation_order() {
        let service = EmergencyService::new(
            Arc::new(InMemoryEmergencyRepository::new()),
            resolver(),
            GeocodePolicy::Lenient,
        );

        service.report(&request("10 Rue de Nantes")).await.unwrap();
        service.report(&request("Unknown lane")).await.unwrap();
        service.report(&request("10 rue de nantes")).await.unwrap();

        let listed = service.list().await.unwrap();
        let ids: Vec<_> = listed.iter().map(|e| e.id).collect();
        assert_eq!(ids, [1, 2, 3]);
        for emergency in &listed {
            let json = serde_json::to_value(emergency).unwrap();
            assert_eq!(json["lat"].is_null(), json["lon"].is_null());
        }
    }
}
