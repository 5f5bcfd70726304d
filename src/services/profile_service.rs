use std::sync::Arc;

use super::ServiceError;
use crate::database::models::Profile;
use crate::dto::{ListItemsOutput, ProfileInput, ProfileOutput};
use crate::filter::Filter;
use crate::repository::ProfileRepository;

#[derive(Clone)]
pub struct ProfileService {
    profiles: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }

    pub async fn list(&self, filter: &Filter) -> Result<ListItemsOutput<ProfileOutput>, ServiceError> {
        let count = self.profiles.count_profiles(filter).await?;
        let items = self.profiles.get_profiles(filter).await?;

        Ok(ListItemsOutput {
            items: items.iter().map(ProfileOutput::from).collect(),
            count,
        })
    }

    pub async fn get(&self, id: i64) -> Result<Profile, ServiceError> {
        Ok(self.profiles.get_profile_by_id(id).await?)
    }

    pub async fn create(&self, input: &ProfileInput) -> Result<ProfileOutput, ServiceError> {
        let mut profile = Profile::default();
        profile.bind(input)?;

        let created = self.profiles.create_profile(&profile).await?;
        Ok(ProfileOutput::from(&created))
    }

    pub async fn update(&self, profile: &Profile, input: &ProfileInput) -> Result<ProfileOutput, ServiceError> {
        let mut profile = profile.clone();
        profile.bind(input)?;

        let updated = self.profiles.update_profile(&profile).await?;
        Ok(ProfileOutput::from(&updated))
    }

    pub async fn delete(&self, profile: &Profile) -> Result<(), ServiceError> {
        Ok(self.profiles.delete_profile(profile).await?)
    }
}
