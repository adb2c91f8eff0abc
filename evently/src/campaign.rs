use evently_store::NewCampaign;
use validator::Validate;

use crate::{
    dto::{CreateCampaignRequest, CreateCampaignResponse},
    error::{Result, ServiceError},
    service::{store_failure, EventQueryService, Subject},
};

impl EventQueryService {
    /// Declares a campaign. Only the keys of `properties` matter when events
    /// are later linked to it.
    pub async fn create_campaign(
        &self,
        req: CreateCampaignRequest,
    ) -> Result<CreateCampaignResponse> {
        req.validate()?;

        self.with_deadline(async {
            if self
                .campaigns
                .exists_by_name(&req.name)
                .await
                .map_err(store_failure("check campaign", Subject::CampaignName(&req.name)))?
            {
                return Err(ServiceError::CampaignExists(req.name.clone()));
            }

            let campaign = self
                .campaigns
                .create(NewCampaign::new(req.name.as_str()).properties(req.properties))
                .await
                .map_err(store_failure("create campaign", Subject::CampaignName(&req.name)))?;

            Ok(campaign.into())
        })
        .await
    }
}
