//! Current user profile

use crate::errors::Result;
use crate::http::{ApiClient, ApiRequest};
use crate::models::{ElectiveList, Group, ProfileUpdate, User};
use crate::session::ProfileSource;
use async_trait::async_trait;

impl ApiClient {
    /// `GET /profile/me`
    pub async fn current_user(&self) -> Result<User> {
        self.execute(ApiRequest::get("/profile/me")).await
    }

    /// `PUT /profile/me`
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<()> {
        self.execute_unit(ApiRequest::put("/profile/me").json(update)?)
            .await
    }

    /// Elective subjects of the user's group with their tutor options.
    pub async fn electives(&self) -> Result<ElectiveList> {
        self.execute(ApiRequest::get("/schedule/my/electives")).await
    }
}

#[async_trait]
impl ProfileSource for ApiClient {
    async fn current_user(&self) -> Result<User> {
        ApiClient::current_user(self).await
    }

    async fn group(&self, group_id: i64) -> Result<Group> {
        ApiClient::group(self, group_id).await
    }
}
