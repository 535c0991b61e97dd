//! Group and tutor lookups

use crate::errors::Result;
use crate::http::{ApiClient, ApiRequest};
use crate::models::{Group, Page, Tutor};

impl ApiClient {
    /// `GET /dicts/groups/{id}`
    pub async fn group(&self, group_id: i64) -> Result<Group> {
        self.execute(ApiRequest::get(format!("/dicts/groups/{group_id}")))
            .await
    }

    /// `GET /dicts/groups?search=&page=&size=`
    pub async fn groups(&self, search: &str, page: u32, size: u32) -> Result<Page<Group>> {
        self.execute(dictionary_request("/dicts/groups", search, page, size))
            .await
    }

    /// `GET /dicts/tutors?search=&page=&size=`
    pub async fn tutors(&self, search: &str, page: u32, size: u32) -> Result<Page<Tutor>> {
        self.execute(dictionary_request("/dicts/tutors", search, page, size))
            .await
    }
}

fn dictionary_request(path: &str, search: &str, page: u32, size: u32) -> ApiRequest {
    ApiRequest::get(path)
        .query("search", search)
        .query("page", page)
        .query("size", size)
}
