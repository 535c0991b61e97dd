//! Administrative endpoints

use crate::errors::Result;
use crate::http::{ApiClient, ApiRequest};
use crate::models::{AdminUser, Chat, Page};
use serde::Serialize;

/// Shortest user search forwarded to the backend.
pub const MIN_USER_SEARCH: usize = 2;

#[derive(Debug, Serialize)]
struct MessageBody<'a> {
    message: &'a str,
}

impl ApiClient {
    /// `GET /admin/users`; searches shorter than two characters are dropped.
    pub async fn admin_users(&self, search: &str, page: u32, size: u32) -> Result<Page<AdminUser>> {
        let search = search.trim();
        let search = (search.chars().count() >= MIN_USER_SEARCH).then_some(search);
        self.execute(
            ApiRequest::get("/admin/users")
                .query("page", page)
                .query("size", size)
                .query_opt("search", search),
        )
        .await
    }

    pub async fn block_user(&self, user_id: i64) -> Result<()> {
        self.execute_unit(ApiRequest::post(format!("/admin/users/{user_id}/block")))
            .await
    }

    pub async fn unblock_user(&self, user_id: i64) -> Result<()> {
        self.execute_unit(ApiRequest::post(format!("/admin/users/{user_id}/unblock")))
            .await
    }

    pub async fn admin_chats(&self, page: u32, size: u32) -> Result<Page<Chat>> {
        self.execute(
            ApiRequest::get("/admin/chats")
                .query("page", page)
                .query("size", size),
        )
        .await
    }

    /// Push a message into a linked chat.
    pub async fn send_chat_message(&self, chat_id: i64, message: &str) -> Result<()> {
        self.execute_unit(
            ApiRequest::post(format!("/admin/chats/{chat_id}/send-message"))
                .json(&MessageBody { message })?,
        )
        .await
    }

    pub async fn trigger_schedule_sync(&self) -> Result<()> {
        self.execute_unit(ApiRequest::post("/admin/system/trigger-schedule-sync"))
            .await
    }

    pub async fn trigger_dict_sync(&self) -> Result<()> {
        self.execute_unit(ApiRequest::post("/admin/system/trigger-dict-sync"))
            .await
    }

    /// Send `message` to every user.
    pub async fn broadcast(&self, message: &str) -> Result<()> {
        let request = ApiRequest::post("/admin/system/broadcast").json(&MessageBody { message })?;
        self.execute_unit(request)
            .await
    }
}
