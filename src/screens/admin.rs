//! Administration: users, linked chats and system jobs.

use super::{keys, validation, write_feedback, Feedback, ScreenState};
use crate::errors::Result;
use crate::http::ApiClient;
use crate::models::{AdminUser, Chat, Page};
use crate::query::{Debounced, QueryCache, QueryKey};

/// Numbered pager state for a list with previous/next buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagedList {
    page: u32,
    total_pages: u32,
}

impl Default for PagedList {
    fn default() -> Self {
        Self {
            page: 1,
            total_pages: 0,
        }
    }
}

impl PagedList {
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn previous(&mut self) {
        if self.has_previous() {
            self.page -= 1;
        }
    }

    pub fn next(&mut self) {
        if self.has_next() {
            self.page += 1;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn record<T>(&mut self, page: &Page<T>) {
        self.total_pages = page.total_pages();
    }
}

pub struct AdminScreen {
    client: ApiClient,
    cache: QueryCache,
    users: PagedList,
    user_search: String,
    chats: PagedList,
}

impl AdminScreen {
    pub fn new(client: ApiClient, cache: QueryCache) -> Self {
        Self {
            client,
            cache,
            users: PagedList::default(),
            user_search: String::new(),
            chats: PagedList::default(),
        }
    }

    pub fn users_pager(&mut self) -> &mut PagedList {
        &mut self.users
    }

    pub fn chats_pager(&mut self) -> &mut PagedList {
        &mut self.chats
    }

    /// Change the user search; paging restarts from the first page.
    pub fn set_user_search(&mut self, search: impl Into<String>) {
        self.user_search = search.into();
        self.users.reset();
    }

    pub async fn users(&mut self) -> ScreenState<Page<AdminUser>> {
        let (client, page, search) = (&self.client, self.users.page(), self.user_search.as_str());
        let size = client.config().page_sizes.admin_users;
        let result = self
            .cache
            .fetch(keys::admin_users(page, search), || client.admin_users(search, page, size))
            .await;
        if let Ok(loaded) = &result {
            self.users.record(loaded);
        }
        ScreenState::from_result(result)
    }

    /// Wait for the next settled search term and load the matching users.
    pub async fn next_debounced_users(
        &mut self,
        input: &mut Debounced<String>,
    ) -> Option<ScreenState<Page<AdminUser>>> {
        let search = input.next().await?;
        self.set_user_search(search);
        Some(self.users().await)
    }

    pub async fn block_user(&self, user_id: i64) -> Feedback {
        let result = self.client.block_user(user_id).await;
        self.after_user_change(&result);
        write_feedback(&result, "user blocked")
    }

    pub async fn unblock_user(&self, user_id: i64) -> Feedback {
        let result = self.client.unblock_user(user_id).await;
        self.after_user_change(&result);
        write_feedback(&result, "user unblocked")
    }

    fn after_user_change(&self, result: &Result<()>) {
        if result.is_ok() {
            self.cache.invalidate(&QueryKey::new(keys::ADMIN_USERS));
        }
    }

    pub async fn chats(&mut self) -> ScreenState<Page<Chat>> {
        let (client, page) = (&self.client, self.chats.page());
        let size = client.config().page_sizes.admin_chats;
        let result = self
            .cache
            .fetch(keys::admin_chats(page), || client.admin_chats(page, size))
            .await;
        if let Ok(loaded) = &result {
            self.chats.record(loaded);
        }
        ScreenState::from_result(result)
    }

    pub async fn send_chat_message(&self, chat_id: i64, message: &str) -> Feedback {
        let message = match validation::chat_message(message) {
            Ok(message) => message,
            Err(e) => return Feedback::Error(e.to_string()),
        };
        let result = self.client.send_chat_message(chat_id, message).await;
        write_feedback(&result, "message sent")
    }

    pub async fn trigger_schedule_sync(&self) -> Feedback {
        let result = self.client.trigger_schedule_sync().await;
        write_feedback(&result, "schedule sync started")
    }

    pub async fn trigger_dict_sync(&self) -> Feedback {
        let result = self.client.trigger_dict_sync().await;
        write_feedback(&result, "dictionary sync started")
    }

    pub async fn broadcast(&self, message: &str) -> Feedback {
        let message = match validation::broadcast(message) {
            Ok(message) => message,
            Err(e) => return Feedback::Error(e.to_string()),
        };
        let result = self.client.broadcast(message).await;
        write_feedback(&result, "broadcast sent")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pager_bounds() {
        let mut pager = PagedList::default();
        assert!(!pager.has_previous());
        assert!(!pager.has_next());

        pager.record(&Page::<u8> {
            items: Vec::new(),
            page: 1,
            size: 10,
            total: 25,
        });
        assert_eq!(pager.total_pages(), 3);
        pager.next();
        pager.next();
        pager.next();
        assert_eq!(pager.page(), 3);
        pager.previous();
        assert_eq!(pager.page(), 2);

        pager.reset();
        assert_eq!(pager.page(), 1);
    }
}
