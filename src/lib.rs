/*!
# Schedule Mini App client

Headless client core of the university schedule Telegram Mini App.

The crate holds everything the app does besides drawing pixels:

- a session store with token, profile and loading state, persisted across launches
- an HTTP client wrapper that attaches the bearer token and detects blocked accounts
- the launch/auth bootstrap state machine and the top-level screen gate
- a query cache, incremental pagination and input debouncing
- view models for the schedule, search, homework, profile and admin screens

## Quick Start

```rust,no_run
use schedule_miniapp::prelude::*;

# #[tokio::main]
# async fn main() -> Result<(), Box<dyn std::error::Error>> {
let config = ClientConfig::new("https://schedule.example.edu");
let app = MiniApp::from_config(config)?;

// Launch parameters come from the embedding host.
let params = LaunchParams::with_init_data("query_id=...&user=...&hash=...");
app.launch(LaunchContext::Present(params)).await;

match app.screen() {
    Screen::Content => {
        let today = chrono::Local::now().date_naive();
        if let ScreenState::Ready(slots) = app.schedule(today).load().await {
            for slot in slots {
                println!("{}: {} lesson(s)", slot.label, slot.entry.lessons().len());
            }
        }
    }
    other => println!("showing {other:?}"),
}
# Ok(())
# }
```

## Blocked accounts

Any account-scoped request answered with HTTP 403, and any response carrying
the `User is blocked` detail, marks the loaded user as blocked. The gate then
shows [`gate::Screen::Blocked`] whose only action is
[`app::MiniApp::clear_local_data`]. Writes on a single item (homework) are
item-scoped: a 403 there is reported as a permission denial and leaves the
session alone.
*/

pub mod api;
pub mod app;
pub mod bootstrap;
pub mod config;
pub mod errors;
pub mod gate;
pub mod http;
pub mod models;
pub mod prelude;
pub mod query;
pub mod screens;
pub mod session;
pub mod storage;

pub use app::{MiniApp, View};
pub use config::ClientConfig;
pub use errors::{ClientError, Result};
pub use http::ApiClient;
pub use session::SessionStore;
