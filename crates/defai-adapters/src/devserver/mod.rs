//! Development mode: a preview harness next to webpack's dev server.
//!
//! `dev` starts three things and tears them down in reverse dependency
//! order on Ctrl-C:
//!
//! 1. a [`PreviewServer`] (axum) on an ephemeral loopback port serving the
//!    harness page, API docs, the live manifest and a mock host API;
//! 2. `webpack serve` on the user-facing port, proxying the preview routes;
//! 3. a [`ProjectWatcher`] that reloads the served manifest on change.

mod error;
mod port;
mod preview;
mod session;
mod watcher;

pub use error::DevServerError;
pub use port::find_available_port;
pub use preview::{
    MOCK_PRICES, MOCK_WALLET_ADDRESS, MOCK_WALLET_BALANCE, PreviewServer, PreviewState,
    PriceQuote, WalletInfo, mock_price, render_preview, router,
};
pub use session::{DevSession, DevUrls, SessionEnd, read_manifest};
pub use watcher::{ProjectWatcher, WatchEvent};
