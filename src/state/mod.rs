// Client-side state: session cache, view-model slots, UI state and the
// optimistic-update machinery. Remote I/O never happens in here.

pub mod optimistic;
pub mod session;
pub mod store;
pub mod ui;

pub use optimistic::{apply_optimistically, LikeGate, LikeToggle, Reversible};
pub use session::SessionCache;
pub use store::{Slot, ViewModelStore};
pub use ui::{Drafts, Notice, NoticeKind, NotificationsTab, Page, SearchTab, UiState};
