//! Audit trail
//!
//! Every privileged action is written to an append-only JSON-lines log and
//! broadcast to live observers. The two sinks are independent: a storage
//! fault never stops live delivery.

pub mod event;
pub mod feed;
pub mod journal;
pub mod window;

pub use event::{AuditAction, AuditDetails, AuditEvent, AuditLevel, details};
pub use feed::{AuditFeed, AuditSubscription, AuditSubscriptionHandle};
pub use journal::{AUDIT_FILE, AuditLog, DEFAULT_RECENT_LIMIT, MAX_RECENT_LIMIT, clamp_limit};
pub use window::LiveWindow;
