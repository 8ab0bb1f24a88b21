//! Domain layer - Pure business logic for the play-area front desk
//!
//! This crate contains:
//! - Entities (BraceletSession, Bracelet, Parent, Child, TariffPlan)
//! - Value objects (BraceletCode, SessionStatus, EntryAction)
//! - Validation rules and the analytics aggregator
//! - The session gateway interface (trait)
//!
//! Nothing in here touches storage or the network.

pub mod analytics;
pub mod bracelet;
pub mod error;
pub mod family;
pub mod notification;
pub mod product;
pub mod session;
pub mod tariff;
pub mod validation;

// Re-export commonly used types
pub use analytics::SessionAnalytics;
pub use bracelet::{Bracelet, BraceletCode, BraceletStatus};
pub use error::{DomainError, FormErrors};
pub use family::{Child, Parent};
pub use notification::{Notification, NotificationKind, Notifier, SoundCue, SoundPlayer};
pub use product::{OrderLines, Product, ProductCategory, SessionProduct};
pub use session::{
    BraceletSession, EntryAction, EntryLog, Registration, SessionGateway, SessionStatus,
    SessionWithDetails, ToggleOutcome,
};
pub use tariff::TariffPlan;
