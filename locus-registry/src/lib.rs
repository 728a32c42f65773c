//! Per-category handler registry for location events
//!
//! Stores callbacks for the seven event categories and fans out each
//! dispatched payload to them in a fixed order, without ever talking to a
//! positioning provider.
//!
//! # Features
//!
//! - **Typed categories**: register and dispatch through marker types in
//!   [`kinds`], so a heading handler can never receive a region update
//! - **Persistent and one-shot handlers**: persistent handlers stay until
//!   cleared, one-shots are removed by category policy
//! - **Delegates**: one object receiving every category, invoked first
//! - **Notifications**: every dispatch is also broadcast on mpsc channels
//!
//! # Quick Start
//!
//! ```rust
//! use locus_model::{AuthorizationStatus, Coordinate, Location};
//! use locus_registry::{kinds, Category, SubscriptionRegistry};
//!
//! let mut registry = SubscriptionRegistry::new();
//!
//! registry.add_persistent::<kinds::Location>(|location| {
//!     println!("now at {}", location.coordinate);
//! });
//! registry.add_one_shot::<kinds::Authorization>(|status| {
//!     println!("answered: {}", status);
//! });
//!
//! registry.dispatch::<kinds::Location>(&Location::new(Coordinate::new(51.5, -0.12)));
//! registry.dispatch::<kinds::Authorization>(&AuthorizationStatus::AuthorizedWhenInUse);
//!
//! assert_eq!(registry.persistent_count(Category::Location), 1);
//! assert_eq!(registry.one_shot_count(Category::Authorization), 0);
//! ```
//!
//! # Architecture
//!
//! ```text
//! SubscriptionRegistry
//!     │
//!     ├── delegates: Vec<Arc<dyn LocationDelegate>>
//!     │
//!     ├── handlers: CategoryHandlers
//!     │       │
//!     │       └── HandlerSlots<Payload> per category
//!     │               ├── persistent: Vec<Box<dyn FnMut(&Payload)>>
//!     │               └── one_shot:   Vec<OneShot<Payload>>
//!     │
//!     └── observers: Vec<mpsc::Sender<Notification>>
//!             │
//!             └── NotificationIterator
//! ```

pub mod category;
pub mod delegate;
pub mod iter;
pub mod notification;
pub mod registry;
pub mod slots;

pub use category::{kinds, Category, EventKind};
pub use delegate::LocationDelegate;
pub use iter::{NotificationIterator, TimeoutIter, TryIter};
pub use notification::{
    LocationEvent, Notification, NotificationName, REGION_STATE_KEY, VISITING_KEY,
};
pub use registry::SubscriptionRegistry;
pub use slots::{CategoryHandlers, HandlerSlots, OneShotLifetime};

/// Boxed handler for the payload of category `K`
pub type Handler<K> = Box<dyn FnMut(&<K as EventKind>::Payload) + Send>;

pub type LocationHandler = Handler<kinds::Location>;
pub type LocationsHandler = Handler<kinds::LocationBatch>;
pub type HeadingHandler = Handler<kinds::Heading>;
pub type RegionHandler = Handler<kinds::Region>;
pub type AuthorizationHandler = Handler<kinds::Authorization>;
pub type VisitHandler = Handler<kinds::Visit>;
pub type ErrorHandler = Handler<kinds::Error>;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::category::{kinds, Category, EventKind};
    pub use crate::delegate::LocationDelegate;
    pub use crate::iter::NotificationIterator;
    pub use crate::notification::{LocationEvent, Notification, NotificationName};
    pub use crate::registry::SubscriptionRegistry;
    pub use crate::Handler;
}
