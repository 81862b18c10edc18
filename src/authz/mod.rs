//! Authorization core for the admin console.
//!
//! Three enforcement points share one decision function:
//! - the route guard (middleware, the trust boundary),
//! - the subtree guard (UI regions, advisory),
//! - the action guard (single controls, advisory).
//!
//! Role defaults are a provisioning template: they seed an employee's
//! effective permission set and can be re-applied in the editor, but the
//! guards only ever read the employee's current stored set.

pub mod capability;
pub mod decision;
pub mod editor;
pub mod guard;
pub mod permission_set;
pub mod role;
pub mod route_table;
pub mod ui;

pub use capability::{Capability, Domain};
pub use decision::{authorize, Combinator, GuardRequirement};
pub use editor::PermissionsEditor;
pub use permission_set::PermissionSet;
pub use role::{Role, RoleRegistry};
pub use route_table::{match_rule, route_table, RouteRule};
pub use ui::{ActionGuard, ActionOutcome, DenialMode, SubtreeGuard, SubtreeOutcome};
