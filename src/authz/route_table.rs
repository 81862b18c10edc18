use std::sync::OnceLock;

use super::capability::Capability;
use super::decision::GuardRequirement;
use super::role::Role;

/// A protected path prefix and what it takes to enter it.
///
/// Route rules always evaluate their requirement with the ANY combinator: an
/// area is reachable if the caller holds at least one of the listed
/// capabilities. Finer ALL-style checks belong to the UI guards inside the
/// area.
#[derive(Debug, Clone)]
pub struct RouteRule {
    pub path_prefix: &'static str,
    pub allowed_roles: &'static [Role],
    pub requirement: GuardRequirement,
}

const ALL_ROLES: &[Role] = Role::ALL;
const ADMIN_SUPERVISOR: &[Role] = &[Role::Admin, Role::Supervisor];
const ADMIN_ONLY: &[Role] = &[Role::Admin];
const SALES_FACING: &[Role] = &[Role::Admin, Role::Supervisor, Role::Sales];
const SUPPORT_FACING: &[Role] = &[Role::Admin, Role::Supervisor, Role::CustomerService];

/// The static table of protected areas. Configuration, not runtime-mutable.
pub fn route_table() -> &'static [RouteRule] {
    static TABLE: OnceLock<Vec<RouteRule>> = OnceLock::new();
    TABLE.get_or_init(|| {
        use Capability::*;
        vec![
            // The bare dashboard only needs a valid credential.
            rule("/dashboard", ALL_ROLES, &[]),
            rule("/dashboard/orders", ALL_ROLES, &[ViewOrders]),
            rule("/dashboard/customers", ALL_ROLES, &[ViewCustomers]),
            rule("/dashboard/services", SALES_FACING, &[ViewServices]),
            rule("/dashboard/offers", SALES_FACING, &[ViewOffers]),
            rule("/dashboard/categories", SALES_FACING, &[ViewCategories]),
            rule("/dashboard/stores", ALL_ROLES, &[ViewStores]),
            rule("/dashboard/providers", ALL_ROLES, &[ViewProviders]),
            rule("/dashboard/wallets", SUPPORT_FACING, &[ViewWallets]),
            rule("/dashboard/reports", SALES_FACING, &[ViewReports]),
            rule("/dashboard/rewards", SUPPORT_FACING, &[ViewRewards]),
            rule("/dashboard/schedules", SUPPORT_FACING, &[ViewSchedules]),
            rule("/dashboard/reviews", SUPPORT_FACING, &[ViewReviews, ModerateReviews]),
            rule("/dashboard/payments", SUPPORT_FACING, &[ViewPayments]),
            rule("/dashboard/coupons", SALES_FACING, &[ViewCoupons]),
            rule("/dashboard/discounts", SALES_FACING, &[ViewDiscounts]),
            rule("/dashboard/gift-cards", SALES_FACING, &[ViewGiftCards]),
            rule("/dashboard/employees", ADMIN_SUPERVISOR, &[ViewEmployees]),
            rule("/dashboard/settings", ADMIN_ONLY, &[ManageSettings]),
            rule("/dashboard/audit-log", ADMIN_SUPERVISOR, &[ViewAuditLog]),
            // The employee management API is gated the same way as its screen.
            rule("/api/employees", ADMIN_SUPERVISOR, &[ViewEmployees]),
        ]
    })
}

fn rule(path_prefix: &'static str, allowed_roles: &'static [Role], required: &[Capability]) -> RouteRule {
    RouteRule {
        path_prefix,
        allowed_roles,
        requirement: GuardRequirement::any(required.to_vec()),
    }
}

/// Find the rule protecting `path`, if any.
///
/// Precedence is longest-prefix-wins, and a prefix only matches on a path
/// segment boundary, so the result is deterministic regardless of declaration
/// order and `/dashboard/employees` never shadows `/dashboard/employeesX`.
pub fn match_rule(path: &str) -> Option<&'static RouteRule> {
    route_table()
        .iter()
        .filter(|rule| prefix_matches(path, rule.path_prefix))
        .max_by_key(|rule| rule.path_prefix.len())
}

fn prefix_matches(path: &str, prefix: &str) -> bool {
    if path == prefix {
        return true;
    }
    path.strip_prefix(prefix)
        .map(|rest| rest.starts_with('/'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_prefix_wins() {
        let rule = match_rule("/dashboard/employees/42/permissions").unwrap();
        assert_eq!(rule.path_prefix, "/dashboard/employees");

        let rule = match_rule("/dashboard").unwrap();
        assert_eq!(rule.path_prefix, "/dashboard");
    }

    #[test]
    fn prefixes_match_on_segment_boundaries_only() {
        assert!(prefix_matches("/dashboard/employees/1", "/dashboard/employees"));
        assert!(!prefix_matches("/dashboard/employeesX", "/dashboard/employees"));
        assert!(prefix_matches("/dashboard/employees", "/dashboard/employees"));
    }

    #[test]
    fn unprotected_paths_have_no_rule() {
        assert!(match_rule("/auth/login").is_none());
        assert!(match_rule("/api/health").is_none());
        assert!(match_rule("/").is_none());
    }

    #[test]
    fn settings_area_is_admin_only() {
        let rule = match_rule("/dashboard/settings").unwrap();
        assert_eq!(rule.allowed_roles, &[Role::Admin]);
        assert_eq!(rule.requirement.required, vec![Capability::ManageSettings]);
    }
}
