use serde::{Deserialize, Serialize};

use super::capability::Capability;
use super::permission_set::PermissionSet;

/// The closed set of console roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Supervisor,
    Sales,
    CustomerService,
}

impl Role {
    pub const ALL: &'static [Role] = &[
        Role::Admin,
        Role::Supervisor,
        Role::Sales,
        Role::CustomerService,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Supervisor => "supervisor",
            Role::Sales => "sales",
            Role::CustomerService => "customer_service",
        }
    }

    pub fn from_name(name: &str) -> Option<Role> {
        Role::ALL.iter().copied().find(|r| r.as_str() == name)
    }
}

/// Canonical per-role default permission sets.
///
/// Defaults are a provisioning template only: they seed an employee's
/// effective permissions at creation (and on "apply defaults" in the editor)
/// and are never consulted by the guards afterwards. Changing a default here
/// does not touch existing employees.
pub struct RoleRegistry;

impl RoleRegistry {
    /// Pure and total over the role enum. `admin` is all-true by definition.
    pub fn defaults_for(role: Role) -> PermissionSet {
        use Capability::*;
        match role {
            Role::Admin => PermissionSet::all(),
            Role::Supervisor => PermissionSet::from_granted(&[
                ViewOrders,
                CreateOrders,
                EditOrders,
                DeleteOrders,
                ViewCustomers,
                EditCustomers,
                DeleteCustomers,
                ViewServices,
                CreateServices,
                EditServices,
                DeleteServices,
                ViewOffers,
                CreateOffers,
                EditOffers,
                DeleteOffers,
                ViewCategories,
                CreateCategories,
                EditCategories,
                DeleteCategories,
                ViewStores,
                CreateStores,
                EditStores,
                ViewProviders,
                CreateProviders,
                EditProviders,
                ViewWallets,
                AdjustWallets,
                ViewReports,
                ExportReports,
                ViewEmployees,
                CreateEmployees,
                EditEmployees,
                ViewRewards,
                ManageRewards,
                ViewSchedules,
                ManageSchedules,
                ViewReviews,
                ModerateReviews,
                ViewPayments,
                RefundPayments,
                ViewCoupons,
                ManageCoupons,
                ViewDiscounts,
                ManageDiscounts,
                ViewGiftCards,
                ManageGiftCards,
                ViewAuditLog,
            ]),
            Role::Sales => PermissionSet::from_granted(&[
                ViewOrders,
                CreateOrders,
                EditOrders,
                ViewCustomers,
                ViewServices,
                ViewOffers,
                CreateOffers,
                EditOffers,
                ViewCategories,
                ViewStores,
                ViewProviders,
                ViewReports,
                ViewCoupons,
                ManageCoupons,
                ViewDiscounts,
                ManageDiscounts,
                ViewGiftCards,
                ManageGiftCards,
            ]),
            Role::CustomerService => PermissionSet::from_granted(&[
                ViewOrders,
                EditOrders,
                ViewCustomers,
                EditCustomers,
                ViewServices,
                ViewStores,
                ViewProviders,
                ViewWallets,
                ViewSchedules,
                ViewReviews,
                ModerateReviews,
                ViewPayments,
                ViewRewards,
                ViewGiftCards,
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_default_grants_everything() {
        let defaults = RoleRegistry::defaults_for(Role::Admin);
        for cap in Capability::ALL {
            assert!(defaults.is_granted(*cap), "admin missing {:?}", cap);
        }
    }

    #[test]
    fn defaults_are_total_for_every_role() {
        for role in Role::ALL {
            let defaults = RoleRegistry::defaults_for(*role);
            assert_eq!(defaults.iter().count(), Capability::ALL.len());
        }
    }

    #[test]
    fn non_admin_roles_are_not_universal() {
        for role in [Role::Supervisor, Role::Sales, Role::CustomerService] {
            let defaults = RoleRegistry::defaults_for(role);
            assert!(defaults.granted_count() < Capability::ALL.len());
            assert!(!defaults.is_granted(Capability::ManageSettings));
        }
    }

    #[test]
    fn role_names_round_trip() {
        for role in Role::ALL {
            assert_eq!(Role::from_name(role.as_str()), Some(*role));
        }
        assert_eq!(Role::from_name("worker"), None);
    }
}
