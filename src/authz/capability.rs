use serde::{Deserialize, Serialize};

/// The closed catalog of console capabilities.
///
/// This enum is the single source of truth for capability names: route rules,
/// role defaults and stored permission sets all reference these variants, so a
/// rule can never name a capability that does not exist. Serialized names are
/// camelCase (`viewOrders`, `manageSettings`, ...), matching what the console
/// front-end and the persisted JSON blobs use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    // Orders
    ViewOrders,
    CreateOrders,
    EditOrders,
    DeleteOrders,
    // Customers
    ViewCustomers,
    EditCustomers,
    DeleteCustomers,
    // Services
    ViewServices,
    CreateServices,
    EditServices,
    DeleteServices,
    // Offers
    ViewOffers,
    CreateOffers,
    EditOffers,
    DeleteOffers,
    // Categories
    ViewCategories,
    CreateCategories,
    EditCategories,
    DeleteCategories,
    // Stores
    ViewStores,
    CreateStores,
    EditStores,
    DeleteStores,
    // Providers
    ViewProviders,
    CreateProviders,
    EditProviders,
    DeleteProviders,
    // Wallets
    ViewWallets,
    AdjustWallets,
    // Reports
    ViewReports,
    ExportReports,
    // Employees
    ViewEmployees,
    CreateEmployees,
    EditEmployees,
    DeleteEmployees,
    EditEmployeePermissions,
    // System
    ManageSettings,
    ViewAuditLog,
    // Rewards
    ViewRewards,
    ManageRewards,
    // Schedules
    ViewSchedules,
    ManageSchedules,
    // Reviews
    ViewReviews,
    ModerateReviews,
    // Payments
    ViewPayments,
    RefundPayments,
    // Coupons
    ViewCoupons,
    ManageCoupons,
    // Discounts
    ViewDiscounts,
    ManageDiscounts,
    // Gift cards
    ViewGiftCards,
    ManageGiftCards,
}

/// Presentation grouping for the permissions editor. Grouping is metadata
/// only; permission sets store capabilities flat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Domain {
    Orders,
    Customers,
    Services,
    Offers,
    Categories,
    Stores,
    Providers,
    Wallets,
    Reports,
    Employees,
    System,
    Rewards,
    Schedules,
    Reviews,
    Payments,
    Coupons,
    Discounts,
    GiftCards,
}

impl Domain {
    pub const ALL: &'static [Domain] = &[
        Domain::Orders,
        Domain::Customers,
        Domain::Services,
        Domain::Offers,
        Domain::Categories,
        Domain::Stores,
        Domain::Providers,
        Domain::Wallets,
        Domain::Reports,
        Domain::Employees,
        Domain::System,
        Domain::Rewards,
        Domain::Schedules,
        Domain::Reviews,
        Domain::Payments,
        Domain::Coupons,
        Domain::Discounts,
        Domain::GiftCards,
    ];

    /// Human-readable label shown as the group heading in the editor.
    pub fn label(&self) -> &'static str {
        match self {
            Domain::Orders => "Orders",
            Domain::Customers => "Customers",
            Domain::Services => "Services",
            Domain::Offers => "Offers",
            Domain::Categories => "Categories",
            Domain::Stores => "Stores",
            Domain::Providers => "Providers",
            Domain::Wallets => "Wallets",
            Domain::Reports => "Reports",
            Domain::Employees => "Employees",
            Domain::System => "System",
            Domain::Rewards => "Rewards",
            Domain::Schedules => "Schedules",
            Domain::Reviews => "Reviews",
            Domain::Payments => "Payments",
            Domain::Coupons => "Coupons",
            Domain::Discounts => "Discounts",
            Domain::GiftCards => "Gift Cards",
        }
    }
}

impl Capability {
    /// Every known capability. Role defaults and `PermissionSet` totality are
    /// defined against this list; adding a variant here forces a decision in
    /// `RoleRegistry::defaults_for` for every role.
    pub const ALL: &'static [Capability] = &[
        Capability::ViewOrders,
        Capability::CreateOrders,
        Capability::EditOrders,
        Capability::DeleteOrders,
        Capability::ViewCustomers,
        Capability::EditCustomers,
        Capability::DeleteCustomers,
        Capability::ViewServices,
        Capability::CreateServices,
        Capability::EditServices,
        Capability::DeleteServices,
        Capability::ViewOffers,
        Capability::CreateOffers,
        Capability::EditOffers,
        Capability::DeleteOffers,
        Capability::ViewCategories,
        Capability::CreateCategories,
        Capability::EditCategories,
        Capability::DeleteCategories,
        Capability::ViewStores,
        Capability::CreateStores,
        Capability::EditStores,
        Capability::DeleteStores,
        Capability::ViewProviders,
        Capability::CreateProviders,
        Capability::EditProviders,
        Capability::DeleteProviders,
        Capability::ViewWallets,
        Capability::AdjustWallets,
        Capability::ViewReports,
        Capability::ExportReports,
        Capability::ViewEmployees,
        Capability::CreateEmployees,
        Capability::EditEmployees,
        Capability::DeleteEmployees,
        Capability::EditEmployeePermissions,
        Capability::ManageSettings,
        Capability::ViewAuditLog,
        Capability::ViewRewards,
        Capability::ManageRewards,
        Capability::ViewSchedules,
        Capability::ManageSchedules,
        Capability::ViewReviews,
        Capability::ModerateReviews,
        Capability::ViewPayments,
        Capability::RefundPayments,
        Capability::ViewCoupons,
        Capability::ManageCoupons,
        Capability::ViewDiscounts,
        Capability::ManageDiscounts,
        Capability::ViewGiftCards,
        Capability::ManageGiftCards,
    ];

    /// The serialized camelCase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ViewOrders => "viewOrders",
            Capability::CreateOrders => "createOrders",
            Capability::EditOrders => "editOrders",
            Capability::DeleteOrders => "deleteOrders",
            Capability::ViewCustomers => "viewCustomers",
            Capability::EditCustomers => "editCustomers",
            Capability::DeleteCustomers => "deleteCustomers",
            Capability::ViewServices => "viewServices",
            Capability::CreateServices => "createServices",
            Capability::EditServices => "editServices",
            Capability::DeleteServices => "deleteServices",
            Capability::ViewOffers => "viewOffers",
            Capability::CreateOffers => "createOffers",
            Capability::EditOffers => "editOffers",
            Capability::DeleteOffers => "deleteOffers",
            Capability::ViewCategories => "viewCategories",
            Capability::CreateCategories => "createCategories",
            Capability::EditCategories => "editCategories",
            Capability::DeleteCategories => "deleteCategories",
            Capability::ViewStores => "viewStores",
            Capability::CreateStores => "createStores",
            Capability::EditStores => "editStores",
            Capability::DeleteStores => "deleteStores",
            Capability::ViewProviders => "viewProviders",
            Capability::CreateProviders => "createProviders",
            Capability::EditProviders => "editProviders",
            Capability::DeleteProviders => "deleteProviders",
            Capability::ViewWallets => "viewWallets",
            Capability::AdjustWallets => "adjustWallets",
            Capability::ViewReports => "viewReports",
            Capability::ExportReports => "exportReports",
            Capability::ViewEmployees => "viewEmployees",
            Capability::CreateEmployees => "createEmployees",
            Capability::EditEmployees => "editEmployees",
            Capability::DeleteEmployees => "deleteEmployees",
            Capability::EditEmployeePermissions => "editEmployeePermissions",
            Capability::ManageSettings => "manageSettings",
            Capability::ViewAuditLog => "viewAuditLog",
            Capability::ViewRewards => "viewRewards",
            Capability::ManageRewards => "manageRewards",
            Capability::ViewSchedules => "viewSchedules",
            Capability::ManageSchedules => "manageSchedules",
            Capability::ViewReviews => "viewReviews",
            Capability::ModerateReviews => "moderateReviews",
            Capability::ViewPayments => "viewPayments",
            Capability::RefundPayments => "refundPayments",
            Capability::ViewCoupons => "viewCoupons",
            Capability::ManageCoupons => "manageCoupons",
            Capability::ViewDiscounts => "viewDiscounts",
            Capability::ManageDiscounts => "manageDiscounts",
            Capability::ViewGiftCards => "viewGiftCards",
            Capability::ManageGiftCards => "manageGiftCards",
        }
    }

    /// Parse a serialized name. Unknown names yield `None`; callers decide
    /// whether that is a warning (stored blobs) or an error (API input).
    pub fn from_name(name: &str) -> Option<Capability> {
        Capability::ALL.iter().copied().find(|c| c.as_str() == name)
    }

    pub fn domain(&self) -> Domain {
        use Capability::*;
        match self {
            ViewOrders | CreateOrders | EditOrders | DeleteOrders => Domain::Orders,
            ViewCustomers | EditCustomers | DeleteCustomers => Domain::Customers,
            ViewServices | CreateServices | EditServices | DeleteServices => Domain::Services,
            ViewOffers | CreateOffers | EditOffers | DeleteOffers => Domain::Offers,
            ViewCategories | CreateCategories | EditCategories | DeleteCategories => {
                Domain::Categories
            }
            ViewStores | CreateStores | EditStores | DeleteStores => Domain::Stores,
            ViewProviders | CreateProviders | EditProviders | DeleteProviders => Domain::Providers,
            ViewWallets | AdjustWallets => Domain::Wallets,
            ViewReports | ExportReports => Domain::Reports,
            ViewEmployees | CreateEmployees | EditEmployees | DeleteEmployees
            | EditEmployeePermissions => Domain::Employees,
            ManageSettings | ViewAuditLog => Domain::System,
            ViewRewards | ManageRewards => Domain::Rewards,
            ViewSchedules | ManageSchedules => Domain::Schedules,
            ViewReviews | ModerateReviews => Domain::Reviews,
            ViewPayments | RefundPayments => Domain::Payments,
            ViewCoupons | ManageCoupons => Domain::Coupons,
            ViewDiscounts | ManageDiscounts => Domain::Discounts,
            ViewGiftCards | ManageGiftCards => Domain::GiftCards,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for cap in Capability::ALL {
            assert_eq!(Capability::from_name(cap.as_str()), Some(*cap));
        }
    }

    #[test]
    fn serde_name_matches_as_str() {
        for cap in Capability::ALL {
            let json = serde_json::to_string(cap).unwrap();
            assert_eq!(json, format!("\"{}\"", cap.as_str()));
        }
    }

    #[test]
    fn every_domain_has_capabilities() {
        for domain in Domain::ALL {
            assert!(
                Capability::ALL.iter().any(|c| c.domain() == *domain),
                "domain {:?} has no capabilities",
                domain
            );
        }
    }
}
