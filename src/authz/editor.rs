use uuid::Uuid;

use crate::errors::AppError;
use crate::models::employee::Employee;
use crate::store::EmployeeStore;

use super::capability::Capability;
use super::permission_set::PermissionSet;
use super::role::{Role, RoleRegistry};

/// The permissions editor state machine.
///
/// Holds the last-persisted `effective` set and a working `draft`. Edits
/// only ever touch the draft; `save` is the single path that persists a new
/// effective set for the employee, as an atomic whole-set replace. Between
/// saves the two may diverge arbitrarily and `dirty` tells the console to
/// warn about unsaved changes.
///
/// Admin employees are not editable: their effective set is always all-true,
/// enforced by rejecting every mutating operation rather than by trusting the
/// caller not to try.
#[derive(Debug, Clone)]
pub struct PermissionsEditor {
    employee_id: Uuid,
    role: Role,
    effective: PermissionSet,
    draft: PermissionSet,
    dirty: bool,
}

impl PermissionsEditor {
    /// Open the editor on an employee's current effective permissions. The
    /// draft starts as an independent copy.
    pub fn open(employee: &Employee) -> Self {
        Self {
            employee_id: employee.id,
            role: employee.role,
            effective: employee.effective_permissions.clone(),
            draft: employee.effective_permissions.clone(),
            dirty: false,
        }
    }

    pub fn employee_id(&self) -> Uuid {
        self.employee_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn draft(&self) -> &PermissionSet {
        &self.draft
    }

    pub fn effective(&self) -> &PermissionSet {
        &self.effective
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_editable(&self) -> bool {
        self.role != Role::Admin
    }

    /// Flip one capability in the draft. Returns false (and changes nothing)
    /// for admin employees.
    pub fn toggle(&mut self, cap: Capability) -> bool {
        if !self.is_editable() {
            return false;
        }
        self.draft.toggle(cap);
        self.dirty = true;
        true
    }

    /// Overwrite the whole draft with the role's canonical defaults. A bulk
    /// overwrite, not a merge: prior manual divergence is discarded.
    pub fn apply_defaults(&mut self) -> bool {
        if !self.is_editable() {
            return false;
        }
        self.draft = RoleRegistry::defaults_for(self.role);
        self.dirty = true;
        true
    }

    /// Discard unsaved edits, restoring the draft to the last-persisted
    /// effective set.
    pub fn reset(&mut self) {
        self.draft = self.effective.clone();
        self.dirty = false;
    }

    /// Persist the draft as the employee's new effective set.
    ///
    /// On success the draft becomes the new baseline for `reset`. On a store
    /// error the draft and the dirty flag are left untouched so the
    /// administrator's in-progress edits survive a retry.
    pub async fn save(&mut self, store: &dyn EmployeeStore) -> Result<(), AppError> {
        store.save_permissions(self.employee_id, &self.draft).await?;
        self.effective = self.draft.clone();
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::utc_now;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn employee(role: Role) -> Employee {
        let now = utc_now();
        Employee {
            id: Uuid::new_v4(),
            name: "Test Employee".to_string(),
            email: "test@example.com".to_string(),
            role,
            effective_permissions: RoleRegistry::defaults_for(role),
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Store stub that records saves, or fails on demand.
    struct StubStore {
        fail: bool,
        saved: Mutex<Option<PermissionSet>>,
    }

    impl StubStore {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                saved: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl EmployeeStore for StubStore {
        async fn load(&self, _id: Uuid) -> Result<Employee, AppError> {
            Err(AppError::not_found("not backed by a database"))
        }

        async fn save_permissions(
            &self,
            _id: Uuid,
            permissions: &PermissionSet,
        ) -> Result<(), AppError> {
            if self.fail {
                return Err(AppError::internal("disk on fire"));
            }
            *self.saved.lock().unwrap() = Some(permissions.clone());
            Ok(())
        }
    }

    #[test]
    fn toggle_marks_dirty_and_flips_draft_only() {
        let mut editor = PermissionsEditor::open(&employee(Role::Sales));
        let before = editor.effective().is_granted(Capability::ViewOrders);

        assert!(editor.toggle(Capability::ViewOrders));
        assert!(editor.is_dirty());
        assert_eq!(editor.draft().is_granted(Capability::ViewOrders), !before);
        assert_eq!(editor.effective().is_granted(Capability::ViewOrders), before);
    }

    #[test]
    fn reset_restores_pre_edit_effective() {
        let mut editor = PermissionsEditor::open(&employee(Role::Sales));
        let baseline = editor.effective().clone();

        editor.toggle(Capability::ManageSettings);
        editor.toggle(Capability::DeleteOrders);
        editor.reset();

        assert_eq!(editor.draft(), &baseline);
        assert!(!editor.is_dirty());
    }

    #[test]
    fn admin_editor_rejects_every_edit() {
        let mut editor = PermissionsEditor::open(&employee(Role::Admin));
        let baseline = editor.draft().clone();

        assert!(!editor.is_editable());
        assert!(!editor.toggle(Capability::ViewOrders));
        assert!(!editor.apply_defaults());
        assert_eq!(editor.draft(), &baseline);
        assert!(!editor.is_dirty());
    }

    #[tokio::test]
    async fn apply_defaults_then_save_equals_role_defaults() {
        let mut editor = PermissionsEditor::open(&employee(Role::CustomerService));
        editor.toggle(Capability::ManageSettings);
        editor.toggle(Capability::ViewOrders);

        assert!(editor.apply_defaults());
        let store = StubStore::new(false);
        editor.save(&store).await.unwrap();

        let expected = RoleRegistry::defaults_for(Role::CustomerService);
        assert_eq!(editor.effective(), &expected);
        assert_eq!(store.saved.lock().unwrap().as_ref(), Some(&expected));
        assert!(!editor.is_dirty());
    }

    #[tokio::test]
    async fn failed_save_keeps_draft_and_dirty() {
        let mut editor = PermissionsEditor::open(&employee(Role::Sales));
        editor.toggle(Capability::DeleteOrders);
        let draft = editor.draft().clone();

        let store = StubStore::new(true);
        assert!(editor.save(&store).await.is_err());

        assert!(editor.is_dirty());
        assert_eq!(editor.draft(), &draft);
        assert_ne!(editor.effective(), &draft);
    }

    #[tokio::test]
    async fn saved_draft_becomes_reset_baseline() {
        let mut editor = PermissionsEditor::open(&employee(Role::Sales));
        editor.toggle(Capability::DeleteOrders);
        let saved = editor.draft().clone();

        let store = StubStore::new(false);
        editor.save(&store).await.unwrap();

        editor.toggle(Capability::ViewReports);
        editor.reset();
        assert_eq!(editor.draft(), &saved);
    }
}
