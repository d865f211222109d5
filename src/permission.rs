//! Permission matrix shown on the roles screen.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::role::{Capabilities, Role};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: String,
    pub category: String,
    pub name: String,
    #[serde(default)]
    pub roles: BTreeMap<Role, bool>,
}

impl Permission {
    pub fn is_granted(&self, role: Role) -> bool {
        self.roles.get(&role).copied().unwrap_or(false)
    }
}

/// Body of `PUT /permissions/role`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePermissionUpdate {
    pub role: Role,
    pub permission_id: String,
    pub granted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionMatrix {
    permissions: Vec<Permission>,
}

impl PermissionMatrix {
    pub fn new(permissions: Vec<Permission>) -> Self {
        Self { permissions }
    }

    /// The organisation's default grants.
    pub fn sample() -> Self {
        use Role::*;
        let rows: [(&str, &str, &str, &[Role]); 13] = [
            (
                "view_dashboard",
                "Dashboard",
                "View company-wide project dashboard",
                &[Sponsor, PmoHead, Pm, Auditor],
            ),
            ("create_project", "Project", "Create project", &[PmoHead, Pm, Admin]),
            ("delete_project", "Project", "Delete project", &[PmoHead, Admin]),
            ("manage_wbs", "Schedule", "Write and edit WBS", &[PmoHead, Pm]),
            ("manage_budget", "Budget", "Plan and edit budget", &[Sponsor, PmoHead]),
            ("approve_budget", "Budget", "Final budget approval", &[Sponsor]),
            (
                "manage_risk",
                "Risk/Issue",
                "Register and edit risks and issues",
                &[PmoHead, Pm, Developer, Qa],
            ),
            (
                "approve_deliverable",
                "Deliverable",
                "Approve or reject deliverables",
                &[Sponsor, PmoHead, Pm],
            ),
            (
                "manage_backlog",
                "Agile",
                "Manage backlog",
                &[Pm, Developer, Qa, BusinessAnalyst],
            ),
            ("manage_sprint", "Agile", "Manage sprints", &[Pm, Developer, Qa]),
            (
                "use_ai_assistant",
                "AI",
                "Use AI assistant",
                &[Sponsor, PmoHead, Pm, Developer, Qa, BusinessAnalyst],
            ),
            (
                "view_audit_log",
                "Security/Audit",
                "View audit log",
                &[PmoHead, Auditor, Admin],
            ),
            (
                "manage_users",
                "Security/Audit",
                "Manage users and permissions",
                &[Admin],
            ),
        ];

        let permissions = rows
            .iter()
            .map(|(id, category, name, granted)| Permission {
                id: id.to_string(),
                category: category.to_string(),
                name: name.to_string(),
                roles: Role::ALL
                    .into_iter()
                    .map(|role| (role, granted.contains(&role)))
                    .collect(),
            })
            .collect();
        Self { permissions }
    }

    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Permission> {
        self.permissions.iter().find(|perm| perm.id == id)
    }

    /// Distinct categories in first-appearance order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for perm in &self.permissions {
            if !seen.contains(&perm.category.as_str()) {
                seen.push(perm.category.as_str());
            }
        }
        seen
    }

    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Permission> {
        self.permissions
            .iter()
            .filter(move |perm| perm.category == category)
    }

    pub fn granted_for(&self, role: Role) -> Vec<&Permission> {
        self.permissions
            .iter()
            .filter(|perm| perm.is_granted(role))
            .collect()
    }

    /// Flip one grant. Only administrators may edit the matrix.
    pub fn toggle(&mut self, actor: Role, target: Role, permission_id: &str) -> Result<bool> {
        let update = self.prepare_toggle(actor, target, permission_id)?;
        self.apply(&update)?;
        Ok(update.granted)
    }

    /// Validate a toggle and compute the request without changing the matrix.
    pub fn prepare_toggle(
        &self,
        actor: Role,
        target: Role,
        permission_id: &str,
    ) -> Result<RolePermissionUpdate> {
        if !Capabilities::for_role(actor).manage_permissions {
            return Err(Error::access_denied(actor, "edit role permissions"));
        }
        let perm = self
            .get(permission_id)
            .ok_or_else(|| Error::PermissionNotFound(permission_id.to_string()))?;
        Ok(RolePermissionUpdate {
            role: target,
            permission_id: perm.id.clone(),
            granted: !perm.is_granted(target),
        })
    }

    pub fn apply(&mut self, update: &RolePermissionUpdate) -> Result<()> {
        let perm = self
            .permissions
            .iter_mut()
            .find(|perm| perm.id == update.permission_id)
            .ok_or_else(|| Error::PermissionNotFound(update.permission_id.clone()))?;
        perm.roles.insert(update.role, update.granted);
        Ok(())
    }
}
