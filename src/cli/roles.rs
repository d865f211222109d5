//! pms menu / roles / permissions

use crate::api::DataSource;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::permission::{Permission, RolePermissionUpdate};
use crate::role::{menu_for, Capabilities, Role, View};

use super::Context;

#[derive(serde::Serialize)]
struct MenuReport {
    role: Role,
    views: Vec<MenuEntry>,
    capabilities: Capabilities,
}

#[derive(serde::Serialize)]
struct MenuEntry {
    id: View,
    label: &'static str,
}

#[derive(serde::Serialize)]
struct RoleInfo {
    id: Role,
    name: &'static str,
    description: &'static str,
    users: u32,
    views: Vec<View>,
}

#[derive(serde::Serialize)]
struct PermissionsReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<Role>,
    permissions: Vec<&'a Permission>,
    source: DataSource,
}

#[derive(serde::Serialize)]
struct ToggleReport {
    #[serde(flatten)]
    update: RolePermissionUpdate,
    source: DataSource,
}

pub fn run_menu(ctx: &Context) -> Result<()> {
    let views: Vec<MenuEntry> = menu_for(ctx.role)
        .iter()
        .map(|view| MenuEntry {
            id: *view,
            label: view.label(),
        })
        .collect();

    let mut human = HumanOutput::new(format!("Menu for {}", ctx.role.display_name()));
    human.push_section(
        "Views",
        views
            .iter()
            .map(|entry| format!("{:<10} {}", entry.id.as_str(), entry.label))
            .collect(),
    );

    emit_success(
        ctx.output,
        "menu",
        &MenuReport {
            role: ctx.role,
            views,
            capabilities: Capabilities::for_role(ctx.role),
        },
        Some(&human),
    )
}

pub fn run_roles(ctx: &Context) -> Result<()> {
    let roles: Vec<RoleInfo> = Role::ALL
        .into_iter()
        .map(|role| RoleInfo {
            id: role,
            name: role.display_name(),
            description: role.description(),
            users: role.user_count(),
            views: menu_for(role).to_vec(),
        })
        .collect();

    let mut human = HumanOutput::new("Project roles");
    human.push_summary("users", Role::ALL.iter().map(|r| r.user_count()).sum::<u32>().to_string());
    human.push_section(
        "Roles",
        roles
            .iter()
            .map(|info| {
                let marker = if info.id == ctx.role { "*" } else { " " };
                format!(
                    "{marker} {:<17} {:<19} {:>2} users  {}",
                    info.id.as_str(),
                    info.name,
                    info.users,
                    info.description
                )
            })
            .collect(),
    );

    emit_success(ctx.output, "roles", &roles, Some(&human))
}

pub async fn run_permissions_show(ctx: &mut Context, for_role: Option<String>) -> Result<()> {
    ctx.require_view(View::Roles)?;
    let filter: Option<Role> = for_role.as_deref().map(str::parse).transpose()?;

    let fetched = ctx.client().await?.permissions().await;
    let matrix = &fetched.value;

    let mut human = HumanOutput::new(match filter {
        Some(role) => format!("Permissions of {}", role.display_name()),
        None => "Permission matrix".to_string(),
    });
    let permissions: Vec<&Permission> = match filter {
        Some(role) => {
            let granted = matrix.granted_for(role);
            human.push_summary("granted", format!("{} of {}", granted.len(), matrix.len()));
            human.push_section(
                "Granted",
                granted
                    .iter()
                    .map(|perm| format!("{:<20} {}", perm.id, perm.name))
                    .collect(),
            );
            granted
        }
        None => {
            for category in matrix.categories() {
                let rows = matrix
                    .in_category(category)
                    .map(|perm| {
                        let holders: Vec<&str> = Role::ALL
                            .into_iter()
                            .filter(|role| perm.is_granted(*role))
                            .map(Role::as_str)
                            .collect();
                        format!("{:<20} {} [{}]", perm.id, perm.name, holders.join(", "))
                    })
                    .collect();
                human.push_section(category, rows);
            }
            matrix.permissions().iter().collect()
        }
    };
    human.note_source(fetched.source);

    emit_success(
        ctx.output,
        "permissions show",
        &PermissionsReport {
            role: filter,
            permissions,
            source: fetched.source,
        },
        Some(&human),
    )
}

pub async fn run_permissions_toggle(
    ctx: &mut Context,
    target: String,
    permission: String,
) -> Result<()> {
    let actor = ctx.role;
    let target: Role = target.parse()?;

    let client = ctx.client().await?;
    let mut matrix = client.permissions().await.value;
    let update = matrix.prepare_toggle(actor, target, &permission)?;
    let fetched = client.update_role_permission(update).await;
    matrix.apply(&fetched.value)?;

    let verb = if fetched.value.granted {
        "granted to"
    } else {
        "revoked from"
    };
    let mut human = HumanOutput::new(format!(
        "{} {verb} {}",
        fetched.value.permission_id,
        target.display_name()
    ));
    human.push_summary(
        "holders",
        matrix
            .get(&fetched.value.permission_id)
            .map(|perm| {
                Role::ALL
                    .into_iter()
                    .filter(|r| perm.is_granted(*r))
                    .map(Role::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default(),
    );
    human.note_source(fetched.source);
    if fetched.source.is_mock() {
        human.push_warning("change was not persisted");
    }

    emit_success(
        ctx.output,
        "permissions toggle",
        &ToggleReport {
            update: fetched.value,
            source: fetched.source,
        },
        Some(&human),
    )
}
