use super::text_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    Viewer,
    Engineer,
    ProjectManager,
    Admin,
}

text_enum!(Role, "role", {
    Viewer => "viewer",
    Engineer => "engineer",
    ProjectManager => "project_manager",
    Admin => "admin",
});

impl Role {
    /// Edit contracts, milestone plans and record payments
    pub fn can_manage_finances(&self) -> bool {
        *self >= Role::ProjectManager
    }

    /// Update progress, inventory, equipment, crews and documents
    pub fn can_edit_operations(&self) -> bool {
        *self >= Role::Engineer
    }

    pub fn can_manage_users(&self) -> bool {
        *self == Role::Admin
    }
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct UserProfile {
    pub id: i32,
    pub email: String,
    pub full_name: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
}
