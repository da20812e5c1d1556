use super::text_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquipmentStatus {
    Available,
    InUse,
    Maintenance,
    Retired,
}

text_enum!(EquipmentStatus, "equipment status", {
    Available => "available",
    InUse => "in_use",
    Maintenance => "maintenance",
    Retired => "retired",
});

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Equipment {
    pub id: i32,
    pub name: String,
    pub serial_number: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: EquipmentStatus,
    pub project_id: Option<i32>,
    /// Public URL of the uploaded manual
    pub manual_url: Option<String>,
}
