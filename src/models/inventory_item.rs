#[derive(sqlx::FromRow, Debug, Clone)]
pub struct InventoryItem {
    pub id: i32,
    pub name: String,
    pub sku: String,
    pub quantity: f64,
    pub unit: String,
    pub unit_cost_usd: f64,
    pub supplier_id: Option<i32>,
    pub location: Option<String>,
}

impl InventoryItem {
    pub fn stock_value_usd(&self) -> f64 {
        self.quantity * self.unit_cost_usd
    }
}
