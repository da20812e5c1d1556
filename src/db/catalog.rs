use anyhow::{Context, Result};

use super::Database;
use crate::models::{Crew, Document, Equipment, InventoryItem, Supplier};

impl Database {
    // Supplier operations
    pub async fn get_suppliers(&self) -> Result<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers ORDER BY name ASC")
            .fetch_all(self.get_pool())
            .await?;

        Ok(suppliers)
    }

    pub async fn create_supplier(&self, supplier: &Supplier) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO suppliers (name, contact_name, email, phone, country)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&supplier.name)
        .bind(&supplier.contact_name)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .bind(&supplier.country)
        .fetch_one(self.get_pool())
        .await?;

        Ok(id)
    }

    pub async fn delete_supplier(&self, id: i32) -> Result<()> {
        sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }

    // Inventory operations
    pub async fn get_inventory(&self) -> Result<Vec<InventoryItem>> {
        let items = sqlx::query_as::<_, InventoryItem>("SELECT * FROM inventory_items ORDER BY name ASC")
            .fetch_all(self.get_pool())
            .await?;

        Ok(items)
    }

    pub async fn get_inventory_item(&self, id: i32) -> Result<InventoryItem> {
        let item = sqlx::query_as::<_, InventoryItem>("SELECT * FROM inventory_items WHERE id = $1")
            .bind(id)
            .fetch_one(self.get_pool())
            .await
            .with_context(|| format!("inventory item {id} not found"))?;

        Ok(item)
    }

    pub async fn create_inventory_item(&self, item: &InventoryItem) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO inventory_items (name, sku, quantity, unit, unit_cost_usd, supplier_id, location)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&item.name)
        .bind(&item.sku)
        .bind(item.quantity)
        .bind(&item.unit)
        .bind(item.unit_cost_usd)
        .bind(item.supplier_id)
        .bind(&item.location)
        .fetch_one(self.get_pool())
        .await?;

        Ok(id)
    }

    /// Add (or with a negative delta, take) stock, refusing to go below zero
    pub async fn adjust_inventory(&self, id: i32, delta: f64) -> Result<f64> {
        let quantity = sqlx::query_scalar::<_, f64>(
            r#"
            UPDATE inventory_items
            SET quantity = quantity + $1
            WHERE id = $2 AND quantity + $1 >= 0
            RETURNING quantity
            "#,
        )
        .bind(delta)
        .bind(id)
        .fetch_optional(self.get_pool())
        .await?
        .with_context(|| format!("inventory item {id} is missing or has too little stock"))?;

        Ok(quantity)
    }

    pub async fn delete_inventory_item(&self, id: i32) -> Result<()> {
        sqlx::query("DELETE FROM inventory_items WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }

    // Equipment operations
    pub async fn get_equipment(&self) -> Result<Vec<Equipment>> {
        let equipment = sqlx::query_as::<_, Equipment>("SELECT * FROM equipment ORDER BY name ASC")
            .fetch_all(self.get_pool())
            .await?;

        Ok(equipment)
    }

    pub async fn create_equipment(&self, equipment: &Equipment) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO equipment (name, serial_number, status, project_id, manual_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&equipment.name)
        .bind(&equipment.serial_number)
        .bind(equipment.status.as_str())
        .bind(equipment.project_id)
        .bind(&equipment.manual_url)
        .fetch_one(self.get_pool())
        .await?;

        Ok(id)
    }

    pub async fn update_equipment(&self, equipment: &Equipment) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE equipment
            SET name = $1, serial_number = $2, status = $3, project_id = $4, manual_url = $5
            WHERE id = $6
            "#,
        )
        .bind(&equipment.name)
        .bind(&equipment.serial_number)
        .bind(equipment.status.as_str())
        .bind(equipment.project_id)
        .bind(&equipment.manual_url)
        .bind(equipment.id)
        .execute(self.get_pool())
        .await?;

        Ok(())
    }

    pub async fn get_equipment_item(&self, id: i32) -> Result<Equipment> {
        let equipment = sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = $1")
            .bind(id)
            .fetch_one(self.get_pool())
            .await
            .with_context(|| format!("equipment {id} not found"))?;

        Ok(equipment)
    }

    pub async fn delete_equipment(&self, id: i32) -> Result<()> {
        sqlx::query("DELETE FROM equipment WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }

    // Crew operations
    pub async fn get_crews(&self) -> Result<Vec<Crew>> {
        let crews = sqlx::query_as::<_, Crew>("SELECT * FROM crews ORDER BY name ASC")
            .fetch_all(self.get_pool())
            .await?;

        Ok(crews)
    }

    pub async fn create_crew(&self, crew: &Crew) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO crews (name, leader, size, project_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&crew.name)
        .bind(&crew.leader)
        .bind(crew.size)
        .bind(crew.project_id)
        .fetch_one(self.get_pool())
        .await?;

        Ok(id)
    }

    pub async fn assign_crew(&self, id: i32, project_id: Option<i32>) -> Result<()> {
        sqlx::query("UPDATE crews SET project_id = $1 WHERE id = $2")
            .bind(project_id)
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }

    pub async fn delete_crew(&self, id: i32) -> Result<()> {
        sqlx::query("DELETE FROM crews WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }

    // Document operations
    pub async fn get_documents_by_project(&self, project_id: i32) -> Result<Vec<Document>> {
        let documents = sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE project_id = $1 ORDER BY uploaded_at DESC",
        )
        .bind(project_id)
        .fetch_all(self.get_pool())
        .await?;

        Ok(documents)
    }

    pub async fn create_document(&self, document: &Document) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO documents (project_id, name, category, url)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(document.project_id)
        .bind(&document.name)
        .bind(document.category.as_str())
        .bind(&document.url)
        .fetch_one(self.get_pool())
        .await?;

        Ok(id)
    }

    pub async fn delete_document(&self, id: i32) -> Result<()> {
        sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }
}
