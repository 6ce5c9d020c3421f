//! # Product Repository
//!
//! The catalog as the register sees it.
//!
//! ## Key Operations
//! - Scan resolution (barcode first, then id) into a [`ProductSnapshot`]
//! - Keyword search, low-stock report, category list
//! - Catalog maintenance: insert, update, restock, delete
//! - The bounded stock decrement used by the commit service
//!
//! ## Scan Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How a scan becomes a cart line                       │
//! │                                                                         │
//! │  Scanner reads: "8991234567890"                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  resolve(code)                                                          │
//! │       ├── barcode = code?  ──► found                                   │
//! │       ├── id = code?       ──► found                                   │
//! │       └── neither          ──► DbError::NotFound                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ProductSnapshot { price, stock } frozen at this instant               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  cart.add_item(&snapshot, qty)                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use super::{encode_timestamp, now_utc};
use crate::error::{DbError, DbResult};
use tillpoint_core::validation::{
    validate_barcode, validate_price_cents, validate_product_name, validate_search_query,
    validate_stock,
};
use tillpoint_core::{Money, Product, ProductSnapshot, ValidationError};

const PRODUCT_COLUMNS: &str =
    "id, barcode, name, category, price_cents, stock, min_stock, created_at, updated_at";

// =============================================================================
// New Product
// =============================================================================

/// Fields supplied when adding a product to the catalog.
///
/// The id and timestamps are generated by [`ProductRepository::insert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub barcode: Option<String>,
    pub name: String,
    pub category: Option<String>,
    pub price: Money,
    pub stock: i64,
    pub min_stock: i64,
}

impl NewProduct {
    /// A product with no barcode, category or stock.
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        NewProduct {
            barcode: None,
            name: name.into(),
            category: None,
            price,
            stock: 0,
            min_stock: 0,
        }
    }

    pub fn barcode(mut self, barcode: impl Into<String>) -> Self {
        self.barcode = Some(barcode.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn stock(mut self, stock: i64) -> Self {
        self.stock = stock;
        self
    }

    pub fn min_stock(mut self, min_stock: i64) -> Self {
        self.min_stock = min_stock;
        self
    }
}

/// Trims a barcode; blank codes are stored as no barcode.
fn normalize_barcode(barcode: Option<&str>) -> Option<String> {
    barcode
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
}

fn validate_fields(
    name: &str,
    barcode: Option<&str>,
    price_cents: i64,
    stock: i64,
    min_stock: i64,
) -> DbResult<()> {
    validate_product_name(name)?;
    if let Some(code) = barcode {
        validate_barcode(code)?;
    }
    validate_price_cents(price_cents)?;
    validate_stock("stock", stock)?;
    validate_stock("min_stock", min_stock)?;
    Ok(())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let snapshot = repo.resolve("8991234567890").await?;
/// let low = repo.list_low_stock().await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Resolves a scanned code to a snapshot of the current price and stock.
    ///
    /// The code is matched against barcodes first, then against ids.
    ///
    /// ## Returns
    /// * `Ok(ProductSnapshot)` - ready for `Cart::add_item`
    /// * `Err(DbError::NotFound)` - no product has that barcode or id
    pub async fn resolve(&self, code: &str) -> DbResult<ProductSnapshot> {
        let code = code.trim();

        if let Some(product) = self.get_by_barcode(code).await? {
            return Ok(product.snapshot());
        }

        match self.get_by_id(code).await? {
            Some(product) => Ok(product.snapshot()),
            None => {
                debug!(code = %code, "Scanned code matches no product");
                Err(DbError::not_found("Product", code))
            }
        }
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS);
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by its barcode.
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE barcode = ?1", PRODUCT_COLUMNS);
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(barcode)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Searches products whose name or barcode contains `keyword`.
    ///
    /// Case-insensitive for ASCII. An empty keyword lists the catalog by
    /// name.
    pub async fn search(&self, keyword: &str, limit: u32) -> DbResult<Vec<Product>> {
        let keyword = validate_search_query(keyword)?;

        debug!(keyword = %keyword, limit = limit, "Searching products");

        let products = if keyword.is_empty() {
            let sql = format!(
                "SELECT {} FROM products ORDER BY name LIMIT ?1",
                PRODUCT_COLUMNS
            );
            sqlx::query_as::<_, Product>(&sql)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
        } else {
            let pattern = format!("%{}%", escape_like(&keyword));
            let sql = format!(
                r#"
                SELECT {} FROM products
                WHERE name LIKE ?1 ESCAPE '\' OR barcode LIKE ?1 ESCAPE '\'
                ORDER BY name
                LIMIT ?2
                "#,
                PRODUCT_COLUMNS
            );
            sqlx::query_as::<_, Product>(&sql)
                .bind(pattern)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
        };

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Products at or below their reorder threshold, emptiest first.
    pub async fn list_low_stock(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE stock <= min_stock ORDER BY stock, name",
            PRODUCT_COLUMNS
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Products in one category, by name.
    pub async fn list_by_category(&self, category: &str) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE category = ?1 ORDER BY name",
            PRODUCT_COLUMNS
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(category.trim())
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Distinct, non-empty categories in alphabetical order.
    pub async fn categories(&self) -> DbResult<Vec<String>> {
        let categories: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT category FROM products
            WHERE category IS NOT NULL AND category <> ''
            ORDER BY category
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Adds a product to the catalog.
    ///
    /// ## Returns
    /// * `Ok(Product)` - the stored product with its generated id
    /// * `Err(DbError::Validation)` - bad name, barcode, price or stock
    /// * `Err(DbError::UniqueViolation)` - barcode already used
    pub async fn insert(&self, new: NewProduct) -> DbResult<Product> {
        let barcode = normalize_barcode(new.barcode.as_deref());
        validate_fields(
            &new.name,
            barcode.as_deref(),
            new.price.cents(),
            new.stock,
            new.min_stock,
        )?;

        let now = now_utc();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            barcode,
            name: new.name.trim().to_string(),
            category: new.category,
            price_cents: new.price.cents(),
            stock: new.stock,
            min_stock: new.min_stock,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, barcode, name, category, price_cents,
                stock, min_stock, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.min_stock)
        .bind(encode_timestamp(&product.created_at))
        .bind(encode_timestamp(&product.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => {
                DbError::duplicate(field, product.barcode.clone().unwrap_or_default())
            }
            other => other,
        })?;

        Ok(product)
    }

    /// Updates the catalog fields of an existing product.
    ///
    /// Already-scanned carts keep their snapshot price; only later scans
    /// see the change.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        let barcode = normalize_barcode(product.barcode.as_deref());
        validate_fields(
            &product.name,
            barcode.as_deref(),
            product.price_cents,
            product.stock,
            product.min_stock,
        )?;

        debug!(id = %product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                barcode = ?2,
                name = ?3,
                category = ?4,
                price_cents = ?5,
                stock = ?6,
                min_stock = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&barcode)
        .bind(product.name.trim())
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.min_stock)
        .bind(encode_timestamp(&now_utc()))
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => {
                DbError::duplicate(field, barcode.clone().unwrap_or_default())
            }
            other => other,
        })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Adds received units to a product's stock.
    ///
    /// ## Returns
    /// * `Ok(i64)` - the new stock level
    /// * `Err(DbError::Validation)` - quantity not positive
    /// * `Err(DbError::NotFound)` - unknown product
    ///
    /// Deliveries are not bound by the per-line sale cap.
    pub async fn restock(&self, id: &str, quantity: i64) -> DbResult<i64> {
        if quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }

        let new_stock: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET stock = stock + ?2, updated_at = ?3
            WHERE id = ?1
            RETURNING stock
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(encode_timestamp(&now_utc()))
        .fetch_optional(&self.pool)
        .await?;

        match new_stock {
            Some(stock) => {
                info!(product_id = %id, quantity = quantity, stock = stock, "Product restocked");
                Ok(stock)
            }
            None => Err(DbError::not_found("Product", id)),
        }
    }

    /// Removes a product from the catalog.
    ///
    /// ## Returns
    /// * `Ok(())` - product deleted
    /// * `Err(DbError::NotFound)` - unknown product
    /// * `Err(DbError::ForeignKeyViolation)` - the product appears on a
    ///   recorded sale and must stay for the history
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        info!(product_id = %id, "Product deleted");
        Ok(())
    }

    /// Counts catalog products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Bounded Decrement
// =============================================================================

/// Lowers stock by `quantity` only if at least that much is on hand.
///
/// ## Compare-and-Decrement
/// ```text
/// UPDATE products SET stock = stock - 3 WHERE id = ? AND stock >= 3
///
///   stock 5  → 1 row  → true   (stock is now 2)
///   stock 2  → 0 rows → false  (unchanged)
/// ```
///
/// Check and write are one statement, so two registers can never both
/// take the last unit. Runs on the caller's transaction connection.
pub(crate) async fn try_decrement_stock(
    conn: &mut SqliteConnection,
    product_id: &str,
    quantity: i64,
) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET stock = stock - ?2, updated_at = ?3
        WHERE id = ?1 AND stock >= ?2
        "#,
    )
    .bind(product_id)
    .bind(quantity)
    .bind(encode_timestamp(&now_utc()))
    .execute(&mut *conn)
    .await?;

    let applied = result.rows_affected() == 1;
    debug!(
        product_id = %product_id,
        quantity = quantity,
        applied = applied,
        "Bounded stock decrement"
    );

    Ok(applied)
}

/// Escapes LIKE wildcards so a keyword matches literally.
fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use tillpoint_core::Cart;

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn teh_botol() -> NewProduct {
        NewProduct::new("Teh Botol 350ml", Money::from_cents(4_500))
            .barcode("8991234567890")
            .category("Beverages")
            .stock(12)
            .min_stock(5)
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = setup().await;
        let repo = db.products();

        let inserted = repo.insert(teh_botol()).await.unwrap();
        let fetched = repo.get_by_id(&inserted.id).await.unwrap().unwrap();

        assert_eq!(fetched, inserted);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_fields() {
        let db = setup().await;
        let repo = db.products();

        let blank = NewProduct::new("  ", Money::from_cents(100));
        assert!(matches!(repo.insert(blank).await, Err(DbError::Validation(_))));

        let negative = NewProduct::new("Gula 1kg", Money::from_cents(-1));
        assert!(matches!(repo.insert(negative).await, Err(DbError::Validation(_))));

        let bad_code = NewProduct::new("Gula 1kg", Money::from_cents(100)).barcode("12 34");
        assert!(matches!(repo.insert(bad_code).await, Err(DbError::Validation(_))));

        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_barcode() {
        let db = setup().await;
        let repo = db.products();

        repo.insert(teh_botol()).await.unwrap();
        let result = repo.insert(teh_botol()).await;

        match result {
            Err(DbError::UniqueViolation { value, .. }) => assert_eq!(value, "8991234567890"),
            other => panic!("expected UniqueViolation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resolve_prefers_barcode_then_id() {
        let db = setup().await;
        let repo = db.products();

        let tea = repo.insert(teh_botol()).await.unwrap();

        let by_barcode = repo.resolve("8991234567890").await.unwrap();
        assert_eq!(by_barcode.id, tea.id);
        assert_eq!(by_barcode.unit_price, Money::from_cents(4_500));
        assert_eq!(by_barcode.available_stock, 12);

        let by_id = repo.resolve(&tea.id).await.unwrap();
        assert_eq!(by_id, by_barcode);

        assert!(matches!(
            repo.resolve("0000000000000").await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_search_matches_name_and_barcode() {
        let db = setup().await;
        let repo = db.products();

        repo.insert(teh_botol()).await.unwrap();
        repo.insert(NewProduct::new("Indomie Goreng", Money::from_cents(3_000)).barcode("089686010947"))
            .await
            .unwrap();

        let by_name = repo.search("teh", 20).await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Teh Botol 350ml");

        let by_barcode = repo.search("0896860", 20).await.unwrap();
        assert_eq!(by_barcode.len(), 1);
        assert_eq!(by_barcode[0].name, "Indomie Goreng");

        assert_eq!(repo.search("", 20).await.unwrap().len(), 2);
        assert_eq!(repo.search("", 1).await.unwrap().len(), 1);
        assert!(repo.search("%", 20).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_low_stock_and_categories() {
        let db = setup().await;
        let repo = db.products();

        repo.insert(teh_botol().stock(5)).await.unwrap();
        repo.insert(
            NewProduct::new("Sabun Lifebuoy", Money::from_cents(5_500))
                .category("Toiletries")
                .stock(40)
                .min_stock(10),
        )
        .await
        .unwrap();
        repo.insert(NewProduct::new("Es Batu", Money::from_cents(1_000)))
            .await
            .unwrap();

        let low: Vec<String> = repo
            .list_low_stock()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(low, vec!["Es Batu".to_string(), "Teh Botol 350ml".to_string()]);

        assert_eq!(
            repo.categories().await.unwrap(),
            vec!["Beverages".to_string(), "Toiletries".to_string()]
        );
    }

    #[tokio::test]
    async fn test_update_and_restock() {
        let db = setup().await;
        let repo = db.products();

        let mut tea = repo.insert(teh_botol()).await.unwrap();
        tea.price_cents = 5_000;
        repo.update(&tea).await.unwrap();

        let stock = repo.restock(&tea.id, 8).await.unwrap();
        assert_eq!(stock, 20);

        let fetched = repo.get_by_id(&tea.id).await.unwrap().unwrap();
        assert_eq!(fetched.price_cents, 5_000);
        assert_eq!(fetched.stock, 20);

        assert!(matches!(repo.restock(&tea.id, 0).await, Err(DbError::Validation(_))));
        assert!(matches!(repo.restock(&tea.id, -4).await, Err(DbError::Validation(_))));
        assert!(matches!(repo.restock("missing", 1).await, Err(DbError::NotFound { .. })));

        tea.id = "missing".to_string();
        assert!(matches!(repo.update(&tea).await, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_restock_accepts_bulk_delivery() {
        let db = setup().await;
        let repo = db.products();

        let tea = repo.insert(teh_botol()).await.unwrap();

        assert_eq!(repo.restock(&tea.id, 1_000).await.unwrap(), 1_012);
        assert_eq!(repo.restock(&tea.id, 24_000).await.unwrap(), 25_012);
    }

    #[tokio::test]
    async fn test_barcode_is_trimmed_before_storing() {
        let db = setup().await;
        let repo = db.products();

        let padded = repo
            .insert(NewProduct::new("Gula Pasir 1kg", Money::from_cents(16_000)).barcode(" 123 "))
            .await
            .unwrap();
        assert_eq!(padded.barcode.as_deref(), Some("123"));
        assert_eq!(repo.resolve("123").await.unwrap().id, padded.id);

        let stored = repo.get_by_barcode("123").await.unwrap().unwrap();
        assert_eq!(stored.barcode.as_deref(), Some("123"));

        let blank = repo
            .insert(NewProduct::new("Es Batu", Money::from_cents(1_000)).barcode("   "))
            .await
            .unwrap();
        assert_eq!(blank.barcode, None);

        let mut tea = repo.insert(teh_botol()).await.unwrap();
        tea.barcode = Some("  8990000000001\t".to_string());
        repo.update(&tea).await.unwrap();
        let fetched = repo.get_by_id(&tea.id).await.unwrap().unwrap();
        assert_eq!(fetched.barcode.as_deref(), Some("8990000000001"));

        // a padded duplicate still collides after trimming
        let clash = repo
            .insert(NewProduct::new("Gula Aren", Money::from_cents(18_000)).barcode("123  "))
            .await;
        match clash {
            Err(DbError::UniqueViolation { value, .. }) => assert_eq!(value, "123"),
            other => panic!("expected UniqueViolation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_by_category() {
        let db = setup().await;
        let repo = db.products();

        repo.insert(teh_botol()).await.unwrap();
        repo.insert(NewProduct::new("Aqua 600ml", Money::from_cents(3_500)).category("Beverages"))
            .await
            .unwrap();
        repo.insert(NewProduct::new("Sabun Lifebuoy", Money::from_cents(5_500)).category("Toiletries"))
            .await
            .unwrap();
        repo.insert(NewProduct::new("Es Batu", Money::from_cents(1_000)))
            .await
            .unwrap();

        let names: Vec<String> = repo
            .list_by_category("Beverages")
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Aqua 600ml".to_string(), "Teh Botol 350ml".to_string()]);

        assert_eq!(repo.list_by_category("Toiletries").await.unwrap().len(), 1);
        assert!(repo.list_by_category("Frozen").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_product() {
        let db = setup().await;
        let repo = db.products();

        let ice = repo
            .insert(NewProduct::new("Es Batu", Money::from_cents(1_000)))
            .await
            .unwrap();
        repo.delete(&ice.id).await.unwrap();

        assert!(repo.get_by_id(&ice.id).await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 0);

        assert!(matches!(repo.delete(&ice.id).await, Err(DbError::NotFound { .. })));
        assert!(matches!(repo.delete("missing").await, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_sold_product_is_foreign_key_violation() {
        let db = setup().await;
        let repo = db.products();

        let tea = repo.insert(teh_botol()).await.unwrap();

        let mut cart = Cart::new();
        cart.add_item(&repo.resolve("8991234567890").await.unwrap(), 2).unwrap();
        cart.set_amount_tendered(Money::from_cents(10_000)).unwrap();
        db.checkout().commit(&cart, "cashier-1").await.unwrap();

        let result = repo.delete(&tea.id).await;
        assert!(
            matches!(result, Err(DbError::ForeignKeyViolation { .. })),
            "expected ForeignKeyViolation, got {:?}",
            result
        );

        let kept = repo.get_by_id(&tea.id).await.unwrap().unwrap();
        assert_eq!(kept.stock, 10);
    }

    #[tokio::test]
    async fn test_try_decrement_stock_is_bounded() {
        let db = setup().await;
        let tea = db.products().insert(teh_botol().stock(3)).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        assert!(try_decrement_stock(&mut conn, &tea.id, 2).await.unwrap());
        assert!(!try_decrement_stock(&mut conn, &tea.id, 2).await.unwrap());
        assert!(try_decrement_stock(&mut conn, &tea.id, 1).await.unwrap());
        assert!(!try_decrement_stock(&mut conn, "missing", 1).await.unwrap());
        drop(conn);

        let fetched = db.products().get_by_id(&tea.id).await.unwrap().unwrap();
        assert_eq!(fetched.stock, 0);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("teh"), "teh");
    }
}
