use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use tallybook_customers::{CustomerId, CustomerRecord};
use tallybook_expenses::{ExpenseId, ExpenseRecord};
use tallybook_invoicing::{InvoiceId, InvoiceRecord, InvoiceStatus, StockDecrement};
use tallybook_products::{ProductId, ProductRecord};

use crate::error::{StoreError, StoreResult};
use crate::record_store::RecordStore;

#[derive(Debug, Default)]
struct StoreState {
    customers: HashMap<CustomerId, CustomerRecord>,
    products: HashMap<ProductId, ProductRecord>,
    expenses: HashMap<ExpenseId, ExpenseRecord>,
    invoices: HashMap<InvoiceId, InvoiceRecord>,
}

impl StoreState {
    /// Apply stock decrements, clamped at zero. Decrements for products that
    /// no longer exist are skipped.
    fn apply_decrements(&mut self, decrements: &[StockDecrement]) {
        for decrement in decrements {
            if let Some(product) = self.products.get_mut(&decrement.product_id) {
                product.stock_quantity = product.stock_quantity.saturating_sub(decrement.quantity);
            } else {
                tracing::warn!(product_id = %decrement.product_id, "stock decrement for unknown product skipped");
            }
        }
    }
}

/// In-memory record store.
///
/// Reference implementation of the external persistence service, intended for
/// tests/dev. All four collections live behind a single lock, so the compound
/// invoice operations (status write + stock writes) are atomic: both succeed
/// or neither is visible.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    state: RwLock<StoreState>,
    offline: AtomicBool,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a lost connection: while offline, every operation fails with
    /// `StoreError::Unavailable` and no state changes.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, StoreState>> {
        self.ensure_online()?;
        self.state
            .read()
            .map_err(|_| StoreError::unavailable("store lock poisoned"))
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, StoreState>> {
        self.ensure_online()?;
        self.state
            .write()
            .map_err(|_| StoreError::unavailable("store lock poisoned"))
    }

    fn ensure_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("no session established"));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn create_customer(&self, record: &CustomerRecord) -> StoreResult<()> {
        let mut state = self.write()?;
        // Idempotent on the client-generated id: a retried create is a no-op.
        state.customers.entry(record.id).or_insert_with(|| record.clone());
        Ok(())
    }

    async fn update_customer(&self, record: &CustomerRecord) -> StoreResult<()> {
        let mut state = self.write()?;
        if !state.customers.contains_key(&record.id) {
            return Err(StoreError::operation(format!("unknown customer {}", record.id)));
        }
        state.customers.insert(record.id, record.clone());
        Ok(())
    }

    async fn delete_customer(&self, id: CustomerId) -> StoreResult<()> {
        // No cascade: the customer's invoices are untouched.
        self.write()?.customers.remove(&id);
        Ok(())
    }

    async fn get_customer(&self, id: CustomerId) -> StoreResult<Option<CustomerRecord>> {
        Ok(self.read()?.customers.get(&id).cloned())
    }

    async fn list_customers(&self) -> StoreResult<Vec<CustomerRecord>> {
        Ok(self.read()?.customers.values().cloned().collect())
    }

    async fn create_product(&self, record: &ProductRecord) -> StoreResult<()> {
        let mut state = self.write()?;
        state.products.entry(record.id).or_insert_with(|| record.clone());
        Ok(())
    }

    async fn update_product(&self, record: &ProductRecord) -> StoreResult<()> {
        let mut state = self.write()?;
        if !state.products.contains_key(&record.id) {
            return Err(StoreError::operation(format!("unknown product {}", record.id)));
        }
        state.products.insert(record.id, record.clone());
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> StoreResult<()> {
        // No cascade: line items on past invoices keep their snapshot.
        self.write()?.products.remove(&id);
        Ok(())
    }

    async fn get_product(&self, id: ProductId) -> StoreResult<Option<ProductRecord>> {
        Ok(self.read()?.products.get(&id).cloned())
    }

    async fn list_products(&self) -> StoreResult<Vec<ProductRecord>> {
        Ok(self.read()?.products.values().cloned().collect())
    }

    async fn create_expense(&self, record: &ExpenseRecord) -> StoreResult<()> {
        let mut state = self.write()?;
        state.expenses.entry(record.id).or_insert_with(|| record.clone());
        Ok(())
    }

    async fn update_expense(&self, record: &ExpenseRecord) -> StoreResult<()> {
        let mut state = self.write()?;
        if !state.expenses.contains_key(&record.id) {
            return Err(StoreError::operation(format!("unknown expense {}", record.id)));
        }
        state.expenses.insert(record.id, record.clone());
        Ok(())
    }

    async fn delete_expense(&self, id: ExpenseId) -> StoreResult<()> {
        self.write()?.expenses.remove(&id);
        Ok(())
    }

    async fn get_expense(&self, id: ExpenseId) -> StoreResult<Option<ExpenseRecord>> {
        Ok(self.read()?.expenses.get(&id).cloned())
    }

    async fn list_expenses(&self) -> StoreResult<Vec<ExpenseRecord>> {
        Ok(self.read()?.expenses.values().cloned().collect())
    }

    async fn create_invoice(
        &self,
        record: &InvoiceRecord,
        decrements: &[StockDecrement],
    ) -> StoreResult<()> {
        let mut state = self.write()?;
        if state.invoices.contains_key(&record.id) {
            // Retried create: already applied, including its decrements.
            return Ok(());
        }
        state.invoices.insert(record.id, record.clone());
        state.apply_decrements(decrements);
        Ok(())
    }

    async fn transition_invoice(
        &self,
        id: InvoiceId,
        status: InvoiceStatus,
        decrements: &[StockDecrement],
    ) -> StoreResult<()> {
        let mut state = self.write()?;
        let Some(invoice) = state.invoices.get_mut(&id) else {
            return Err(StoreError::operation(format!("unknown invoice {id}")));
        };
        invoice.status = status;
        state.apply_decrements(decrements);
        Ok(())
    }

    async fn get_invoice(&self, id: InvoiceId) -> StoreResult<Option<InvoiceRecord>> {
        Ok(self.read()?.invoices.get(&id).cloned())
    }

    async fn list_invoices(&self) -> StoreResult<Vec<InvoiceRecord>> {
        Ok(self.read()?.invoices.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tallybook_core::{Money, RecordId, Timestamp};
    use tallybook_invoicing::LineItem;

    fn product(stock: u64) -> ProductRecord {
        ProductRecord {
            id: ProductId::new(RecordId::new()),
            name: "Steel Bottle".to_string(),
            description: String::new(),
            category: "Kitchen".to_string(),
            price: Money::from_minor(1000),
            stock_quantity: stock,
        }
    }

    fn invoice(product_id: ProductId, quantity: u64, status: InvoiceStatus) -> InvoiceRecord {
        InvoiceRecord {
            id: InvoiceId::new(RecordId::new()),
            customer_id: CustomerId::new(RecordId::new()),
            line_items: vec![LineItem {
                product_id,
                name: "Steel Bottle".to_string(),
                description: String::new(),
                price: Money::from_minor(1000),
                quantity,
            }],
            total_amount: Money::from_minor(1000 * quantity as i64),
            status,
            created_at: Timestamp::from_date_str("2024-03-15").unwrap(),
            due_date: Timestamp::from_date_str("2024-04-01").unwrap(),
        }
    }

    #[tokio::test]
    async fn transition_applies_status_and_stock_together() {
        let store = InMemoryRecordStore::new();
        let product = product(10);
        store.create_product(&product).await.unwrap();
        let record = invoice(product.id, 4, InvoiceStatus::Sent);
        store.create_invoice(&record, &[]).await.unwrap();

        let decrements = [StockDecrement { product_id: product.id, quantity: 4 }];
        store
            .transition_invoice(record.id, InvoiceStatus::Paid, &decrements)
            .await
            .unwrap();

        let stored = store.get_invoice(record.id).await.unwrap().unwrap();
        assert_eq!(stored.status, InvoiceStatus::Paid);
        let stored = store.get_product(product.id).await.unwrap().unwrap();
        assert_eq!(stored.stock_quantity, 6);
    }

    #[tokio::test]
    async fn transition_of_unknown_invoice_changes_nothing() {
        let store = InMemoryRecordStore::new();
        let product = product(10);
        store.create_product(&product).await.unwrap();

        let decrements = [StockDecrement { product_id: product.id, quantity: 4 }];
        let err = store
            .transition_invoice(InvoiceId::new(RecordId::new()), InvoiceStatus::Paid, &decrements)
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Operation(_)));
        let stored = store.get_product(product.id).await.unwrap().unwrap();
        assert_eq!(stored.stock_quantity, 10);
    }

    #[tokio::test]
    async fn stock_is_floored_at_zero() {
        let store = InMemoryRecordStore::new();
        let product = product(3);
        store.create_product(&product).await.unwrap();
        let record = invoice(product.id, 5, InvoiceStatus::Sent);
        store.create_invoice(&record, &[]).await.unwrap();

        let decrements = [StockDecrement { product_id: product.id, quantity: 5 }];
        store
            .transition_invoice(record.id, InvoiceStatus::Paid, &decrements)
            .await
            .unwrap();

        let stored = store.get_product(product.id).await.unwrap().unwrap();
        assert_eq!(stored.stock_quantity, 0);
    }

    #[tokio::test]
    async fn retried_invoice_create_does_not_reapply_decrements() {
        let store = InMemoryRecordStore::new();
        let product = product(10);
        store.create_product(&product).await.unwrap();

        let record = invoice(product.id, 4, InvoiceStatus::Paid);
        let decrements = [StockDecrement { product_id: product.id, quantity: 4 }];
        store.create_invoice(&record, &decrements).await.unwrap();
        store.create_invoice(&record, &decrements).await.unwrap();

        assert_eq!(store.list_invoices().await.unwrap().len(), 1);
        let stored = store.get_product(product.id).await.unwrap().unwrap();
        assert_eq!(stored.stock_quantity, 6);
    }

    #[tokio::test]
    async fn retried_customer_create_does_not_double_insert() {
        let store = InMemoryRecordStore::new();
        let record = CustomerRecord {
            id: CustomerId::new(RecordId::new()),
            name: "Priya Sharma".to_string(),
            email: "priya@example.com".to_string(),
            phone: String::new(),
            address: String::new(),
            created_at: Timestamp::now(),
        };

        store.create_customer(&record).await.unwrap();
        store.create_customer(&record).await.unwrap();

        assert_eq!(store.list_customers().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn offline_store_rejects_everything_without_mutation() {
        let store = InMemoryRecordStore::new();
        let product = product(10);
        store.create_product(&product).await.unwrap();

        store.set_offline(true);
        let err = store.delete_product(product.id).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(store.list_products().await.is_err());

        store.set_offline(false);
        let stored = store.get_product(product.id).await.unwrap().unwrap();
        assert_eq!(stored.stock_quantity, 10);
    }

    #[tokio::test]
    async fn update_of_unknown_record_is_rejected() {
        let store = InMemoryRecordStore::new();
        let err = store.update_product(&product(1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Operation(_)));
    }
}
