use std::sync::Arc;

use async_trait::async_trait;

use tallybook_customers::{CustomerId, CustomerRecord};
use tallybook_expenses::{ExpenseId, ExpenseRecord};
use tallybook_invoicing::{InvoiceId, InvoiceRecord, InvoiceStatus, StockDecrement};
use tallybook_products::{ProductId, ProductRecord};

use crate::error::StoreResult;

/// Request/response contract of the external record store.
///
/// Identifiers are client-generated, so the id doubles as the idempotency key:
/// a retried create of an already-present id must succeed without
/// double-inserting (and without re-applying creation-time stock decrements).
///
/// The compound invoice operations take the paid-entry stock decrements
/// alongside the invoice write; implementations must apply both atomically.
/// An invoice marked paid with stock unchanged (or vice versa) must never be
/// observable.
#[async_trait]
pub trait RecordStore: Send + Sync {
    // Customers
    async fn create_customer(&self, record: &CustomerRecord) -> StoreResult<()>;
    async fn update_customer(&self, record: &CustomerRecord) -> StoreResult<()>;
    async fn delete_customer(&self, id: CustomerId) -> StoreResult<()>;
    async fn get_customer(&self, id: CustomerId) -> StoreResult<Option<CustomerRecord>>;
    async fn list_customers(&self) -> StoreResult<Vec<CustomerRecord>>;

    // Products
    async fn create_product(&self, record: &ProductRecord) -> StoreResult<()>;
    async fn update_product(&self, record: &ProductRecord) -> StoreResult<()>;
    async fn delete_product(&self, id: ProductId) -> StoreResult<()>;
    async fn get_product(&self, id: ProductId) -> StoreResult<Option<ProductRecord>>;
    async fn list_products(&self) -> StoreResult<Vec<ProductRecord>>;

    // Expenses
    async fn create_expense(&self, record: &ExpenseRecord) -> StoreResult<()>;
    async fn update_expense(&self, record: &ExpenseRecord) -> StoreResult<()>;
    async fn delete_expense(&self, id: ExpenseId) -> StoreResult<()>;
    async fn get_expense(&self, id: ExpenseId) -> StoreResult<Option<ExpenseRecord>>;
    async fn list_expenses(&self) -> StoreResult<Vec<ExpenseRecord>>;

    // Invoices (no delete; status is the only mutable field after creation)
    async fn create_invoice(
        &self,
        record: &InvoiceRecord,
        decrements: &[StockDecrement],
    ) -> StoreResult<()>;
    async fn transition_invoice(
        &self,
        id: InvoiceId,
        status: InvoiceStatus,
        decrements: &[StockDecrement],
    ) -> StoreResult<()>;
    async fn get_invoice(&self, id: InvoiceId) -> StoreResult<Option<InvoiceRecord>>;
    async fn list_invoices(&self) -> StoreResult<Vec<InvoiceRecord>>;
}

#[async_trait]
impl<S> RecordStore for Arc<S>
where
    S: RecordStore + ?Sized,
{
    async fn create_customer(&self, record: &CustomerRecord) -> StoreResult<()> {
        (**self).create_customer(record).await
    }

    async fn update_customer(&self, record: &CustomerRecord) -> StoreResult<()> {
        (**self).update_customer(record).await
    }

    async fn delete_customer(&self, id: CustomerId) -> StoreResult<()> {
        (**self).delete_customer(id).await
    }

    async fn get_customer(&self, id: CustomerId) -> StoreResult<Option<CustomerRecord>> {
        (**self).get_customer(id).await
    }

    async fn list_customers(&self) -> StoreResult<Vec<CustomerRecord>> {
        (**self).list_customers().await
    }

    async fn create_product(&self, record: &ProductRecord) -> StoreResult<()> {
        (**self).create_product(record).await
    }

    async fn update_product(&self, record: &ProductRecord) -> StoreResult<()> {
        (**self).update_product(record).await
    }

    async fn delete_product(&self, id: ProductId) -> StoreResult<()> {
        (**self).delete_product(id).await
    }

    async fn get_product(&self, id: ProductId) -> StoreResult<Option<ProductRecord>> {
        (**self).get_product(id).await
    }

    async fn list_products(&self) -> StoreResult<Vec<ProductRecord>> {
        (**self).list_products().await
    }

    async fn create_expense(&self, record: &ExpenseRecord) -> StoreResult<()> {
        (**self).create_expense(record).await
    }

    async fn update_expense(&self, record: &ExpenseRecord) -> StoreResult<()> {
        (**self).update_expense(record).await
    }

    async fn delete_expense(&self, id: ExpenseId) -> StoreResult<()> {
        (**self).delete_expense(id).await
    }

    async fn get_expense(&self, id: ExpenseId) -> StoreResult<Option<ExpenseRecord>> {
        (**self).get_expense(id).await
    }

    async fn list_expenses(&self) -> StoreResult<Vec<ExpenseRecord>> {
        (**self).list_expenses().await
    }

    async fn create_invoice(
        &self,
        record: &InvoiceRecord,
        decrements: &[StockDecrement],
    ) -> StoreResult<()> {
        (**self).create_invoice(record, decrements).await
    }

    async fn transition_invoice(
        &self,
        id: InvoiceId,
        status: InvoiceStatus,
        decrements: &[StockDecrement],
    ) -> StoreResult<()> {
        (**self).transition_invoice(id, status, decrements).await
    }

    async fn get_invoice(&self, id: InvoiceId) -> StoreResult<Option<InvoiceRecord>> {
        (**self).get_invoice(id).await
    }

    async fn list_invoices(&self) -> StoreResult<Vec<InvoiceRecord>> {
        (**self).list_invoices().await
    }
}
