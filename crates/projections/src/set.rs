use tallybook_customers::CustomerRecord;
use tallybook_expenses::ExpenseRecord;
use tallybook_invoicing::InvoiceRecord;
use tallybook_products::ProductRecord;

use crate::store::{InMemoryProjection, ProjectionStore};

/// The four projected collections, one per entity kind.
#[derive(Debug, Default)]
pub struct ProjectionSet {
    customers: InMemoryProjection<CustomerRecord>,
    products: InMemoryProjection<ProductRecord>,
    expenses: InMemoryProjection<ExpenseRecord>,
    invoices: InMemoryProjection<InvoiceRecord>,
}

impl ProjectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn customers(&self) -> &InMemoryProjection<CustomerRecord> {
        &self.customers
    }

    pub fn products(&self) -> &InMemoryProjection<ProductRecord> {
        &self.products
    }

    pub fn expenses(&self) -> &InMemoryProjection<ExpenseRecord> {
        &self.expenses
    }

    pub fn invoices(&self) -> &InMemoryProjection<InvoiceRecord> {
        &self.invoices
    }

    /// Replace a collection wholesale with a freshly listed copy.
    pub fn reset_customers(&self, records: Vec<CustomerRecord>) {
        Self::reset(&self.customers, records);
    }

    pub fn reset_products(&self, records: Vec<ProductRecord>) {
        Self::reset(&self.products, records);
    }

    pub fn reset_expenses(&self, records: Vec<ExpenseRecord>) {
        Self::reset(&self.expenses, records);
    }

    pub fn reset_invoices(&self, records: Vec<InvoiceRecord>) {
        Self::reset(&self.invoices, records);
    }

    fn reset<E, S>(store: &S, records: Vec<E>)
    where
        E: tallybook_core::Entity,
        S: ProjectionStore<E>,
    {
        store.clear();
        for record in records {
            store.upsert(record);
        }
    }
}
