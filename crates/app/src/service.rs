use tracing::instrument;

use tallybook_core::{DomainError, RecordId, Timestamp};
use tallybook_customers::{
    Customer, CustomerCommand, CustomerId, CustomerRecord, RegisterCustomer, UpdateCustomer,
};
use tallybook_events::execute;
use tallybook_expenses::{
    Expense, ExpenseCommand, ExpenseId, ExpenseRecord, RecordExpense, UpdateExpense,
};
use tallybook_invoicing::{
    CreateInvoice, Invoice, InvoiceCommand, InvoiceId, InvoiceRecord, InvoiceStatus,
    StockDecrement, TransitionStatus,
};
use tallybook_products::{
    AddProduct, DeductStock, Product, ProductCommand, ProductId, ProductRecord, UpdateProduct,
};
use tallybook_projections::{ProjectionSet, ProjectionStore};
use tallybook_reports::{
    CategoryTotal, DashboardMetrics, MonthRevenue, ProductSales, ProfitSummary,
};
use tallybook_store::RecordStore;

use crate::error::AppResult;
use crate::input::{
    CustomerUpdate, ExpenseUpdate, NewCustomer, NewExpense, NewInvoice, NewProduct, ProductUpdate,
};

/// How many invoices the recent-invoices view shows.
const RECENT_INVOICE_LIMIT: usize = 5;

/// The application service the UI layer talks to.
///
/// Owns the store client and the projected collections. Projections reflect
/// confirmed store state only: a failed store call leaves them untouched, and
/// a fresh session repopulates them via [`Backoffice::load`].
pub struct Backoffice<S: RecordStore> {
    store: S,
    projections: ProjectionSet,
}

impl<S: RecordStore> Backoffice<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            projections: ProjectionSet::new(),
        }
    }

    /// Hydrate the projections from the store's list endpoints.
    #[instrument(skip_all)]
    pub async fn load(&self) -> AppResult<()> {
        let customers = self.store.list_customers().await?;
        let products = self.store.list_products().await?;
        let expenses = self.store.list_expenses().await?;
        let invoices = self.store.list_invoices().await?;

        self.projections.reset_customers(customers);
        self.projections.reset_products(products);
        self.projections.reset_expenses(expenses);
        self.projections.reset_invoices(invoices);

        tracing::info!("projections hydrated from store");
        Ok(())
    }

    // ── Customers ──────────────────────────────────────────────────────

    #[instrument(skip_all)]
    pub async fn create_customer(&self, input: NewCustomer) -> AppResult<CustomerRecord> {
        let customer_id = CustomerId::new(RecordId::new());
        let mut customer = Customer::empty(customer_id);
        execute(
            &mut customer,
            &CustomerCommand::Register(RegisterCustomer {
                customer_id,
                name: input.name,
                email: input.email,
                phone: input.phone,
                address: input.address,
                occurred_at: Timestamp::now(),
            }),
        )?;

        let record = snapshot_or_invariant(customer.snapshot())?;
        self.store.create_customer(&record).await?;
        self.projections.customers().upsert(record.clone());

        tracing::info!(customer_id = %customer_id, "customer created");
        Ok(record)
    }

    #[instrument(skip_all, fields(customer_id = %id))]
    pub async fn update_customer(
        &self,
        id: CustomerId,
        input: CustomerUpdate,
    ) -> AppResult<CustomerRecord> {
        let existing = self
            .projections
            .customers()
            .get(&id)
            .ok_or(DomainError::NotFound)?;
        let mut customer = Customer::hydrate(&existing);
        execute(
            &mut customer,
            &CustomerCommand::Update(UpdateCustomer {
                customer_id: id,
                name: input.name,
                email: input.email,
                phone: input.phone,
                address: input.address,
                occurred_at: Timestamp::now(),
            }),
        )?;

        let record = snapshot_or_invariant(customer.snapshot())?;
        self.store.update_customer(&record).await?;
        self.projections.customers().upsert(record.clone());
        Ok(record)
    }

    /// Deleting a customer does not cascade: their invoices stay as-is.
    #[instrument(skip_all, fields(customer_id = %id))]
    pub async fn delete_customer(&self, id: CustomerId) -> AppResult<()> {
        if self.projections.customers().get(&id).is_none() {
            return Err(DomainError::NotFound.into());
        }
        self.store.delete_customer(id).await?;
        self.projections.customers().remove(&id);
        Ok(())
    }

    // ── Products ───────────────────────────────────────────────────────

    #[instrument(skip_all)]
    pub async fn add_product(&self, input: NewProduct) -> AppResult<ProductRecord> {
        let product_id = ProductId::new(RecordId::new());
        let mut product = Product::empty(product_id);
        execute(
            &mut product,
            &ProductCommand::Add(AddProduct {
                product_id,
                name: input.name,
                description: input.description,
                category: input.category,
                price: input.price,
                stock_quantity: input.stock_quantity,
                occurred_at: Timestamp::now(),
            }),
        )?;

        let record = snapshot_or_invariant(product.snapshot())?;
        self.store.create_product(&record).await?;
        self.projections.products().upsert(record.clone());

        tracing::info!(product_id = %product_id, "product added");
        Ok(record)
    }

    #[instrument(skip_all, fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: ProductId,
        input: ProductUpdate,
    ) -> AppResult<ProductRecord> {
        let existing = self
            .projections
            .products()
            .get(&id)
            .ok_or(DomainError::NotFound)?;
        let mut product = Product::hydrate(&existing);
        execute(
            &mut product,
            &ProductCommand::Update(UpdateProduct {
                product_id: id,
                name: input.name,
                description: input.description,
                category: input.category,
                price: input.price,
                stock_quantity: input.stock_quantity,
                occurred_at: Timestamp::now(),
            }),
        )?;

        let record = snapshot_or_invariant(product.snapshot())?;
        self.store.update_product(&record).await?;
        self.projections.products().upsert(record.clone());
        Ok(record)
    }

    /// Deleting a product does not cascade: line items on past invoices keep
    /// their frozen snapshot.
    #[instrument(skip_all, fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> AppResult<()> {
        if self.projections.products().get(&id).is_none() {
            return Err(DomainError::NotFound.into());
        }
        self.store.delete_product(id).await?;
        self.projections.products().remove(&id);
        Ok(())
    }

    // ── Expenses ───────────────────────────────────────────────────────

    #[instrument(skip_all)]
    pub async fn record_expense(&self, input: NewExpense) -> AppResult<ExpenseRecord> {
        let expense_id = ExpenseId::new(RecordId::new());
        let mut expense = Expense::empty(expense_id);
        execute(
            &mut expense,
            &ExpenseCommand::Record(RecordExpense {
                expense_id,
                date: input.date,
                category: input.category,
                description: input.description,
                amount: input.amount,
                occurred_at: Timestamp::now(),
            }),
        )?;

        let record = snapshot_or_invariant(expense.snapshot())?;
        self.store.create_expense(&record).await?;
        self.projections.expenses().upsert(record.clone());

        tracing::info!(expense_id = %expense_id, "expense recorded");
        Ok(record)
    }

    #[instrument(skip_all, fields(expense_id = %id))]
    pub async fn update_expense(
        &self,
        id: ExpenseId,
        input: ExpenseUpdate,
    ) -> AppResult<ExpenseRecord> {
        let existing = self
            .projections
            .expenses()
            .get(&id)
            .ok_or(DomainError::NotFound)?;
        let mut expense = Expense::hydrate(&existing);
        execute(
            &mut expense,
            &ExpenseCommand::Update(UpdateExpense {
                expense_id: id,
                date: input.date,
                category: input.category,
                description: input.description,
                amount: input.amount,
                occurred_at: Timestamp::now(),
            }),
        )?;

        let record = snapshot_or_invariant(expense.snapshot())?;
        self.store.update_expense(&record).await?;
        self.projections.expenses().upsert(record.clone());
        Ok(record)
    }

    #[instrument(skip_all, fields(expense_id = %id))]
    pub async fn delete_expense(&self, id: ExpenseId) -> AppResult<()> {
        if self.projections.expenses().get(&id).is_none() {
            return Err(DomainError::NotFound.into());
        }
        self.store.delete_expense(id).await?;
        self.projections.expenses().remove(&id);
        Ok(())
    }

    // ── Invoices ───────────────────────────────────────────────────────

    #[instrument(skip_all)]
    pub async fn create_invoice(&self, input: NewInvoice) -> AppResult<InvoiceRecord> {
        // Line items must reference known products; the projection is the
        // source of truth for the product collection here.
        for line in &input.line_items {
            if self.projections.products().get(&line.product_id).is_none() {
                return Err(
                    DomainError::validation(format!("unknown product {}", line.product_id)).into(),
                );
            }
        }

        let invoice_id = InvoiceId::new(RecordId::new());
        let occurred_at = Timestamp::now();
        let mut invoice = Invoice::empty(invoice_id);
        let events = execute(
            &mut invoice,
            &InvoiceCommand::Create(CreateInvoice {
                invoice_id,
                customer_id: input.customer_id,
                line_items: input.line_items,
                total_amount: input.total_amount,
                status: input.status,
                due_date: input.due_date,
                occurred_at,
            }),
        )?;

        let decrements = collect_decrements(&events);
        let record = snapshot_or_invariant(invoice.snapshot())?;
        self.store.create_invoice(&record, &decrements).await?;
        self.projections.invoices().upsert(record.clone());
        self.apply_stock_decrements(&decrements, occurred_at);

        tracing::info!(invoice_id = %invoice_id, status = ?record.status, "invoice created");
        Ok(record)
    }

    /// Transition an invoice to `status`.
    ///
    /// The status write and any paid-entry stock decrements travel in one
    /// store call; the store applies them atomically. Projections are updated
    /// only after that call succeeds.
    #[instrument(skip_all, fields(invoice_id = %id, status = ?status))]
    pub async fn transition_invoice_status(
        &self,
        id: InvoiceId,
        status: InvoiceStatus,
    ) -> AppResult<InvoiceRecord> {
        let existing = self
            .projections
            .invoices()
            .get(&id)
            .ok_or(DomainError::NotFound)?;
        let mut invoice = Invoice::hydrate(&existing);
        let occurred_at = Timestamp::now();
        let events = execute(
            &mut invoice,
            &InvoiceCommand::Transition(TransitionStatus {
                invoice_id: id,
                status,
                occurred_at,
            }),
        )?;

        let decrements = collect_decrements(&events);
        self.store.transition_invoice(id, status, &decrements).await?;

        let record = snapshot_or_invariant(invoice.snapshot())?;
        self.projections.invoices().upsert(record.clone());
        self.apply_stock_decrements(&decrements, occurred_at);

        tracing::info!(invoice_id = %id, decrements = decrements.len(), "invoice status updated");
        Ok(record)
    }

    /// Fold confirmed stock decrements into the product projection through the
    /// product aggregate (which clamps at zero). Products deleted since the
    /// invoice was written are skipped.
    fn apply_stock_decrements(&self, decrements: &[StockDecrement], occurred_at: Timestamp) {
        for decrement in decrements {
            let Some(existing) = self.projections.products().get(&decrement.product_id) else {
                tracing::warn!(product_id = %decrement.product_id, "decrement for unknown product skipped");
                continue;
            };
            let mut product = Product::hydrate(&existing);
            let result = execute(
                &mut product,
                &ProductCommand::DeductStock(DeductStock {
                    product_id: decrement.product_id,
                    quantity: decrement.quantity,
                    occurred_at,
                }),
            );
            match result.map(|_| product.snapshot()) {
                Ok(Some(updated)) => self.projections.products().upsert(updated),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(product_id = %decrement.product_id, ?err, "stock decrement skipped")
                }
            }
        }
    }

    // ── Collections ────────────────────────────────────────────────────

    pub fn customers(&self) -> Vec<CustomerRecord> {
        self.projections.customers().list()
    }

    pub fn products(&self) -> Vec<ProductRecord> {
        self.projections.products().list()
    }

    pub fn expenses(&self) -> Vec<ExpenseRecord> {
        self.projections.expenses().list()
    }

    pub fn invoices(&self) -> Vec<InvoiceRecord> {
        self.projections.invoices().list()
    }

    // ── Reports (recomputed per call from the projected snapshots) ─────

    pub fn dashboard(&self) -> DashboardMetrics {
        tallybook_reports::dashboard_metrics(
            &self.customers(),
            &self.products(),
            &self.invoices(),
        )
    }

    pub fn recent_invoices(&self) -> Vec<InvoiceRecord> {
        tallybook_reports::recent_invoices(&self.invoices(), RECENT_INVOICE_LIMIT)
    }

    pub fn monthly_revenue(&self, year: i32) -> Vec<MonthRevenue> {
        tallybook_reports::monthly_revenue(&self.invoices(), year)
    }

    pub fn available_years(&self) -> Vec<i32> {
        tallybook_reports::available_years(&self.invoices(), Timestamp::now().year())
    }

    pub fn top_selling_products(&self) -> Vec<ProductSales> {
        tallybook_reports::top_selling_products(&self.invoices())
    }

    pub fn current_month_profit(&self) -> ProfitSummary {
        let now = Timestamp::now();
        tallybook_reports::month_profit(&self.invoices(), &self.expenses(), now.year(), now.month())
    }

    pub fn current_month_expense_breakdown(&self) -> Vec<CategoryTotal> {
        let now = Timestamp::now();
        tallybook_reports::expense_breakdown(&self.expenses(), now.year(), now.month())
    }
}

fn collect_decrements(events: &[tallybook_invoicing::InvoiceEvent]) -> Vec<StockDecrement> {
    events
        .iter()
        .flat_map(|event| event.stock_decrements().iter().cloned())
        .collect()
}

fn snapshot_or_invariant<T>(snapshot: Option<T>) -> AppResult<T> {
    snapshot.ok_or_else(|| DomainError::invariant("aggregate has no persisted state").into())
}
