use serde::{Deserialize, Serialize};

use tallybook_core::{Aggregate, AggregateRoot, DomainError, Entity, Money, RecordId, Timestamp};
use tallybook_events::{Command, Event};

/// Product identifier.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProductId(pub RecordId);

impl ProductId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Product as stored by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    /// Unit price in smallest currency unit (e.g., cents).
    pub price: Money,
    pub stock_quantity: u64,
}

impl Entity for ProductRecord {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Aggregate root: Product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    name: String,
    description: String,
    category: String,
    price: Money,
    stock: u64,
    version: u64,
    created: bool,
}

impl Product {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: ProductId) -> Self {
        Self {
            id,
            name: String::new(),
            description: String::new(),
            category: String::new(),
            price: Money::ZERO,
            stock: 0,
            version: 0,
            created: false,
        }
    }

    /// Rehydrate from a stored record.
    pub fn hydrate(record: &ProductRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            description: record.description.clone(),
            category: record.category.clone(),
            price: record.price,
            stock: record.stock_quantity,
            version: 1,
            created: true,
        }
    }

    /// Current state as a storable record; `None` until the product exists.
    pub fn snapshot(&self) -> Option<ProductRecord> {
        self.created.then(|| ProductRecord {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            price: self.price,
            stock_quantity: self.stock,
        })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn stock(&self) -> u64 {
        self.stock
    }
}

impl AggregateRoot for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: AddProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddProduct {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Money,
    pub stock_quantity: u64,
    pub occurred_at: Timestamp,
}

/// Command: UpdateProduct.
///
/// Replaces the mutable fields wholesale; existing invoice line items are
/// frozen snapshots and are never touched by product updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProduct {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Money,
    pub stock_quantity: u64,
    pub occurred_at: Timestamp,
}

/// Command: DeductStock (paid-invoice side effect).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductStock {
    pub product_id: ProductId,
    pub quantity: u64,
    pub occurred_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductCommand {
    Add(AddProduct),
    Update(UpdateProduct),
    DeductStock(DeductStock),
}

impl Command for ProductCommand {
    fn target_id(&self) -> RecordId {
        match self {
            ProductCommand::Add(cmd) => cmd.product_id.0,
            ProductCommand::Update(cmd) => cmd.product_id.0,
            ProductCommand::DeductStock(cmd) => cmd.product_id.0,
        }
    }
}

/// Event: ProductAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAdded {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Money,
    pub stock_quantity: u64,
    pub occurred_at: Timestamp,
}

/// Event: ProductUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdated {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Money,
    pub stock_quantity: u64,
    pub occurred_at: Timestamp,
}

/// Event: StockDeducted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockDeducted {
    pub product_id: ProductId,
    pub quantity: u64,
    pub occurred_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductEvent {
    ProductAdded(ProductAdded),
    ProductUpdated(ProductUpdated),
    StockDeducted(StockDeducted),
}

impl Event for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::ProductAdded(_) => "products.product.added",
            ProductEvent::ProductUpdated(_) => "products.product.updated",
            ProductEvent::StockDeducted(_) => "products.product.stock_deducted",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> Timestamp {
        match self {
            ProductEvent::ProductAdded(e) => e.occurred_at,
            ProductEvent::ProductUpdated(e) => e.occurred_at,
            ProductEvent::StockDeducted(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Product {
    type Command = ProductCommand;
    type Event = ProductEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ProductEvent::ProductAdded(e) => {
                self.id = e.product_id;
                self.name = e.name.clone();
                self.description = e.description.clone();
                self.category = e.category.clone();
                self.price = e.price;
                self.stock = e.stock_quantity;
                self.created = true;
            }
            ProductEvent::ProductUpdated(e) => {
                self.name = e.name.clone();
                self.description = e.description.clone();
                self.category = e.category.clone();
                self.price = e.price;
                self.stock = e.stock_quantity;
            }
            ProductEvent::StockDeducted(e) => {
                // Floored at zero: stock never goes negative.
                self.stock = self.stock.saturating_sub(e.quantity);
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ProductCommand::Add(cmd) => self.handle_add(cmd),
            ProductCommand::Update(cmd) => self.handle_update(cmd),
            ProductCommand::DeductStock(cmd) => self.handle_deduct(cmd),
        }
    }
}

impl Product {
    fn ensure_product_id(&self, product_id: ProductId) -> Result<(), DomainError> {
        if self.id != product_id {
            return Err(DomainError::invariant("product_id mismatch"));
        }
        Ok(())
    }

    fn validate_details(name: &str, price: Money) -> Result<(), DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        if price.is_negative() {
            return Err(DomainError::validation("product price cannot be negative"));
        }
        Ok(())
    }

    fn handle_add(&self, cmd: &AddProduct) -> Result<Vec<ProductEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("product already exists"));
        }
        Self::validate_details(&cmd.name, cmd.price)?;

        Ok(vec![ProductEvent::ProductAdded(ProductAdded {
            product_id: cmd.product_id,
            name: cmd.name.clone(),
            description: cmd.description.clone(),
            category: cmd.category.clone(),
            price: cmd.price,
            stock_quantity: cmd.stock_quantity,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update(&self, cmd: &UpdateProduct) -> Result<Vec<ProductEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_product_id(cmd.product_id)?;
        Self::validate_details(&cmd.name, cmd.price)?;

        Ok(vec![ProductEvent::ProductUpdated(ProductUpdated {
            product_id: cmd.product_id,
            name: cmd.name.clone(),
            description: cmd.description.clone(),
            category: cmd.category.clone(),
            price: cmd.price,
            stock_quantity: cmd.stock_quantity,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_deduct(&self, cmd: &DeductStock) -> Result<Vec<ProductEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_product_id(cmd.product_id)?;

        if cmd.quantity == 0 {
            return Err(DomainError::validation("deduction quantity must be at least 1"));
        }

        Ok(vec![ProductEvent::StockDeducted(StockDeducted {
            product_id: cmd.product_id,
            quantity: cmd.quantity,
            occurred_at: cmd.occurred_at,
        })])
    }
}
