use serde::{Deserialize, Serialize};

use tallybook_core::{Aggregate, AggregateRoot, DomainError, Entity, Money, RecordId, Timestamp};
use tallybook_events::{Command, Event};

/// Expense identifier.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ExpenseId(pub RecordId);

impl ExpenseId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Expense as stored by the record store.
///
/// Identity is the id alone; date, category, description, and amount are all
/// mutable via update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: ExpenseId,
    pub date: Timestamp,
    pub category: String,
    pub description: String,
    /// Amount in smallest currency unit (e.g., cents).
    pub amount: Money,
}

impl Entity for ExpenseRecord {
    type Id = ExpenseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Aggregate root: Expense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expense {
    id: ExpenseId,
    date: Timestamp,
    category: String,
    description: String,
    amount: Money,
    version: u64,
    created: bool,
}

impl Expense {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: ExpenseId) -> Self {
        Self {
            id,
            date: Timestamp::default(),
            category: String::new(),
            description: String::new(),
            amount: Money::ZERO,
            version: 0,
            created: false,
        }
    }

    /// Rehydrate from a stored record.
    pub fn hydrate(record: &ExpenseRecord) -> Self {
        Self {
            id: record.id,
            date: record.date,
            category: record.category.clone(),
            description: record.description.clone(),
            amount: record.amount,
            version: 1,
            created: true,
        }
    }

    /// Current state as a storable record; `None` until the expense exists.
    pub fn snapshot(&self) -> Option<ExpenseRecord> {
        self.created.then(|| ExpenseRecord {
            id: self.id,
            date: self.date,
            category: self.category.clone(),
            description: self.description.clone(),
            amount: self.amount,
        })
    }

    pub fn id_typed(&self) -> ExpenseId {
        self.id
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }
}

impl AggregateRoot for Expense {
    type Id = ExpenseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RecordExpense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordExpense {
    pub expense_id: ExpenseId,
    pub date: Timestamp,
    pub category: String,
    pub description: String,
    pub amount: Money,
    pub occurred_at: Timestamp,
}

/// Command: UpdateExpense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateExpense {
    pub expense_id: ExpenseId,
    pub date: Timestamp,
    pub category: String,
    pub description: String,
    pub amount: Money,
    pub occurred_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpenseCommand {
    Record(RecordExpense),
    Update(UpdateExpense),
}

impl Command for ExpenseCommand {
    fn target_id(&self) -> RecordId {
        match self {
            ExpenseCommand::Record(cmd) => cmd.expense_id.0,
            ExpenseCommand::Update(cmd) => cmd.expense_id.0,
        }
    }
}

/// Event: ExpenseRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecorded {
    pub expense_id: ExpenseId,
    pub date: Timestamp,
    pub category: String,
    pub description: String,
    pub amount: Money,
    pub occurred_at: Timestamp,
}

/// Event: ExpenseUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseUpdated {
    pub expense_id: ExpenseId,
    pub date: Timestamp,
    pub category: String,
    pub description: String,
    pub amount: Money,
    pub occurred_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpenseEvent {
    ExpenseRecorded(ExpenseRecorded),
    ExpenseUpdated(ExpenseUpdated),
}

impl Event for ExpenseEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ExpenseEvent::ExpenseRecorded(_) => "expenses.expense.recorded",
            ExpenseEvent::ExpenseUpdated(_) => "expenses.expense.updated",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> Timestamp {
        match self {
            ExpenseEvent::ExpenseRecorded(e) => e.occurred_at,
            ExpenseEvent::ExpenseUpdated(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Expense {
    type Command = ExpenseCommand;
    type Event = ExpenseEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ExpenseEvent::ExpenseRecorded(e) => {
                self.id = e.expense_id;
                self.date = e.date;
                self.category = e.category.clone();
                self.description = e.description.clone();
                self.amount = e.amount;
                self.created = true;
            }
            ExpenseEvent::ExpenseUpdated(e) => {
                self.date = e.date;
                self.category = e.category.clone();
                self.description = e.description.clone();
                self.amount = e.amount;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ExpenseCommand::Record(cmd) => self.handle_record(cmd),
            ExpenseCommand::Update(cmd) => self.handle_update(cmd),
        }
    }
}

impl Expense {
    fn ensure_expense_id(&self, expense_id: ExpenseId) -> Result<(), DomainError> {
        if self.id != expense_id {
            return Err(DomainError::invariant("expense_id mismatch"));
        }
        Ok(())
    }

    fn validate_details(category: &str, amount: Money) -> Result<(), DomainError> {
        if category.trim().is_empty() {
            return Err(DomainError::validation("expense category cannot be empty"));
        }
        if amount <= Money::ZERO {
            return Err(DomainError::validation("expense amount must be positive"));
        }
        Ok(())
    }

    fn handle_record(&self, cmd: &RecordExpense) -> Result<Vec<ExpenseEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("expense already exists"));
        }
        Self::validate_details(&cmd.category, cmd.amount)?;

        Ok(vec![ExpenseEvent::ExpenseRecorded(ExpenseRecorded {
            expense_id: cmd.expense_id,
            date: cmd.date,
            category: cmd.category.clone(),
            description: cmd.description.clone(),
            amount: cmd.amount,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update(&self, cmd: &UpdateExpense) -> Result<Vec<ExpenseEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_expense_id(cmd.expense_id)?;
        Self::validate_details(&cmd.category, cmd.amount)?;

        Ok(vec![ExpenseEvent::ExpenseUpdated(ExpenseUpdated {
            expense_id: cmd.expense_id,
            date: cmd.date,
            category: cmd.category.clone(),
            description: cmd.description.clone(),
            amount: cmd.amount,
            occurred_at: cmd.occurred_at,
        })])
    }
}
