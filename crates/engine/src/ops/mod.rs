use std::{fmt, sync::Arc};

use sea_orm::DatabaseConnection;

use crate::{Currency, NoExpiry, NoopNotifier, Notifier, ResultEngine, TokenPolicy};

mod access;
mod balances;
mod confirmation;
mod friends;
mod lekkas;
mod pools;
mod users;

pub use confirmation::ConfirmationView;
pub use lekkas::LekkaListFilter;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

pub struct Engine {
    database: DatabaseConnection,
    currency: Currency,
    notifier: Arc<dyn Notifier>,
    token_policy: Arc<dyn TokenPolicy>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("database", &self.database)
            .field("currency", &self.currency)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The single currency every amount in this ledger is kept in.
    pub fn currency(&self) -> Currency {
        self.currency
    }
}

/// The builder for `Engine`
pub struct EngineBuilder {
    database: DatabaseConnection,
    currency: Currency,
    notifier: Arc<dyn Notifier>,
    token_policy: Arc<dyn TokenPolicy>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            currency: Currency::default(),
            notifier: Arc::new(NoopNotifier),
            token_policy: Arc::new(NoExpiry),
        }
    }
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Ledger currency (default INR).
    pub fn currency(mut self, currency: Currency) -> EngineBuilder {
        self.currency = currency;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> EngineBuilder {
        self.notifier = notifier;
        self
    }

    /// Expiry rule for confirmation links (default: never expire).
    pub fn token_policy(mut self, policy: Arc<dyn TokenPolicy>) -> EngineBuilder {
        self.token_policy = policy;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            currency: self.currency,
            notifier: self.notifier,
            token_policy: self.token_policy,
        })
    }
}
