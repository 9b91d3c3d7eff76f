/// Dashboard aggregation
///
/// The three views are always read through [`Store::dashboard_snapshot`], so
/// a single call never mixes states from before and after a concurrent write.
/// The single-view helpers take a snapshot and keep one part of it.

use std::sync::Arc;

use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::models::account::{Account, AccountId, AccountSummary};
use crate::models::task::Task;
use crate::store::{DashboardSnapshot, Store};

/// Dashboard payload
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub own_tasks: Vec<Task>,
    pub followed_tasks: Vec<Task>,
    pub suggested_accounts: Vec<AccountSummary>,
}

impl From<DashboardSnapshot> for Dashboard {
    fn from(snapshot: DashboardSnapshot) -> Self {
        Dashboard {
            own_tasks: snapshot.own_tasks,
            followed_tasks: snapshot.followed_tasks,
            suggested_accounts: snapshot
                .suggested_accounts
                .iter()
                .map(AccountSummary::from)
                .collect(),
        }
    }
}

/// Dashboard operations
#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn Store>,
}

impl DashboardService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        DashboardService { store }
    }

    async fn snapshot(&self, viewer: AccountId) -> CoreResult<DashboardSnapshot> {
        self.store
            .dashboard_snapshot(viewer)
            .await?
            .ok_or(CoreError::NotFound("Account"))
    }

    /// Viewer's tasks, insertion order
    pub async fn own_tasks(&self, viewer: AccountId) -> CoreResult<Vec<Task>> {
        Ok(self.snapshot(viewer).await?.own_tasks)
    }

    /// Tasks of followed accounts, never the viewer's own
    pub async fn followed_tasks(&self, viewer: AccountId) -> CoreResult<Vec<Task>> {
        Ok(self.snapshot(viewer).await?.followed_tasks)
    }

    /// Accounts neither the viewer nor already followed, by username
    pub async fn suggested_accounts(&self, viewer: AccountId) -> CoreResult<Vec<Account>> {
        Ok(self.snapshot(viewer).await?.suggested_accounts)
    }

    /// All three views from one snapshot
    pub async fn dashboard(&self, viewer: AccountId) -> CoreResult<Dashboard> {
        let snapshot = self.snapshot(viewer).await?;

        tracing::debug!(
            account_id = viewer,
            own = snapshot.own_tasks.len(),
            followed = snapshot.followed_tasks.len(),
            suggested = snapshot.suggested_accounts.len(),
            "Dashboard assembled"
        );

        Ok(snapshot.into())
    }
}
