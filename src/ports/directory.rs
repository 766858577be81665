//! Directory Port - Employee and Department Lookups

use async_trait::async_trait;

use crate::domain::organization::{Department, Employee};

/// Read-only access to the organization directory.
#[async_trait]
pub trait DirectoryApi: Send + Sync + 'static {
  async fn employee(&self, id: u32) -> anyhow::Result<Employee>;

  async fn department(&self, id: u32) -> anyhow::Result<Department>;
}
