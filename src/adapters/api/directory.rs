//! Employee Directory Adapter

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use super::client::ApiClient;
use crate::domain::organization::{Department, Employee};
use crate::ports::directory::DirectoryApi;

pub struct HttpDirectoryApi {
  client: Arc<ApiClient>,
}

impl HttpDirectoryApi {
  pub fn new(client: Arc<ApiClient>) -> Self {
    Self { client }
  }
}

#[async_trait]
impl DirectoryApi for HttpDirectoryApi {
  async fn employee(&self, id: u32) -> Result<Employee> {
    self.client.get_json(&format!("/employees/{id}")).await
  }

  async fn department(&self, id: u32) -> Result<Department> {
    self.client.get_json(&format!("/departments/{id}")).await
  }
}
