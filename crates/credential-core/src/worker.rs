//! Worker identity: which process instance handled a request.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a running service instance.
///
/// Resolved once at startup and handed to every handler through application
/// state; nothing reads it from the environment at request time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(String);

impl WorkerId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  /// Use `configured` if it is non-blank, otherwise derive
  /// `"{service}-{pid}"` from the current process.
  pub fn resolve(configured: Option<&str>, service: &str) -> Self {
    match configured.map(str::trim).filter(|s| !s.is_empty()) {
      Some(id) => Self::new(id),
      None => Self(format!("{service}-{}", std::process::id())),
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for WorkerId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn configured_value_wins() {
    let id = WorkerId::resolve(Some("issuer-a"), "issuance-service");
    assert_eq!(id.as_str(), "issuer-a");
  }

  #[test]
  fn blank_value_falls_back_to_pid() {
    let id = WorkerId::resolve(Some("   "), "issuance-service");
    assert_eq!(
      id.as_str(),
      format!("issuance-service-{}", std::process::id())
    );
    assert_eq!(WorkerId::resolve(None, "issuance-service"), id);
  }
}
