use serde::{Deserialize, Serialize};

/// One page of a list response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub page: u32,
    pub next: bool,
    pub items: Vec<T>,
}

