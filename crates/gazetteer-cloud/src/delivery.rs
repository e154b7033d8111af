/// Outcome of a best-effort side effect. Never raised; callers decide what a failure means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    Failed(String),
}

impl Delivery {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Delivery::Delivered)
    }

    /// Diagnostic text of a failed delivery
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Delivery::Delivered => None,
            Delivery::Failed(reason) => Some(reason),
        }
    }
}
