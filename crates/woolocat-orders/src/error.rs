use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrderListError {
    #[error("No orders data found")]
    Missing,

    #[error("Malformed orders data: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Orders data is not an array (got {0})")]
    NotAList(&'static str),
}

impl OrderListError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Missing => "No orders recorded for this address.",
            Self::Malformed(_) | Self::NotAList(_) => "Order details could not be read.",
        }
    }
}
