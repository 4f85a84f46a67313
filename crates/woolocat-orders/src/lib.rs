//! Orders behind each dashboard row.
//!
//! Shop orders are grouped by shipping address into [`woolocat_core::Row`]s,
//! each carrying its serialized order list; [`OrderModal`] parses that list
//! back for the order detail overlay.

pub mod error;
pub mod grouping;
pub mod modal;
pub mod order;

pub use error::OrderListError;
pub use grouping::{format_price, group_by_address, ShippingAddress, ShopOrder};
pub use modal::{Binding, ClickTarget, HandlerCall, ModalEvent, OrderModal, OrderRow};
pub use order::{normalize_status, parse_order_list, Order};
