//! Order detail overlay.
//!
//! Opening the modal (re)binds its three dismissal handlers. Bindings are
//! keyed by [`Binding`], so binding again replaces the previous handler
//! instead of adding a second one.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::OrderListError;
use crate::order::{normalize_status, parse_order_list, Order};

pub const ESCAPE_KEY: &str = "Escape";

/// Rendered table row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRow {
    pub id: String,
    pub date: String,
    pub customer: String,
    /// Badge text, `wc-` prefix removed
    pub status: String,
    pub total: String,
    pub edit_url: String,
}

impl OrderRow {
    pub fn from_order(order: &Order, admin_base_url: &str) -> Self {
        Self {
            id: order.id.clone(),
            date: order.date.clone(),
            customer: order.customer.clone(),
            status: normalize_status(&order.status).to_string(),
            total: order.total.clone(),
            edit_url: format!(
                "{}/post.php?post={}&action=edit",
                admin_base_url.trim_end_matches('/'),
                order.id
            ),
        }
    }
}

/// Dismissal paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    CloseButton,
    OutsideClick,
    EscapeKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// The dimmed area around the dialog
    Backdrop,
    /// Anywhere inside the dialog
    Content,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalEvent {
    CloseClicked,
    Click(ClickTarget),
    KeyUp(String),
}

impl ModalEvent {
    fn binding(&self) -> Option<Binding> {
        match self {
            Self::CloseClicked => Some(Binding::CloseButton),
            Self::Click(ClickTarget::Backdrop) => Some(Binding::OutsideClick),
            Self::Click(ClickTarget::Content) => None,
            Self::KeyUp(key) if key == ESCAPE_KEY => Some(Binding::EscapeKey),
            Self::KeyUp(_) => None,
        }
    }
}

/// One handler invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerCall {
    pub binding: Binding,
    pub handler: u64,
    /// False when the modal was already hidden
    pub closed: bool,
}

#[derive(Debug)]
pub struct OrderModal {
    admin_base_url: String,
    visible: bool,
    rows: Vec<OrderRow>,
    /// Binding -> id of the handler currently attached
    bindings: HashMap<Binding, u64>,
    next_handler: u64,
    calls: Vec<HandlerCall>,
}

impl OrderModal {
    pub fn new(admin_base_url: &str) -> Self {
        Self {
            admin_base_url: admin_base_url.to_string(),
            visible: false,
            rows: Vec::new(),
            bindings: HashMap::new(),
            next_handler: 0,
            calls: Vec::new(),
        }
    }

    /// Populate from a row's serialized order list and show the overlay.
    ///
    /// On a parse failure the error is logged and the modal is left exactly
    /// as it was.
    pub fn open(&mut self, orders_json: &str) -> Result<usize, OrderListError> {
        let orders = match parse_order_list(orders_json) {
            Ok(orders) => orders,
            Err(e) => {
                tracing::error!("Error processing orders: {}", e);
                return Err(e);
            }
        };

        self.rows = orders
            .iter()
            .map(|o| OrderRow::from_order(o, &self.admin_base_url))
            .collect();
        self.visible = true;

        self.bind(Binding::CloseButton);
        self.bind(Binding::OutsideClick);
        self.bind(Binding::EscapeKey);

        tracing::debug!("Order modal opened with {} orders", self.rows.len());
        Ok(self.rows.len())
    }

    fn bind(&mut self, binding: Binding) {
        self.next_handler += 1;
        if self.bindings.insert(binding, self.next_handler).is_some() {
            tracing::trace!("Replaced {:?} handler", binding);
        }
    }

    /// Route a UI event to the bound handler. Returns true if it closed the modal.
    pub fn dispatch(&mut self, event: &ModalEvent) -> bool {
        let Some(binding) = event.binding() else {
            return false;
        };
        let Some(&handler) = self.bindings.get(&binding) else {
            return false;
        };

        let closed = self.close();
        self.calls.push(HandlerCall {
            binding,
            handler,
            closed,
        });
        closed
    }

    /// Hide the overlay; closing an already-hidden modal does nothing.
    fn close(&mut self) -> bool {
        if !self.visible {
            return false;
        }
        self.visible = false;
        true
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn rows(&self) -> &[OrderRow] {
        &self.rows
    }

    pub fn handler_count(&self) -> usize {
        self.bindings.len()
    }

    /// Id of the handler currently attached to `binding`.
    pub fn handler_id(&self, binding: Binding) -> Option<u64> {
        self.bindings.get(&binding).copied()
    }

    /// Every handler invocation, oldest first.
    pub fn calls(&self) -> &[HandlerCall] {
        &self.calls
    }

    /// How many times the overlay has been dismissed.
    pub fn dismissals(&self) -> usize {
        self.calls.iter().filter(|c| c.closed).count()
    }

    pub fn render(&self) -> String {
        let mut out = String::from("Order Details\n");
        out.push_str(&format!(
            "{:<10} {:<20} {:<24} {:<12} {:>12}  {}\n",
            "Order ID", "Date", "Customer", "Status", "Total", "Action"
        ));
        for row in &self.rows {
            out.push_str(&format!(
                "{:<10} {:<20} {:<24} {:<12} {:>12}  {}\n",
                format!("#{}", row.id),
                row.date,
                row.customer,
                row.status,
                row.total,
                row.edit_url
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    const ORDERS: &str = r#"[
        {"id":"101","date":"2026-03-01 09:15:00","status":"wc-on-hold","total":"R250.00","customer":"Thandi Nkosi"},
        {"id":"102","date":"2026-03-02 10:00:00","status":"completed","total":"R99.90","customer":"Sam Pillay"}
    ]"#;

    #[test]
    fn test_open_renders_rows() {
        let mut modal = OrderModal::new("/wp-admin/");
        assert_eq!(modal.open(ORDERS).unwrap(), 2);
        assert!(modal.is_visible());

        let first = &modal.rows()[0];
        assert_eq!(first.status, "on-hold");
        assert_eq!(first.edit_url, "/wp-admin/post.php?post=101&action=edit");
        assert!(modal.render().contains("#102"));
    }

    #[test]
    fn test_not_an_array_aborts_without_render() {
        let mut modal = OrderModal::new("/wp-admin");
        let err = modal.open(r#""not an array""#).unwrap_err();
        assert!(matches!(err, OrderListError::NotAList(_)));
        assert!(!modal.is_visible());
        assert!(modal.rows().is_empty());
        assert_eq!(modal.handler_count(), 0);
    }

    #[test]
    fn test_failed_open_keeps_previous_contents() {
        let mut modal = OrderModal::new("/wp-admin");
        modal.open(ORDERS).unwrap();
        assert!(modal.dispatch(&ModalEvent::CloseClicked));
        assert!(modal.open("{broken").is_err());
        assert_eq!(modal.rows().len(), 2);
        assert!(!modal.is_visible());
    }

    #[test]
    fn test_reopening_does_not_stack_handlers() {
        let mut modal = OrderModal::new("/wp-admin");
        modal.open(ORDERS).unwrap();
        let first = modal.handler_id(Binding::CloseButton).unwrap();
        modal.open(ORDERS).unwrap();
        modal.open(ORDERS).unwrap();
        assert_eq!(modal.handler_count(), 3);
        let current = modal.handler_id(Binding::CloseButton).unwrap();
        assert_ne!(first, current);

        // one click runs exactly one handler, the latest one
        assert!(modal.dispatch(&ModalEvent::CloseClicked));
        assert_eq!(
            modal.calls(),
            &[HandlerCall {
                binding: Binding::CloseButton,
                handler: current,
                closed: true,
            }]
        );
        assert!(!modal.is_visible());

        // every other path still runs one handler each but closes nothing
        assert!(!modal.dispatch(&ModalEvent::CloseClicked));
        assert!(!modal.dispatch(&ModalEvent::Click(ClickTarget::Backdrop)));
        assert!(!modal.dispatch(&ModalEvent::KeyUp("Escape".into())));
        assert_eq!(modal.calls().len(), 4);
        assert_eq!(modal.dismissals(), 1);
    }

    #[test]
    fn test_each_dismissal_path() {
        let mut modal = OrderModal::new("/wp-admin");

        modal.open(ORDERS).unwrap();
        assert!(!modal.dispatch(&ModalEvent::Click(ClickTarget::Content)));
        assert!(!modal.dispatch(&ModalEvent::KeyUp("Enter".into())));
        assert!(modal.is_visible());

        assert!(modal.dispatch(&ModalEvent::Click(ClickTarget::Backdrop)));
        modal.open(ORDERS).unwrap();
        assert!(modal.dispatch(&ModalEvent::KeyUp("Escape".into())));
        assert_eq!(modal.dismissals(), 2);
    }

    #[test]
    fn test_events_before_first_open_are_ignored() {
        let mut modal = OrderModal::new("/wp-admin");
        assert!(!modal.dispatch(&ModalEvent::CloseClicked));
        assert!(modal.calls().is_empty());
        assert_eq!(modal.handler_id(Binding::EscapeKey), None);
    }
}
