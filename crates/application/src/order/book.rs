use dashmap::DashMap;
use tracing::debug;

use domain::product::default_catalog;
use domain::{OrderLines, Product, SessionProduct, SessionWithDetails};

/// Per-session product orders, held in memory only
///
/// Edits go to a draft copy of the session's order. The draft is written
/// back by [`OrderBook::commit`] and thrown away by [`OrderBook::discard`].
pub struct OrderBook {
    catalog: Vec<Product>,
    committed: DashMap<String, OrderLines>,
    drafts: DashMap<String, OrderLines>,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    pub fn new() -> Self {
        Self::with_catalog(default_catalog())
    }

    pub fn with_catalog(catalog: Vec<Product>) -> Self {
        Self {
            catalog,
            committed: DashMap::new(),
            drafts: DashMap::new(),
        }
    }

    pub fn catalog(&self) -> &[Product] {
        &self.catalog
    }

    pub fn find_product(&self, product_id: &str) -> Option<&Product> {
        self.catalog.iter().find(|p| p.id == product_id)
    }

    /// Start editing; an already open draft is kept as is
    pub fn open_draft(&self, session_id: &str) -> OrderLines {
        self.drafts
            .entry(session_id.to_string())
            .or_insert_with(|| self.order(session_id))
            .value()
            .clone()
    }

    pub fn has_draft(&self, session_id: &str) -> bool {
        self.drafts.contains_key(session_id)
    }

    pub fn add_product(&self, session_id: &str, product: Product) {
        debug!(session_id, product_id = %product.id, "Adding product to draft");
        self.edit(session_id, |lines| lines.add(product));
    }

    /// Returns false when the product was not in the draft
    pub fn decrement_product(&self, session_id: &str, product_id: &str) -> bool {
        self.edit(session_id, |lines| lines.decrement(product_id))
    }

    pub fn remove_product(&self, session_id: &str, product_id: &str) -> bool {
        self.edit(session_id, |lines| lines.remove(product_id))
    }

    pub fn draft(&self, session_id: &str) -> Option<OrderLines> {
        self.drafts.get(session_id).map(|d| d.value().clone())
    }

    pub fn draft_total(&self, session_id: &str) -> f64 {
        self.drafts
            .get(session_id)
            .map(|d| d.total())
            .unwrap_or(0.0)
    }

    /// Replace the stored order with the draft and close it
    ///
    /// Returns the committed total; committing with no open draft leaves the
    /// stored order untouched.
    pub fn commit(&self, session_id: &str) -> f64 {
        let Some((_, draft)) = self.drafts.remove(session_id) else {
            return self.order_total(session_id);
        };

        let total = draft.total();
        if draft.is_empty() {
            self.committed.remove(session_id);
        } else {
            self.committed.insert(session_id.to_string(), draft);
        }
        debug!(session_id, total, "Order committed");
        total
    }

    /// Close the draft without saving
    pub fn discard(&self, session_id: &str) {
        if self.drafts.remove(session_id).is_some() {
            debug!(session_id, "Order draft discarded");
        }
    }

    /// Stored order for the session, empty when nothing was committed
    pub fn order(&self, session_id: &str) -> OrderLines {
        self.committed
            .get(session_id)
            .map(|o| o.value().clone())
            .unwrap_or_default()
    }

    pub fn lines(&self, session_id: &str) -> Vec<SessionProduct> {
        self.order(session_id).lines().to_vec()
    }

    pub fn order_total(&self, session_id: &str) -> f64 {
        self.committed
            .get(session_id)
            .map(|o| o.total())
            .unwrap_or(0.0)
    }

    /// Tariff price plus committed products
    pub fn session_total(&self, session: &SessionWithDetails) -> f64 {
        session.price() + self.order_total(session.id())
    }

    /// Tariff revenue of `sessions` plus everything ordered on them
    pub fn revenue_with_products(&self, sessions: &[SessionWithDetails]) -> f64 {
        sessions.iter().map(|s| self.session_total(s)).sum()
    }

    fn edit<R>(&self, session_id: &str, f: impl FnOnce(&mut OrderLines) -> R) -> R {
        let mut draft = self
            .drafts
            .entry(session_id.to_string())
            .or_insert_with(|| self.order(session_id));
        f(draft.value_mut())
    }
}
