use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Drinks,
    Snacks,
    Extras,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drinks => "drinks",
            Self::Snacks => "snacks",
            Self::Extras => "extras",
        }
    }
}

/// Priced add-on sold at the front desk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub category: ProductCategory,
}

impl Product {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: f64,
        category: ProductCategory,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            category,
        }
    }
}

/// Products offered by default at the counter
pub fn default_catalog() -> Vec<Product> {
    vec![
        Product::new("water", "Water", 2.0, ProductCategory::Drinks),
        Product::new("juice", "Fresh Juice", 3.0, ProductCategory::Drinks),
        Product::new("soda", "Soda", 2.5, ProductCategory::Drinks),
        Product::new("cookies", "Cookies", 4.0, ProductCategory::Snacks),
        Product::new("chips", "Chips", 3.5, ProductCategory::Snacks),
        Product::new("sandwich", "Sandwich", 6.0, ProductCategory::Snacks),
        Product::new("combo", "Snack Combo", 8.0, ProductCategory::Extras),
        Product::new("birthday", "Birthday Package", 15.0, ProductCategory::Extras),
    ]
}

/// One order line: a product and how many of it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionProduct {
    pub product: Product,
    pub quantity: u32,
}

impl SessionProduct {
    pub fn line_total(&self) -> f64 {
        self.product.price * self.quantity as f64
    }
}

/// Ordered list of order lines for one session
///
/// Lines keep their insertion order; a product appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderLines(Vec<SessionProduct>);

impl OrderLines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the existing line or append a new one with quantity 1
    pub fn add(&mut self, product: Product) {
        match self.0.iter_mut().find(|line| line.product.id == product.id) {
            Some(line) => line.quantity += 1,
            None => self.0.push(SessionProduct {
                product,
                quantity: 1,
            }),
        }
    }

    /// Decrement by one, dropping the line instead of leaving it at zero.
    /// Returns false when the product is not in the order.
    pub fn decrement(&mut self, product_id: &str) -> bool {
        let Some(index) = self.position(product_id) else {
            return false;
        };
        if self.0[index].quantity > 1 {
            self.0[index].quantity -= 1;
        } else {
            self.0.remove(index);
        }
        true
    }

    /// Drop the line regardless of quantity
    pub fn remove(&mut self, product_id: &str) -> bool {
        match self.position(product_id) {
            Some(index) => {
                self.0.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn total(&self) -> f64 {
        self.0.iter().map(SessionProduct::line_total).sum()
    }

    pub fn item_count(&self) -> u32 {
        self.0.iter().map(|line| line.quantity).sum()
    }

    pub fn quantity_of(&self, product_id: &str) -> u32 {
        self.position(product_id)
            .map(|index| self.0[index].quantity)
            .unwrap_or(0)
    }

    pub fn lines(&self) -> &[SessionProduct] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn position(&self, product_id: &str) -> Option<usize> {
        self.0.iter().position(|line| line.product.id == product_id)
    }
}

impl From<Vec<SessionProduct>> for OrderLines {
    fn from(lines: Vec<SessionProduct>) -> Self {
        let mut order = Self::new();
        for line in lines {
            for _ in 0..line.quantity {
                order.add(line.product.clone());
            }
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water() -> Product {
        Product::new("water", "Water", 2.0, ProductCategory::Drinks)
    }

    fn cookies() -> Product {
        Product::new("cookies", "Cookies", 4.0, ProductCategory::Snacks)
    }

    #[test]
    fn test_same_product_twice_is_one_line() {
        let mut order = OrderLines::new();
        order.add(water());
        order.add(water());

        assert_eq!(order.len(), 1);
        assert_eq!(order.quantity_of("water"), 2);
        assert_eq!(order.total(), 4.0);
    }

    #[test]
    fn test_decrement_to_zero_removes_line() {
        let mut order = OrderLines::new();
        order.add(water());
        assert!(order.decrement("water"));
        assert!(order.is_empty());
        assert!(!order.decrement("water"));
    }

    #[test]
    fn test_new_lines_append_and_order_is_kept() {
        let mut order = OrderLines::new();
        order.add(cookies());
        order.add(water());
        order.add(cookies());

        let ids: Vec<&str> = order.lines().iter().map(|l| l.product.id.as_str()).collect();
        assert_eq!(ids, vec!["cookies", "water"]);
        assert_eq!(order.item_count(), 3);
        assert_eq!(order.total(), 10.0);
    }

    #[test]
    fn test_remove_ignores_quantity() {
        let mut order = OrderLines::new();
        order.add(water());
        order.add(water());
        order.add(cookies());
        assert!(order.remove("water"));
        assert_eq!(order.len(), 1);
        assert_eq!(order.total(), 4.0);
        assert!(!order.remove("juice"));
    }

    #[test]
    fn test_from_lines_merges_duplicates() {
        let order = OrderLines::from(vec![
            SessionProduct { product: water(), quantity: 2 },
            SessionProduct { product: water(), quantity: 1 },
        ]);
        assert_eq!(order.len(), 1);
        assert_eq!(order.quantity_of("water"), 3);
    }

    #[test]
    fn test_default_catalog_unique_ids() {
        let catalog = default_catalog();
        let mut ids: Vec<&str> = catalog.iter().map(|p| p.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), catalog.len());
    }
}
