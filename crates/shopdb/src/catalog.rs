//! The demo catalog used by `shopdb-seed` and the test fixtures.

use crate::product::NewProduct;

/// Nine sample products: (name, price, stock).
const SAMPLE: [(&str, f64, u32); 9] = [
    ("Gaming Laptop", 1800.0, 4),
    ("Smartphone", 900.0, 12),
    ("Wireless Headphones", 250.0, 20),
    ("Tablet", 600.0, 8),
    ("Smartwatch", 300.0, 15),
    ("Digital Camera", 1200.0, 5),
    ("Bluetooth Speaker", 150.0, 10),
    ("Gaming Console", 500.0, 7),
    ("External Hard Drive", 100.0, 25),
];

/// The sample catalog, in insertion order.
pub fn sample_catalog() -> Vec<NewProduct> {
    SAMPLE
        .iter()
        .map(|&(name, price, stock)| NewProduct::new(name, price, stock))
        .collect()
}
