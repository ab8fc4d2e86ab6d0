//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::{Map, Value};

use shopdb::{NewProduct, ProductPatch};
use shopdb_core::RecordId;

/// Generate a product name.
pub fn product_name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 ]{0,23}".prop_map(String::from)
}

/// Generate a price in whole cents, so it survives storage exactly.
pub fn price() -> impl Strategy<Value = f64> {
    (0u32..=1_000_000).prop_map(|cents| f64::from(cents) / 100.0)
}

/// Generate a stock level.
pub fn stock() -> impl Strategy<Value = u32> {
    0u32..=10_000
}

/// Generate a record id.
pub fn record_id() -> impl Strategy<Value = RecordId> {
    (1u64..=1_000).prop_map(RecordId)
}

/// Generate an extra field value.
pub fn extra_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-z ]{0,16}".prop_map(Value::from),
        prop::collection::vec("[a-z]{1,6}", 0..4).prop_map(Value::from),
    ]
}

/// Generate extra fields. Names never collide with `id`, `name`, `price`
/// or `stock`.
pub fn extra_fields(max_len: usize) -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map("x_[a-z]{1,8}", extra_value(), 0..=max_len)
        .prop_map(|fields| fields.into_iter().collect())
}

/// Parameters for generating a product.
#[derive(Debug, Clone)]
pub struct ProductParams {
    pub name: String,
    pub price: f64,
    pub stock: u32,
    pub extra: Map<String, Value>,
}

impl Arbitrary for ProductParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (product_name(), price(), stock(), extra_fields(3))
            .prop_map(|(name, price, stock, extra)| ProductParams {
                name,
                price,
                stock,
                extra,
            })
            .boxed()
    }
}

/// Build a product from parameters.
pub fn product_from_params(params: &ProductParams) -> NewProduct {
    params
        .extra
        .iter()
        .fold(
            NewProduct::new(params.name.clone(), params.price, params.stock),
            |product, (field, value)| product.with_field(field.clone(), value.clone()),
        )
}

/// Generate a product ready to insert.
pub fn new_product() -> impl Strategy<Value = NewProduct> {
    any::<ProductParams>().prop_map(|params| product_from_params(&params))
}

/// Generate a well-typed patch touching any subset of fields.
pub fn product_patch() -> impl Strategy<Value = ProductPatch> {
    (
        proptest::option::of(product_name()),
        proptest::option::of(price()),
        proptest::option::of(stock()),
        extra_fields(2),
    )
        .prop_map(|(name, price, stock, extra)| {
            let mut patch = ProductPatch::new();
            if let Some(name) = name {
                patch = patch.name(name);
            }
            if let Some(price) = price {
                patch = patch.price(price);
            }
            if let Some(stock) = stock {
                patch = patch.stock(stock);
            }
            extra
                .into_iter()
                .fold(patch, |patch, (field, value)| patch.field(field, value))
        })
}
