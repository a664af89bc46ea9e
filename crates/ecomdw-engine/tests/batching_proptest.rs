//! Property: how rows are split into batches never changes what is stored.

mod common;

use std::collections::BTreeSet;
use std::num::NonZeroUsize;

use ecomdw_engine::descriptor::PAYMENT_METHODS;
use ecomdw_engine::{DescriptorLoader, TableLoader};
use ecomdw_warehouse::{Row, SqliteWarehouse, Value};
use proptest::prelude::*;

use common::stored_rows;

fn load_with(rows: &[Row], batch_size: usize) -> Vec<Row> {
    let mut wh = SqliteWarehouse::in_memory().unwrap();
    let loader = DescriptorLoader::payment_methods()
        .with_batch_size(NonZeroUsize::new(batch_size).unwrap());
    let written = loader.load(&mut wh, rows).unwrap();
    assert_eq!(written, rows.len() as u64);
    stored_rows(&mut wh, &PAYMENT_METHODS)
}

proptest! {
    #[test]
    fn batch_size_does_not_change_stored_rows(
        providers in prop::collection::btree_set("[A-Za-z][A-Za-z ]{0,11}", 1..60),
        batch_size in 1usize..80,
    ) {
        let providers: BTreeSet<String> = providers;
        let rows: Vec<Row> = providers
            .into_iter()
            .map(|p| vec![Value::from("Credit Card"), Value::from(p)])
            .collect();

        let batched = load_with(&rows, batch_size);
        let single = load_with(&rows, rows.len());

        prop_assert_eq!(batched.len(), rows.len());
        prop_assert_eq!(batched, single);
    }
}
